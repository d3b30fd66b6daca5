//! Sequential trigger-and-wait run loop.

use std::time::Duration;

use anyhow::Context;
use jgate_client::{
    mask_token,
    ClientConfig,
    ClientError,
    Credentials,
    JenkinsClient,
    TlsPolicy,
};

use crate::output;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Configuration for one invocation, assembled from flags and
/// environment variables and validated before any network call.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub base_url: String,
    pub username: String,
    pub token: String,
    pub remote_token: String,
    pub jobs: Vec<String>,
    pub parameters: Vec<String>,
    pub tls: TlsPolicy,
    pub use_crumb: bool,
    pub wait: bool,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub keep_going: bool,
    pub debug: bool,
}

impl RunConfig {
    fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.is_empty() {
            return Err(ClientError::InvalidConfig(
                "jenkins base URL is required".to_string(),
            ));
        }

        let has_user_auth = !self.username.is_empty() && !self.token.is_empty();
        let has_remote_token = !self.remote_token.is_empty();
        if !has_user_auth && !has_remote_token {
            return Err(ClientError::InvalidConfig(
                "authentication required: provide either (user + token) or a remote trigger token"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// Executes the run: validates the configuration, builds the client,
/// then triggers each job in order, optionally gating on its terminal
/// result. Fail-fast by default; with `keep_going` every job is
/// attempted and the first failure is returned after the loop so the
/// exit code still reflects it.
pub async fn run(config: RunConfig) -> anyhow::Result<()> {
    config.validate().context("configuration error")?;

    let jobs = trim_jobs(&config.jobs);
    if jobs.is_empty() {
        anyhow::bail!("at least one Jenkins job name is required");
    }

    if config.debug {
        debug_dump(&config);
    }

    let mut client_config = ClientConfig::new(&config.base_url)
        .with_tls(config.tls.clone())
        .with_crumb(config.use_crumb)
        .with_debug(config.debug);
    if !config.username.is_empty() && !config.token.is_empty() {
        client_config =
            client_config.with_credentials(Credentials::new(&config.username, &config.token));
    }
    if !config.remote_token.is_empty() {
        client_config = client_config.with_remote_token(&config.remote_token);
    }

    let client = JenkinsClient::new(client_config).await?;

    let params = parse_parameters(&config.parameters);

    let poll_interval = if config.poll_interval.is_zero() {
        DEFAULT_POLL_INTERVAL
    } else {
        config.poll_interval
    };
    let timeout = if config.timeout.is_zero() {
        DEFAULT_TIMEOUT
    } else {
        config.timeout
    };

    let mut failures = Vec::new();

    for job in &jobs {
        match process_job(&client, job, &params, &config, poll_interval, timeout).await {
            Ok(()) => {}
            Err(e) if config.keep_going => {
                tracing::error!(job, error = %e, "job failed");
                failures.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    if !failures.is_empty() {
        tracing::error!(
            failed = failures.len(),
            total = jobs.len(),
            "run finished with failures"
        );
        return Err(failures.remove(0));
    }

    Ok(())
}

async fn process_job(
    client: &JenkinsClient,
    job: &str,
    params: &[(String, String)],
    config: &RunConfig,
    poll_interval: Duration,
    timeout: Duration,
) -> anyhow::Result<()> {
    let queue_id = client
        .trigger(job, params)
        .await
        .with_context(|| format!("failed to trigger job {job:?}"))?;
    tracing::info!(job, queue_id, "successfully triggered job");

    if !config.wait {
        return Ok(());
    }

    let info = client
        .wait_for_completion(job, queue_id, poll_interval, timeout)
        .await
        .with_context(|| format!("error waiting for job {job:?}"))?;

    if let Err(e) = output::set_outputs(&[
        ("result", info.result_str()),
        ("url", info.url.as_deref().unwrap_or("")),
    ]) {
        tracing::warn!(error = %e, "failed to write outputs");
    }

    if let Some(started) = chrono::DateTime::from_timestamp_millis(info.timestamp) {
        tracing::debug!(job, started = %started, duration_ms = info.duration, "build finished");
    }

    if info.result_str() != "SUCCESS" {
        return Err(ClientError::BuildFailed {
            job: job.to_string(),
            build_number: info.number,
            result: info.result_str().to_string(),
        }
        .into());
    }

    tracing::info!(job, build_number = info.number, "job completed successfully");
    Ok(())
}

/// Removes empty and whitespace-only entries, trimming the survivors.
fn trim_jobs(jobs: &[String]) -> Vec<String> {
    jobs.iter()
        .map(|job| job.trim())
        .filter(|job| !job.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `key=value` strings into query parameters. Keys are trimmed;
/// values are kept verbatim to preserve intentional spaces. Malformed
/// entries are skipped with a warning.
fn parse_parameters(params: &[String]) -> Vec<(String, String)> {
    let mut values = Vec::new();

    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            tracing::warn!(param = %param, "skipping invalid parameter, expected key=value");
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            tracing::warn!(param = %param, "skipping parameter with empty key");
            continue;
        }

        values.push((key.to_string(), value.to_string()));
    }

    values
}

fn debug_dump(config: &RunConfig) {
    tracing::debug!(
        base_url = %config.base_url,
        username = %config.username,
        token = %mask_token(&config.token),
        remote_token = %mask_token(&config.remote_token),
        jobs = ?config.jobs,
        parameters = ?config.parameters,
        tls = ?config.tls,
        use_crumb = config.use_crumb,
        wait = config.wait,
        poll_interval = ?config.poll_interval,
        timeout = ?config.timeout,
        keep_going = config.keep_going,
        "effective configuration"
    );
}

//! Jenkins API client and the trigger/poll state machine.

use std::time::Duration;

use reqwest::{
    Client,
    RequestBuilder,
    StatusCode,
};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tokio::time::Instant;

use crate::auth::mask_token;
use crate::config::{
    ClientConfig,
    TlsPolicy,
};
use crate::error::{
    ClientError,
    ClientResult,
};
use crate::path::resolve_job_path;
use crate::types::{
    BuildInfo,
    Crumb,
    QueueItem,
};

/// Reserved query key carrying the remote trigger token.
const TOKEN_PARAM: &str = "token";
/// Path marker preceding the queue id in trigger Location headers.
const QUEUE_ITEM_MARKER: &str = "/queue/item/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Jenkins API client owning the HTTP transport and authentication.
#[derive(Debug)]
pub struct JenkinsClient {
    http: Client,
    config: ClientConfig,
    crumb: OnceCell<Crumb>,
}

impl JenkinsClient {
    /// Builds a client from the configuration, loading the custom CA
    /// certificate when one is configured.
    pub async fn new(config: ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT);

        match &config.tls {
            TlsPolicy::SystemRoots => {}
            TlsPolicy::SkipVerify => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            TlsPolicy::CustomCa(source) => {
                let pem = source.load().await?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    ClientError::InvalidConfig(format!("failed to parse CA certificate: {e}"))
                })?;
                builder = builder.add_root_certificate(cert);
            }
        }

        if let Some(credentials) = &config.credentials {
            builder = builder.default_headers(credentials.default_headers()?);
        }

        let http = builder.build()?;

        Ok(Self {
            http,
            config,
            crumb: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Triggers a build and returns the queue item id for tracking.
    ///
    /// The configured remote trigger token is merged into the
    /// parameter set under the reserved `token` key; the token never
    /// counts toward the parameterized-vs-plain endpoint decision.
    /// All parameters travel as URL query parameters.
    pub async fn trigger(&self, job: &str, params: &[(String, String)]) -> ClientResult<i64> {
        let mut query: Vec<(String, String)> = params.to_vec();
        if let Some(token) = &self.config.remote_token {
            query.retain(|(key, _)| key != TOKEN_PARAM);
            query.push((TOKEN_PARAM.to_string(), token.clone()));
        }

        let suffix = if has_build_params(&query) {
            "/buildWithParameters"
        } else {
            "/build"
        };
        let path = format!("{}{}", resolve_job_path(job), suffix);

        if self.config.debug {
            let param_display: Vec<String> = query
                .iter()
                .map(|(key, value)| {
                    if key == TOKEN_PARAM {
                        format!("{key}={}", mask_token(value))
                    } else {
                        format!("{key}={value}")
                    }
                })
                .collect();
            tracing::debug!(job, path = %path, params = ?param_display, "triggering build");
        }

        let mut request = self.http.post(self.url(&path));
        if !query.is_empty() {
            request = request.query(&query);
        }
        request = self.apply_crumb(request).await?;

        let response = request.send().await?;
        let status = response.status();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_queue_id(&location.ok_or(ClientError::MissingLocation)?)
    }

    /// Fetches the current state of a queue item.
    ///
    /// Any non-200 response (404 included, once the item has been
    /// promoted to a build and removed) is an error; the caller
    /// decides whether that is fatal or merely "try again".
    pub async fn get_queue_item(&self, queue_id: i64) -> ClientResult<QueueItem> {
        self.queue_item_with_deadline(queue_id, None).await
    }

    /// Fetches the current state of a build.
    pub async fn get_build_info(&self, job: &str, build_number: i64) -> ClientResult<BuildInfo> {
        self.build_info_with_deadline(job, build_number, None).await
    }

    /// Fetches the anti-CSRF crumb from the issuer endpoint.
    pub async fn fetch_crumb(&self) -> ClientResult<Crumb> {
        self.get_json("/crumbIssuer/api/json", None).await
    }

    /// Waits for a triggered build to reach a terminal state.
    ///
    /// Phase one polls the queue item until the scheduler assigns a
    /// build number; phase two polls that build until it stops
    /// running. Both phases share a single deadline computed at entry,
    /// so a slow dispatch eats into the build phase's budget. Fetch
    /// failures inside either loop are transient: the queue entry is
    /// expected to vanish once the build starts, so the failure is
    /// logged and the poll retried at the fixed interval.
    ///
    /// Any terminal result (SUCCESS, FAILURE, ABORTED, UNSTABLE) is
    /// returned as `Ok`; judging the result is the caller's job.
    pub async fn wait_for_completion(
        &self,
        job: &str,
        queue_id: i64,
        poll_interval: Duration,
        timeout: Duration,
    ) -> ClientResult<BuildInfo> {
        let deadline = Instant::now() + timeout;

        tracing::info!(job, queue_id, "waiting for job to start");
        let build_number = loop {
            if Instant::now() >= deadline {
                return Err(ClientError::Timeout {
                    job: job.to_string(),
                    build_number: None,
                });
            }

            match self.queue_item_with_deadline(queue_id, Some(deadline)).await {
                Ok(item) => {
                    if let Some(executable) = &item.executable {
                        if executable.number > 0 {
                            tracing::info!(job, build_number = executable.number, "job started");
                            break executable.number;
                        }
                    }
                    if let Some(why) = item.why.as_deref().filter(|why| !why.is_empty()) {
                        tracing::info!(job, why, "job is queued");
                    }
                }
                Err(e) => {
                    // The queue entry may already have been promoted
                    // to a build and deleted; keep polling until the
                    // deadline.
                    tracing::warn!(job, error = %e, "failed to get queue item");
                }
            }

            tokio::time::sleep(poll_interval).await;
        };

        tracing::info!(job, build_number, "waiting for build to complete");
        loop {
            if Instant::now() >= deadline {
                return Err(ClientError::Timeout {
                    job: job.to_string(),
                    build_number: Some(build_number),
                });
            }

            match self
                .build_info_with_deadline(job, build_number, Some(deadline))
                .await
            {
                Ok(info) if !info.building => {
                    tracing::info!(
                        job,
                        build_number,
                        result = info.result_str(),
                        "build completed"
                    );
                    return Ok(info);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(job, error = %e, "failed to get build info");
                }
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn queue_item_with_deadline(
        &self,
        queue_id: i64,
        deadline: Option<Instant>,
    ) -> ClientResult<QueueItem> {
        self.get_json(&format!("/queue/item/{queue_id}/api/json"), deadline)
            .await
    }

    async fn build_info_with_deadline(
        &self,
        job: &str,
        build_number: i64,
        deadline: Option<Instant>,
    ) -> ClientResult<BuildInfo> {
        let path = format!("{}/{}/api/json", resolve_job_path(job), build_number);
        self.get_json(&path, deadline).await
    }

    /// GET a JSON endpoint. When a deadline is given the request's own
    /// timeout is clamped to the time remaining, so an in-flight call
    /// cannot outlive the deadline.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        deadline: Option<Instant>,
    ) -> ClientResult<T> {
        let mut request = self.http.get(self.url(path));
        if let Some(deadline) = deadline {
            request = request.timeout(deadline.saturating_duration_since(Instant::now()));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn apply_crumb(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        if !self.config.use_crumb {
            return Ok(request);
        }

        // Fetched once per session and reused across jobs.
        let crumb = self.crumb.get_or_try_init(|| self.fetch_crumb()).await?;
        Ok(request.header(crumb.crumb_request_field.as_str(), crumb.crumb.as_str()))
    }
}

/// Whether any real build parameter is present. The reserved token key
/// never flips the trigger endpoint from plain to parameterized.
fn has_build_params(query: &[(String, String)]) -> bool {
    query.iter().any(|(key, _)| key != TOKEN_PARAM)
}

/// Extracts the queue id from a trigger response Location header by
/// locating the queue item marker and reading the decimal digits after
/// it, stopping at the next `/` or end of string.
fn parse_queue_id(location: &str) -> ClientResult<i64> {
    let idx = location
        .find(QUEUE_ITEM_MARKER)
        .ok_or_else(|| ClientError::QueueIdNotFound(location.to_string()))?;

    let digits: String = location[idx + QUEUE_ITEM_MARKER.len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();

    digits
        .parse()
        .map_err(|_| ClientError::InvalidQueueId(location.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queue_id_with_trailing_slash() {
        assert_eq!(
            parse_queue_id("http://jenkins.example.com/queue/item/456/").unwrap(),
            456
        );
    }

    #[test]
    fn test_parse_queue_id_without_trailing_slash() {
        assert_eq!(
            parse_queue_id("http://jenkins.example.com/queue/item/789").unwrap(),
            789
        );
    }

    #[test]
    fn test_parse_queue_id_missing_marker() {
        let err = parse_queue_id("http://jenkins.example.com/somewhere/else").unwrap_err();
        assert!(matches!(err, ClientError::QueueIdNotFound(_)));

        let err = parse_queue_id("").unwrap_err();
        assert!(matches!(err, ClientError::QueueIdNotFound(_)));
    }

    #[test]
    fn test_parse_queue_id_non_numeric() {
        let err = parse_queue_id("http://jenkins.example.com/queue/item/abc").unwrap_err();
        assert!(matches!(err, ClientError::InvalidQueueId(_)));

        let err = parse_queue_id("http://jenkins.example.com/queue/item/").unwrap_err();
        assert!(matches!(err, ClientError::InvalidQueueId(_)));
    }

    #[test]
    fn test_has_build_params_ignores_reserved_token_key() {
        let token_only = vec![("token".to_string(), "secret".to_string())];
        assert!(!has_build_params(&token_only));

        let with_param = vec![
            ("token".to_string(), "secret".to_string()),
            ("branch".to_string(), "main".to_string()),
        ];
        assert!(has_build_params(&with_param));

        assert!(!has_build_params(&[]));
    }
}

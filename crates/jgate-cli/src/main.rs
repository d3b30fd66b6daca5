//! jgate - trigger Jenkins jobs and gate on their results.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use jgate_client::{
    CaSource,
    TlsPolicy,
};
use jgate_cli::runner::{
    self,
    RunConfig,
};
use jgate_cli::{
    duration,
    logging,
};

/// Trigger Jenkins jobs and gate on their results.
#[derive(Parser)]
#[command(name = "jgate", version, about, long_about = None)]
struct Cli {
    /// Jenkins base URL
    #[arg(long, env = "JENKINS_URL")]
    url: Option<String>,

    /// Jenkins username
    #[arg(short, long, env = "JENKINS_USER")]
    user: Option<String>,

    /// Jenkins API token for authentication
    #[arg(short, long, env = "JENKINS_TOKEN")]
    token: Option<String>,

    /// Jenkins remote trigger token
    #[arg(long, env = "JENKINS_REMOTE_TOKEN")]
    remote_token: Option<String>,

    /// Job to trigger; repeat for multiple jobs
    #[arg(short, long = "job", env = "JENKINS_JOB", value_delimiter = ',')]
    job: Vec<String>,

    /// Build parameter in key=value form; repeat for multiple
    #[arg(
        short = 'p',
        long = "param",
        env = "JENKINS_PARAMETERS",
        value_delimiter = '\n'
    )]
    param: Vec<String>,

    /// Allow insecure server connections when using SSL
    #[arg(long, env = "JENKINS_INSECURE")]
    insecure: bool,

    /// Custom CA certificate: inline PEM, file path, or URL
    #[arg(long, env = "JENKINS_CA_CERT")]
    ca_cert: Option<String>,

    /// Fetch an anti-CSRF crumb before triggering
    #[arg(long, env = "JENKINS_CRUMB")]
    crumb: bool,

    /// Wait for job completion
    #[arg(short, long, env = "JENKINS_WAIT")]
    wait: bool,

    /// Interval between status checks (e.g. 10s, 1m)
    #[arg(
        long,
        env = "JENKINS_POLL_INTERVAL",
        default_value = "10s",
        value_parser = duration::parse
    )]
    poll_interval: Duration,

    /// Maximum time to wait for job completion (e.g. 30m, 1h)
    #[arg(
        long,
        env = "JENKINS_TIMEOUT",
        default_value = "30m",
        value_parser = duration::parse
    )]
    timeout: Duration,

    /// Attempt every job even after one fails
    #[arg(long, env = "JENKINS_KEEP_GOING")]
    keep_going: bool,

    /// Show detailed request and configuration information
    #[arg(long, env = "JENKINS_DEBUG")]
    debug: bool,
}

impl Cli {
    fn tls_policy(&self) -> TlsPolicy {
        if self.insecure {
            TlsPolicy::SkipVerify
        } else if let Some(ca_cert) = &self.ca_cert {
            TlsPolicy::CustomCa(CaSource::classify(ca_cert))
        } else {
            TlsPolicy::SystemRoots
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let config = RunConfig {
        base_url: cli.url.clone().unwrap_or_default(),
        username: cli.user.clone().unwrap_or_default(),
        token: cli.token.clone().unwrap_or_default(),
        remote_token: cli.remote_token.clone().unwrap_or_default(),
        jobs: cli.job.clone(),
        parameters: cli.param.clone(),
        tls: cli.tls_policy(),
        use_crumb: cli.crumb,
        wait: cli.wait,
        poll_interval: cli.poll_interval,
        timeout: cli.timeout,
        keep_going: cli.keep_going,
        debug: cli.debug,
    };

    runner::run(config).await
}

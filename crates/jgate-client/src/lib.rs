//! Jenkins REST client for triggering jobs and tracking builds.
//!
//! This crate implements the small slice of the Jenkins API needed to
//! kick off a job and observe one build's lifecycle:
//! - Trigger a job, with or without build parameters, authenticated by
//!   an API token or a remote trigger token
//! - Resolve the resulting queue item to a build number
//! - Poll the build until it reaches a terminal state
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use jgate_client::{ClientConfig, Credentials, JenkinsClient};
//!
//! # async fn example() -> Result<(), jgate_client::ClientError> {
//! let config = ClientConfig::new("https://jenkins.example.com")
//!     .with_credentials(Credentials::new("admin", "api-token"));
//! let client = JenkinsClient::new(config).await?;
//!
//! let queue_id = client.trigger("folder/app", &[]).await?;
//! let build = client
//!     .wait_for_completion(
//!         "folder/app",
//!         queue_id,
//!         Duration::from_secs(10),
//!         Duration::from_secs(1800),
//!     )
//!     .await?;
//! println!("build #{} finished: {}", build.number, build.result_str());
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod path;
mod types;

pub use auth::{mask_token, Credentials};
pub use client::JenkinsClient;
pub use config::{CaSource, ClientConfig, TlsPolicy};
pub use error::{ClientError, ClientResult};
pub use path::resolve_job_path;
pub use types::{BuildInfo, Crumb, QueueExecutable, QueueItem};

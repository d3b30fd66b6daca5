//! Client configuration and TLS trust policy.

use std::path::PathBuf;

use reqwest::StatusCode;

use crate::auth::Credentials;
use crate::error::{
    ClientError,
    ClientResult,
};

/// Where a custom CA certificate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaSource {
    /// Inline PEM text.
    Pem(String),
    /// Path to a PEM file on disk.
    File(PathBuf),
    /// HTTP(S) URL serving the PEM.
    Url(String),
}

impl CaSource {
    /// Classifies a user-supplied CA certificate value: inline PEM when
    /// it starts with a BEGIN marker, a URL when it starts with an HTTP
    /// scheme, a file path otherwise.
    pub fn classify(value: &str) -> Self {
        if value.trim_start().starts_with("-----BEGIN") {
            CaSource::Pem(value.to_string())
        } else if value.starts_with("http://") || value.starts_with("https://") {
            CaSource::Url(value.to_string())
        } else {
            CaSource::File(PathBuf::from(value))
        }
    }

    /// Loads the PEM bytes from the classified source.
    pub(crate) async fn load(&self) -> ClientResult<Vec<u8>> {
        match self {
            CaSource::Pem(text) => Ok(text.clone().into_bytes()),
            CaSource::File(path) => std::fs::read(path).map_err(|e| {
                ClientError::InvalidConfig(format!(
                    "failed to read CA certificate file {}: {e}",
                    path.display()
                ))
            }),
            CaSource::Url(url) => {
                let response = reqwest::get(url).await?;
                if response.status() != StatusCode::OK {
                    return Err(ClientError::UnexpectedStatus {
                        status: response.status().as_u16(),
                        body: format!("failed to fetch CA certificate from {url}"),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// TLS trust policy for the HTTP transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsPolicy {
    /// System trust store.
    #[default]
    SystemRoots,
    /// System trust store plus a custom CA certificate.
    CustomCa(CaSource),
    /// Accept any server certificate.
    SkipVerify,
}

/// Immutable client configuration, fixed for the client's lifetime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) remote_token: Option<String>,
    pub(crate) tls: TlsPolicy,
    pub(crate) use_crumb: bool,
    pub(crate) debug: bool,
}

impl ClientConfig {
    /// Creates a configuration for the given server. Trailing slashes
    /// on the base URL are stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            credentials: None,
            remote_token: None,
            tls: TlsPolicy::default(),
            use_crumb: false,
            debug: false,
        }
    }

    /// Sets the username and API token pair used for basic auth.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the remote trigger token, sent as a query parameter under
    /// the reserved `token` key.
    #[must_use]
    pub fn with_remote_token(mut self, token: impl Into<String>) -> Self {
        self.remote_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    /// Fetch an anti-CSRF crumb before the first trigger request.
    #[must_use]
    pub fn with_crumb(mut self, use_crumb: bool) -> Self {
        self.use_crumb = use_crumb;
        self
    }

    /// Echo outgoing trigger requests (with secrets masked) at debug
    /// level.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

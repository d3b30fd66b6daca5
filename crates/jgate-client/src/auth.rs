//! Request decoration for the supported authentication strategies.
//!
//! Jenkins accepts several ways to authorize a trigger: a username plus
//! API token pair sent as basic auth, a remote trigger token sent as a
//! query parameter, and an anti-CSRF crumb header on state-changing
//! requests. Each strategy contributes its decoration here or in
//! [`crate::client`] rather than branching through the request path.

use base64::Engine;
use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
};

use crate::error::{
    ClientError,
    ClientResult,
};

/// Username and API token pair for request-level basic auth.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub api_token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_token: api_token.into(),
        }
    }

    /// Builds the Authorization header applied to every request.
    pub(crate) fn default_headers(&self) -> ClientResult<HeaderMap> {
        let auth_value = format!("{}:{}", self.username, self.api_token);
        let auth_header = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(auth_value.as_bytes())
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_header)
                .map_err(|e| ClientError::InvalidConfig(format!("invalid auth format: {e}")))?,
        );

        Ok(headers)
    }
}

/// Masks a secret for display.
pub fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }
    "***MASKED***".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        let credentials = Credentials::new("admin", "secret");
        let headers = credentials.default_headers().unwrap();

        assert_eq!(
            headers.get(AUTHORIZATION).unwrap(),
            "Basic YWRtaW46c2VjcmV0"
        );
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token(""), "");
        assert_eq!(mask_token("super-secret"), "***MASKED***");
        assert!(!mask_token("super-secret").contains("super"));
    }
}

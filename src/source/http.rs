//! Blocking JSON HTTP client shared by the platform adapters.

use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

use super::FetchError;
use crate::domain::ConfigError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How requests authenticate. Secrets are never logged.
#[derive(Clone)]
pub enum Auth {
    /// HTTP basic auth (Azure DevOps PATs use an empty user name).
    Basic { user: String, password: String },
    /// A single header carrying the token (GitLab `PRIVATE-TOKEN`).
    Header { name: &'static str, value: String },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Basic { user, .. } => write!(f, "Basic({user:?}, <redacted>)"),
            Auth::Header { name, .. } => write!(f, "Header({name}, <redacted>)"),
        }
    }
}

/// A decoded JSON body plus the response headers (for pagination metadata).
#[derive(Debug)]
pub struct JsonResponse {
    pub body: Value,
    headers: HeaderMap,
}

impl JsonResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    auth: Auth,
}

impl ApiClient {
    pub fn new(auth: Auth, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pr-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, auth })
    }

    /// GET `url` with `query`; any non-2xx status is an error.
    pub fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<JsonResponse, FetchError> {
        let request = self.client.get(url).query(query);
        let request = match &self.auth {
            Auth::Basic { user, password } => request.basic_auth(user, Some(password)),
            Auth::Header { name, value } => request.header(*name, value.as_str()),
        };

        tracing::debug!(url, ?query, "GET");
        let response = request
            .send()
            .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let headers = response.headers().clone();
        let body = response
            .json::<Value>()
            .map_err(|e| FetchError::Decode { url: url.to_string(), reason: e.to_string() })?;
        Ok(JsonResponse { body, headers })
    }
}

/// Append path segments to `base`, percent-encoding each segment (so a
/// GitLab project path `group/project` becomes `group%2Fproject`).
pub fn join_segments(base: &str, segments: &[&str]) -> Result<String, ConfigError> {
    let mut url = Url::parse(base.trim()).map_err(|e| ConfigError::InvalidValue {
        name: "base URL",
        reason: format!("'{base}': {e}"),
    })?;
    {
        let mut path = url.path_segments_mut().map_err(|_| ConfigError::InvalidValue {
            name: "base URL",
            reason: format!("'{base}' cannot carry a path"),
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_segments_encodes_each_segment() {
        let url =
            join_segments("https://gitlab.com/", &["api", "v4", "projects", "group/project"])
                .unwrap();
        assert_eq!(url, "https://gitlab.com/api/v4/projects/group%2Fproject");
    }

    #[test]
    fn join_segments_keeps_base_path() {
        let url = join_segments("https://dev.azure.com/org", &["My Project", "_apis"]).unwrap();
        assert_eq!(url, "https://dev.azure.com/org/My%20Project/_apis");
    }

    #[test]
    fn join_segments_rejects_garbage() {
        assert!(join_segments("not a url", &["x"]).is_err());
        assert!(join_segments("mailto:someone@example.com", &["x"]).is_err());
    }

    #[test]
    fn auth_debug_redacts_secrets() {
        let auth = Auth::Header { name: "PRIVATE-TOKEN", value: "glpat-secret".to_string() };
        assert!(!format!("{auth:?}").contains("glpat-secret"));
    }
}

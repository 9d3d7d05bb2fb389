// ============================================================================
// HTTP Transport
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("wallpaper-ed/", env!("CARGO_PKG_VERSION"));

/// Raw outcome of one GET request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Turn a non-2xx status into `FetchError::Http`, keep the body otherwise
    pub fn into_success(self) -> Result<Vec<u8>, FetchError> {
        if (200..300).contains(&self.status) {
            return Ok(self.body);
        }
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        Err(FetchError::Http {
            status: self.status,
            reason,
        })
    }
}

/// Single blocking GET. Implemented over reqwest for real use and by stubs in tests.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(ReqwestClient { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        debug!(status, bytes = body.len(), "response received");
        Ok(HttpResponse { status, body })
    }
}

/// Append url-encoded query parameters to `base`
pub fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    let mut url = base.to_string();
    let mut separator = if base.contains('?') { '&' } else { '?' };
    for (key, value) in params {
        url.push(separator);
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
        separator = '&';
    }
    url
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_keep_body() {
        let response = HttpResponse { status: 204, body: b"ok".to_vec() };
        assert_eq!(response.into_success().expect("2xx is success"), b"ok");
    }

    #[test]
    fn error_status_carries_code_and_reason() {
        let err = HttpResponse { status: 404, body: Vec::new() }
            .into_success()
            .expect_err("404 is a failure");
        match err {
            FetchError::Http { status, reason } => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn query_values_are_encoded() {
        let url = with_query("https://example.com/search", &[("q", "red fox"), ("purity", "100")]);
        assert_eq!(url, "https://example.com/search?q=red%20fox&purity=100");

        let url = with_query("https://example.com/search?x=1", &[("q", "a&b")]);
        assert_eq!(url, "https://example.com/search?x=1&q=a%26b");
    }
}

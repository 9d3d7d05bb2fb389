// ============================================================================
// Image Fetcher
// ============================================================================
// One search request to the selected provider yields an image URL,
// a second plain GET downloads the image bytes.
// ============================================================================

use reqwest::Url;
use tracing::{debug, info};

use crate::config::{Config, UNSPLASH_ID, WALLHAVEN_ID};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::unsplash::Unsplash;
use crate::wallhaven::Wallhaven;

/// Photographer attribution shown next to Unsplash images
#[derive(Debug, Clone, PartialEq)]
pub struct Credit {
    pub name: String,
    pub link: Option<String>,
}

/// An image picked by a provider, not yet downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCandidate {
    pub url: String,
    pub preview_url: Option<String>,  // Smaller rendition, when the provider offers one
    pub credit: Option<Credit>,
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub image: ImageCandidate,
    pub bytes: Option<Vec<u8>>,
}

/// What every provider knows how to do: build its search request and pick an
/// image out of the response body.
pub trait ImageSource {
    fn name(&self) -> &'static str;

    fn request_url(&self, query: Option<&str>) -> String;

    fn parse(&self, body: &[u8]) -> Result<ImageCandidate, FetchError>;
}

#[derive(Debug, Clone)]
pub enum Provider {
    Unsplash(Unsplash),
    Wallhaven(Wallhaven),
}

impl Provider {
    /// Resolve the selected provider id and validate its settings.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        match config.api.selected_provider.as_str() {
            UNSPLASH_ID => Ok(Provider::Unsplash(Unsplash::from_config(config)?)),
            WALLHAVEN_ID => Ok(Provider::Wallhaven(Wallhaven::from_config(config)?)),
            other => Err(FetchError::Config(format!(
                "unknown provider '{}' (supported: {}, {})",
                other, UNSPLASH_ID, WALLHAVEN_ID
            ))),
        }
    }

    fn source(&self) -> &dyn ImageSource {
        match self {
            Provider::Unsplash(p) => p,
            Provider::Wallhaven(p) => p,
        }
    }
}

impl ImageSource for Provider {
    fn name(&self) -> &'static str {
        self.source().name()
    }

    fn request_url(&self, query: Option<&str>) -> String {
        self.source().request_url(query)
    }

    fn parse(&self, body: &[u8]) -> Result<ImageCandidate, FetchError> {
        self.source().parse(body)
    }
}

pub struct ImageFetcher<C> {
    http: C,
}

impl<C: HttpClient> ImageFetcher<C> {
    pub fn new(http: C) -> Self {
        ImageFetcher { http }
    }

    /// Ask the selected provider for one image. Exactly one request is made,
    /// none if the configuration is incomplete.
    pub fn resolve_image_url(&self, config: &Config, query: Option<&str>) -> Result<ImageCandidate, FetchError> {
        let provider = Provider::from_config(config)?;
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        let url = provider.request_url(query);
        info!(provider = provider.name(), query = ?query, "searching for an image");

        let body = self.http.get(&url)?.into_success()?;
        let candidate = provider.parse(&body)?;
        ensure_absolute(&candidate.url)?;

        debug!(url = %candidate.url, "image resolved");
        Ok(candidate)
    }

    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let bytes = self.http.get(url)?.into_success()?;
        debug!(%url, bytes = bytes.len(), "image downloaded");
        Ok(bytes)
    }

    /// Resolve, then download the full-size image
    pub fn fetch(&self, config: &Config, query: Option<&str>) -> Result<FetchResult, FetchError> {
        let image = self.resolve_image_url(config, query)?;
        let bytes = self.fetch_bytes(&image.url)?;
        Ok(FetchResult {
            image,
            bytes: Some(bytes),
        })
    }
}

fn ensure_absolute(url: &str) -> Result<(), FetchError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(FetchError::InvalidResponse(format!("'{}' is not an absolute image URL", url))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::StubClient;

    const UNSPLASH_BODY: &str = r#"{"id":"x","urls":{"full":"https://images.unsplash.com/full.jpg","regular":"https://images.unsplash.com/small.jpg"}}"#;
    const WALLHAVEN_BODY: &str = r#"{"data":[{"id":"k7","path":"https://w.wallhaven.cc/full/k7/wallhaven-k7.jpg"}]}"#;

    fn config_for(provider: &str) -> Config {
        let mut config = Config::default();
        config.api.selected_provider = provider.to_string();
        config
    }

    #[test]
    fn unsplash_resolves_with_one_request() {
        let fetcher = ImageFetcher::new(StubClient::new().respond(200, UNSPLASH_BODY));
        let candidate = fetcher
            .resolve_image_url(&config_for(UNSPLASH_ID), Some(" mountains "))
            .expect("stubbed 200");

        assert_eq!(candidate.url, "https://images.unsplash.com/full.jpg");
        assert!(Url::parse(&candidate.url).is_ok());

        let requests = fetcher.http.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains("query=mountains"));
    }

    #[test]
    fn wallhaven_resolves_with_one_request() {
        let fetcher = ImageFetcher::new(StubClient::new().respond(200, WALLHAVEN_BODY));
        let candidate = fetcher
            .resolve_image_url(&config_for(WALLHAVEN_ID), None)
            .expect("stubbed 200");

        assert_eq!(candidate.url, "https://w.wallhaven.cc/full/k7/wallhaven-k7.jpg");
        assert_eq!(fetcher.http.requests().len(), 1);
    }

    #[test]
    fn wallhaven_seed_changes_between_calls() {
        let fetcher = ImageFetcher::new(
            StubClient::new()
                .respond(200, WALLHAVEN_BODY)
                .respond(200, WALLHAVEN_BODY),
        );
        let config = config_for(WALLHAVEN_ID);
        fetcher.resolve_image_url(&config, None).expect("first call");
        fetcher.resolve_image_url(&config, None).expect("second call");

        let seeds: Vec<String> = fetcher
            .http
            .requests()
            .iter()
            .map(|url| url.split("seed=").nth(1).expect("seed param").to_string())
            .collect();
        assert_eq!(seeds.len(), 2);
        assert!(seeds.iter().all(|s| s.len() == 6 && s.chars().all(|c| c.is_ascii_alphanumeric())));
        assert_ne!(seeds[0], seeds[1]);
    }

    #[test]
    fn wallhaven_empty_data_fails_without_second_request() {
        let fetcher = ImageFetcher::new(StubClient::new().respond(200, r#"{"data":[]}"#));
        let err = fetcher
            .fetch(&config_for(WALLHAVEN_ID), Some("nothing"))
            .expect_err("no candidates");

        assert!(matches!(err, FetchError::NoResults { .. }));
        assert_eq!(fetcher.http.requests().len(), 1);
    }

    #[test]
    fn unknown_provider_makes_no_request() {
        let fetcher = ImageFetcher::new(StubClient::new().respond(200, UNSPLASH_BODY));
        let err = fetcher
            .resolve_image_url(&config_for("flickr"), None)
            .expect_err("unknown provider");

        assert!(matches!(err, FetchError::Config(_)));
        assert!(fetcher.http.requests().is_empty());
    }

    #[test]
    fn incomplete_wallhaven_config_makes_no_request() {
        let fetcher = ImageFetcher::new(StubClient::new().respond(200, WALLHAVEN_BODY));
        let mut config = config_for(WALLHAVEN_ID);
        config.orientation_ratios.clear();

        let err = fetcher.resolve_image_url(&config, None).expect_err("no ratio");
        assert!(matches!(err, FetchError::Config(_)));
        assert!(fetcher.http.requests().is_empty());
    }

    #[test]
    fn error_statuses_surface_code_and_hint() {
        for status in [401u16, 404, 500] {
            let fetcher = ImageFetcher::new(StubClient::new().respond(status, "{}"));
            let err = fetcher
                .resolve_image_url(&config_for(UNSPLASH_ID), None)
                .expect_err("non-2xx");
            let message = err.to_string();

            assert!(message.contains(&status.to_string()));
            assert_eq!(message.contains("access token is invalid or missing"), status == 401);
        }
    }

    #[test]
    fn fetch_bytes_returns_body_or_status_error() {
        let fetcher = ImageFetcher::new(
            StubClient::new()
                .respond(200, vec![0xFF, 0xD8, 0xFF])
                .respond(401, Vec::new()),
        );

        let bytes = fetcher.fetch_bytes("https://example.com/a.jpg").expect("200");
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);

        let err = fetcher.fetch_bytes("https://example.com/a.jpg").expect_err("401");
        assert!(err.to_string().starts_with("401 - Unauthorized"));
        assert!(err.to_string().contains("access token is invalid or missing"));
    }

    #[test]
    fn fetch_downloads_the_resolved_url() {
        let fetcher = ImageFetcher::new(
            StubClient::new()
                .respond(200, UNSPLASH_BODY)
                .respond(200, b"jpeg".to_vec()),
        );
        let result = fetcher.fetch(&config_for(UNSPLASH_ID), None).expect("both stubs succeed");

        assert_eq!(result.bytes.as_deref(), Some(&b"jpeg"[..]));
        assert_eq!(fetcher.http.requests()[1], "https://images.unsplash.com/full.jpg");
    }

    #[test]
    fn relative_image_path_is_rejected() {
        let body = r#"{"data":[{"path":"/full/k7.jpg"}]}"#;
        let fetcher = ImageFetcher::new(StubClient::new().respond(200, body));
        let err = fetcher
            .resolve_image_url(&config_for(WALLHAVEN_ID), None)
            .expect_err("not absolute");
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }
}

// ============================================================================
// Background Fetch
// ============================================================================
// Runs one fetch cycle off the interface thread. The result is handed back
// over a channel that carries exactly one message; the thread then exits.
// ============================================================================

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::fetcher::{FetchResult, ImageFetcher};
use crate::http::HttpClient;

pub type FetchOutcome = Result<FetchResult, FetchError>;

/// Start a fetch on its own thread. There is no cancellation; a second call
/// while the first is running simply starts another independent fetch.
pub fn spawn_fetch<C>(fetcher: Arc<ImageFetcher<C>>, config: Config, query: Option<String>) -> Receiver<FetchOutcome>
where
    C: HttpClient + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let outcome = fetcher.fetch(&config, query.as_deref());
        debug!(ok = outcome.is_ok(), "background fetch finished");
        // The interface may have stopped listening; nothing to do then
        let _ = tx.send(outcome);
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UNSPLASH_ID;
    use crate::http::stub::StubClient;
    use std::sync::mpsc::RecvTimeoutError;
    use std::time::Duration;

    const BODY: &str = r#"{"urls":{"full":"https://images.unsplash.com/f.jpg","regular":"https://images.unsplash.com/r.jpg"}}"#;

    #[test]
    fn delivers_exactly_one_success() {
        let fetcher = Arc::new(ImageFetcher::new(
            StubClient::new().respond(200, BODY).respond(200, b"img".to_vec()),
        ));
        let mut config = Config::default();
        config.api.selected_provider = UNSPLASH_ID.to_string();

        let rx = spawn_fetch(Arc::clone(&fetcher), config, Some("sea".to_string()));

        let result = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should report")
            .expect("fetch should succeed");
        assert_eq!(result.image.url, "https://images.unsplash.com/f.jpg");
        assert_eq!(result.bytes.as_deref(), Some(&b"img"[..]));

        // Sender is dropped once the worker exits
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn delivers_failures_too() {
        let fetcher = Arc::new(ImageFetcher::new(StubClient::new().respond(500, "")));
        let rx = spawn_fetch(fetcher, Config::default(), None);

        let err = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should report")
            .expect_err("500 is a failure");
        assert!(err.to_string().starts_with("500"));
    }
}

// ============================================================================
// Error Types
// ============================================================================

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Hint appended to every 401 response.
pub const TOKEN_HINT: &str = "API access token is invalid or missing. Set it with 'wallpaper-ed config token <TOKEN>'.";

/// Failures of the image fetch cycle (URL resolution and byte download).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Bad or incomplete configuration, detected before any request is made
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{}", http_message(.status, .reason))]
    Http { status: u16, reason: String },

    #[error("{provider} returned no results for this query")]
    NoResults { provider: &'static str },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl FetchError {
    pub fn summary(&self) -> &'static str {
        match self {
            FetchError::Config(_) => "Configuration is incomplete",
            FetchError::Http { .. } => "The server rejected the request",
            FetchError::NoResults { .. } => "Nothing matched your query",
            FetchError::InvalidResponse(_) => "The server sent something unexpected",
            FetchError::Network(_) => "Could not reach the server",
        }
    }
}

fn http_message(status: &u16, reason: &str) -> String {
    if *status == 401 {
        format!("{} - {}\n{}", status, reason, TOKEN_HINT)
    } else {
        format!("{} - {}", status, reason)
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {} has an unexpected shape: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("cannot locate the user configuration directory")]
    NoConfigDir,
}

/// Everything the entry points can surface to the user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),

    #[error("background fetch stopped without reporting a result")]
    WorkerLost,
}

impl AppError {
    /// Short one-line description shown above the details
    pub fn summary(&self) -> &'static str {
        match self {
            AppError::Fetch(e) => e.summary(),
            AppError::Install(_) => "Could not save the image",
            AppError::Config(_) => "Could not use the configuration",
            AppError::Terminal(_) => "Terminal error",
            AppError::WorkerLost => "Background fetch failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_carries_token_hint() {
        let err = FetchError::Http { status: 401, reason: "Unauthorized".to_string() };
        let msg = err.to_string();
        assert!(msg.starts_with("401 - Unauthorized"));
        assert!(msg.contains("access token is invalid or missing"));
    }

    #[test]
    fn other_statuses_have_no_hint() {
        for (status, reason) in [(404, "Not Found"), (500, "Internal Server Error")] {
            let msg = FetchError::Http { status, reason: reason.to_string() }.to_string();
            assert_eq!(msg, format!("{} - {}", status, reason));
            assert!(!msg.contains("access token"));
        }
    }

    #[test]
    fn app_error_keeps_fetch_summary() {
        let err: AppError = FetchError::NoResults { provider: "Wallhaven" }.into();
        assert_eq!(err.summary(), "Nothing matched your query");
        assert_eq!(err.to_string(), "Wallhaven returned no results for this query");
    }
}

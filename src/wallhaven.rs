// ============================================================================
// Wallhaven API Integration
// ============================================================================
// Endpoint: https://wallhaven.cc/api/v1/search
// API Key: NOT required for SFW content (purity 100)
// Results come back in pages of 24; one is picked at random
// ============================================================================

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::config::{Config, WALLHAVEN_ID};
use crate::error::FetchError;
use crate::fetcher::{ImageCandidate, ImageSource};
use crate::http::with_query;

pub const SEED_LENGTH: usize = 6;

// ============================================================================
// API Response Structures
// ============================================================================
#[derive(Debug, Deserialize)]
pub struct WallhavenResponse {
    pub data: Vec<WallhavenWallpaper>,
    pub meta: Option<WallhavenMeta>,
}

#[derive(Debug, Deserialize)]
pub struct WallhavenWallpaper {
    #[serde(default)]
    pub id: String,
    pub path: String,  // Direct download URL
    pub resolution: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WallhavenMeta {
    pub total: Option<u32>,
    pub seed: Option<String>,
}

// ============================================================================
// Request Builder
// ============================================================================
#[derive(Debug, Clone)]
pub struct Wallhaven {
    api_key: String,
    api_url: String,
    ratios: String,
    purity: String,
}

impl Wallhaven {
    /// Check every field the search needs before a request is attempted
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let settings = config.api.providers.get(WALLHAVEN_ID).ok_or_else(|| {
            FetchError::Config("no settings entry for provider 'wallhaven'".to_string())
        })?;

        if settings.api_url.trim().is_empty() {
            return Err(FetchError::Config("wallhaven api_url is empty".to_string()));
        }

        let orientation = config.image.orientation;
        let ratios = config
            .orientation_ratios
            .get(&orientation)
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                FetchError::Config(format!("no wallhaven ratio configured for orientation '{}'", orientation))
            })?;

        let purity = config.image.purity.trim();
        if purity.is_empty() {
            return Err(FetchError::Config("image purity is empty".to_string()));
        }

        Ok(Wallhaven {
            api_key: settings.api_token.trim().to_string(),
            api_url: settings.api_url.trim().to_string(),
            ratios: ratios.to_string(),
            purity: purity.to_string(),
        })
    }
}

/// Fresh alphanumeric seed so repeated searches are not served from cache
pub fn random_seed() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SEED_LENGTH)
        .map(char::from)
        .collect()
}

impl ImageSource for Wallhaven {
    fn name(&self) -> &'static str {
        "Wallhaven"
    }

    fn request_url(&self, query: Option<&str>) -> String {
        let seed = random_seed();
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(6);
        if !self.api_key.is_empty() {
            params.push(("apikey", self.api_key.as_str()));
        }
        params.push(("ratios", self.ratios.as_str()));
        if let Some(q) = query {
            params.push(("q", q));
        }
        params.push(("purity", self.purity.as_str()));
        params.push(("sorting", "random"));
        params.push(("seed", seed.as_str()));
        with_query(&self.api_url, &params)
    }

    fn parse(&self, body: &[u8]) -> Result<ImageCandidate, FetchError> {
        let response: WallhavenResponse = serde_json::from_slice(body)
            .map_err(|e| FetchError::InvalidResponse(format!("wallhaven search: {}", e)))?;

        if let Some(meta) = &response.meta {
            debug!(total = ?meta.total, seed = ?meta.seed, "wallhaven results");
        }

        let wallpaper = response
            .data
            .choose(&mut rand::thread_rng())
            .ok_or(FetchError::NoResults { provider: self.name() })?;

        debug!(id = %wallpaper.id, resolution = ?wallpaper.resolution, "picked wallpaper");
        Ok(ImageCandidate {
            url: wallpaper.path.clone(),
            preview_url: None,
            credit: None,
        })
    }
}

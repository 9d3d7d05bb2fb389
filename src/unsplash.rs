// ============================================================================
// Unsplash API Integration
// ============================================================================
// Endpoint: https://api.unsplash.com/photos/random
// API Key: REQUIRED (free signup at unsplash.com/developers)
// Photos are distributed under the Unsplash License
// ============================================================================

use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

use crate::config::{Config, Orientation, UNSPLASH_ID};
use crate::error::FetchError;
use crate::fetcher::{Credit, ImageCandidate, ImageSource};
use crate::http::with_query;

// ============================================================================
// API Response Structures
// ============================================================================

/// `/photos/random` answers with one object, or an array when `count` is given
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RandomPhotos {
    Many(Vec<UnsplashPhoto>),
    One(UnsplashPhoto),
}

#[derive(Debug, Deserialize)]
pub struct UnsplashPhoto {
    #[serde(default)]
    pub id: String,
    pub urls: UnsplashUrls,
    pub user: Option<UnsplashUser>,
}

#[derive(Debug, Deserialize)]
pub struct UnsplashUrls {
    pub full: String,
    pub regular: String,
}

#[derive(Debug, Deserialize)]
pub struct UnsplashUser {
    pub name: String,
    pub links: Option<UnsplashUserLinks>,
}

#[derive(Debug, Deserialize)]
pub struct UnsplashUserLinks {
    pub html: Option<String>,
}

// ============================================================================
// Request Builder
// ============================================================================
#[derive(Debug, Clone)]
pub struct Unsplash {
    client_id: String,
    api_url: String,
    orientation: Orientation,
    count: u32,
}

impl Unsplash {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let settings = config.api.providers.get(UNSPLASH_ID).ok_or_else(|| {
            FetchError::Config("no settings entry for provider 'unsplash'".to_string())
        })?;

        if settings.api_url.trim().is_empty() {
            return Err(FetchError::Config("unsplash api_url is empty".to_string()));
        }

        Ok(Unsplash {
            client_id: settings.api_token.trim().to_string(),
            api_url: settings.api_url.trim().to_string(),
            orientation: config.image.orientation,
            count: config.image.count,
        })
    }
}

impl ImageSource for Unsplash {
    fn name(&self) -> &'static str {
        "Unsplash"
    }

    fn request_url(&self, query: Option<&str>) -> String {
        let count = self.count.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id.as_str()),
            ("orientation", self.orientation.as_str()),
        ];
        if let Some(q) = query {
            params.push(("query", q));
        }
        if self.count > 1 {
            params.push(("count", count.as_str()));
        }
        with_query(&self.api_url, &params)
    }

    fn parse(&self, body: &[u8]) -> Result<ImageCandidate, FetchError> {
        let photos: RandomPhotos = serde_json::from_slice(body)
            .map_err(|e| FetchError::InvalidResponse(format!("unsplash photo: {}", e)))?;

        let photo = match photos {
            RandomPhotos::One(photo) => photo,
            RandomPhotos::Many(mut photos) => {
                if photos.is_empty() {
                    return Err(FetchError::NoResults { provider: self.name() });
                }
                photos.shuffle(&mut rand::thread_rng());
                photos.swap_remove(0)
            }
        };

        debug!(id = %photo.id, "picked photo");
        let credit = photo.user.map(|user| Credit {
            name: user.name,
            link: user.links.and_then(|links| links.html),
        });

        Ok(ImageCandidate {
            url: photo.urls.full,
            preview_url: Some(photo.urls.regular),
            credit,
        })
    }
}

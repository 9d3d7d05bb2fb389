// ============================================================================
// Configuration Model & Store
// ============================================================================
// Location: <config dir>/wallpaper-ed/config.json
// Format: pretty-printed JSON, read and written as a whole record
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

pub const APP_NAME: &str = "wallpaper-ed";

/// Literal substring of a command template replaced with the saved image path
pub const PATH_PLACEHOLDER: &str = "%PATH%";

pub const UNSPLASH_ID: &str = "unsplash";
pub const WALLHAVEN_ID: &str = "wallhaven";

// ============================================================================
// Configuration Structures
// ============================================================================
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub app: AppSettings,
    pub api: ApiSettings,
    pub image: ImageRequest,
    pub orientation_ratios: BTreeMap<Orientation, String>,  // Wallhaven "ratios" values
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    pub execute: Vec<String>,            // Command templates containing %PATH%
    pub wallpaper_filename: String,
    pub download_directory: String,      // May start with "~"
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiSettings {
    pub selected_provider: String,
    pub providers: BTreeMap<String, ProviderSettings>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_token: String,
    pub api_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageRequest {
    pub orientation: Orientation,
    pub count: u32,
    pub purity: String,  // Wallhaven purity bits, passed through as-is
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Squarish,
    Portrait,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Squarish => "squarish",
            Orientation::Portrait => "portrait",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "squarish" => Ok(Orientation::Squarish),
            "portrait" => Ok(Orientation::Portrait),
            other => Err(format!(
                "unknown orientation '{}' (expected landscape, squarish or portrait)",
                other
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            UNSPLASH_ID.to_string(),
            ProviderSettings {
                api_token: String::new(),
                api_url: "https://api.unsplash.com/photos/random".to_string(),
            },
        );
        providers.insert(
            WALLHAVEN_ID.to_string(),
            ProviderSettings {
                api_token: String::new(),
                api_url: "https://wallhaven.cc/api/v1/search".to_string(),
            },
        );

        let mut orientation_ratios = BTreeMap::new();
        orientation_ratios.insert(Orientation::Landscape, "16x9".to_string());
        orientation_ratios.insert(Orientation::Squarish, "1x1".to_string());
        orientation_ratios.insert(Orientation::Portrait, "9x16".to_string());

        Config {
            app: AppSettings {
                execute: vec![
                    "gsettings set org.gnome.desktop.background picture-uri \"file://%PATH%\"".to_string(),
                    "gsettings set org.gnome.desktop.background picture-uri-dark \"file://%PATH%\"".to_string(),
                ],
                wallpaper_filename: "wallpaper.jpg".to_string(),
                download_directory: "~/.local/share/backgrounds/".to_string(),
            },
            api: ApiSettings {
                selected_provider: UNSPLASH_ID.to_string(),
                providers,
            },
            image: ImageRequest {
                orientation: Orientation::Landscape,
                count: 1,
                purity: "100".to_string(),  // SFW only
            },
            orientation_ratios,
        }
    }
}

impl Config {
    /// Download directory with "~" expanded against the user's home
    pub fn download_dir(&self) -> PathBuf {
        expand_path(&self.app.download_directory)
    }
}

/// Expand a leading "~" using the current user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    expand_home(path, dirs::home_dir().as_deref())
}

pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = home {
            let suffix = path.trim_start_matches('~').trim_start_matches('/');
            return home.join(suffix);
        }
    }
    PathBuf::from(path)
}

// ============================================================================
// Config Store
// ============================================================================

/// Owns the in-memory configuration and writes the whole record back after
/// every change.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(APP_NAME).join("config.json"))
    }

    /// Load the file at `path`, or create it with defaults if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        if path.is_file() {
            let config = load(&path)?;
            debug!(path = %path.display(), "loaded configuration");
            return Ok(ConfigStore { path, config });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let store = ConfigStore {
            path,
            config: Config::default(),
        };
        store.save()?;
        info!(path = %store.path.display(), "created default configuration");
        Ok(store)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        save(&self.path, &self.config)
    }

    fn update(&mut self, change: impl FnOnce(&mut Config)) -> Result<(), ConfigError> {
        change(&mut self.config);
        self.save()
    }

    pub fn set_provider(&mut self, provider: &str) -> Result<(), ConfigError> {
        let provider = provider.trim().to_lowercase();
        if !self.config.api.providers.contains_key(&provider) {
            let known: Vec<&str> = self.config.api.providers.keys().map(String::as_str).collect();
            return Err(ConfigError::Invalid(format!(
                "unknown provider '{}' (configured: {})",
                provider,
                known.join(", ")
            )));
        }
        self.update(|c| c.api.selected_provider = provider)
    }

    /// Store the access token of the currently selected provider
    pub fn set_api_token(&mut self, token: &str) -> Result<(), ConfigError> {
        let selected = self.config.api.selected_provider.clone();
        if !self.config.api.providers.contains_key(&selected) {
            return Err(ConfigError::Invalid(format!(
                "selected provider '{}' has no settings entry",
                selected
            )));
        }
        let token = token.trim().to_string();
        self.update(|c| {
            if let Some(settings) = c.api.providers.get_mut(&selected) {
                settings.api_token = token;
            }
        })
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), ConfigError> {
        self.update(|c| c.image.orientation = orientation)
    }

    pub fn set_purity(&mut self, purity: &str) -> Result<(), ConfigError> {
        let purity = purity.trim().to_string();
        self.update(|c| c.image.purity = purity)
    }

    pub fn set_download_directory(&mut self, directory: &str) -> Result<(), ConfigError> {
        let directory = directory.trim();
        if directory.is_empty() {
            return Err(ConfigError::Invalid("download directory cannot be empty".to_string()));
        }
        let directory = directory.to_string();
        self.update(|c| c.app.download_directory = directory)
    }

    pub fn set_wallpaper_filename(&mut self, filename: &str) -> Result<(), ConfigError> {
        let filename = filename.trim();
        if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
            return Err(ConfigError::Invalid(format!(
                "'{}' is not a plain file name",
                filename
            )));
        }
        let filename = filename.to_string();
        self.update(|c| c.app.wallpaper_filename = filename)
    }

    pub fn set_commands(&mut self, commands: Vec<String>) -> Result<(), ConfigError> {
        let commands: Vec<String> = commands
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if commands.is_empty() {
            return Err(ConfigError::Invalid("at least one command is required".to_string()));
        }
        self.update(|c| c.app.execute = commands)
    }
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

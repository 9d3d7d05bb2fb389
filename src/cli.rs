use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Orientation;

/// Fetch a random Unsplash or Wallhaven photo and set it as the desktop wallpaper.
///
/// Without a subcommand one image is fetched and set right away.
#[derive(Debug, Parser)]
#[command(name = "wallpaper-ed", version, about)]
pub struct Cli {
    /// Open the interactive menu instead of setting a wallpaper immediately
    #[arg(short, long)]
    pub interactive: bool,

    /// What the image should show, e.g. "mountain lake"
    #[arg(short, long)]
    pub query: Option<String>,

    /// Use this config file instead of the per-user default
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or change the stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the current settings
    Show,
    /// Print the config file location
    Path,
    /// Select the image provider (unsplash, wallhaven)
    Provider { name: String },
    /// Store the API token of the selected provider
    Token { value: String },
    /// Preferred image shape
    Orientation { value: Orientation },
    /// Wallhaven purity bits, e.g. 100 (SFW) or 110
    Purity { mask: String },
    /// Directory the wallpaper is saved to
    Directory { path: String },
    /// File name of the saved wallpaper
    Filename { name: String },
    /// Replace the wallpaper commands; %PATH% is substituted with the image path
    Command {
        #[arg(required = true)]
        templates: Vec<String>,
    },
}

// ============================================================================
// wallpaper-ed
// ============================================================================
// Photos are provided by Unsplash (https://unsplash.com/license)
// and Wallhaven (https://wallhaven.cc); all rights belong to their owners.
// ============================================================================

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod error;
mod fetcher;
mod http;
mod installer;
mod loader;
mod unsplash;
mod wallhaven;
mod worker;

use app::InteractiveApp;
use cli::{Cli, Command, ConfigAction};
use config::ConfigStore;
use error::AppError;
use fetcher::ImageFetcher;
use http::ReqwestClient;

fn init_logging() {
    let filter = EnvFilter::try_from_env("WALLPAPER_ED_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => ConfigStore::default_path()?,
    };
    let mut store = ConfigStore::open(config_path)?;

    if let Some(Command::Config { action }) = cli.command {
        return edit_config(&mut store, action);
    }

    let fetcher = ImageFetcher::new(ReqwestClient::new()?);

    if cli.interactive {
        InteractiveApp::new(store, fetcher).run()
    } else {
        let path = app::run_once(&store, &fetcher, cli.query.as_deref())?;
        println!("Wallpaper set: {}", path.display());
        Ok(())
    }
}

fn edit_config(store: &mut ConfigStore, action: ConfigAction) -> Result<(), AppError> {
    match action {
        ConfigAction::Show => {
            app::print_config(store.config(), store.path());
            return Ok(());
        }
        ConfigAction::Path => {
            println!("{}", store.path().display());
            return Ok(());
        }
        ConfigAction::Provider { name } => store.set_provider(&name)?,
        ConfigAction::Token { value } => store.set_api_token(&value)?,
        ConfigAction::Orientation { value } => store.set_orientation(value)?,
        ConfigAction::Purity { mask } => store.set_purity(&mask)?,
        ConfigAction::Directory { path } => store.set_download_directory(&path)?,
        ConfigAction::Filename { name } => store.set_wallpaper_filename(&name)?,
        ConfigAction::Command { templates } => store.set_commands(templates)?,
    }
    println!("Saved to {}", store.path().display());
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            app::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Entry Point Logic
// ============================================================================
// Headless: fetch one image, save it, set it, exit.
// Interactive: menu loop, fetches run in the background while a spinner turns.
// ============================================================================

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::*;
use tracing::warn;

use crate::config::{Config, ConfigStore, Orientation};
use crate::error::AppError;
use crate::fetcher::{FetchResult, ImageFetcher};
use crate::http::HttpClient;
use crate::installer::WallpaperInstaller;
use crate::loader::{self, Loader};
use crate::worker::spawn_fetch;

const HISTORY_FILE: &str = "history.log";

/// Save the bytes and run the wallpaper commands. No command runs if the save fails.
pub fn install(config: &Config, bytes: &[u8]) -> Result<PathBuf, AppError> {
    let installer = WallpaperInstaller::from_config(config);
    let path = installer.save_image(bytes, &config.app.wallpaper_filename)?;
    installer.apply_wallpaper(&path);
    Ok(path)
}

/// One fetch + set cycle, used when no interface is requested
pub fn run_once<C: HttpClient>(
    store: &ConfigStore,
    fetcher: &ImageFetcher<C>,
    query: Option<&str>,
) -> Result<PathBuf, AppError> {
    let config = store.config();
    let result = fetcher.fetch(config, query)?;
    let bytes = result.bytes.unwrap_or_default();
    let path = install(config, &bytes)?;
    log_history(store.path(), &config.api.selected_provider, &result.image.url, &path);
    Ok(path)
}

/// Append one line per installed wallpaper next to the config file
fn log_history(config_file: &Path, provider: &str, url: &str, saved: &Path) {
    let Some(dir) = config_file.parent() else {
        return;
    };
    let log_path = dir.join(HISTORY_FILE);
    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(mut file) => {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(file, "[{}] {} {} -> {}", timestamp, provider, url, saved.display());
        }
        Err(e) => warn!(path = %log_path.display(), error = %e, "cannot append to history"),
    }
}

pub fn print_error(err: &AppError) {
    eprintln!("{} {}", "[ ERROR ]".red(), err.summary().red());
    eprintln!("Details:\n{}", err);
}

// ============================================================================
// Interactive Mode
// ============================================================================
pub struct InteractiveApp<C> {
    store: ConfigStore,
    fetcher: Arc<ImageFetcher<C>>,
    current: Option<FetchResult>,
}

impl<C: HttpClient + 'static> InteractiveApp<C> {
    pub fn new(store: ConfigStore, fetcher: ImageFetcher<C>) -> Self {
        InteractiveApp {
            store,
            fetcher: Arc::new(fetcher),
            current: None,
        }
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        loop {
            self.show_menu();
            let choice = prompt("")?.to_lowercase();

            let result = match choice.as_str() {
                "1" | "f" => self.fetch(),
                "2" | "s" => self.set_current(),
                "3" | "c" => self.settings(),
                "0" | "q" | "quit" | "exit" => return Ok(()),
                "" => continue,
                _ => {
                    println!("{}", "[ ERROR ] Invalid choice".red());
                    continue;
                }
            };

            if let Err(e) = result {
                loader::error(e.summary(), &e.to_string());
            }
        }
    }

    fn show_menu(&self) {
        let config = self.store.config();
        println!();
        println!("{}", "+------------------------------------------+".cyan());
        println!("{}", "|               WALLPAPER-ED               |".cyan().bold());
        println!("{}", "+------------------------------------------+".cyan());
        println!("{}", "| 1) Fetch a new image                     |".cyan());
        println!("{}", "| 2) Set it as wallpaper                   |".cyan());
        println!("{}", "| 3) Settings                              |".cyan());
        println!("{}", "| 0) Quit                                  |".cyan());
        println!("{}", "+------------------------------------------+".cyan());
        println!(
            "{}",
            format!(
                "  Source: {}  |  Orientation: {}",
                config.api.selected_provider, config.image.orientation
            )
            .bright_cyan()
        );
        if let Some(current) = &self.current {
            println!("{}", format!("  Current: {}", current.image.url).dimmed());
        }
        println!();
    }

    fn fetch(&mut self) -> Result<(), AppError> {
        println!("{}", "+ Type what you'd like to see, or press Enter for anything".cyan());
        let query = prompt("")?;
        let query = if query.is_empty() { None } else { Some(query) };

        // The worker gets its own snapshot; config is only written on this thread
        let rx = spawn_fetch(Arc::clone(&self.fetcher), self.store.config().clone(), query);
        let outcome = Loader::new("Fetching image").wait(&rx).ok_or(AppError::WorkerLost)?;
        let result = outcome?;

        loader::complete("Image ready");
        println!("  {}", result.image.url.bright_cyan());
        if let Some(preview) = &result.image.preview_url {
            println!("  {} {}", "Preview:".dimmed(), preview.dimmed());
        }
        if let Some(credit) = &result.image.credit {
            match &credit.link {
                Some(link) => println!("  Captured by {} ({})", credit.name.green(), link),
                None => println!("  Captured by {}", credit.name.green()),
            }
        }
        if let Some(bytes) = &result.bytes {
            println!("  {} KB downloaded", bytes.len() / 1024);
        }

        self.current = Some(result);
        Ok(())
    }

    fn set_current(&mut self) -> Result<(), AppError> {
        let Some(bytes) = self.current.as_ref().and_then(|c| c.bytes.as_deref()) else {
            println!("{}", "! Fetch an image first (option 1)".cyan());
            return Ok(());
        };

        let path = install(self.store.config(), bytes)?;
        if let Some(current) = &self.current {
            log_history(self.store.path(), &self.store.config().api.selected_provider, &current.image.url, &path);
        }
        loader::complete(&format!("Wallpaper set: {}", path.display()));
        Ok(())
    }

    fn settings(&mut self) -> Result<(), AppError> {
        print_config(self.store.config(), self.store.path());
        println!();
        println!("{}", "| 1) Provider  2) API token  3) Orientation  4) Purity".cyan());
        println!("{}", "| 5) Download directory  6) File name  0) Back".cyan());
        let choice = prompt("")?;

        match choice.as_str() {
            "1" => {
                let value = prompt("Provider (unsplash / wallhaven)")?;
                self.store.set_provider(&value)?;
            }
            "2" => {
                let value = prompt(&format!("API token for {}", self.store.config().api.selected_provider))?;
                self.store.set_api_token(&value)?;
            }
            "3" => {
                let value = prompt("Orientation (landscape / squarish / portrait)")?;
                let orientation: Orientation = match value.parse() {
                    Ok(o) => o,
                    Err(msg) => {
                        println!("{}", format!("[ ERROR ] {}", msg).red());
                        return Ok(());
                    }
                };
                self.store.set_orientation(orientation)?;
            }
            "4" => {
                let value = prompt("Purity mask (e.g. 100)")?;
                self.store.set_purity(&value)?;
            }
            "5" => {
                let value = prompt("Download directory")?;
                self.store.set_download_directory(&value)?;
            }
            "6" => {
                let value = prompt("Wallpaper file name")?;
                self.store.set_wallpaper_filename(&value)?;
            }
            _ => return Ok(()),
        }

        loader::complete("Settings saved");
        Ok(())
    }
}

pub fn print_config(config: &Config, path: &Path) {
    println!("{}", format!("Config file: {}", path.display()).dimmed());
    println!("  {:<20} {}", "Provider:", config.api.selected_provider.green());
    for (name, settings) in &config.api.providers {
        let token = if settings.api_token.is_empty() { "not set" } else { "set" };
        println!("  {:<20} {} (token {})", format!("{}:", name), settings.api_url, token);
    }
    println!("  {:<20} {}", "Orientation:", config.image.orientation);
    println!("  {:<20} {}", "Count:", config.image.count);
    println!("  {:<20} {}", "Purity:", config.image.purity);
    println!("  {:<20} {}", "Download directory:", config.download_dir().display());
    println!("  {:<20} {}", "File name:", config.app.wallpaper_filename);
    println!("  {}", "Commands:");
    for command in &config.app.execute {
        println!("    {}", command);
    }
}

fn prompt(label: &str) -> io::Result<String> {
    if !label.is_empty() {
        println!("{}", label.cyan());
    }
    print!("{}", "> ".cyan());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{save, UNSPLASH_ID};
    use crate::http::stub::StubClient;
    use std::fs;
    use tempfile::TempDir;

    const BODY: &str = r#"{"urls":{"full":"https://images.unsplash.com/f.jpg","regular":"https://images.unsplash.com/r.jpg"}}"#;

    fn store_in(dir: &Path, marker: &Path) -> ConfigStore {
        let mut config = Config::default();
        config.api.selected_provider = UNSPLASH_ID.to_string();
        config.app.download_directory = dir.join("walls").display().to_string();
        config.app.wallpaper_filename = "w.jpg".to_string();
        config.app.execute = vec![format!("echo %PATH% >> '{}'", marker.display())];

        let path = dir.join("config.json");
        save(&path, &config).expect("config should save");
        ConfigStore::open(path).expect("store should open")
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn run_once_saves_sets_and_logs() {
        let dir = TempDir::new().expect("tempdir should be created");
        let marker = dir.path().join("applied.txt");
        let store = store_in(dir.path(), &marker);
        let fetcher = ImageFetcher::new(StubClient::new().respond(200, BODY).respond(200, b"pixels".to_vec()));

        let path = run_once(&store, &fetcher, Some("lake")).expect("cycle should succeed");

        assert_eq!(path, dir.path().join("walls").join("w.jpg"));
        assert_eq!(fs::read(&path).expect("image saved"), b"pixels");
        let applied = fs::read_to_string(&marker).expect("command ran");
        assert_eq!(applied.trim(), path.display().to_string());

        let history = fs::read_to_string(dir.path().join(HISTORY_FILE)).expect("history written");
        assert!(history.contains("unsplash https://images.unsplash.com/f.jpg ->"));
    }

    #[test]
    fn failed_fetch_writes_nothing_and_runs_nothing() {
        let dir = TempDir::new().expect("tempdir should be created");
        let marker = dir.path().join("applied.txt");
        let store = store_in(dir.path(), &marker);
        let fetcher = ImageFetcher::new(StubClient::new().respond(401, ""));

        let err = run_once(&store, &fetcher, None).expect_err("401 fails");

        assert!(matches!(err, AppError::Fetch(_)));
        assert!(!dir.path().join("walls").exists());
        assert!(!marker.exists());
        assert!(!dir.path().join(HISTORY_FILE).exists());
    }

    #[test]
    fn failed_save_runs_no_command() {
        let dir = TempDir::new().expect("tempdir should be created");
        let marker = dir.path().join("applied.txt");
        let mut config = Config::default();
        config.app.download_directory = dir.path().join("no").join("such").display().to_string();
        config.app.execute = vec![format!("echo %PATH% >> '{}'", marker.display())];

        let err = install(&config, b"pixels").expect_err("parent directory is missing");
        assert!(matches!(err, AppError::Install(_)));
        assert!(!marker.exists());
    }
}

// ============================================================================
// Wallpaper Installer
// ============================================================================
// Saves the downloaded image under the download directory and runs the
// configured commands with %PATH% replaced by the saved file.
// ============================================================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::{info, warn};

use crate::config::{Config, PATH_PLACEHOLDER};
use crate::error::InstallError;

/// Runs one command line through the OS shell
pub trait CommandRunner {
    fn run(&self, command: &str) -> io::Result<ExitStatus>;
}

pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    #[cfg(not(target_os = "windows"))]
    fn run(&self, command: &str) -> io::Result<ExitStatus> {
        Command::new("sh").arg("-c").arg(command).status()
    }

    #[cfg(target_os = "windows")]
    fn run(&self, command: &str) -> io::Result<ExitStatus> {
        Command::new("cmd").args(["/C", command]).status()
    }
}

pub struct WallpaperInstaller<R = ShellRunner> {
    download_dir: PathBuf,
    commands: Vec<String>,
    runner: R,
}

impl WallpaperInstaller<ShellRunner> {
    pub fn from_config(config: &Config) -> Self {
        WallpaperInstaller::new(config.download_dir(), config.app.execute.clone(), ShellRunner)
    }
}

impl<R: CommandRunner> WallpaperInstaller<R> {
    pub fn new(download_dir: PathBuf, commands: Vec<String>, runner: R) -> Self {
        WallpaperInstaller {
            download_dir: absolute(download_dir),
            commands,
            runner,
        }
    }

    /// Write `bytes` to `<download dir>/<filename>` and return that path.
    /// Only the last directory level is created; its parent has to exist.
    pub fn save_image(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, InstallError> {
        if !self.download_dir.is_dir() {
            fs::create_dir(&self.download_dir).map_err(|source| InstallError::Io {
                path: self.download_dir.clone(),
                source,
            })?;
            info!(dir = %self.download_dir.display(), "created download directory");
        }

        let path = self.download_dir.join(filename);
        fs::write(&path, bytes).map_err(|source| InstallError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "image saved");
        Ok(path)
    }

    /// Run every command template in order. Exit codes are only logged.
    pub fn apply_wallpaper(&self, path: &Path) {
        if self.commands.is_empty() {
            warn!("no wallpaper commands configured");
            return;
        }

        let path = path.to_string_lossy();
        for template in &self.commands {
            let command = template.replace(PATH_PLACEHOLDER, &path);
            match self.runner.run(&command) {
                Ok(status) if status.success() => info!(%command, "wallpaper command finished"),
                Ok(status) => warn!(%command, code = ?status.code(), "wallpaper command failed"),
                Err(e) => warn!(%command, error = %e, "wallpaper command could not be started"),
            }
        }
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

// ============================================================================
// Terminal Loader
// ============================================================================
// Spinner drawn by the interface thread while a background fetch runs.
// ============================================================================

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use colored::*;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

pub struct Loader {
    message: String,
    spinner_chars: Vec<char>,
}

impl Loader {
    pub fn new(message: &str) -> Self {
        let spinner_chars = if cfg!(target_os = "windows") {
            vec!['|', '/', '-', '\\']
        } else {
            vec!['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏']
        };

        Loader {
            message: message.to_string(),
            spinner_chars,
        }
    }

    /// Animate until the worker reports. `None` means the sender went away
    /// without a result.
    pub fn wait<T>(&self, rx: &Receiver<T>) -> Option<T> {
        let start_time = Instant::now();
        let mut i = 0;

        let outcome = loop {
            match rx.recv_timeout(FRAME_INTERVAL) {
                Ok(value) => break Some(value),
                Err(RecvTimeoutError::Disconnected) => break None,
                Err(RecvTimeoutError::Timeout) => {
                    let frame = self.spinner_chars[i % self.spinner_chars.len()];
                    print!(
                        "\r{} {}... {:.1}s",
                        frame.to_string().cyan(),
                        self.message.cyan(),
                        start_time.elapsed().as_secs_f64()
                    );
                    io::stdout().flush().ok();
                    i += 1;
                }
            }
        };

        print!("\r{}\r", " ".repeat(80));
        io::stdout().flush().ok();
        outcome
    }
}

pub fn complete(message: &str) {
    println!("{} {}", "✓".green(), message.green());
}

/// Summary line first, full details underneath
pub fn error(summary: &str, details: &str) {
    println!("{} {}", "[ ERROR ]".red(), summary.red());
    println!("{}", "Details:".dimmed());
    for line in details.lines() {
        println!("  {}", line);
    }
}

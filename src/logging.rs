//! Session log file
//!
//! The TUI owns the terminal, so anything worth keeping goes to
//! `<data_dir>/aurora/aurora.log` instead of stderr.

use chrono::Local;
use lazy_static::lazy_static;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

/// Initialize the log file
pub fn init_logger() -> anyhow::Result<()> {
    let file = open_log_file()?;

    let Ok(mut log_file) = LOG_FILE.lock() else {
        anyhow::bail!("log file lock poisoned");
    };
    *log_file = Some(file);

    // Write session start marker
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    if let Some(ref mut f) = *log_file {
        let _ = writeln!(f, "\n=== Aurora Session Started at {} ===\n", timestamp);
    }

    Ok(())
}

/// Open the log file for appending, creating its directory first
pub fn open_log_file() -> std::io::Result<File> {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    OpenOptions::new().create(true).append(true).open(&log_path)
}

/// Also echo DEBUG lines to stderr
pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_mode() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

/// Get the log file path
fn get_log_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("aurora").join("aurora.log")
    } else {
        PathBuf::from("aurora.log")
    }
}

/// Log a message to file
pub fn log(level: &str, message: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let formatted = format!("[{}] {}: {}", timestamp, level, message);

    if level == "DEBUG" && is_debug_mode() {
        eprintln!("{}", formatted);
    }

    if let Ok(mut log_file) = LOG_FILE.lock() {
        if let Some(ref mut f) = *log_file {
            let _ = writeln!(f, "{}", formatted);
            let _ = f.flush();
        }
    }
}

/// Macros for easier logging
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::log("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::log("DEBUG", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::log("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::log("ERROR", &format!($($arg)*));
    };
}

/// Get the current log file path for display
pub fn get_log_path_display() -> String {
    get_log_path().display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_under_aurora() {
        let path = get_log_path_display();
        assert!(path.ends_with("aurora.log"));
    }

    #[test]
    fn test_log_without_file_is_noop() {
        log("INFO", "nothing to write to");
    }
}

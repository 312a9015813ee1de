//! Session logger — mirrors pipeline events to a log file and a small
//! in-memory ring shown in the UI's log drawer.
//!
//! The file is truncated at each launch, so it only ever holds the most
//! recent session:
//!   Windows:  `%APPDATA%\CannyPlayground\canny_playground.log`
//!   Linux:    `~/.local/share/CannyPlayground/canny_playground.log`
//!   macOS:    `~/Library/Application Support/CannyPlayground/canny_playground.log`
//!
//! Use the `log_info!` / `log_warn!` / `log_err!` macros anywhere in the
//! crate.  Until [`init`] has run they only feed the in-memory ring, so
//! library consumers and tests need no setup.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of lines kept for the log drawer.
const RECENT_CAPACITY: usize = 200;

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static RECENT: Mutex<VecDeque<String>> = Mutex::new(VecDeque::new());

/// Returns the path to the current session log file.
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

/// Write a line to the session log.  I/O errors are swallowed.
pub fn write_line(line: &str) {
    if let Ok(mut recent) = RECENT.lock() {
        if recent.len() == RECENT_CAPACITY {
            recent.pop_front();
        }
        recent.push_back(line.to_string());
    }
    if let Some(mutex) = LOG_FILE.get()
        && let Ok(mut file) = mutex.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Write a timestamped, level-tagged line to the session log.
pub fn write(level: &str, msg: &str) {
    write_line(&format!("[{}] [{}] {}", timestamp(), level, msg));
}

/// Snapshot of the most recent log lines, oldest first.
pub fn recent_lines() -> Vec<String> {
    RECENT
        .lock()
        .map(|recent| recent.iter().cloned().collect())
        .unwrap_or_default()
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*));
    };
}

/// Initialise the session log file.  Call once, early in `main`.
///
/// Creates (or truncates) the file and installs a panic hook that mirrors
/// the panic message to the log before running the previous hook.
pub fn init() {
    let path = log_file_path();

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path);

    match file {
        Ok(f) => {
            let _ = LOG_PATH.set(path.clone());
            let _ = LOG_FILE.set(Mutex::new(f));
        }
        Err(e) => {
            eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
            return;
        }
    }

    write_line(&format!(
        "=== Canny Playground session started (unix {}) ===",
        unix_seconds().unwrap_or_default()
    ));
    write_line(&format!("Log file: {}", path.display()));

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write_line(&format!("[{}] [PANIC] {}", timestamp(), info));
        prev(info);
    }));
}

fn log_file_path() -> PathBuf {
    data_dir()
        .join("CannyPlayground")
        .join("canny_playground.log")
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support");
        }
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from(".")
}

fn unix_seconds() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// HH:MM:SS within the current (UTC) day.
fn timestamp() -> String {
    match unix_seconds() {
        Some(secs) => format!(
            "{:02}:{:02}:{:02}",
            (secs % 86400) / 3600,
            (secs % 3600) / 60,
            secs % 60
        ),
        None => "??:??:??".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_feed_recent_ring_without_init() {
        crate::log_warn!("ring probe {}", 42);
        let lines = recent_lines();
        assert!(lines.iter().any(|l| l.contains("[WARN] ring probe 42")));
    }

    #[test]
    fn ring_is_bounded() {
        for i in 0..(RECENT_CAPACITY + 25) {
            write_line(&format!("bounded {}", i));
        }
        assert!(recent_lines().len() <= RECENT_CAPACITY);
    }
}

// Session log for one stamping run
use crate::config::LogTarget;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const LOG_RETENTION_COUNT: usize = 10;

pub struct SessionLogger {
    log_buffer: Mutex<Vec<String>>,
    log_path: Option<PathBuf>,
    app_name: String,
}

impl SessionLogger {
    pub fn new(target: &LogTarget, app_name: &str) -> Result<Self> {
        let log_path = match target {
            LogTarget::Stderr => None,
            LogTarget::Dir(dir) => {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
                clean_old_logs(dir, app_name, LOG_RETENTION_COUNT.saturating_sub(1));

                let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
                Some(dir.join(format!("{}_{}.log", app_name, timestamp)))
            }
        };

        let logger = Self {
            log_buffer: Mutex::new(Vec::new()),
            log_path,
            app_name: app_name.to_string(),
        };
        logger.log(format!("=== {} Session Started ===", app_name));

        Ok(logger)
    }

    pub fn log(&self, message: impl AsRef<str>) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let log_line = format!("[{}] {}", timestamp, message.as_ref());

        // stdout belongs to the patched text
        if self.log_path.is_none() {
            eprintln!("{}", log_line);
        } else {
            self.log_buffer.lock().push(log_line);
        }
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(format!("ERROR: {}", message.as_ref()));
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(format!("WARN: {}", message.as_ref()));
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(message);
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn flush_to_disk(&self) -> Result<()> {
        let Some(path) = &self.log_path else {
            return Ok(());
        };

        let mut buffer = self.log_buffer.lock();
        if buffer.is_empty() {
            return Ok(());
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        for line in buffer.iter() {
            writeln!(file, "{}", line)?;
        }

        file.flush()?;
        buffer.clear();
        Ok(())
    }

    pub fn finalize(&self) -> Result<()> {
        self.log(format!("=== {} Session Ended ===", self.app_name));
        self.flush_to_disk()
    }
}

/// Keeps the newest `keep` logs for `app_name` in `dir` and removes the rest.
fn clean_old_logs(dir: &Path, app_name: &str, keep: usize) {
    let prefix = format!("{}_", app_name);
    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let is_ours = path.extension().and_then(|s| s.to_str()) == Some("log")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix));
            if !is_ours {
                return None;
            }
            let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((path, modified))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(keep) {
        let _ = fs::remove_file(path);
    }
}

static LOGGER: once_cell::sync::OnceCell<SessionLogger> = once_cell::sync::OnceCell::new();

pub fn init_logger(target: &LogTarget, app_name: &str) -> Result<()> {
    let logger = SessionLogger::new(target, app_name)?;
    LOGGER
        .set(logger)
        .map_err(|_| anyhow::anyhow!("Logger already initialized"))?;
    Ok(())
}

pub fn log_error(message: impl AsRef<str>) {
    if let Some(logger) = LOGGER.get() {
        logger.error(message);
    }
}

pub fn log_warn(message: impl AsRef<str>) {
    if let Some(logger) = LOGGER.get() {
        logger.warn(message);
    }
}

pub fn log_info(message: impl AsRef<str>) {
    if let Some(logger) = LOGGER.get() {
        logger.info(message);
    }
}

pub fn finalize_logs() -> Result<()> {
    if let Some(logger) = LOGGER.get() {
        logger.finalize()?;
    }
    Ok(())
}

pub fn get_log_path() -> Option<PathBuf> {
    LOGGER.get().and_then(|logger| logger.log_path().map(Path::to_path_buf))
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::log_info(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::log_warn(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::log_error(format!($($arg)*))
    };
}

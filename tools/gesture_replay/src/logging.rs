use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};
use serde_json::json;

/// stderr logger that can mirror every record as a JSON line.
pub struct Logger {
    level: LevelFilter,
    json_file: Mutex<Option<File>>,
}

impl Logger {
    pub fn from_env(level: LevelFilter) -> Result<Self> {
        let path = std::env::var("GESTURE_REPLAY_LOG_JSON_PATH").ok();
        Self::new(level, path.map(PathBuf::from))
    }

    pub fn new(level: LevelFilter, path: Option<PathBuf>) -> Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                Some(file)
            }
            None => None,
        };
        Ok(Self {
            level,
            json_file: Mutex::new(json_file),
        })
    }

    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).context("logger already installed")?;
        log::set_max_level(level);
        Ok(())
    }

    fn event(&self, level: &str, target: &str, message: &str) {
        let Ok(mut guard) = self.json_file.lock() else {
            return;
        };
        let Some(file) = guard.as_mut() else {
            return;
        };

        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let entry = json!({
            "ts_ms": ts_ms,
            "level": level,
            "target": target,
            "msg": message,
        });

        let _ = writeln!(file, "{}", entry);
        let _ = file.flush();
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        eprintln!("{}", message);
        self.event(
            record.level().as_str(),
            record.target(),
            &message,
        );
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.json_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_mirrored_as_json_lines() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("logs").join("replay.jsonl");
        let logger = Logger::new(LevelFilter::Debug, Some(path.clone())).expect("logger");

        logger.log(
            &Record::builder()
                .level(log::Level::Info)
                .target("mouse_gesture::gesture::hsm")
                .args(format_args!("gesture: inverted V recognized packets=12"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(log::Level::Trace)
                .args(format_args!("filtered out"))
                .build(),
        );

        let raw = fs::read_to_string(&path).expect("log file");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 1);
        let entry: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(entry["level"], "INFO");
        assert_eq!(entry["msg"], "gesture: inverted V recognized packets=12");
        assert_eq!(entry["target"], "mouse_gesture::gesture::hsm");
    }
}

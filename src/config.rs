use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{driver::SessionLimits, gesture::GestureConfig, gesture::MIN_SLOPE};

pub(crate) const NON_NEGATIVE_I32: &str = "in 0..=2147483647";
pub(crate) const NON_NEGATIVE_U32: &str = "in 0..=4294967295";
pub(crate) const POSITIVE_U32: &str = "in 1..=4294967295";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {origin}: {source}")]
    Parse {
        origin: String,
        source: toml::de::Error,
    },
    #[error("{key} must be {requirement}, got {value}")]
    OutOfRange {
        key: &'static str,
        requirement: &'static str,
        value: i64,
    },
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GestureConfigFile {
    pub gesture: GestureSection,
    #[serde(default)]
    pub session: SessionSection,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GestureSection {
    pub min_x_displacement: i64,
    pub tolerance: i64,
    #[serde(default = "default_min_slope")]
    pub min_slope: i64,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    #[serde(default = "default_timer_hz")]
    pub timer_hz: i64,
    #[serde(default)]
    pub idle_timeout_s: Option<i64>,
    #[serde(default = "default_max_receive_errors")]
    pub max_receive_errors: i64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            timer_hz: default_timer_hz(),
            idle_timeout_s: None,
            max_receive_errors: default_max_receive_errors(),
        }
    }
}

fn default_min_slope() -> i64 {
    i64::from(MIN_SLOPE)
}

fn default_timer_hz() -> i64 {
    i64::from(SessionLimits::DEFAULT_TIMER_HZ)
}

fn default_max_receive_errors() -> i64 {
    i64::from(SessionLimits::DEFAULT_MAX_RECEIVE_ERRORS)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedConfig {
    pub gesture: GestureConfig,
    pub session: SessionLimits,
}

impl GestureConfigFile {
    pub fn parse_str(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&raw, &path.display().to_string())
    }

    pub fn gesture_config(&self) -> Result<GestureConfig, ConfigError> {
        let section = &self.gesture;
        let config = GestureConfig {
            min_x_displacement: narrow(
                section.min_x_displacement,
                "gesture.min_x_displacement",
                NON_NEGATIVE_I32,
            )?,
            tolerance: narrow(section.tolerance, "gesture.tolerance", NON_NEGATIVE_U32)?,
            min_slope: narrow(section.min_slope, "gesture.min_slope", NON_NEGATIVE_U32)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn session_limits(&self) -> Result<SessionLimits, ConfigError> {
        let section = &self.session;
        let idle_timeout_s = match section.idle_timeout_s {
            Some(raw) => Some(narrow(raw, "session.idle_timeout_s", POSITIVE_U32)?),
            None => None,
        };
        let limits = SessionLimits {
            timer_hz: narrow(section.timer_hz, "session.timer_hz", POSITIVE_U32)?,
            idle_timeout_s,
            max_receive_errors: narrow(
                section.max_receive_errors,
                "session.max_receive_errors",
                NON_NEGATIVE_U32,
            )?,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        Ok(ResolvedConfig {
            gesture: self.gesture_config()?,
            session: self.session_limits()?,
        })
    }
}

pub fn load_resolved(path: &Path) -> Result<ResolvedConfig, ConfigError> {
    GestureConfigFile::load_from_path(path)?.resolve()
}

fn narrow<T: TryFrom<i64>>(
    value: i64,
    key: &'static str,
    requirement: &'static str,
) -> Result<T, ConfigError> {
    T::try_from(value).map_err(|_| ConfigError::OutOfRange {
        key,
        requirement,
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const DEFAULT_CONFIG: &str = include_str!("../config/gesture.toml");

    #[test]
    fn bundled_config_resolves() {
        let file = GestureConfigFile::parse_str(DEFAULT_CONFIG, "config/gesture.toml")
            .expect("bundled config should parse");
        let resolved = file.resolve().expect("bundled config should validate");
        assert_eq!(resolved.gesture.min_x_displacement, 50);
        assert_eq!(resolved.gesture.tolerance, 5);
        assert_eq!(resolved.gesture.min_slope, MIN_SLOPE);
        assert_eq!(resolved.session.timer_hz, 60);
    }

    #[test]
    fn session_table_is_optional() {
        let file = GestureConfigFile::parse_str(
            "[gesture]\nmin_x_displacement = 20\ntolerance = 3\n",
            "inline",
        )
        .expect("minimal config should parse");
        let resolved = file.resolve().expect("minimal config should validate");
        assert_eq!(resolved.session, SessionLimits::default());
        assert_eq!(resolved.gesture.min_slope, MIN_SLOPE);
    }

    #[test]
    fn out_of_range_values_name_the_key_and_range() {
        let cases = [
            (
                "[gesture]\nmin_x_displacement = -1\ntolerance = 3\n",
                "gesture.min_x_displacement must be in 0..=2147483647, got -1",
            ),
            (
                "[gesture]\nmin_x_displacement = 10\ntolerance = -3\n",
                "gesture.tolerance must be in 0..=4294967295, got -3",
            ),
            (
                "[gesture]\nmin_x_displacement = 10\ntolerance = 3\n[session]\ntimer_hz = 0\n",
                "session.timer_hz must be in 1..=4294967295, got 0",
            ),
            (
                "[gesture]\nmin_x_displacement = 10\ntolerance = 3\n[session]\nidle_timeout_s = 0\n",
                "session.idle_timeout_s must be in 1..=4294967295, got 0",
            ),
            (
                "[gesture]\nmin_x_displacement = 10\ntolerance = 5000000000\n",
                "gesture.tolerance must be in 0..=4294967295, got 5000000000",
            ),
            (
                "[gesture]\nmin_x_displacement = 3000000000\ntolerance = 3\n",
                "gesture.min_x_displacement must be in 0..=2147483647, got 3000000000",
            ),
        ];

        for (raw, expected) in cases {
            let err = GestureConfigFile::parse_str(raw, "inline")
                .expect("syntax is valid")
                .resolve()
                .expect_err("semantic validation should fail");
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = GestureConfigFile::parse_str(
            "[gesture]\nmin_x_displacement = 10\ntolerance = 3\nslope = 2\n",
            "inline",
        )
        .expect_err("unknown key should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            "[gesture]\nmin_x_displacement = 30\ntolerance = 2\nmin_slope = 2\n\n[session]\nidle_timeout_s = 5\n"
        )
        .expect("write config");

        let resolved = load_resolved(file.path()).expect("config should load");
        assert_eq!(resolved.gesture.min_x_displacement, 30);
        assert_eq!(resolved.gesture.min_slope, 2);
        assert_eq!(resolved.session.idle_timeout_s, Some(5));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_resolved(Path::new("/nonexistent/gesture.toml")).expect_err("must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/gesture.toml"));
    }
}

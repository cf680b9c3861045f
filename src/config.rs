//! Worker configuration, loadable from TOML.
//!
//! ```toml
//! thread_name = "wait_event_demo_thread"
//! pause_ms = 100
//! ```
//!
//! Missing keys take their defaults; unknown keys are rejected.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_THREAD_NAME: &str = "wait_event_demo_thread";
pub const DEFAULT_PAUSE_MS: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name given to the worker thread.
    pub thread_name: String,
    /// Length of the simulated work pause after each satisfied wait.
    pub pause_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            pause_ms: DEFAULT_PAUSE_MS,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pause_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "pause_ms must be nonzero".to_owned(),
            });
        }
        if self.thread_name.is_empty() || self.thread_name.contains('\0') {
            return Err(ConfigError::Invalid {
                reason: "thread_name must be non-empty and contain no NUL bytes".to_owned(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_PAUSE_MS, DEFAULT_THREAD_NAME};
    use crate::error::ConfigError;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
        assert_eq!(config.pause(), Duration::from_millis(DEFAULT_PAUSE_MS));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("pause_ms = 250").unwrap();
        assert_eq!(config.pause_ms, 250);
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn rejects_unknown_keys_and_zero_pause() {
        assert!(matches!(
            Config::from_toml_str("pause = 1"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("pause_ms = 0"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            Config::from_toml_str("thread_name = \"\""),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "thread_name = \"waiter\"\npause_ms = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.thread_name, "waiter");
        assert_eq!(config.pause_ms, 5);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        match Config::load(&path) {
            Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected: {other:?}"),
        }
    }
}

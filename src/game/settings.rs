use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE: &str = "settings.json";
const DATA_DIR_ENV: &str = "TILEPANEL_DATA_DIR";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineSettings {
    #[serde(default = "default_version")]
    version: u32,

    /// Oldest notifications are evicted beyond this many.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_auto_dismiss_secs")]
    pub auto_dismiss_secs: u64,

    /// New highest tiles below this value are recorded silently.
    #[serde(default = "default_tile_notify_threshold")]
    pub tile_notify_threshold: u32,

    #[serde(default = "default_welcome_message")]
    pub welcome_message: Option<String>,

    #[serde(default = "default_statistics_key")]
    pub statistics_key: String,

    #[serde(default = "default_achievements_key")]
    pub achievements_key: String,
}

// Helper functions for default values
fn default_version() -> u32 {
    2
}
fn default_queue_capacity() -> usize {
    50
}
fn default_auto_dismiss_secs() -> u64 {
    5
}
fn default_tile_notify_threshold() -> u32 {
    512
}
fn default_welcome_message() -> Option<String> {
    Some("Welcome to 2048!".to_string())
}
fn default_statistics_key() -> String {
    "gameStatistics".to_string()
}
fn default_achievements_key() -> String {
    "gameAchievements".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            version: default_version(),
            queue_capacity: default_queue_capacity(),
            auto_dismiss_secs: default_auto_dismiss_secs(),
            tile_notify_threshold: default_tile_notify_threshold(),
            welcome_message: default_welcome_message(),
            statistics_key: default_statistics_key(),
            achievements_key: default_achievements_key(),
        }
    }
}

impl EngineSettings {
    pub fn with_welcome_message(mut self, welcome_message: Option<String>) -> Self {
        self.welcome_message = welcome_message;
        self
    }

    pub fn auto_dismiss_after(&self) -> Duration {
        Duration::from_secs(self.auto_dismiss_secs)
    }

    /// Reads `settings.json` from `data_dir`, falling back to (and writing)
    /// the defaults when it is missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::settings_path(data_dir);
        if let Ok(contents) = fs::read_to_string(&path) {
            match serde_json::from_str::<EngineSettings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    settings.sanitize();
                    info!(target: "settings", "Loaded settings from {:?}", path);
                    return settings;
                }
                Err(err) => warn!(target: "settings", "Ignoring unreadable {:?}: {}", path, err),
            }
        }
        let default = EngineSettings::default();
        if let Err(err) = default.save(data_dir) {
            warn!(target: "settings", "Could not write default settings: {}", err);
        }
        default
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), std::io::Error> {
        let path = Self::settings_path(data_dir);
        // Ensure the directory exists
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
    }

    fn settings_path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    /// `TILEPANEL_DATA_DIR`, else `$HOME/.local/share/tilepanel`.
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".local/share/tilepanel")
    }

    fn migrate(&mut self) {
        match self.version {
            // v1 stored the dismiss delay in milliseconds
            1 => {
                self.auto_dismiss_secs = (self.auto_dismiss_secs / 1000).max(1);
                self.version = 2;
            }
            _ => (),
        }
    }

    fn sanitize(&mut self) {
        if self.queue_capacity == 0 {
            self.queue_capacity = default_queue_capacity();
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.queue_capacity, 50);
        assert_eq!(settings.auto_dismiss_after(), Duration::from_secs(5));
        assert_eq!(settings.tile_notify_threshold, 512);
        assert_eq!(settings.statistics_key, "gameStatistics");
        assert_eq!(settings.achievements_key, "gameAchievements");
        assert_eq!(settings.welcome_message.as_deref(), Some("Welcome to 2048!"));
    }

    #[test]
    fn test_with_welcome_message() {
        let settings = EngineSettings::default().with_welcome_message(None);
        assert_eq!(settings.welcome_message, None);
        assert_eq!(settings.queue_capacity, 50);
    }

    #[test]
    fn test_load_missing_writes_defaults() {
        let dir = tempdir().unwrap();
        let settings = EngineSettings::load(dir.path());
        assert_eq!(settings, EngineSettings::default());
        assert!(dir.path().join("settings.json").exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let settings = EngineSettings {
            queue_capacity: 10,
            welcome_message: None,
            ..EngineSettings::default()
        };
        settings.save(dir.path()).unwrap();

        let loaded = EngineSettings::load(dir.path());
        assert_eq!(loaded.queue_capacity, 10);
        assert_eq!(loaded.welcome_message, None);
    }

    #[test]
    fn test_partial_file_fills_defaults_and_migrates() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{"version": 1, "auto_dismiss_secs": 8000, "queue_capacity": 0}"#,
        )
        .unwrap();

        let loaded = EngineSettings::load(dir.path());
        assert_eq!(loaded.auto_dismiss_secs, 8);
        assert_eq!(loaded.queue_capacity, 50);
        assert_eq!(loaded.tile_notify_threshold, 512);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "not json").unwrap();
        assert_eq!(EngineSettings::load(dir.path()), EngineSettings::default());
    }

    #[test]
    #[serial]
    fn test_data_dir_from_env() {
        std::env::set_var(DATA_DIR_ENV, "/tmp/tilepanel-test");
        assert_eq!(EngineSettings::data_dir(), PathBuf::from("/tmp/tilepanel-test"));
        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    #[serial]
    fn test_data_dir_defaults_under_home() {
        let previous_home = std::env::var("HOME").ok();
        std::env::remove_var(DATA_DIR_ENV);
        std::env::set_var("HOME", "/home/player");
        assert_eq!(
            EngineSettings::data_dir(),
            PathBuf::from("/home/player/.local/share/tilepanel")
        );
        if let Some(home) = previous_home {
            std::env::set_var("HOME", home);
        }
    }
}

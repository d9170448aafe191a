//! Configuration loading for SkillSwap.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.skillswap/config.toml`)
//! 3. User config (`~/.skillswap/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SwapError};

/// Default award for completing a session, in points.
pub const DEFAULT_COMPLETION_AWARD: u64 = 10;

/// Main configuration struct for SkillSwap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Point award policy.
    pub points: PointsConfig,
}

/// Point award policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointsConfig {
    /// Points credited to the mentor per completed session.
    ///
    /// A policy constant, not derived from anything about the session.
    pub completion_award: u64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            completion_award: DEFAULT_COMPLETION_AWARD,
        }
    }
}

impl Config {
    /// Load configuration following the precedence chain.
    ///
    /// Missing files are fine; unparseable files are an error (a present
    /// but broken config should be fixed, not silently ignored).
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(home) = skillswap_home() {
            let user_path = home.join("config.toml");
            if let Some(user) = Self::load_file(&user_path)? {
                config = user;
            }
        }

        let project_path = PathBuf::from(".skillswap").join("config.toml");
        if let Some(project) = Self::load_file(&project_path)? {
            config = project;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a single config file. Returns `Ok(None)` if it doesn't exist.
    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|e| SwapError::storage(path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SwapError::config(format!("invalid config at {:?}: {}", path, e)))?;
        Ok(Some(config))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("SKILLSWAP_COMPLETION_AWARD") {
            match value.parse::<u64>() {
                Ok(award) => self.points.completion_award = award,
                Err(_) => tracing::warn!(
                    "SKILLSWAP_COMPLETION_AWARD is not a number ({}), ignoring",
                    value
                ),
            }
        }
    }
}

/// Resolve the SkillSwap home directory.
///
/// Honors `SKILLSWAP_HOME` when set and non-empty; falls back to
/// `~/.skillswap`, then to a per-user temp directory for containerized
/// environments without HOME.
pub fn skillswap_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("SKILLSWAP_HOME") {
        if home.is_empty() {
            tracing::warn!("SKILLSWAP_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("SKILLSWAP_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".skillswap"));
    }

    let fallback = fallback_skillswap_home();
    tracing::warn!("HOME not set, using fallback location: {}", fallback.display());
    Some(fallback)
}

/// Get fallback home path when HOME is unavailable.
#[cfg(unix)]
fn fallback_skillswap_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/skillswap-{}", uid))
}

/// Get fallback home path when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_skillswap_home() -> PathBuf {
    std::env::temp_dir().join("skillswap")
}

/// Get the sessions directory.
///
/// Returns `<skillswap_home>/sessions/`.
pub fn sessions_dir() -> Option<PathBuf> {
    skillswap_home().map(|h| h.join("sessions"))
}

/// Get the messages directory.
///
/// Returns `<skillswap_home>/messages/`.
pub fn messages_dir() -> Option<PathBuf> {
    skillswap_home().map(|h| h.join("messages"))
}

/// Get the points ledger snapshot path.
///
/// Returns `<skillswap_home>/points.json`.
pub fn points_path() -> Option<PathBuf> {
    skillswap_home().map(|h| h.join("points.json"))
}

/// Get the skill registry path used by the CLI.
///
/// Returns `<skillswap_home>/skills.json`.
pub fn skills_path() -> Option<PathBuf> {
    skillswap_home().map(|h| h.join("skills.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.points.completion_award, DEFAULT_COMPLETION_AWARD);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [points]
            completion_award = 25
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.points.completion_award, 25);
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_file_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("config.toml");
        assert!(Config::load_file(&missing).unwrap().is_none());
    }

    #[test]
    fn test_load_file_invalid_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "points = \"not a table\"").unwrap();
        let err = Config::load_file(&path).unwrap_err();
        assert!(matches!(err, SwapError::Config { .. }));
    }

    #[test]
    #[serial]
    fn test_env_override_completion_award() {
        env::set_var("SKILLSWAP_COMPLETION_AWARD", "99");
        let mut config = Config::default();
        config.apply_env_overrides();
        env::remove_var("SKILLSWAP_COMPLETION_AWARD");
        assert_eq!(config.points.completion_award, 99);
    }

    #[test]
    #[serial]
    fn test_env_override_garbage_ignored() {
        env::set_var("SKILLSWAP_COMPLETION_AWARD", "lots");
        let mut config = Config::default();
        config.apply_env_overrides();
        env::remove_var("SKILLSWAP_COMPLETION_AWARD");
        assert_eq!(config.points.completion_award, DEFAULT_COMPLETION_AWARD);
    }

    #[test]
    #[serial]
    fn test_load_precedence_chain() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let original_cwd = env::current_dir().unwrap();

        fs::write(
            home.path().join("config.toml"),
            "[points]\ncompletion_award = 20\n",
        )
        .unwrap();
        fs::create_dir_all(project.path().join(".skillswap")).unwrap();
        fs::write(
            project.path().join(".skillswap").join("config.toml"),
            "[points]\ncompletion_award = 30\n",
        )
        .unwrap();

        env::set_var("SKILLSWAP_HOME", home.path());
        env::set_current_dir(project.path()).unwrap();

        // Project config wins over user config.
        assert_eq!(Config::load().unwrap().points.completion_award, 30);

        // Env var wins over both files.
        env::set_var("SKILLSWAP_COMPLETION_AWARD", "40");
        assert_eq!(Config::load().unwrap().points.completion_award, 40);
        env::remove_var("SKILLSWAP_COMPLETION_AWARD");

        // Without a project config the user config applies.
        env::set_current_dir(elsewhere.path()).unwrap();
        assert_eq!(Config::load().unwrap().points.completion_award, 20);

        env::remove_var("SKILLSWAP_HOME");
        env::set_current_dir(original_cwd).unwrap();
    }

    #[test]
    #[serial]
    fn test_skillswap_home_env_absolute() {
        env::set_var("SKILLSWAP_HOME", "/tmp/skillswap-test-home");
        let home = skillswap_home().unwrap();
        env::remove_var("SKILLSWAP_HOME");
        assert_eq!(home, PathBuf::from("/tmp/skillswap-test-home"));
    }

    #[test]
    #[serial]
    fn test_derived_paths_hang_off_home() {
        env::set_var("SKILLSWAP_HOME", "/tmp/skillswap-test-home");
        assert_eq!(
            sessions_dir().unwrap(),
            PathBuf::from("/tmp/skillswap-test-home/sessions")
        );
        assert_eq!(
            messages_dir().unwrap(),
            PathBuf::from("/tmp/skillswap-test-home/messages")
        );
        assert_eq!(
            points_path().unwrap(),
            PathBuf::from("/tmp/skillswap-test-home/points.json")
        );
        assert_eq!(
            skills_path().unwrap(),
            PathBuf::from("/tmp/skillswap-test-home/skills.json")
        );
        env::remove_var("SKILLSWAP_HOME");
    }
}

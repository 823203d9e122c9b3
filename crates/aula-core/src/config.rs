//! Configuration management for the course assistant.
//!
//! Loads configuration from ${AULA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for the assistant's configuration directory.
    //!
    //! AULA_HOME resolution order:
    //! 1. AULA_HOME environment variable (if set)
    //! 2. ~/.config/aula (default)

    use std::path::PathBuf;

    /// Returns the aula home directory.
    pub fn aula_home() -> PathBuf {
        if let Ok(home) = std::env::var("AULA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("aula"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        aula_home().join("config.toml")
    }
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token for the Telegram API.
    pub bot_token: Option<String>,
    /// Allowlist of numeric Telegram user IDs. Empty means open access.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowlist_user_ids: Vec<i64>,
}

/// Course identity and material layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    /// Number of weeks with published material.
    pub total_weeks: u32,
    /// Monday of week 1.
    pub start_date: NaiveDate,
    /// Grade number used in file suffixes and captions.
    pub grade: u8,
    /// Section letter used in file suffixes and captions.
    pub section: String,
    /// Whether week documents carry the `_{grade}{section}_S{week}` suffix.
    pub with_suffix: bool,
    /// Root directory holding one `semana{n}` folder per week.
    pub materials_dir: PathBuf,
    /// Plain-text announcements file.
    pub announcements_path: PathBuf,
}

impl CourseConfig {
    const DEFAULT_TOTAL_WEEKS: u32 = 7;
    const DEFAULT_GRADE: u8 = 2;
    const DEFAULT_SECTION: &str = "B";
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            total_weeks: Self::DEFAULT_TOTAL_WEEKS,
            start_date: NaiveDate::from_ymd_opt(2025, 7, 28).expect("valid default start date"),
            grade: Self::DEFAULT_GRADE,
            section: Self::DEFAULT_SECTION.to_string(),
            with_suffix: true,
            materials_dir: PathBuf::from("fichas_pedagogicas"),
            announcements_path: PathBuf::from("comunicados.txt"),
        }
    }
}

/// Tutor chat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Model identifier sent to the completion service.
    pub model: String,
    /// Maximum tokens for a single tutor reply.
    pub max_tokens: u32,
    /// Sampling temperature. 0.0 keeps replies deterministic.
    pub temperature: f32,
    /// Exchange pairs included in each request window.
    pub window: usize,
    /// History entries (user+assistant turns) retained per session at
    /// rest. Must cover at least one full window (>= 2 * window).
    pub retention: usize,
    /// Timeout for a single completion request in seconds.
    pub request_timeout_secs: u64,
    /// Optional persona preamble override. The bot ships a default one.
    pub system_prompt: Option<String>,
}

impl TutorConfig {
    const DEFAULT_MODEL: &str = "claude-haiku-4-5";
    const DEFAULT_MAX_TOKENS: u32 = 1024;
    const DEFAULT_WINDOW: usize = 8;
    const DEFAULT_RETENTION: usize = 20;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            window: Self::DEFAULT_WINDOW,
            retention: Self::DEFAULT_RETENTION,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            system_prompt: None,
        }
    }
}

/// Per-provider configuration (base URL, API key).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub anthropic: ProviderConfig,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram bot configuration.
    pub telegram: TelegramConfig,
    /// Course identity and material layout.
    pub course: CourseConfig,
    /// Tutor chat configuration.
    pub tutor: TutorConfig,
    /// Provider configuration (base URLs, API keys).
    pub providers: ProvidersConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Validates cross-field constraints. Called once at startup; violations
    /// are configuration errors and abort the process.
    pub fn validate(&self) -> Result<()> {
        if self.course.total_weeks == 0 {
            anyhow::bail!("course.total_weeks must be at least 1");
        }
        if self.course.section.trim().is_empty() {
            anyhow::bail!("course.section must not be empty");
        }
        if self.tutor.window == 0 {
            anyhow::bail!("tutor.window must be at least 1");
        }
        if self.tutor.retention < self.tutor.window * 2 {
            anyhow::bail!(
                "tutor.retention ({}) must cover at least one window of {} pairs",
                self.tutor.retention,
                self.tutor.window
            );
        }
        Ok(())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::Config;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.course.total_weeks, 7);
        assert_eq!(config.course.section, "B");
        assert_eq!(config.tutor.window, 8);
        assert_eq!(config.tutor.retention, 20);
        assert!(config.telegram.bot_token.is_none());
    }

    #[test]
    fn init_template_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::init(&path).unwrap();

        let config = Config::load_from(&path).unwrap();
        config.validate().unwrap();
        assert_eq!(
            config.course.start_date,
            NaiveDate::from_ymd_opt(2025, 7, 28).unwrap()
        );
    }

    #[test]
    fn init_fails_if_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# existing").unwrap();
        assert!(Config::init(&path).is_err());
    }

    #[test]
    fn retention_below_window_is_rejected() {
        let mut config = Config::default();
        config.tutor.window = 8;
        config.tutor.retention = 4;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retention"));
    }

    #[test]
    fn partial_toml_overlays_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[course]\ntotal_weeks = 11\n\n[tutor]\nwindow = 4\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.course.total_weeks, 11);
        assert_eq!(config.tutor.window, 4);
        // Untouched sections keep their defaults.
        assert_eq!(config.course.grade, 2);
        assert_eq!(config.tutor.retention, 20);
    }
}

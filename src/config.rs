//! Configuration types for the puzzle bot.

use crate::error::{BotError, Result};
use crate::puzzle::archive::DEFAULT_IMAGE_BASE;
use crate::scheduler::tasks::DailyTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Remote puzzle feed settings.
    pub feed: FeedConfig,
    /// Used-puzzle ledger settings.
    pub ledger: LedgerConfig,
    /// Image download settings.
    pub image: ImageConfig,
    /// Message delivery settings.
    pub dispatch: DispatchConfig,
    /// Daily run times and polling cadence.
    pub schedule: ScheduleConfig,
}

/// Remote puzzle feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Endpoint returning the puzzle JSON.
    pub url: String,
    /// `User-Agent` header sent with feed requests.
    pub user_agent: String,
    /// Whole-request timeout applied to the HTTP client, in seconds.
    pub timeout_secs: u64,
    /// Board renderer that archive puzzle images are requested from.
    pub archive_image_base: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://api.chess.com/pub/puzzle".to_owned(),
            user_agent: "ChessClubBot/1.0".to_owned(),
            timeout_secs: 30,
            archive_image_base: DEFAULT_IMAGE_BASE.to_owned(),
        }
    }
}

/// Used-puzzle ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Line-delimited file of already-sent puzzle identifiers.
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("used_puzzles.txt"),
        }
    }
}

/// Image download configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Directory where downloaded images are written before dispatch.
    pub temp_dir: PathBuf,
    /// Static image used whenever a download fails.
    pub fallback_path: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("."),
            fallback_path: PathBuf::from("fallback_image.jpg"),
        }
    }
}

/// Which dispatcher delivers the puzzle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchBackend {
    /// WhatsApp Business Cloud API.
    Whatsapp,
    /// Log the message instead of sending it.
    #[default]
    DryRun,
}

impl std::fmt::Display for DispatchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Whatsapp => write!(f, "whatsapp"),
            Self::DryRun => write!(f, "dry_run"),
        }
    }
}

/// Message delivery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Selected dispatcher.
    pub backend: DispatchBackend,
    /// Group or phone number receiving every puzzle.
    pub recipient: String,
    /// WhatsApp credentials, used when `backend = "whatsapp"`.
    pub whatsapp: WhatsAppConfig,
}

/// WhatsApp Business Cloud API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    /// Permanent or system-user access token.
    pub access_token: String,
    /// Sender phone number ID from the Meta developer console.
    pub phone_number_id: String,
    /// Graph API base URL including the version segment.
    pub api_base: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            api_base: "https://graph.facebook.com/v18.0".to_owned(),
        }
    }
}

/// Scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local times of day (`HH:MM`) at which the job runs.
    pub times: Vec<String>,
    /// Seconds between scheduler polls.
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            times: vec!["09:00".to_owned(), "15:00".to_owned()],
            poll_interval_secs: 60,
        }
    }
}

impl ScheduleConfig {
    /// Parse every configured time of day.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Schedule`] for the first malformed entry.
    pub fn daily_times(&self) -> Result<Vec<DailyTime>> {
        self.times.iter().map(|t| DailyTime::parse(t)).collect()
    }
}

impl BotConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BotError::Config(e.to_string()))
    }

    /// Load `path` when it exists, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| BotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde cannot: schedule times and poll cadence.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.times.is_empty() {
            return Err(BotError::Config("schedule.times is empty".to_owned()));
        }
        self.schedule.daily_times()?;
        if self.schedule.poll_interval_secs == 0 {
            return Err(BotError::Config(
                "schedule.poll_interval_secs must be positive".to_owned(),
            ));
        }
        if self.feed.url.trim().is_empty() {
            return Err(BotError::Config("feed.url is empty".to_owned()));
        }
        if self.feed.archive_image_base.trim().is_empty() {
            return Err(BotError::Config("feed.archive_image_base is empty".to_owned()));
        }
        Ok(())
    }

    /// Returns the default config file path: `~/.config/puzzlebot/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("puzzlebot").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("puzzlebot")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/puzzlebot-config/config.toml")
        }
    }
}

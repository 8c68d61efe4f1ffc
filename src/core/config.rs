//! Startup configuration
//!
//! Everything the bot needs is resolved once at startup and then passed around
//! as an immutable [`AppConfig`]. Sources are layered with `figment`, later ones
//! winning:
//!
//! 1. built-in defaults (the stock channel list, movie catalog and caption)
//! 2. a TOML file (`kinogate.toml` unless `--config` says otherwise, optional)
//! 3. environment variables: `BOT_TOKEN` / `TELOXIDE_TOKEN`, `ADMIN_ID`, `PORT`,
//!    `STORE_PATH`, `LOG_FILE_PATH`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use secrecy::SecretString;
use serde::Deserialize;

use crate::core::error::{AppError, AppResult};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "kinogate.toml";

/// Default liveness port, matches what most hosting platforms poll
pub const DEFAULT_PORT: u16 = 5000;

/// Default location of the user record document
pub const DEFAULT_STORE_PATH: &str = "pending.json";

/// Default log file path
pub const DEFAULT_LOG_FILE_PATH: &str = "app.log";

const DEFAULT_CAPTION: &str = "🎬 Ajal O'yini
🔑 Janr: Triller | Fantastika | Hayot-mamot
📺 Fasl: 3 (Netflix Original)
⭐ Reyting: Juda yuqori
🌏 Til: Uzbek tilida";

const DEFAULT_MOVIES: [(&str, &str); 6] = [
    ("111", "BAACAgEAAxkBAAMFaN0nSEYPOBm92m-gthAtpMhVWvQAAmgFAAKwbLlGCLXVfcF8-K42BA"),
    ("112", "BAACAgUAAxkBAAMJaN0nuudyinyyd1sywNXwKRyXad8AArAWAAIau7hWsTfVTjPPf2w2BA"),
    ("113", "BAACAgUAAxkBAAMLaN0nx2pXJyIfpLMS_vQWF5JzxsMAArMWAAIau7hWasHhn8Rimjs2BA"),
    ("114", "BAACAgEAAxkBAAMNaN0nx9gxQ5Bz5SoMYU8pbG5IZIsAAiIHAAKwBcBG1yEOdBkWw2I2BA"),
    ("115", "BAACAgUAAxkBAAMMaN0nx775kKpW3HrGmmWyolc0htMAAkUYAAJCGMBWJvA6qEiAc-c2BA"),
    ("116", "BAACAgUAAxkBAAMOaN0nx5LVe55nJ2UuKbQEPQABChlYAAJPGAACQhjIVilo_HEewLmkNgQ"),
];

/// A channel the user has to join before codes can be redeemed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    /// Display name shown on the button
    pub name: String,
    /// Invite link the button opens
    pub link: String,
    /// Telegram chat id of the channel (usually `-100...`)
    pub id: i64,
}

/// Code → file mapping plus the caption attached to every delivered file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub caption: String,
    pub movies: BTreeMap<String, String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            caption: DEFAULT_CAPTION.to_string(),
            movies: DEFAULT_MOVIES
                .iter()
                .map(|(code, file_id)| (code.to_string(), file_id.to_string()))
                .collect(),
        }
    }
}

impl Catalog {
    /// Exact, case-sensitive lookup of an already trimmed code
    pub fn file_for(&self, code: &str) -> Option<&str> {
        self.movies.get(code).map(String::as_str)
    }

    /// Codes in display order: shorter first, then lexicographic, so "9" comes before "10"
    pub fn sorted_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.movies.keys().map(String::as_str).collect();
        codes.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        codes
    }

    /// Human readable range of valid codes, e.g. `111–116`
    pub fn code_range(&self) -> String {
        let codes = self.sorted_codes();
        match (codes.first(), codes.last()) {
            (Some(first), Some(last)) if first != last => format!("{}–{}", first, last),
            (Some(only), _) => only.to_string(),
            _ => String::new(),
        }
    }
}

fn default_channels() -> Vec<Channel> {
    vec![Channel {
        name: "Kanal 1".to_string(),
        link: "https://t.me/+g5pGoUg7fbkwNzM1".to_string(),
        id: -1003000935874,
    }]
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_log_file_path() -> String {
    DEFAULT_LOG_FILE_PATH.to_string()
}

/// Shape of the merged sources before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    bot_token: Option<String>,
    admin_id: Option<i64>,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_store_path")]
    store_path: PathBuf,
    #[serde(default = "default_log_file_path")]
    log_file_path: String,
    #[serde(default = "default_channels")]
    channels: Vec<Channel>,
    #[serde(default)]
    catalog: Catalog,
}

/// Validated, immutable configuration for the whole process
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bot_token: SecretString,
    /// Receives a message for every redemption; notifications are skipped when unset
    pub admin_id: Option<i64>,
    pub port: u16,
    pub store_path: PathBuf,
    pub log_file_path: String,
    pub channels: Vec<Channel>,
    pub catalog: Catalog,
}

impl AppConfig {
    /// Load from the TOML file at `path` (missing file is fine) and the environment
    ///
    /// # Errors
    /// Returns `AppError::Config` if the sources cannot be merged or the result
    /// fails validation (including a missing bot token).
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::raw().only(&["TELOXIDE_TOKEN"]).map(|_| "bot_token".into()))
            .merge(Env::raw().only(&["BOT_TOKEN", "ADMIN_ID", "PORT", "STORE_PATH", "LOG_FILE_PATH"]));

        Self::from_figment(figment)
    }

    /// Extract and validate from an already assembled figment
    pub fn from_figment(figment: Figment) -> AppResult<Self> {
        let raw: RawConfig = figment.extract()?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> AppResult<Self> {
        let token = raw
            .bot_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Config("BOT_TOKEN environment variable not set".to_string()))?;

        if raw.channels.is_empty() {
            return Err(AppError::Config("at least one channel must be configured".to_string()));
        }
        for channel in &raw.channels {
            if channel.name.trim().is_empty() {
                return Err(AppError::Config(format!("channel {} has an empty name", channel.id)));
            }
            url::Url::parse(&channel.link)
                .map_err(|e| AppError::Config(format!("channel '{}' has an invalid link: {}", channel.name, e)))?;
        }

        if raw.catalog.movies.is_empty() {
            return Err(AppError::Config("movie catalog is empty".to_string()));
        }
        for (code, file_id) in &raw.catalog.movies {
            if code.is_empty() || code.trim() != code {
                return Err(AppError::Config(format!(
                    "catalog code '{}' must be non-empty and have no surrounding whitespace",
                    code
                )));
            }
            if file_id.trim().is_empty() {
                return Err(AppError::Config(format!("catalog code '{}' has an empty file id", code)));
            }
        }

        Ok(Self {
            bot_token: SecretString::from(token),
            admin_id: raw.admin_id,
            port: raw.port,
            store_path: raw.store_path,
            log_file_path: raw.log_file_path,
            channels: raw.channels,
            catalog: raw.catalog,
        })
    }

    /// Startup diagnostics, never prints the token
    pub fn log_summary(&self) {
        log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        log::info!("⚙️  Configuration");
        log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        log::info!("Required channels: {}", self.channels.len());
        for channel in &self.channels {
            log::info!("  📢 {} ({}) {}", channel.name, channel.id, channel.link);
        }
        log::info!("Catalog: {} codes ({})", self.catalog.movies.len(), self.catalog.code_range());
        log::info!("Store: {}", self.store_path.display());
        log::info!("Liveness port: {}", self.port);
        match self.admin_id {
            Some(id) => log::info!("Admin notifications: {}", id),
            None => log::warn!("⚠️  ADMIN_ID not set, redemption notifications are disabled"),
        }
    }
}

mod defaults;


use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::NudgeError;
use defaults::*;

/// Top-level tasknudge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub nudge: NudgeConfig,
    #[serde(default)]
    pub todoist: TodoistConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub prioritize: PrioritizeConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NudgeConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Also write logs to this file. Empty = stdout only.
    #[serde(default)]
    pub log_file: String,
    /// IANA timezone used for "today", "tomorrow", and the schedule.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Human-readable debug logs instead of JSON.
    #[serde(default)]
    pub dev: bool,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_file: String::new(),
            timezone: default_timezone(),
            dev: false,
        }
    }
}

/// Todoist API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoistConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_todoist_base_url")]
    pub base_url: String,
    /// Attempts per request on transport errors.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_project_cache_ttl_secs")]
    pub project_cache_ttl_secs: u64,
}

impl Default for TodoistConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_todoist_base_url(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            project_cache_ttl_secs: default_project_cache_ttl_secs(),
        }
    }
}

impl TodoistConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn project_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.project_cache_ttl_secs)
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Telegram bot config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// The single chat allowed to talk to the bot and receive notifications.
    /// `0` means unset.
    #[serde(default)]
    pub chat_id: i64,
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Reply sent to any other chat.
    #[serde(default = "default_deny_message")]
    pub deny_message: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            deny_message: default_deny_message(),
        }
    }
}

/// Scheduler configuration -- periodic notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (6 fields with seconds, or 5 without) for the
    /// "tasks for today" notification.
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Cron expression that starts the prioritization dialog. Empty = off.
    #[serde(default)]
    pub prioritize_schedule: String,
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_schedule(),
            prioritize_schedule: String::new(),
            job_timeout_secs: default_job_timeout_secs(),
        }
    }
}

/// Interactive prioritization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizeConfig {
    /// Unfinished dialogs older than this are dropped.
    #[serde(default = "default_state_timeout_hours")]
    pub state_timeout_hours: u64,
    /// Budget for handling one command or button press.
    #[serde(default = "default_handler_timeout_secs")]
    pub handler_timeout_secs: u64,
}

impl Default for PrioritizeConfig {
    fn default() -> Self {
        Self {
            state_timeout_hours: default_state_timeout_hours(),
            handler_timeout_secs: default_handler_timeout_secs(),
        }
    }
}

impl Config {
    /// Override values from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override values from `lookup`. Empty values are ignored.
    ///
    /// Keys: `TODOIST_TOKEN`, `TELEGRAM_BOT_ID`, `TELEGRAM_CHAT_ID`,
    /// `SCHEDULE`, `LOCATION`, `ENV` (`dev` turns on dev logging).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TODOIST_TOKEN") {
            self.todoist.api_token = v;
        }
        if let Some(v) = get("TELEGRAM_BOT_ID") {
            self.channel.telegram.bot_token = v;
        }
        if let Some(v) = get("TELEGRAM_CHAT_ID") {
            match v.trim().parse::<i64>() {
                Ok(id) => self.channel.telegram.chat_id = id,
                Err(e) => tracing::warn!("ignoring TELEGRAM_CHAT_ID '{v}': {e}"),
            }
        }
        if let Some(v) = get("SCHEDULE") {
            self.scheduler.schedule = v;
        }
        if let Some(v) = get("LOCATION") {
            self.nudge.timezone = v;
        }
        if get("ENV").as_deref() == Some("dev") {
            self.nudge.dev = true;
        }
    }

    /// Check that everything needed to run is present and parsable.
    /// All missing required values are reported together.
    pub fn validate(&self) -> Result<(), NudgeError> {
        let mut missing = Vec::new();
        if self.todoist.api_token.is_empty() {
            missing.push("TODOIST_TOKEN");
        }
        if self.channel.telegram.bot_token.is_empty() {
            missing.push("TELEGRAM_BOT_ID");
        }
        if self.channel.telegram.chat_id == 0 {
            missing.push("TELEGRAM_CHAT_ID");
        }
        if !missing.is_empty() {
            return Err(NudgeError::Config(format!(
                "required settings not set: {}",
                missing.join(", ")
            )));
        }

        self.timezone()?;
        parse_schedule(&self.scheduler.schedule)?;
        if !self.scheduler.prioritize_schedule.trim().is_empty() {
            parse_schedule(&self.scheduler.prioritize_schedule)?;
        }
        Ok(())
    }

    /// The configured timezone.
    pub fn timezone(&self) -> Result<Tz, NudgeError> {
        self.nudge.timezone.parse::<Tz>().map_err(|e| {
            NudgeError::Config(format!("unknown timezone '{}': {e}", self.nudge.timezone))
        })
    }

    pub fn state_timeout(&self) -> chrono::Duration {
        chrono::Duration::hours(self.prioritize.state_timeout_hours as i64)
    }

    pub fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.prioritize.handler_timeout_secs)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.scheduler.job_timeout_secs)
    }
}

/// Parse a cron expression. Standard 5-field expressions get a leading
/// seconds field of `0`.
pub fn parse_schedule(expression: &str) -> Result<cron::Schedule, NudgeError> {
    let normalized = expression.trim();
    let expr = if normalized.split_whitespace().count() == 5 {
        format!("0 {normalized}")
    } else {
        normalized.to_string()
    };
    cron::Schedule::from_str(&expr)
        .map_err(|e| NudgeError::Config(format!("invalid schedule '{expression}': {e}")))
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, NudgeError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| NudgeError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| NudgeError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

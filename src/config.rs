use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub contest: ContestConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the live feed (e.g., "https://<host>")
    pub base_url: String,
    /// Value sent as the X-RapidAPI-Host header
    pub api_host: String,
    /// RapidAPI key; falls back to RAPIDAPI_KEY when unset
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
    /// Case-insensitive marker in provider error text meaning "not started"
    #[serde(default = "default_not_started_marker")]
    pub not_started_marker: String,
    /// Status token the feed reports once a game is over
    #[serde(default = "default_completed_status")]
    pub completed_status: String,
}

fn default_feed_timeout() -> u64 {
    10
}

fn default_not_started_marker() -> String {
    "Game hasn't started".to_string()
}

fn default_completed_status() -> String {
    "Completed".to_string()
}

impl FeedConfig {
    /// API key from config, then from the environment
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("RAPIDAPI_KEY").ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestConfig {
    /// JSON file holding the operator-selected contest
    pub pointer_path: PathBuf,
    /// Label appended to the kickoff time in status lines
    #[serde(default = "default_timezone_label")]
    pub timezone_label: String,
}

fn default_timezone_label() -> String {
    "EST".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SinkConfig {
    /// Outbox folders; every unit is written once into each
    #[serde(default)]
    pub folders: Vec<PathBuf>,
}

/// Sleep points of the poll loop, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_unit_pause")]
    pub unit_pause_secs: u64,
    #[serde(default = "default_drive_pause")]
    pub drive_pause_secs: u64,
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,
    #[serde(default = "default_fetch_failure_backoff")]
    pub fetch_failure_backoff_secs: u64,
    #[serde(default = "default_contest_backoff")]
    pub contest_backoff_secs: u64,
}

fn default_poll_interval() -> u64 {
    10
}

fn default_unit_pause() -> u64 {
    10
}

fn default_drive_pause() -> u64 {
    5
}

fn default_error_backoff() -> u64 {
    5
}

fn default_fetch_failure_backoff() -> u64 {
    10
}

fn default_contest_backoff() -> u64 {
    10
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            unit_pause_secs: default_unit_pause(),
            drive_pause_secs: default_drive_pause(),
            error_backoff_secs: default_error_backoff(),
            fetch_failure_backoff_secs: default_fetch_failure_backoff(),
            contest_backoff_secs: default_contest_backoff(),
        }
    }
}

/// Resolved durations used by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub poll_interval: Duration,
    pub unit_pause: Duration,
    pub drive_pause: Duration,
    pub error_backoff: Duration,
    pub fetch_failure_backoff: Duration,
    pub contest_backoff: Duration,
}

impl Timing {
    /// All sleeps disabled; used by tests and `--once`
    pub fn immediate() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            unit_pause: Duration::ZERO,
            drive_pause: Duration::ZERO,
            error_backoff: Duration::ZERO,
            fetch_failure_backoff: Duration::ZERO,
            contest_backoff: Duration::ZERO,
        }
    }
}

impl From<&TimingConfig> for Timing {
    fn from(cfg: &TimingConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(cfg.poll_interval_secs),
            unit_pause: Duration::from_secs(cfg.unit_pause_secs),
            drive_pause: Duration::from_secs(cfg.drive_pause_secs),
            error_backoff: Duration::from_secs(cfg.error_backoff_secs),
            fetch_failure_backoff: Duration::from_secs(cfg.fetch_failure_backoff_secs),
            contest_backoff: Duration::from_secs(cfg.contest_backoff_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rotated log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            log_dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a directory, then environment overrides
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default(
                "feed.base_url",
                "https://tank01-nfl-live-in-game-real-time-statistics-nfl.p.rapidapi.com",
            )?
            .set_default(
                "feed.api_host",
                "tank01-nfl-live-in-game-real-time-statistics-nfl.p.rapidapi.com",
            )?
            .set_default("contest.pointer_path", "config/contest.json")?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GRIDCAST_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GRIDCAST_FEED__API_KEY, etc.)
            .add_source(
                Environment::with_prefix("GRIDCAST")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sink.folders")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn timing(&self) -> Timing {
        Timing::from(&self.timing)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.feed.base_url.trim().is_empty() {
            errors.push("feed.base_url must not be empty".to_string());
        }

        if self.feed.not_started_marker.trim().is_empty() {
            errors.push("feed.not_started_marker must not be empty".to_string());
        }

        if self.sink.folders.is_empty() {
            errors.push("sink.folders must list at least one outbox folder".to_string());
        }

        if self.timing.poll_interval_secs == 0 {
            errors.push("timing.poll_interval_secs must be positive".to_string());
        }

        if self.timing.fetch_failure_backoff_secs < self.timing.error_backoff_secs {
            errors.push(
                "timing.fetch_failure_backoff_secs should not be shorter than error_backoff_secs"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_default(dir: &Path, body: &str) {
        let mut file = std::fs::File::create(dir.join("default.toml")).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_default(
            dir.path(),
            r#"
[sink]
folders = ["out/a", "out/b"]
"#,
        );

        let cfg = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(cfg.feed.completed_status, "Completed");
        assert_eq!(cfg.feed.not_started_marker, "Game hasn't started");
        assert_eq!(cfg.contest.timezone_label, "EST");
        assert_eq!(cfg.sink.folders.len(), 2);
        assert_eq!(cfg.timing.poll_interval_secs, 10);
        assert_eq!(cfg.timing().drive_pause, Duration::from_secs(5));
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_timing() {
        let dir = tempfile::tempdir().unwrap();
        write_default(
            dir.path(),
            r#"
[contest]
pointer_path = "/srv/contest.json"
timezone_label = "ET"

[sink]
folders = ["out"]

[timing]
poll_interval_secs = 3
unit_pause_secs = 1
"#,
        );

        let cfg = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(cfg.contest.pointer_path, PathBuf::from("/srv/contest.json"));
        assert_eq!(cfg.contest.timezone_label, "ET");
        let timing = cfg.timing();
        assert_eq!(timing.poll_interval, Duration::from_secs(3));
        assert_eq!(timing.unit_pause, Duration::from_secs(1));
        assert_eq!(timing.error_backoff, Duration::from_secs(5));
    }

    #[test]
    fn test_validate_requires_outbox() {
        let dir = tempfile::tempdir().unwrap();
        write_default(dir.path(), "");

        let cfg = AppConfig::load_from(dir.path()).unwrap();
        let errors = cfg.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("sink.folders")));
    }
}

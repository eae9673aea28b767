//! TOML configuration loading and validation.
//!
//! Every section has defaults, so running without a config file is the same
//! as loading an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use alphaflex::{Backoff, MarketHours, PacingPolicy, RetryPolicy};
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub broker: BrokerConfig,
    pub session: SessionConfig,
    pub market: MarketConfig,
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.robinhood.com".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Token file location. A leading `~/` expands to the home directory.
    pub token_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: "~/.tokens/alphaflex.json".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub timezone: String,
    /// `HH:MM`, inclusive.
    pub open: String,
    /// `HH:MM`, inclusive.
    pub close: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".into(),
            open: "09:00".into(),
            close: "14:30".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub max_attempts: u32,
    pub backoff_step_ms: u64,
    pub pacing_min_ms: u64,
    pub pacing_max_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step_ms: 1_000,
            pacing_min_ms: 5_000,
            pacing_max_ms: 10_000,
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.broker.base_url.is_empty() {
            return Err(Error::Config("broker base_url must not be empty".into()));
        }
        if self.broker.timeout_secs == 0 {
            return Err(Error::Config("broker timeout_secs must be > 0".into()));
        }
        if self.session.token_path.is_empty() {
            return Err(Error::Config("session token_path must not be empty".into()));
        }
        if self.execution.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be >= 1".into()));
        }
        if self.execution.pacing_min_ms > self.execution.pacing_max_ms {
            return Err(Error::Config(
                "pacing_min_ms must not exceed pacing_max_ms".into(),
            ));
        }
        let hours = self.market_hours()?;
        if hours.open >= hours.close {
            return Err(Error::Config("market open must be before close".into()));
        }
        Ok(())
    }

    /// The configured trading window.
    pub fn market_hours(&self) -> Result<MarketHours> {
        let tz: Tz = self
            .market
            .timezone
            .parse()
            .map_err(|_| Error::Config(format!("unknown timezone '{}'", self.market.timezone)))?;
        Ok(MarketHours::new(
            tz,
            parse_time(&self.market.open)?,
            parse_time(&self.market.close)?,
        ))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.execution.max_attempts,
            Backoff::Linear(Duration::from_millis(self.execution.backoff_step_ms)),
        )
    }

    pub fn pacing_policy(&self) -> PacingPolicy {
        PacingPolicy::new(
            Duration::from_millis(self.execution.pacing_min_ms),
            Duration::from_millis(self.execution.pacing_max_ms),
        )
    }

    pub fn broker_timeout(&self) -> Duration {
        Duration::from_secs(self.broker.timeout_secs)
    }

    /// Token file path with `~/` expanded.
    pub fn token_path(&self) -> PathBuf {
        expand_home(&self.session.token_path)
    }
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| Error::Config(format!("invalid time '{s}', expected HH:MM")))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => Path::new(&home).join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[broker]
base_url = "https://api.robinhood.com"
timeout_secs = 20

[session]
token_path = "/var/lib/alphaflex/token.json"

[market]
timezone = "America/New_York"
open = "09:30"
close = "15:30"

[execution]
max_attempts = 5
backoff_step_ms = 500
pacing_min_ms = 2000
pacing_max_ms = 4000
"#
    }

    #[test]
    fn parse_example_config() {
        let config = Config::from_toml(example_toml()).unwrap();
        assert_eq!(config.broker.timeout_secs, 20);
        assert_eq!(config.execution.max_attempts, 5);
        assert_eq!(config.market.timezone, "America/New_York");
        assert_eq!(
            config.token_path(),
            PathBuf::from("/var/lib/alphaflex/token.json")
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.pacing_policy(), PacingPolicy::default());
        assert_eq!(config.market_hours().unwrap(), MarketHours::default());
        assert_eq!(config.broker_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = Config::from_toml("[execution]\nmax_attempts = 1\n").unwrap();
        assert_eq!(config.execution.max_attempts, 1);
        assert_eq!(config.execution.pacing_max_ms, 10_000);
    }

    #[test]
    fn policies_from_config() {
        let config = Config::from_toml(example_toml()).unwrap();
        let retry = config.retry_policy();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.delay_after(2), Some(Duration::from_secs(1)));
        assert_eq!(
            config.pacing_policy(),
            PacingPolicy::new(Duration::from_secs(2), Duration::from_secs(4))
        );
    }

    #[test]
    fn validate_catches_zero_attempts() {
        assert!(Config::from_toml("[execution]\nmax_attempts = 0\n").is_err());
    }

    #[test]
    fn validate_catches_inverted_pacing() {
        let toml = "[execution]\npacing_min_ms = 9000\npacing_max_ms = 1000\n";
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn validate_catches_bad_timezone() {
        assert!(Config::from_toml("[market]\ntimezone = \"Mars/Olympus\"\n").is_err());
    }

    #[test]
    fn validate_catches_bad_times() {
        assert!(Config::from_toml("[market]\nopen = \"9am\"\n").is_err());
        assert!(Config::from_toml("[market]\nopen = \"15:00\"\nclose = \"09:00\"\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alphaflex.toml");
        std::fs::write(&path, example_toml()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.execution.backoff_step_ms, 500);
        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn home_expansion_leaves_absolute_paths() {
        assert_eq!(expand_home("/tmp/token.json"), PathBuf::from("/tmp/token.json"));
    }
}

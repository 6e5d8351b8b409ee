//! Process configuration loaded from the environment.

use anyhow::{Context, Result, bail};

use shopkeep_observability::LogFormat;
use shopkeep_stock::{DisplayChannel, StockConfig};

pub const LOG_FORMAT_VAR: &str = "SHOPKEEP_LOG_FORMAT";
pub const DISPLAY_CHANNEL_VAR: &str = "SHOPKEEP_DISPLAY_CHANNEL";

/// Settings for a running process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub log_format: LogFormat,
    pub stock: StockConfig,
}

impl AppConfig {
    /// Read `SHOPKEEP_LOG_FORMAT` (`json` | `pretty`) and
    /// `SHOPKEEP_DISPLAY_CHANNEL` (`frontend` | `backend` | `all`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .with_context(|| format!("invalid {LOG_FORMAT_VAR}"))?,
            None => LogFormat::default(),
        };

        let display_channel = match lookup(DISPLAY_CHANNEL_VAR) {
            Some(raw) => {
                parse_channel(&raw).with_context(|| format!("invalid {DISPLAY_CHANNEL_VAR}"))?
            }
            None => None,
        };

        Ok(Self {
            log_format,
            stock: StockConfig { display_channel },
        })
    }

    /// Install process-wide logging in the configured format.
    pub fn init_logging(&self) {
        shopkeep_observability::init_with(self.log_format);
    }
}

fn parse_channel(raw: &str) -> Result<Option<DisplayChannel>> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "frontend" | "front_end" => Ok(Some(DisplayChannel::Frontend)),
        "backend" | "back_end" => Ok(Some(DisplayChannel::Backend)),
        "all" | "" => Ok(None),
        other => bail!("unknown display channel '{other}'"),
    }
}

use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 86_400;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub channel_access_token: Option<String>,
    pub channel_secret: Option<String>,
    pub apps_script_url: Option<String>,
    pub line_api_base: String,
    pub port: u16,
    pub log_format: LogFormat,
    /// `None` disables idle eviction.
    pub session_idle_timeout: Option<Duration>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid PORT: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => bail!("invalid LOG_FORMAT: {other} (expected json or pretty)"),
        };

        let idle_secs = parse_secs(get("SESSION_IDLE_TIMEOUT_SECS"), "SESSION_IDLE_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT_SECS);
        let http_timeout_secs = parse_secs(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Ok(Self {
            channel_access_token: get("LINE_CHANNEL_ACCESS_TOKEN"),
            channel_secret: get("LINE_CHANNEL_SECRET"),
            apps_script_url: get("GOOGLE_APPS_SCRIPT_URL"),
            line_api_base: get("LINE_API_BASE").unwrap_or_else(|| DEFAULT_LINE_API_BASE.to_string()),
            port,
            log_format,
            session_idle_timeout: (idle_secs > 0).then(|| Duration::from_secs(idle_secs)),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// How often to look for idle sessions.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.session_idle_timeout
            .map(|timeout| timeout.min(MAX_SWEEP_INTERVAL))
    }
}

fn parse_secs(raw: Option<String>, key: &str) -> Result<Option<u64>> {
    raw.map(|value| {
        value
            .parse::<u64>()
            .with_context(|| format!("invalid {key}: {value}"))
    })
    .transpose()
}

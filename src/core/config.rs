use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

// Console configuration: endpoints plus the two fixed identities the
// session is bound to. Precedence is defaults < TOML file < environment.

pub const DEFAULT_AGENT_ID: &str = "699f2236d19ec1f1c4d3e715";
pub const DEFAULT_SCHEDULE_ID: &str = "699f223e399dfadeac398cdf";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub agent_base_url: String,
    pub scheduler_base_url: String,
    pub agent_id: String,
    pub schedule_id: String,
    pub timezone_label: String,
    pub log_file: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            agent_base_url: "http://localhost:8080/".to_string(),
            scheduler_base_url: "http://localhost:8080/".to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            schedule_id: DEFAULT_SCHEDULE_ID.to_string(),
            timezone_label: "America/New_York (ET)".to_string(),
            log_file: "po-console.log".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Loads the optional TOML file, then applies `PO_CONSOLE_*`
    /// environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("cannot read config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config.override_with(|key| std::env::var(key).ok()))
    }

    pub fn override_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut apply = |key: &str, field: &mut String| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value;
            }
        };
        apply("PO_CONSOLE_AGENT_URL", &mut self.agent_base_url);
        apply("PO_CONSOLE_SCHEDULER_URL", &mut self.scheduler_base_url);
        apply("PO_CONSOLE_AGENT_ID", &mut self.agent_id);
        apply("PO_CONSOLE_SCHEDULE_ID", &mut self.schedule_id);
        apply("PO_CONSOLE_TIMEZONE", &mut self.timezone_label);
        apply("PO_CONSOLE_LOG_FILE", &mut self.log_file);
        self
    }

    pub fn agent_url(&self) -> Result<Url> {
        Url::parse(&self.agent_base_url)
            .with_context(|| format!("invalid agent base url {}", self.agent_base_url))
    }

    pub fn scheduler_url(&self) -> Result<Url> {
        Url::parse(&self.scheduler_base_url)
            .with_context(|| format!("invalid scheduler base url {}", self.scheduler_base_url))
    }
}

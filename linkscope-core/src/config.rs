// Audit configuration

use crate::error::{AuditError, Result};
use linkscope_scanner::Fetcher;
use linkscope_scanner::fetch::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which links make the cut when a page has more than `probe_cap` of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOrder {
    /// First links in the document win.
    #[default]
    Document,
    /// Internal links first, then external, each in document order.
    InternalFirst,
}

/// Options for a single audit. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditOptions {
    pub probe_cap: usize,
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub probe_order: ProbeOrder,
    pub user_agent: String,
    pub discover_resources: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            probe_cap: 20,
            timeout_secs: 5,
            max_redirects: 3,
            probe_order: ProbeOrder::Document,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            discover_resources: true,
        }
    }
}

impl AuditOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// A zero timeout would fail every fetch before it starts.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(AuditError::InvalidOptions(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_probe_cap(mut self, cap: usize) -> Self {
        self.probe_cap = cap;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_probe_order(mut self, order: ProbeOrder) -> Self {
        self.probe_order = order;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_discovery(mut self, enabled: bool) -> Self {
        self.discover_resources = enabled;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// One client per audit, shared by the prober and discovery.
    pub fn fetcher(&self) -> Result<Fetcher> {
        self.validate()?;
        Ok(Fetcher::new(
            &self.user_agent,
            self.timeout(),
            self.max_redirects,
        )?)
    }
}

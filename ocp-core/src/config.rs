//! Provider configuration.
//!
//! A [`ProviderConfig`] is built once, explicitly, and handed to the client
//! and the reconciler. Nothing in the workspace reads configuration from a
//! global.

use crate::error::{OcpError, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Backend region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    /// Ukraine.
    #[default]
    Ua,
    /// Poland.
    Pl,
}

impl Region {
    /// API host serving this region.
    pub fn host(self) -> &'static str {
        match self {
            Self::Ua => "core.ocplanet.cloud",
            Self::Pl => "core-pl.ocplanet.cloud",
        }
    }

    /// Short region code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ua => "ua",
            Self::Pl => "pl",
        }
    }
}

impl FromStr for Region {
    type Err = OcpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ua" => Ok(Self::Ua),
            "pl" => Ok(Self::Pl),
            other => Err(OcpError::invalid_config(format!(
                "unknown region '{other}', expected 'ua' or 'pl'"
            ))),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create/update/delete deadlines for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    /// Deadline for creation.
    pub create: Duration,
    /// Deadline for updates.
    pub update: Duration,
    /// Deadline for deletion.
    pub delete: Duration,
}

impl ResourceTimeouts {
    /// Cluster defaults: 60 minutes to create, 1 to update, 2 to delete.
    pub const CLUSTER: Self = Self {
        create: Duration::from_secs(60 * 60),
        update: Duration::from_secs(60),
        delete: Duration::from_secs(2 * 60),
    };

    /// Node pool defaults: 1 minute for everything.
    pub const NODE_POOL: Self = Self {
        create: Duration::from_secs(60),
        update: Duration::from_secs(60),
        delete: Duration::from_secs(60),
    };
}

/// Timing policy of the operation poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Wait before the first status lookup.
    pub initial_delay: Duration,
    /// Floor for the interval between lookups.
    pub min_interval: Duration,
    /// Ceiling for the doubling interval.
    pub max_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            min_interval: Duration::from_secs(3),
            max_interval: Duration::from_secs(10),
        }
    }
}

impl PollSettings {
    fn validate(&self) -> Result<()> {
        if self.min_interval.is_zero() {
            return Err(OcpError::invalid_config("poll min_interval must be positive"));
        }
        if self.max_interval < self.min_interval {
            return Err(OcpError::invalid_config(
                "poll max_interval must not be below min_interval",
            ));
        }
        Ok(())
    }
}

/// Everything needed to talk to the backend.
#[derive(Clone)]
pub struct ProviderConfig {
    token: String,
    region: Region,
    endpoint: Option<String>,
    request_timeout: Duration,
    user_agent: String,
    cluster_timeouts: ResourceTimeouts,
    node_pool_timeouts: ResourceTimeouts,
    poll: PollSettings,
}

// Keeps the token out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("token", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .field("cluster_timeouts", &self.cluster_timeouts)
            .field("node_pool_timeouts", &self.node_pool_timeouts)
            .field("poll", &self.poll)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a new builder.
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `OCP_API_TOKEN`: API token (required)
    /// - `OCP_REGION`: "ua" (default) or "pl"
    /// - `OCP_ENDPOINT`: base URL override
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("OCP_API_TOKEN")
            .ok_or_else(|| OcpError::invalid_config("OCP_API_TOKEN is not set"))?;

        let mut builder = Self::builder().token(token);
        if let Some(region) = lookup("OCP_REGION").filter(|r| !r.trim().is_empty()) {
            builder = builder.region(region.parse()?);
        }
        if let Some(endpoint) = lookup("OCP_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            builder = builder.endpoint(endpoint);
        }
        builder.build()
    }

    /// API token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Selected region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Base URL of the API, always ending with `/`.
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) if endpoint.ends_with('/') => endpoint.clone(),
            Some(endpoint) => format!("{endpoint}/"),
            None => format!("https://{}/backend/api/", self.region.host()),
        }
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// User agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Deadlines for cluster operations.
    pub fn cluster_timeouts(&self) -> ResourceTimeouts {
        self.cluster_timeouts
    }

    /// Deadlines for node pool operations.
    pub fn node_pool_timeouts(&self) -> ResourceTimeouts {
        self.node_pool_timeouts
    }

    /// Poller timing policy.
    pub fn poll(&self) -> PollSettings {
        self.poll
    }
}

/// Builder for ProviderConfig.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfigBuilder {
    token: Option<String>,
    region: Option<Region>,
    endpoint: Option<String>,
    request_timeout: Option<Duration>,
    user_agent: Option<String>,
    cluster_timeouts: Option<ResourceTimeouts>,
    node_pool_timeouts: Option<ResourceTimeouts>,
    poll: Option<PollSettings>,
}

impl ProviderConfigBuilder {
    /// Set the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the region.
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Override the base URL (private installs, tests).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set cluster deadlines.
    pub fn cluster_timeouts(mut self, timeouts: ResourceTimeouts) -> Self {
        self.cluster_timeouts = Some(timeouts);
        self
    }

    /// Set node pool deadlines.
    pub fn node_pool_timeouts(mut self, timeouts: ResourceTimeouts) -> Self {
        self.node_pool_timeouts = Some(timeouts);
        self
    }

    /// Set the poller timing policy.
    pub fn poll(mut self, poll: PollSettings) -> Self {
        self.poll = Some(poll);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ProviderConfig> {
        let token = self.token.unwrap_or_default();
        if token.trim().is_empty() {
            return Err(OcpError::invalid_config("API token must not be empty"));
        }
        let poll = self.poll.unwrap_or_default();
        poll.validate()?;

        Ok(ProviderConfig {
            token,
            region: self.region.unwrap_or_default(),
            endpoint: self.endpoint,
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| format!("ocp-rs/{}", env!("CARGO_PKG_VERSION"))),
            cluster_timeouts: self.cluster_timeouts.unwrap_or(ResourceTimeouts::CLUSTER),
            node_pool_timeouts: self
                .node_pool_timeouts
                .unwrap_or(ResourceTimeouts::NODE_POOL),
            poll,
        })
    }
}

//! CLI command implementations.

pub mod apply;
pub mod catalog;
pub mod destroy;
pub mod operation;
pub mod plan;
pub mod refresh;
pub mod version;

use anyhow::{Context, Result};
use ocp_client::Client;
use ocp_core::ProviderConfig;
use ocp_reconciler::Reconciler;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Provider configuration from the environment.
pub fn provider_config() -> Result<ProviderConfig> {
    ProviderConfig::from_env()
        .context("Failed to load provider configuration (is OCP_API_TOKEN set?)")
}

/// HTTP client for the configured backend.
pub fn client(config: &ProviderConfig) -> Result<Client> {
    Client::new(config).context("Failed to create API client")
}

/// Reconciler talking to the configured backend.
pub fn connect(cancel: CancellationToken) -> Result<Reconciler<Client>> {
    let config = provider_config()?;
    tracing::debug!(config = ?config, "Loaded provider configuration");
    let client = client(&config)?;
    Ok(Reconciler::new(client, &config).with_cancellation(cancel))
}

/// What happened, or would happen, to one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Resource created.
    Create,
    /// Resource updated in place.
    Update,
    /// Resource needs to be destroyed and created again.
    Replace,
    /// Resource deleted or dropped from state.
    Delete,
    /// Nothing to do.
    Unchanged,
}

impl Action {
    fn symbol(self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update => "~",
            Self::Replace => "!",
            Self::Delete => "-",
            Self::Unchanged => "=",
        }
    }
}

/// Changes made by a command, in order.
#[derive(Debug, Default)]
pub struct Summary {
    /// One entry per resource touched.
    pub changes: Vec<(Action, String)>,
}

impl Summary {
    /// Record a change.
    pub fn push(&mut self, action: Action, resource: impl Into<String>) {
        self.changes.push((action, resource.into()));
    }

    /// Number of changes with this action.
    pub fn count(&self, action: Action) -> usize {
        self.changes.iter().filter(|(a, _)| *a == action).count()
    }

    /// True when nothing changed.
    pub fn is_noop(&self) -> bool {
        self.changes
            .iter()
            .all(|(action, _)| *action == Action::Unchanged)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (action, resource) in &self.changes {
            writeln!(f, "  {} {}", action.symbol(), resource)?;
        }
        write!(
            f,
            "{} created, {} updated, {} deleted, {} unchanged",
            self.count(Action::Create),
            self.count(Action::Update),
            self.count(Action::Delete),
            self.count(Action::Unchanged)
        )
    }
}

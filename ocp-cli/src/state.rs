//! Observed-state file.
//!
//! The last state the backend reported for every managed resource, written
//! after each change so an interrupted run loses nothing it already did.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ocp_core::{ClusterState, NodePoolState, same_name};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format version written into new files.
const FORMAT_VERSION: u32 = 1;

/// Contents of the state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    /// File format version.
    pub version: u32,
    /// Incremented on every save.
    #[serde(default)]
    pub serial: u64,
    /// Time of the last save.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Managed cluster.
    #[serde(default)]
    pub cluster: Option<ClusterState>,
    /// Managed standalone node pools.
    #[serde(default)]
    pub node_pools: Vec<NodePoolState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            serial: 0,
            updated_at: None,
            cluster: None,
            node_pools: Vec::new(),
        }
    }
}

impl StateFile {
    /// Read a state file. A missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No state file, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if state.version > FORMAT_VERSION {
            anyhow::bail!(
                "state file {} has format version {}, this build reads up to {}",
                path.display(),
                state.version,
                FORMAT_VERSION
            );
        }
        Ok(state)
    }

    /// Write the state through a temporary file and a rename.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.serial += 1;
        self.updated_at = Some(Utc::now());

        let content = serde_json::to_string_pretty(self).context("Failed to encode state")?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), serial = self.serial, "State saved");
        Ok(())
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.cluster.is_none() && self.node_pools.is_empty()
    }

    /// Tracked standalone pool with this name.
    pub fn node_pool(&self, name: &str) -> Option<&NodePoolState> {
        self.node_pools.iter().find(|pool| same_name(&pool.name, name))
    }

    /// Insert or replace the tracked pool with the same name.
    pub fn put_node_pool(&mut self, pool: NodePoolState) {
        match self
            .node_pools
            .iter_mut()
            .find(|tracked| same_name(&tracked.name, &pool.name))
        {
            Some(tracked) => *tracked = pool,
            None => self.node_pools.push(pool),
        }
    }

    /// Stop tracking the pool with this name.
    pub fn remove_node_pool(&mut self, name: &str) {
        self.node_pools.retain(|pool| !same_name(&pool.name, name));
    }
}

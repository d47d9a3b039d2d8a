//! Desired-state manifest.
//!
//! ```yaml
//! cluster:
//!   cluster_name: prod
//!   cluster_version: "1.29"
//!   master_flavor_id: m1.medium
//!   master_count: 3
//!   image: ubuntu-22.04
//!   networking: calico
//!   restriction_api: false
//!   node_pool:
//!     - name: default
//!       flavor_id: m1.large
//!       node_count: 3
//!       autoscale: false
//!       max_count: 3
//! node_pools:
//!   - name: batch
//!     flavor_id: m1.xlarge
//!     node_count: 2
//!     autoscale: true
//!     max_count: 6
//! ```
//!
//! A standalone pool without `cluster` joins the manifest's cluster.

use anyhow::{Context, Result};
use ocp_core::{ClusterId, ClusterSpec, NodePoolSpec, same_name};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resources a manifest declares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// The cluster, if the manifest manages one.
    #[serde(default)]
    pub cluster: Option<ClusterSpec>,
    /// Standalone node pools.
    #[serde(default)]
    pub node_pools: Vec<NodePoolSpec>,
}

impl Manifest {
    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check every declared resource on its own and pool names for clashes.
    pub fn validate(&self) -> Result<()> {
        if let Some(cluster) = &self.cluster {
            cluster.validate()?;
        }
        for pool in &self.node_pools {
            pool.validate()?;
            if self.cluster.is_none() && pool.cluster.is_none() {
                anyhow::bail!(
                    "node pool '{}' has no cluster and the manifest declares none",
                    pool.name
                );
            }
        }
        for (i, pool) in self.node_pools.iter().enumerate() {
            if self.node_pools[..i]
                .iter()
                .any(|other| same_name(&other.name, &pool.name))
            {
                anyhow::bail!("node pool '{}' is declared twice", pool.name);
            }
        }
        Ok(())
    }

    /// Standalone pools with a missing `cluster` pointed at `cluster`.
    pub fn resolved_node_pools(&self, cluster: Option<&ClusterId>) -> Result<Vec<NodePoolSpec>> {
        self.node_pools
            .iter()
            .map(|pool| {
                let mut pool = pool.clone();
                if pool.cluster.is_none() {
                    let id = cluster.with_context(|| {
                        format!("node pool '{}' needs a cluster that does not exist yet", pool.name)
                    })?;
                    pool.cluster = Some(id.clone());
                }
                Ok(pool)
            })
            .collect()
    }
}

//! Records exchanged with the backend and tracked by the reconciler.

mod cluster;
mod ids;
mod node_pool;
mod operation;

pub use cluster::{
    Addon, Cluster, ClusterCreateRequest, ClusterPatch, ClusterSpec, ClusterState, ClusterUpdate,
};
pub use ids::{ClusterId, NodePoolId, OperationId};
pub use node_pool::{
    Label, NodePool, NodePoolCreateRequest, NodePoolScaling, NodePoolSpec, NodePoolState,
    Submission, Taint,
};
pub use operation::{OperationHandle, OperationRecord, OperationStatus, Progress, StepDetail};

use serde::{Deserialize, Serialize};

/// Compare resource names the way the backend does: case-insensitively.
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// A node of a cluster. Always computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Backend identifier.
    #[serde(default)]
    pub id: String,
    /// Node name.
    #[serde(default)]
    pub name: String,
    /// Whether the kubelet reports ready.
    #[serde(default)]
    pub ready: bool,
    /// Backend state string.
    #[serde(default)]
    pub state: String,
    /// Flavor name.
    #[serde(default)]
    pub flavor: String,
    /// Kubelet version.
    #[serde(default)]
    pub version: String,
    /// Name of the owning pool.
    #[serde(default)]
    pub node_pool: String,
    /// Whether the node runs the control plane.
    #[serde(default)]
    pub control_plane: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_compare_case_insensitively() {
        assert!(same_name("Workers", "workers"));
        assert!(same_name("ÄPFEL", "äpfel"));
        assert!(!same_name("workers", "worker"));
    }
}

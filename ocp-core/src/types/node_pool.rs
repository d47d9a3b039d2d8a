//! Node pool records: what callers declare, what the backend returns, and the
//! tracked state that ties the two together.

use super::ids::{ClusterId, NodePoolId};
use super::{Node, operation::OperationHandle, same_name};
use crate::error::{OcpError, Result};
use serde::{Deserialize, Serialize};

/// Kubernetes label applied to every node of a pool. Set only at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label key.
    pub key: String,
    /// Label value.
    pub value: String,
}

/// Kubernetes taint applied to every node of a pool. Set only at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    /// Taint key.
    pub key: String,
    /// Taint value.
    pub value: String,
    /// Taint effect (NoSchedule, PreferNoSchedule, NoExecute).
    pub effect: String,
}

/// The mutable triple of a node pool.
///
/// This is both the body of a scaling update and the authoritative answer the
/// backend sends back, which may differ from what was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePoolScaling {
    /// Number of nodes.
    pub count: u32,
    /// Whether the autoscaler manages the pool.
    pub autoscale: bool,
    /// Upper bound for the autoscaler.
    #[serde(default)]
    pub max_count: u32,
}

/// A node pool as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePoolSpec {
    /// Pool name, compared case-insensitively.
    pub name: String,
    /// Owning cluster. Required for standalone pools, ignored inside a cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterId>,
    /// Flavor used for the pool's nodes.
    pub flavor_id: String,
    /// Desired node count.
    pub node_count: u32,
    /// Whether the autoscaler manages the pool.
    pub autoscale: bool,
    /// Upper bound for the autoscaler.
    #[serde(default)]
    pub max_count: u32,
    /// Node labels, creation only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    /// Node taints, creation only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
}

impl NodePoolSpec {
    /// Scaling triple requested by this declaration.
    pub fn scaling(&self) -> NodePoolScaling {
        NodePoolScaling {
            count: self.node_count,
            autoscale: self.autoscale,
            max_count: self.max_count,
        }
    }

    /// Check rules that apply to every declared pool.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(OcpError::validation("node pool name must not be empty"));
        }
        if self.flavor_id.trim().is_empty() {
            return Err(OcpError::validation(format!(
                "node pool '{}' has no flavor_id",
                self.name
            )));
        }
        Ok(())
    }

    /// Check rules for a pool declared on its own, outside a cluster.
    pub fn validate_standalone(&self) -> Result<&ClusterId> {
        self.validate()?;
        self.cluster.as_ref().ok_or_else(|| {
            OcpError::validation(format!(
                "standalone node pool '{}' must reference a cluster",
                self.name
            ))
        })
    }

    /// Fields that can only be set at creation differ from `other`.
    pub fn requires_replacement(&self, other: &NodePoolSpec) -> bool {
        !same_name(&self.name, &other.name)
            || self.cluster != other.cluster
            || self.flavor_id != other.flavor_id
            || self.labels != other.labels
            || self.taints != other.taints
    }
}

/// Wire body for creating a node pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePoolCreateRequest {
    /// Pool name.
    pub name: String,
    /// Flavor used for the pool's nodes.
    pub flavor_id: String,
    /// Initial node count.
    pub count: u32,
    /// Whether the autoscaler manages the pool.
    pub autoscale: bool,
    /// Upper bound for the autoscaler.
    pub max_count: u32,
    /// Whether this is the cluster's default pool.
    pub is_default: bool,
    /// Node labels.
    pub labels: Vec<Label>,
    /// Node taints.
    pub taints: Vec<Taint>,
    /// Owning cluster, for standalone pools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterId>,
}

impl NodePoolCreateRequest {
    /// Build the request for a standalone pool.
    pub fn standalone(spec: &NodePoolSpec) -> Self {
        Self {
            name: spec.name.clone(),
            flavor_id: spec.flavor_id.clone(),
            count: spec.node_count,
            autoscale: spec.autoscale,
            max_count: spec.max_count,
            is_default: false,
            labels: spec.labels.clone(),
            taints: spec.taints.clone(),
            cluster: spec.cluster.clone(),
        }
    }

    /// Build the request for the default pool embedded in a cluster create.
    pub fn cluster_default(spec: &NodePoolSpec) -> Self {
        Self {
            name: spec.name.clone(),
            flavor_id: spec.flavor_id.clone(),
            count: spec.node_count,
            autoscale: spec.autoscale,
            max_count: spec.max_count,
            is_default: true,
            labels: Vec::new(),
            taints: Vec::new(),
            cluster: None,
        }
    }
}

/// A node pool as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePool {
    /// Backend identifier.
    pub id: NodePoolId,
    /// Pool name.
    pub name: String,
    /// Human-readable flavor name.
    #[serde(default)]
    pub flavor: String,
    /// Current node count.
    pub count: u32,
    /// Whether the autoscaler manages the pool.
    pub autoscale: bool,
    /// Upper bound for the autoscaler.
    #[serde(default)]
    pub max_count: u32,
    /// Whether this is the cluster's default pool.
    #[serde(default)]
    pub is_default: bool,
    /// Backend status string.
    #[serde(default)]
    pub status: String,
    /// Node labels.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Node taints.
    #[serde(default)]
    pub taints: Vec<Taint>,
    /// Nodes currently assigned to the pool.
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl NodePool {
    /// Current scaling triple.
    pub fn scaling(&self) -> NodePoolScaling {
        NodePoolScaling {
            count: self.count,
            autoscale: self.autoscale,
            max_count: self.max_count,
        }
    }
}

/// Answer to a node pool create call.
///
/// Depending on the backend version the pool is either created synchronously
/// or through an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submission {
    /// The work continues asynchronously.
    Operation(OperationHandle),
    /// The pool already exists.
    Created {
        /// Identifier of the new pool.
        id: NodePoolId,
    },
}

/// Tracked state of a node pool: the declared fields plus what the backend computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePoolState {
    /// Backend identifier; `None` until the pool exists.
    #[serde(default)]
    pub id: Option<NodePoolId>,
    /// Pool name.
    pub name: String,
    /// Owning cluster, for standalone pools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterId>,
    /// Declared flavor.
    pub flavor_id: String,
    /// Human-readable flavor name (computed).
    #[serde(default)]
    pub flavor: String,
    /// Node count.
    pub node_count: u32,
    /// Whether the autoscaler manages the pool.
    pub autoscale: bool,
    /// Upper bound for the autoscaler.
    #[serde(default)]
    pub max_count: u32,
    /// Whether this is the cluster's default pool (computed).
    #[serde(default)]
    pub is_default: bool,
    /// Backend status (computed).
    #[serde(default)]
    pub status: String,
    /// Node labels.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Node taints.
    #[serde(default)]
    pub taints: Vec<Taint>,
    /// Nodes assigned to the pool (computed).
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl NodePoolState {
    /// State for a pool that has been declared but not created yet.
    pub fn declared(spec: &NodePoolSpec) -> Self {
        Self {
            id: None,
            name: spec.name.clone(),
            cluster: spec.cluster.clone(),
            flavor_id: spec.flavor_id.clone(),
            flavor: String::new(),
            node_count: spec.node_count,
            autoscale: spec.autoscale,
            max_count: spec.max_count,
            is_default: false,
            status: String::new(),
            labels: spec.labels.clone(),
            taints: spec.taints.clone(),
            nodes: Vec::new(),
        }
    }

    /// Standalone projection: every field comes from the backend record.
    pub fn observed(spec: &NodePoolSpec, pool: &NodePool) -> Self {
        Self {
            id: Some(pool.id.clone()),
            name: pool.name.clone(),
            cluster: spec.cluster.clone(),
            flavor_id: spec.flavor_id.clone(),
            flavor: pool.flavor.clone(),
            node_count: pool.count,
            autoscale: pool.autoscale,
            max_count: pool.max_count,
            is_default: pool.is_default,
            status: pool.status.clone(),
            labels: pool.labels.clone(),
            taints: pool.taints.clone(),
            nodes: pool.nodes.clone(),
        }
    }

    /// Copy identity and computed fields from a backend record, keeping the
    /// declared sizing.
    pub fn absorb_computed(&mut self, pool: &NodePool) {
        self.id = Some(pool.id.clone());
        self.flavor = pool.flavor.clone();
        self.is_default = pool.is_default;
        self.status = pool.status.clone();
        self.nodes = pool.nodes.clone();
    }

    /// Current scaling triple.
    pub fn scaling(&self) -> NodePoolScaling {
        NodePoolScaling {
            count: self.node_count,
            autoscale: self.autoscale,
            max_count: self.max_count,
        }
    }

    /// Overwrite the scaling triple with authoritative values.
    pub fn apply_scaling(&mut self, scaling: &NodePoolScaling) {
        self.node_count = scaling.count;
        self.autoscale = scaling.autoscale;
        self.max_count = scaling.max_count;
    }

    /// Declared shape of the tracked state.
    pub fn as_spec(&self) -> NodePoolSpec {
        NodePoolSpec {
            name: self.name.clone(),
            cluster: self.cluster.clone(),
            flavor_id: self.flavor_id.clone(),
            node_count: self.node_count,
            autoscale: self.autoscale,
            max_count: self.max_count,
            labels: self.labels.clone(),
            taints: self.taints.clone(),
        }
    }

    /// Replace the declared fields with `spec`, keeping identity and computed fields.
    ///
    /// A name that differs only in case keeps the tracked spelling.
    pub fn redeclare(&mut self, spec: &NodePoolSpec) {
        if !same_name(&self.name, &spec.name) {
            self.name = spec.name.clone();
        }
        self.flavor_id = spec.flavor_id.clone();
        self.apply_scaling(&spec.scaling());
        if spec.cluster.is_some() {
            self.cluster = spec.cluster.clone();
        }
    }
}

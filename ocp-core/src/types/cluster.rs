//! Cluster records.

use super::ids::ClusterId;
use super::node_pool::{NodePool, NodePoolCreateRequest, NodePoolSpec, NodePoolState};
use super::{Node, same_name};
use crate::error::{OcpError, Result};
use serde::{Deserialize, Serialize};

/// Addon installed at cluster creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    /// Addon name.
    pub name: String,
    /// Addon release version.
    pub version: String,
}

/// A cluster as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster name, compared case-insensitively.
    pub cluster_name: String,
    /// Kubernetes version.
    pub cluster_version: String,
    /// Flavor of the control-plane nodes.
    pub master_flavor_id: String,
    /// Number of control-plane nodes.
    pub master_count: u32,
    /// Node image.
    pub image: String,
    /// Networking (CNI) choice.
    pub networking: String,
    /// Whether API access is restricted to `restriction_ips`.
    pub restriction_api: bool,
    /// Addresses allowed to reach the API when restricted.
    #[serde(default)]
    pub restriction_ips: Vec<String>,
    /// Addons installed at creation.
    #[serde(default)]
    pub addons: Vec<Addon>,
    /// The cluster's default node pool. Exactly one entry.
    pub node_pool: Vec<NodePoolSpec>,
}

impl ClusterSpec {
    /// Check the declaration before any call is made.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(OcpError::validation("cluster_name must not be empty"));
        }
        if self.master_count == 0 {
            return Err(OcpError::validation(format!(
                "cluster '{}' needs at least one master",
                self.cluster_name
            )));
        }
        if self.node_pool.len() != 1 {
            return Err(OcpError::validation(format!(
                "cluster '{}' must declare exactly one node_pool, found {}",
                self.cluster_name,
                self.node_pool.len()
            )));
        }
        for pool in &self.node_pool {
            pool.validate()?;
        }
        Ok(())
    }

    /// Names of immutable fields that differ from `other`.
    ///
    /// A non-empty answer means the cluster has to be replaced; the engine
    /// never issues update calls for these fields.
    pub fn replacement_fields(&self, other: &ClusterSpec) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !same_name(&self.cluster_name, &other.cluster_name) {
            fields.push("cluster_name");
        }
        if self.master_flavor_id != other.master_flavor_id {
            fields.push("master_flavor_id");
        }
        if self.master_count != other.master_count {
            fields.push("master_count");
        }
        if self.image != other.image {
            fields.push("image");
        }
        if self.networking != other.networking {
            fields.push("networking");
        }
        if self.addons != other.addons {
            fields.push("addons");
        }
        let pools_replaced = self.node_pool.len() != other.node_pool.len()
            || self
                .node_pool
                .iter()
                .zip(&other.node_pool)
                .any(|(a, b)| a.requires_replacement(b));
        if pools_replaced {
            fields.push("node_pool");
        }
        fields
    }
}

/// Wire body for creating a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCreateRequest {
    /// Cluster name.
    pub cluster_name: String,
    /// Kubernetes version.
    pub cluster_version: String,
    /// Flavor of the control-plane nodes.
    pub master_flavor_id: String,
    /// Number of control-plane nodes.
    pub master_count: u32,
    /// Node pools created together with the cluster.
    pub node_pools: Vec<NodePoolCreateRequest>,
    /// Node image.
    pub image: String,
    /// Networking (CNI) choice.
    pub networking: String,
    /// Whether API access is restricted.
    pub restriction_api: bool,
    /// Allowed API client addresses.
    pub restriction_ips: Vec<String>,
    /// Addons installed at creation.
    pub addons: Vec<Addon>,
}

impl From<&ClusterSpec> for ClusterCreateRequest {
    fn from(spec: &ClusterSpec) -> Self {
        Self {
            cluster_name: spec.cluster_name.clone(),
            cluster_version: spec.cluster_version.clone(),
            master_flavor_id: spec.master_flavor_id.clone(),
            master_count: spec.master_count,
            node_pools: spec
                .node_pool
                .iter()
                .map(NodePoolCreateRequest::cluster_default)
                .collect(),
            image: spec.image.clone(),
            networking: spec.networking.clone(),
            restriction_api: spec.restriction_api,
            restriction_ips: spec.restriction_ips.clone(),
            addons: spec.addons.clone(),
        }
    }
}

/// A cluster as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Backend identifier.
    pub id: ClusterId,
    /// Cluster name.
    pub cluster_name: String,
    /// Kubernetes version.
    pub cluster_version: String,
    /// Whether API access is restricted.
    #[serde(default)]
    pub restriction_api: bool,
    /// Allowed API client addresses.
    #[serde(default)]
    pub restriction_ips: Vec<String>,
    /// Node pools of the cluster.
    #[serde(default)]
    pub node_pools: Vec<NodePool>,
    /// Kubernetes API endpoint.
    #[serde(default)]
    pub api_address: Option<String>,
    /// Control-plane nodes.
    #[serde(default)]
    pub control_nodes: Vec<Node>,
    /// Backend status string.
    #[serde(default)]
    pub status: String,
    /// Explanation for the current status.
    #[serde(default)]
    pub status_reason: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Cluster {
    /// Find a node pool by case-insensitive name.
    pub fn node_pool_named(&self, name: &str) -> Option<&NodePool> {
        self.node_pools.iter().find(|pool| same_name(&pool.name, name))
    }
}

/// Partial cluster update. Only fields that changed are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterUpdate {
    /// New Kubernetes version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_version: Option<String>,
    /// New API restriction flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction_api: Option<bool>,
    /// New API allow-list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction_ips: Option<Vec<String>>,
}

impl ClusterUpdate {
    /// True when nothing would be sent.
    pub fn is_empty(&self) -> bool {
        self.cluster_version.is_none()
            && self.restriction_api.is_none()
            && self.restriction_ips.is_none()
    }
}

/// Cluster fields echoed by an update call. Absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ClusterPatch {
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub cluster_version: Option<String>,
    #[serde(default)]
    pub restriction_api: Option<bool>,
    #[serde(default)]
    pub restriction_ips: Option<Vec<String>>,
    #[serde(default)]
    pub api_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Tracked state of a cluster: declared fields plus computed backend fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterState {
    /// Backend identifier.
    pub id: ClusterId,
    /// Cluster name.
    pub cluster_name: String,
    /// Kubernetes version.
    pub cluster_version: String,
    /// Flavor of the control-plane nodes.
    pub master_flavor_id: String,
    /// Number of control-plane nodes.
    pub master_count: u32,
    /// Node image.
    pub image: String,
    /// Networking (CNI) choice.
    pub networking: String,
    /// Whether API access is restricted.
    pub restriction_api: bool,
    /// Allowed API client addresses.
    #[serde(default)]
    pub restriction_ips: Vec<String>,
    /// Addons installed at creation.
    #[serde(default)]
    pub addons: Vec<Addon>,
    /// The default node pool.
    pub node_pool: Vec<NodePoolState>,
    /// Kubernetes API endpoint.
    #[serde(default)]
    pub api_address: Option<String>,
    /// Control-plane nodes.
    #[serde(default)]
    pub control_nodes: Vec<Node>,
    /// Backend status string.
    #[serde(default)]
    pub status: String,
    /// Explanation for the current status.
    #[serde(default)]
    pub status_reason: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ClusterState {
    /// Project a backend record into the declared shape.
    ///
    /// Each declared pool is matched to an observed pool by case-insensitive
    /// name and picks up its identity and computed fields. A declared pool the
    /// backend does not report is a malformed response.
    pub fn project(spec: &ClusterSpec, cluster: &Cluster) -> Result<Self> {
        let node_pool = spec
            .node_pool
            .iter()
            .map(|declared| {
                let observed = cluster.node_pool_named(&declared.name).ok_or_else(|| {
                    OcpError::malformed(format!(
                        "cluster {} does not report node pool '{}'",
                        cluster.id, declared.name
                    ))
                })?;
                let mut state = NodePoolState::declared(declared);
                state.absorb_computed(observed);
                Ok(state)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: cluster.id.clone(),
            cluster_name: cluster.cluster_name.clone(),
            cluster_version: cluster.cluster_version.clone(),
            master_flavor_id: spec.master_flavor_id.clone(),
            master_count: spec.master_count,
            image: spec.image.clone(),
            networking: spec.networking.clone(),
            restriction_api: cluster.restriction_api,
            restriction_ips: cluster.restriction_ips.clone(),
            addons: spec.addons.clone(),
            node_pool,
            api_address: cluster.api_address.clone(),
            control_nodes: cluster.control_nodes.clone(),
            status: cluster.status.clone(),
            status_reason: cluster.status_reason.clone(),
            created_at: cluster.created_at.clone(),
            updated_at: cluster.updated_at.clone(),
        })
    }

    /// Declared shape of the tracked state.
    pub fn as_spec(&self) -> ClusterSpec {
        ClusterSpec {
            cluster_name: self.cluster_name.clone(),
            cluster_version: self.cluster_version.clone(),
            master_flavor_id: self.master_flavor_id.clone(),
            master_count: self.master_count,
            image: self.image.clone(),
            networking: self.networking.clone(),
            restriction_api: self.restriction_api,
            restriction_ips: self.restriction_ips.clone(),
            addons: self.addons.clone(),
            node_pool: self.node_pool.iter().map(NodePoolState::as_spec).collect(),
        }
    }

    /// Merge an update response into the tracked state.
    pub fn merge_patch(&mut self, patch: ClusterPatch) {
        if let Some(name) = patch.cluster_name {
            self.cluster_name = name;
        }
        if let Some(version) = patch.cluster_version {
            self.cluster_version = version;
        }
        if let Some(restricted) = patch.restriction_api {
            self.restriction_api = restricted;
        }
        if let Some(ips) = patch.restriction_ips {
            self.restriction_ips = ips;
        }
        if patch.api_address.is_some() {
            self.api_address = patch.api_address;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if patch.status_reason.is_some() {
            self.status_reason = patch.status_reason;
        }
        if patch.updated_at.is_some() {
            self.updated_at = patch.updated_at;
        }
    }
}

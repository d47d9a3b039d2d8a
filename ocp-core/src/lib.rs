//! OCP Core Library
//!
//! Shared vocabulary for reconciling OneCloud Planet (OCP) clusters and node
//! pools: typed backend records, the error taxonomy, provider configuration,
//! and the [`ResourceApi`] seam the reconciler drives.
//!
//! # Key Components
//!
//! - **Types**: declared specs, backend records and tracked state
//! - **Error**: [`OcpError`], one value per failed reconciliation attempt
//! - **Config**: [`ProviderConfig`], built explicitly and passed down
//! - **Traits**: [`ResourceApi`], implemented over HTTP by `ocp-client`
//! - **Testing**: [`testing::MockBackend`], an in-memory backend

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod testing;
pub mod traits;
pub mod types;

pub use config::{PollSettings, ProviderConfig, ProviderConfigBuilder, Region, ResourceTimeouts};
pub use error::{OcpError, Result};
pub use traits::{ApiFuture, ResourceApi};
pub use types::{
    Addon, Cluster, ClusterCreateRequest, ClusterId, ClusterPatch, ClusterSpec, ClusterState,
    ClusterUpdate, Label, Node, NodePool, NodePoolCreateRequest, NodePoolId, NodePoolScaling,
    NodePoolSpec, NodePoolState, OperationHandle, OperationId, OperationRecord, OperationStatus,
    Progress, StepDetail, Submission, Taint, same_name,
};

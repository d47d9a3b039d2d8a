//! Reconciliation engine for OCP managed Kubernetes clusters.
//!
//! This crate turns the backend's asynchronous, operation-based API into
//! synchronous create/read/update/delete flows:
//!
//! - [`OperationPoller`] waits for a submitted operation to reach a terminal status
//! - [`NodePoolDiffer`] sends the minimal scaling updates for changed node pools
//! - [`Reconciler`] drives clusters and standalone node pools end to end
//!
//! Any [`ocp_core::ResourceApi`] implementation can back a reconciler; the
//! HTTP client lives in `ocp-client` and an in-memory backend in
//! [`ocp_core::testing`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod differ;
pub mod observability;
pub mod poller;
pub mod reconciler;

pub use differ::{DiffReport, NodePoolDiffer, PlannedUpdate, plan};
pub use poller::OperationPoller;
pub use reconciler::{Reconciler, carry_node_pools, plan_cluster_update};

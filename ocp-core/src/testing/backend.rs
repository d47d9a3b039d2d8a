//! In-memory backend for exercising the reconciler without a network.

use crate::error::{OcpError, Result};
use crate::traits::{ApiFuture, ResourceApi};
use crate::types::{
    Cluster, ClusterCreateRequest, ClusterId, ClusterPatch, ClusterUpdate, NodePool,
    NodePoolCreateRequest, NodePoolId, NodePoolScaling, OperationHandle, OperationId,
    OperationRecord, OperationStatus, Submission,
};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// One scripted answer of the operation status endpoint.
#[derive(Debug, Clone)]
pub enum ScriptedStatus {
    /// Return this record.
    Record(OperationRecord),
    /// Answer 404, as if the record were not visible yet.
    NotFound,
    /// Answer with a non-success status.
    Error {
        /// HTTP status.
        status: u16,
        /// Error message.
        message: String,
    },
}

impl ScriptedStatus {
    /// A bare record with the given status.
    pub fn status(status: OperationStatus) -> Self {
        Self::Record(OperationRecord::new(status))
    }

    /// A bare in-progress record.
    pub fn in_progress() -> Self {
        Self::status(OperationStatus::InProgress)
    }

    fn answer(&self) -> Result<OperationRecord> {
        match self {
            Self::Record(record) => Ok(record.clone()),
            Self::NotFound => Err(OcpError::Api {
                status: 404,
                message: "operation not found".to_string(),
            }),
            Self::Error { status, message } => Err(OcpError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// A call received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// `create_cluster`.
    CreateCluster(ClusterCreateRequest),
    /// `get_cluster`.
    GetCluster(ClusterId),
    /// `update_cluster`.
    UpdateCluster(ClusterId, ClusterUpdate),
    /// `delete_cluster`.
    DeleteCluster(ClusterId),
    /// `create_node_pool`.
    CreateNodePool(NodePoolCreateRequest),
    /// `get_node_pool`.
    GetNodePool(NodePoolId),
    /// `update_node_pool`.
    UpdateNodePool(NodePoolId, NodePoolScaling),
    /// `delete_node_pool`.
    DeleteNodePool(NodePoolId),
    /// `get_operation`.
    GetOperation(OperationId),
}

#[derive(Default)]
struct State {
    clusters: HashMap<ClusterId, Cluster>,
    node_pools: HashMap<NodePoolId, NodePool>,
    operations: HashMap<OperationId, VecDeque<ScriptedStatus>>,
    cluster_submissions: VecDeque<OperationHandle>,
    cluster_deletions: VecDeque<OperationHandle>,
    node_pool_submissions: VecDeque<Submission>,
    node_pool_deletions: VecDeque<Option<OperationHandle>>,
    scaling_overrides: HashMap<NodePoolId, NodePoolScaling>,
    cluster_patches: VecDeque<ClusterPatch>,
    failures: HashMap<&'static str, (u16, String)>,
}

/// Mock implementation of [`ResourceApi`].
///
/// Operation status sequences are consumed one lookup at a time; the last
/// entry sticks. An operation with no script answers 404 forever.
/// Updates are applied to the stored resources unless a response is scripted.
///
/// # Example
///
/// ```
/// use ocp_core::testing::{MockBackend, ScriptedStatus};
/// use ocp_core::{OperationId, OperationStatus};
///
/// let backend = MockBackend::new().with_operation(
///     "op-1",
///     [
///         ScriptedStatus::in_progress(),
///         ScriptedStatus::status(OperationStatus::Succeeded),
///     ],
/// );
/// assert_eq!(backend.polls(&OperationId::new("op-1")), 0);
/// ```
#[derive(Default)]
pub struct MockBackend {
    state: RwLock<State>,
    calls: RwLock<Vec<RecordedCall>>,
    latency: Option<Duration>,
}

impl MockBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every answer by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Script the status lookups of an operation.
    pub fn with_operation(
        self,
        id: impl Into<OperationId>,
        statuses: impl IntoIterator<Item = ScriptedStatus>,
    ) -> Self {
        self.script_operation(id, statuses);
        self
    }

    /// Script the status lookups of an operation on a shared backend.
    pub fn script_operation(
        &self,
        id: impl Into<OperationId>,
        statuses: impl IntoIterator<Item = ScriptedStatus>,
    ) {
        self.state
            .write()
            .operations
            .insert(id.into(), statuses.into_iter().collect());
    }

    /// Store a cluster.
    pub fn with_cluster(self, cluster: Cluster) -> Self {
        self.put_cluster(cluster);
        self
    }

    /// Store or replace a cluster.
    pub fn put_cluster(&self, cluster: Cluster) {
        self.state.write().clusters.insert(cluster.id.clone(), cluster);
    }

    /// Store a node pool.
    pub fn with_node_pool(self, pool: NodePool) -> Self {
        self.put_node_pool(pool);
        self
    }

    /// Store or replace a node pool.
    pub fn put_node_pool(&self, pool: NodePool) {
        self.state.write().node_pools.insert(pool.id.clone(), pool);
    }

    /// Answer the next `create_cluster` with this operation.
    pub fn on_create_cluster(self, operation_id: impl Into<OperationId>) -> Self {
        self.state
            .write()
            .cluster_submissions
            .push_back(OperationHandle::new(operation_id));
        self
    }

    /// Answer the next `delete_cluster` with this operation.
    pub fn on_delete_cluster(self, operation_id: impl Into<OperationId>) -> Self {
        self.state
            .write()
            .cluster_deletions
            .push_back(OperationHandle::new(operation_id));
        self
    }

    /// Answer the next `create_node_pool` with this submission.
    pub fn on_create_node_pool(self, submission: Submission) -> Self {
        self.state.write().node_pool_submissions.push_back(submission);
        self
    }

    /// Answer the next `delete_node_pool` with this operation. Without one
    /// the deletion is synchronous.
    pub fn on_delete_node_pool(self, operation_id: impl Into<OperationId>) -> Self {
        self.state
            .write()
            .node_pool_deletions
            .push_back(Some(OperationHandle::new(operation_id)));
        self
    }

    /// Answer the next `update_cluster` with this patch instead of echoing the update.
    pub fn on_update_cluster(self, patch: ClusterPatch) -> Self {
        self.state.write().cluster_patches.push_back(patch);
        self
    }

    /// Make the backend apply `scaling` whatever a pool update requests.
    pub fn adjust_scaling(self, id: impl Into<NodePoolId>, scaling: NodePoolScaling) -> Self {
        self.state
            .write()
            .scaling_overrides
            .insert(id.into(), scaling);
        self
    }

    /// Fail every call of the named method (e.g. `"update_node_pool"`).
    pub fn fail(self, method: &'static str, status: u16, message: impl Into<String>) -> Self {
        self.state
            .write()
            .failures
            .insert(method, (status, message.into()));
        self
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().clone()
    }

    /// Calls other than operation lookups.
    pub fn mutations(&self) -> Vec<RecordedCall> {
        self.calls
            .read()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    RecordedCall::CreateCluster(_)
                        | RecordedCall::UpdateCluster(..)
                        | RecordedCall::DeleteCluster(_)
                        | RecordedCall::CreateNodePool(_)
                        | RecordedCall::UpdateNodePool(..)
                        | RecordedCall::DeleteNodePool(_)
                )
            })
            .cloned()
            .collect()
    }

    /// Scaling updates received so far.
    pub fn node_pool_updates(&self) -> Vec<(NodePoolId, NodePoolScaling)> {
        self.calls
            .read()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::UpdateNodePool(id, scaling) => Some((id.clone(), *scaling)),
                _ => None,
            })
            .collect()
    }

    /// Number of status lookups for an operation.
    pub fn polls(&self, id: &OperationId) -> usize {
        self.calls
            .read()
            .iter()
            .filter(|call| matches!(call, RecordedCall::GetOperation(polled) if polled == id))
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.write().clear();
    }

    /// Whether a cluster is currently stored.
    pub fn has_cluster(&self, id: &ClusterId) -> bool {
        self.state.read().clusters.contains_key(id)
    }

    /// Whether a node pool is currently stored.
    pub fn has_node_pool(&self, id: &NodePoolId) -> bool {
        self.state.read().node_pools.contains_key(id)
    }

    fn record(&self, call: RecordedCall) {
        self.calls.write().push(call);
    }

    fn check_failure(&self, method: &'static str) -> Result<()> {
        match self.state.read().failures.get(method) {
            Some((status, message)) => Err(OcpError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn respond<'a, T: Send + 'a>(&'a self, result: Result<T>) -> ApiFuture<'a, T> {
        let latency = self.latency;
        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }

    fn missing(what: &str, id: impl std::fmt::Display) -> OcpError {
        OcpError::Api {
            status: 404,
            message: format!("{what} {id} not found"),
        }
    }
}

impl ResourceApi for MockBackend {
    fn create_cluster<'a>(
        &'a self,
        request: &'a ClusterCreateRequest,
    ) -> ApiFuture<'a, OperationHandle> {
        self.record(RecordedCall::CreateCluster(request.clone()));
        let result = self.check_failure("create_cluster").and_then(|()| {
            self.state
                .write()
                .cluster_submissions
                .pop_front()
                .ok_or_else(|| OcpError::malformed("no operation scripted for create_cluster"))
        });
        self.respond(result)
    }

    fn get_cluster<'a>(&'a self, id: &'a ClusterId) -> ApiFuture<'a, Option<Cluster>> {
        self.record(RecordedCall::GetCluster(id.clone()));
        let result = self
            .check_failure("get_cluster")
            .map(|()| self.state.read().clusters.get(id).cloned());
        self.respond(result)
    }

    fn update_cluster<'a>(
        &'a self,
        id: &'a ClusterId,
        update: &'a ClusterUpdate,
    ) -> ApiFuture<'a, ClusterPatch> {
        self.record(RecordedCall::UpdateCluster(id.clone(), update.clone()));
        let result = self.check_failure("update_cluster").and_then(|()| {
            let mut state = self.state.write();
            if let Some(patch) = state.cluster_patches.pop_front() {
                return Ok(patch);
            }
            let cluster = state
                .clusters
                .get_mut(id)
                .ok_or_else(|| Self::missing("cluster", id))?;
            if let Some(version) = &update.cluster_version {
                cluster.cluster_version = version.clone();
            }
            if let Some(restricted) = update.restriction_api {
                cluster.restriction_api = restricted;
            }
            if let Some(ips) = &update.restriction_ips {
                cluster.restriction_ips = ips.clone();
            }
            Ok(ClusterPatch {
                cluster_version: update.cluster_version.clone(),
                restriction_api: update.restriction_api,
                restriction_ips: update.restriction_ips.clone(),
                ..ClusterPatch::default()
            })
        });
        self.respond(result)
    }

    fn delete_cluster<'a>(&'a self, id: &'a ClusterId) -> ApiFuture<'a, OperationHandle> {
        self.record(RecordedCall::DeleteCluster(id.clone()));
        let result = self.check_failure("delete_cluster").and_then(|()| {
            let mut state = self.state.write();
            let handle = state
                .cluster_deletions
                .pop_front()
                .ok_or_else(|| OcpError::malformed("no operation scripted for delete_cluster"))?;
            state.clusters.remove(id);
            Ok(handle)
        });
        self.respond(result)
    }

    fn create_node_pool<'a>(
        &'a self,
        request: &'a NodePoolCreateRequest,
    ) -> ApiFuture<'a, Submission> {
        self.record(RecordedCall::CreateNodePool(request.clone()));
        let result = self.check_failure("create_node_pool").and_then(|()| {
            self.state
                .write()
                .node_pool_submissions
                .pop_front()
                .ok_or_else(|| OcpError::malformed("no answer scripted for create_node_pool"))
        });
        self.respond(result)
    }

    fn get_node_pool<'a>(&'a self, id: &'a NodePoolId) -> ApiFuture<'a, Option<NodePool>> {
        self.record(RecordedCall::GetNodePool(id.clone()));
        let result = self
            .check_failure("get_node_pool")
            .map(|()| self.state.read().node_pools.get(id).cloned());
        self.respond(result)
    }

    fn update_node_pool<'a>(
        &'a self,
        id: &'a NodePoolId,
        scaling: &'a NodePoolScaling,
    ) -> ApiFuture<'a, NodePoolScaling> {
        self.record(RecordedCall::UpdateNodePool(id.clone(), *scaling));
        let result = self.check_failure("update_node_pool").and_then(|()| {
            let mut state = self.state.write();
            let applied = state.scaling_overrides.get(id).copied().unwrap_or(*scaling);
            if let Some(pool) = state.node_pools.get_mut(id) {
                pool.count = applied.count;
                pool.autoscale = applied.autoscale;
                pool.max_count = applied.max_count;
            }
            let in_cluster = state
                .clusters
                .values_mut()
                .flat_map(|cluster| cluster.node_pools.iter_mut())
                .find(|pool| &pool.id == id);
            if let Some(pool) = in_cluster {
                pool.count = applied.count;
                pool.autoscale = applied.autoscale;
                pool.max_count = applied.max_count;
            }
            Ok(applied)
        });
        self.respond(result)
    }

    fn delete_node_pool<'a>(
        &'a self,
        id: &'a NodePoolId,
    ) -> ApiFuture<'a, Option<OperationHandle>> {
        self.record(RecordedCall::DeleteNodePool(id.clone()));
        let result = self.check_failure("delete_node_pool").and_then(|()| {
            let mut state = self.state.write();
            if state.node_pools.remove(id).is_none() {
                return Err(Self::missing("node pool", id));
            }
            Ok(state.node_pool_deletions.pop_front().flatten())
        });
        self.respond(result)
    }

    fn get_operation<'a>(&'a self, id: &'a OperationId) -> ApiFuture<'a, OperationRecord> {
        self.record(RecordedCall::GetOperation(id.clone()));
        let result = {
            let mut state = self.state.write();
            match state.operations.get_mut(id) {
                Some(script) if script.len() > 1 => script
                    .pop_front()
                    .map_or_else(|| Err(Self::missing("operation", id)), |s| s.answer()),
                Some(script) => script
                    .front()
                    .map_or_else(|| Err(Self::missing("operation", id)), |s| s.answer()),
                None => Err(Self::missing("operation", id)),
            }
        };
        self.respond(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_scripted_status_sticks() {
        let backend = MockBackend::new().with_operation(
            "op-1",
            [
                ScriptedStatus::NotFound,
                ScriptedStatus::status(OperationStatus::Succeeded),
            ],
        );
        let id = OperationId::new("op-1");

        assert!(backend.get_operation(&id).await.unwrap_err().is_not_found());
        for _ in 0..3 {
            let record = backend.get_operation(&id).await.unwrap();
            assert_eq!(record.status, OperationStatus::Succeeded);
        }
        assert_eq!(backend.polls(&id), 4);
    }

    #[tokio::test]
    async fn unscripted_operation_is_not_found() {
        let backend = MockBackend::new();
        let err = backend
            .get_operation(&OperationId::new("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn scaling_override_wins_over_request() {
        let adjusted = NodePoolScaling {
            count: 4,
            autoscale: false,
            max_count: 4,
        };
        let backend = MockBackend::new().adjust_scaling("np-1", adjusted);
        let requested = NodePoolScaling {
            count: 9,
            autoscale: false,
            max_count: 9,
        };

        let applied = backend
            .update_node_pool(&NodePoolId::new("np-1"), &requested)
            .await
            .unwrap();
        assert_eq!(applied, adjusted);
        assert_eq!(
            backend.node_pool_updates(),
            vec![(NodePoolId::new("np-1"), requested)]
        );
    }

    #[tokio::test]
    async fn injected_failure_is_an_api_error() {
        let backend = MockBackend::new().fail("get_cluster", 502, "bad gateway");
        let err = backend.get_cluster(&ClusterId::new("c-1")).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
    }
}

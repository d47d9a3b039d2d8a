//! The seam between the reconciliation engine and the backend.

use crate::error::Result;
use crate::types::{
    Cluster, ClusterCreateRequest, ClusterId, ClusterPatch, ClusterUpdate, NodePool,
    NodePoolCreateRequest, NodePoolId, NodePoolScaling, OperationHandle, OperationId,
    OperationRecord, Submission,
};
use std::future::Future;
use std::pin::Pin;

/// A boxed future for async backend calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Remote calls the reconciler needs.
///
/// Implementations return [`OcpError::Api`](crate::OcpError::Api) for non-success
/// responses. `get_operation` in particular must report a missing record as a
/// 404 so the poller can treat it as not yet visible.
pub trait ResourceApi: Send + Sync {
    /// Submit a cluster creation.
    fn create_cluster<'a>(
        &'a self,
        request: &'a ClusterCreateRequest,
    ) -> ApiFuture<'a, OperationHandle>;

    /// Fetch a cluster; `None` when the backend answers 404.
    fn get_cluster<'a>(&'a self, id: &'a ClusterId) -> ApiFuture<'a, Option<Cluster>>;

    /// Apply a partial cluster update. Synchronous on the backend.
    fn update_cluster<'a>(
        &'a self,
        id: &'a ClusterId,
        update: &'a ClusterUpdate,
    ) -> ApiFuture<'a, ClusterPatch>;

    /// Submit a cluster deletion.
    fn delete_cluster<'a>(&'a self, id: &'a ClusterId) -> ApiFuture<'a, OperationHandle>;

    /// Submit a node pool creation.
    fn create_node_pool<'a>(
        &'a self,
        request: &'a NodePoolCreateRequest,
    ) -> ApiFuture<'a, Submission>;

    /// Fetch a node pool; `None` when the backend answers 404.
    fn get_node_pool<'a>(&'a self, id: &'a NodePoolId) -> ApiFuture<'a, Option<NodePool>>;

    /// Change a pool's scaling triple. The answer carries the values the
    /// backend actually applied.
    fn update_node_pool<'a>(
        &'a self,
        id: &'a NodePoolId,
        scaling: &'a NodePoolScaling,
    ) -> ApiFuture<'a, NodePoolScaling>;

    /// Delete a node pool. `None` when the backend deleted it synchronously.
    fn delete_node_pool<'a>(
        &'a self,
        id: &'a NodePoolId,
    ) -> ApiFuture<'a, Option<OperationHandle>>;

    /// Look up an operation's status.
    fn get_operation<'a>(&'a self, id: &'a OperationId) -> ApiFuture<'a, OperationRecord>;
}

impl<T: ResourceApi + ?Sized> ResourceApi for std::sync::Arc<T> {
    fn create_cluster<'a>(
        &'a self,
        request: &'a ClusterCreateRequest,
    ) -> ApiFuture<'a, OperationHandle> {
        (**self).create_cluster(request)
    }

    fn get_cluster<'a>(&'a self, id: &'a ClusterId) -> ApiFuture<'a, Option<Cluster>> {
        (**self).get_cluster(id)
    }

    fn update_cluster<'a>(
        &'a self,
        id: &'a ClusterId,
        update: &'a ClusterUpdate,
    ) -> ApiFuture<'a, ClusterPatch> {
        (**self).update_cluster(id, update)
    }

    fn delete_cluster<'a>(&'a self, id: &'a ClusterId) -> ApiFuture<'a, OperationHandle> {
        (**self).delete_cluster(id)
    }

    fn create_node_pool<'a>(
        &'a self,
        request: &'a NodePoolCreateRequest,
    ) -> ApiFuture<'a, Submission> {
        (**self).create_node_pool(request)
    }

    fn get_node_pool<'a>(&'a self, id: &'a NodePoolId) -> ApiFuture<'a, Option<NodePool>> {
        (**self).get_node_pool(id)
    }

    fn update_node_pool<'a>(
        &'a self,
        id: &'a NodePoolId,
        scaling: &'a NodePoolScaling,
    ) -> ApiFuture<'a, NodePoolScaling> {
        (**self).update_node_pool(id, scaling)
    }

    fn delete_node_pool<'a>(
        &'a self,
        id: &'a NodePoolId,
    ) -> ApiFuture<'a, Option<OperationHandle>> {
        (**self).delete_node_pool(id)
    }

    fn get_operation<'a>(&'a self, id: &'a OperationId) -> ApiFuture<'a, OperationRecord> {
        (**self).get_operation(id)
    }
}

//! [`ResourceApi`] over HTTP.

use crate::client::Client;
use ocp_core::{
    ApiFuture, Cluster, ClusterCreateRequest, ClusterId, ClusterPatch, ClusterUpdate, NodePool,
    NodePoolCreateRequest, NodePoolId, NodePoolScaling, OperationHandle, OperationId,
    OperationRecord, ResourceApi, Submission,
};

impl ResourceApi for Client {
    fn create_cluster<'a>(
        &'a self,
        request: &'a ClusterCreateRequest,
    ) -> ApiFuture<'a, OperationHandle> {
        Box::pin(async move { Ok(Client::create_cluster(self, request).await?) })
    }

    fn get_cluster<'a>(&'a self, id: &'a ClusterId) -> ApiFuture<'a, Option<Cluster>> {
        Box::pin(async move { Ok(Client::get_cluster(self, id).await?) })
    }

    fn update_cluster<'a>(
        &'a self,
        id: &'a ClusterId,
        update: &'a ClusterUpdate,
    ) -> ApiFuture<'a, ClusterPatch> {
        Box::pin(async move { Ok(Client::update_cluster(self, id, update).await?) })
    }

    fn delete_cluster<'a>(&'a self, id: &'a ClusterId) -> ApiFuture<'a, OperationHandle> {
        Box::pin(async move { Ok(Client::delete_cluster(self, id).await?) })
    }

    fn create_node_pool<'a>(
        &'a self,
        request: &'a NodePoolCreateRequest,
    ) -> ApiFuture<'a, Submission> {
        Box::pin(async move { Ok(Client::create_node_pool(self, request).await?) })
    }

    fn get_node_pool<'a>(&'a self, id: &'a NodePoolId) -> ApiFuture<'a, Option<NodePool>> {
        Box::pin(async move { Ok(Client::get_node_pool(self, id).await?) })
    }

    fn update_node_pool<'a>(
        &'a self,
        id: &'a NodePoolId,
        scaling: &'a NodePoolScaling,
    ) -> ApiFuture<'a, NodePoolScaling> {
        Box::pin(async move { Ok(Client::update_node_pool(self, id, scaling).await?) })
    }

    fn delete_node_pool<'a>(
        &'a self,
        id: &'a NodePoolId,
    ) -> ApiFuture<'a, Option<OperationHandle>> {
        Box::pin(async move { Ok(Client::delete_node_pool(self, id).await?) })
    }

    fn get_operation<'a>(&'a self, id: &'a OperationId) -> ApiFuture<'a, OperationRecord> {
        Box::pin(async move { Ok(Client::get_operation(self, id).await?) })
    }
}

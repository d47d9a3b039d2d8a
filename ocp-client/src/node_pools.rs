//! Node pool operations.

use crate::client::Client;
use crate::error::{ClientError, Result};
use ocp_core::{
    NodePool, NodePoolCreateRequest, NodePoolId, NodePoolScaling, OperationHandle, Submission,
};

const NODE_POOL_PATH: &str = "node-pool/";

impl Client {
    /// Create a node pool in an existing cluster.
    ///
    /// Depending on the backend the answer is either an operation to poll or
    /// the created pool itself.
    pub async fn create_node_pool(&self, request: &NodePoolCreateRequest) -> Result<Submission> {
        let response = self.post(NODE_POOL_PATH, request).await?;
        self.handle_response(response).await
    }

    /// Get a node pool by id. Returns `Ok(None)` on 404.
    pub async fn get_node_pool(&self, id: &NodePoolId) -> Result<Option<NodePool>> {
        let response = self.get(&format!("{NODE_POOL_PATH}{id}")).await?;
        self.handle_optional(response).await
    }

    /// Change the scaling triple of a pool.
    ///
    /// The backend answers with the full pool; only the triple it reports is
    /// returned.
    pub async fn update_node_pool(
        &self,
        id: &NodePoolId,
        scaling: &NodePoolScaling,
    ) -> Result<NodePoolScaling> {
        let response = self
            .patch(&format!("{NODE_POOL_PATH}{id}/"), scaling)
            .await?;
        self.handle_response(response).await
    }

    /// Delete a node pool.
    ///
    /// Returns the operation to poll, or `None` when the pool was removed
    /// synchronously. A body carrying an `operation_id` must decode as a
    /// handle.
    pub async fn delete_node_pool(&self, id: &NodePoolId) -> Result<Option<OperationHandle>> {
        let response = self.delete(&format!("{NODE_POOL_PATH}{id}/")).await?;
        let body: Option<serde_json::Value> = self.handle_maybe_empty(response).await?;

        match body {
            Some(value) if value.get("operation_id").is_some() => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| {
                    ClientError::InvalidResponse(format!("delete of node pool {id}: {err}"))
                }),
            _ => Ok(None),
        }
    }
}

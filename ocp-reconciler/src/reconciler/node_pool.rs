//! Standalone node pool flows.

use super::{Reconciler, primary_object};
use crate::differ::NodePoolDiffer;
use ocp_core::{
    NodePoolCreateRequest, NodePoolId, NodePoolSpec, NodePoolState, OcpError, ResourceApi, Result,
    Submission,
};
use std::slice;

fn tracked_id(state: &NodePoolState) -> Result<&NodePoolId> {
    state.id.as_ref().ok_or_else(|| {
        OcpError::validation(format!("node pool '{}' has not been created", state.name))
    })
}

impl<A: ResourceApi> Reconciler<A> {
    /// Create a node pool in an existing cluster.
    ///
    /// The backend answers either with an operation, which is awaited, or
    /// with the created pool, which is fetched right away.
    pub async fn create_node_pool(&self, spec: &NodePoolSpec) -> Result<NodePoolState> {
        let cluster = spec.validate_standalone()?;

        tracing::info!(
            node_pool = %spec.name,
            cluster_id = %cluster,
            count = spec.node_count,
            autoscale = spec.autoscale,
            "Creating node pool"
        );

        let request = NodePoolCreateRequest::standalone(spec);
        let id = match self.api.create_node_pool(&request).await? {
            Submission::Operation(handle) => {
                tracing::info!(
                    node_pool = %spec.name,
                    operation_id = %handle.operation_id,
                    "Node pool creation submitted"
                );
                let record = self
                    .await_operation(&handle, self.node_pool_timeouts.create)
                    .await?;
                NodePoolId::new(primary_object(&record)?)
            }
            Submission::Created { id } => id,
        };

        let pool = self
            .api
            .get_node_pool(&id)
            .await?
            .ok_or_else(|| OcpError::NotFound {
                kind: "node pool",
                id: id.to_string(),
            })?;

        tracing::info!(node_pool_id = %pool.id, status = %pool.status, "Node pool created");
        Ok(NodePoolState::observed(spec, &pool))
    }

    /// Refresh a tracked node pool. `None` means the pool no longer exists.
    pub async fn read_node_pool(&self, state: &NodePoolState) -> Result<Option<NodePoolState>> {
        let id = tracked_id(state)?;
        match self.api.get_node_pool(id).await? {
            Some(pool) => Ok(Some(NodePoolState::observed(&state.as_spec(), &pool))),
            None => {
                tracing::info!(node_pool_id = %id, "Node pool no longer exists");
                Ok(None)
            }
        }
    }

    /// Apply a scaling change to a standalone pool.
    ///
    /// Uses the same rule as the cluster's pools: one update with the whole
    /// scaling triple when any part of it changed, answer merged back.
    pub async fn update_node_pool(
        &self,
        previous: &NodePoolState,
        desired: &NodePoolSpec,
    ) -> Result<NodePoolState> {
        desired.validate_standalone()?;
        let id = tracked_id(previous)?;

        if previous.as_spec().requires_replacement(desired) {
            return Err(OcpError::validation(format!(
                "node pool '{}' must be replaced to change name, cluster, flavor, labels or taints",
                previous.name
            )));
        }

        let mut declared = previous.clone();
        declared.redeclare(desired);

        self.within(
            format!("update node pool {id}"),
            self.node_pool_timeouts.update,
            async {
                NodePoolDiffer::new(&self.api)
                    .apply(slice::from_ref(previous), slice::from_mut(&mut declared))
                    .await
            },
        )
        .await?;

        Ok(declared)
    }

    /// Delete a node pool, waiting for the operation when there is one.
    pub async fn delete_node_pool(&self, state: &NodePoolState) -> Result<()> {
        let id = tracked_id(state)?;
        tracing::info!(node_pool_id = %id, "Deleting node pool");

        match self.api.delete_node_pool(id).await? {
            Some(handle) => {
                self.await_operation(&handle, self.node_pool_timeouts.delete)
                    .await?;
            }
            None => tracing::debug!(node_pool_id = %id, "Node pool deleted synchronously"),
        }

        tracing::info!(node_pool_id = %id, "Node pool deleted");
        Ok(())
    }
}

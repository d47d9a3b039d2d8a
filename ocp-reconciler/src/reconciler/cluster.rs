//! Cluster flows.

use super::{Reconciler, primary_object};
use crate::differ::NodePoolDiffer;
use ocp_core::{
    ClusterCreateRequest, ClusterId, ClusterSpec, ClusterState, ClusterUpdate, NodePoolSpec,
    NodePoolState, OcpError, ResourceApi, Result, same_name,
};

/// Minimal cluster-level update moving `previous` to `desired`.
///
/// Only `cluster_version`, `restriction_api` and `restriction_ips` are
/// mutable. The two restriction fields travel together: a change in either
/// sends both.
pub fn plan_cluster_update(previous: &ClusterState, desired: &ClusterSpec) -> ClusterUpdate {
    let mut update = ClusterUpdate::default();

    if previous.cluster_version != desired.cluster_version {
        update.cluster_version = Some(desired.cluster_version.clone());
    }

    if previous.restriction_api != desired.restriction_api
        || previous.restriction_ips != desired.restriction_ips
    {
        update.restriction_api = Some(desired.restriction_api);
        update.restriction_ips = Some(desired.restriction_ips.clone());
    }

    update
}

/// Declared node pool records carrying identity and computed fields over
/// from the previous state.
///
/// Pools are paired by case-insensitive name. A declared pool with no
/// previous counterpart starts without an id.
pub fn carry_node_pools(
    previous: &[NodePoolState],
    desired: &[NodePoolSpec],
) -> Vec<NodePoolState> {
    desired
        .iter()
        .map(
            |spec| match previous.iter().find(|pool| same_name(&pool.name, &spec.name)) {
                Some(pool) => {
                    let mut carried = pool.clone();
                    carried.redeclare(spec);
                    carried
                }
                None => NodePoolState::declared(spec),
            },
        )
        .collect()
}

impl<A: ResourceApi> Reconciler<A> {
    /// Create a cluster and wait until it is built.
    ///
    /// Fails without surfacing a partial resource if any step fails.
    pub async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterState> {
        spec.validate()?;

        tracing::info!(
            cluster = %spec.cluster_name,
            version = %spec.cluster_version,
            masters = spec.master_count,
            "Creating cluster"
        );

        let request = ClusterCreateRequest::from(spec);
        let handle = self.api.create_cluster(&request).await?;
        tracing::info!(
            cluster = %spec.cluster_name,
            operation_id = %handle.operation_id,
            "Cluster creation submitted"
        );

        let record = self
            .await_operation(&handle, self.cluster_timeouts.create)
            .await?;
        let id = ClusterId::new(primary_object(&record)?);

        let cluster = self
            .api
            .get_cluster(&id)
            .await?
            .ok_or_else(|| OcpError::NotFound {
                kind: "cluster",
                id: id.to_string(),
            })?;

        let state = ClusterState::project(spec, &cluster)?;
        tracing::info!(cluster_id = %state.id, status = %state.status, "Cluster created");
        Ok(state)
    }

    /// Refresh a tracked cluster. `None` means the cluster no longer exists.
    pub async fn read_cluster(&self, state: &ClusterState) -> Result<Option<ClusterState>> {
        match self.api.get_cluster(&state.id).await? {
            Some(cluster) => ClusterState::project(&state.as_spec(), &cluster).map(Some),
            None => {
                tracing::info!(cluster_id = %state.id, "Cluster no longer exists");
                Ok(None)
            }
        }
    }

    /// Move a cluster from `previous` to `desired` with the fewest calls.
    ///
    /// Sends at most one cluster PATCH, then runs the node pool differ.
    /// Changes to immutable fields are rejected before any call is made.
    pub async fn update_cluster(
        &self,
        previous: &ClusterState,
        desired: &ClusterSpec,
    ) -> Result<ClusterState> {
        desired.validate()?;

        let replaced = previous.as_spec().replacement_fields(desired);
        if !replaced.is_empty() {
            return Err(OcpError::validation(format!(
                "cluster '{}' must be replaced to change: {}",
                previous.cluster_name,
                replaced.join(", ")
            )));
        }

        self.within(
            format!("update cluster {}", previous.id),
            self.cluster_timeouts.update,
            self.apply_cluster_update(previous, desired),
        )
        .await
    }

    async fn apply_cluster_update(
        &self,
        previous: &ClusterState,
        desired: &ClusterSpec,
    ) -> Result<ClusterState> {
        let mut state = previous.clone();
        state.cluster_version = desired.cluster_version.clone();
        state.restriction_api = desired.restriction_api;
        state.restriction_ips = desired.restriction_ips.clone();

        let update = plan_cluster_update(previous, desired);
        if update.is_empty() {
            tracing::debug!(cluster_id = %previous.id, "No cluster-level changes");
        } else {
            tracing::info!(cluster_id = %previous.id, update = ?update, "Updating cluster");
            let patch = self.api.update_cluster(&previous.id, &update).await?;
            state.merge_patch(patch);
        }

        let mut pools = carry_node_pools(&previous.node_pool, &desired.node_pool);
        let report = NodePoolDiffer::new(&self.api)
            .apply(&previous.node_pool, &mut pools)
            .await?;
        state.node_pool = pools;

        tracing::info!(
            cluster_id = %state.id,
            cluster_patched = !update.is_empty(),
            node_pools_updated = report.updated.len(),
            "Cluster reconciled"
        );
        Ok(state)
    }

    /// Delete a cluster and wait until it is gone.
    pub async fn delete_cluster(&self, state: &ClusterState) -> Result<()> {
        tracing::info!(cluster_id = %state.id, "Deleting cluster");

        let handle = self.api.delete_cluster(&state.id).await?;
        self.await_operation(&handle, self.cluster_timeouts.delete)
            .await?;

        tracing::info!(cluster_id = %state.id, "Cluster deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocp_core::NodePoolId;

    fn state() -> ClusterState {
        ClusterState {
            id: ClusterId::new("c-1"),
            cluster_name: "prod".into(),
            cluster_version: "1.29".into(),
            master_flavor_id: "m1.medium".into(),
            master_count: 3,
            image: "ubuntu-22.04".into(),
            networking: "calico".into(),
            restriction_api: false,
            restriction_ips: Vec::new(),
            addons: Vec::new(),
            node_pool: vec![NodePoolState {
                id: Some(NodePoolId::new("np-1")),
                name: "default".into(),
                cluster: None,
                flavor_id: "m1.large".into(),
                flavor: "Large".into(),
                node_count: 3,
                autoscale: false,
                max_count: 3,
                is_default: true,
                status: "active".into(),
                labels: Vec::new(),
                taints: Vec::new(),
                nodes: Vec::new(),
            }],
            api_address: None,
            control_nodes: Vec::new(),
            status: "running".into(),
            status_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn unchanged_spec_plans_nothing() {
        let previous = state();
        assert!(plan_cluster_update(&previous, &previous.as_spec()).is_empty());
    }

    #[test]
    fn version_change_sends_only_version() {
        let previous = state();
        let mut desired = previous.as_spec();
        desired.cluster_version = "1.30".into();

        let update = plan_cluster_update(&previous, &desired);
        assert_eq!(update.cluster_version.as_deref(), Some("1.30"));
        assert!(update.restriction_api.is_none());
        assert!(update.restriction_ips.is_none());
    }

    #[test]
    fn restriction_fields_travel_together() {
        let previous = state();
        let mut desired = previous.as_spec();
        desired.restriction_ips = vec!["10.0.0.1".into()];

        let update = plan_cluster_update(&previous, &desired);
        assert_eq!(update.restriction_api, Some(false));
        assert_eq!(update.restriction_ips, Some(vec!["10.0.0.1".to_string()]));
        assert!(update.cluster_version.is_none());
    }

    #[test]
    fn carried_pools_keep_identity_and_take_new_sizing() {
        let previous = state();
        let mut desired = previous.as_spec();
        desired.node_pool[0].name = "DEFAULT".into();
        desired.node_pool[0].node_count = 5;

        let pools = carry_node_pools(&previous.node_pool, &desired.node_pool);
        assert_eq!(pools[0].id, Some(NodePoolId::new("np-1")));
        assert_eq!(pools[0].node_count, 5);
        assert_eq!(pools[0].flavor, "Large");
        assert!(pools[0].is_default);
    }

    #[test]
    fn unknown_pool_starts_without_id() {
        let previous = state();
        let mut desired = previous.as_spec();
        desired.node_pool[0].name = "other".into();

        let pools = carry_node_pools(&previous.node_pool, &desired.node_pool);
        assert!(pools[0].id.is_none());
    }
}

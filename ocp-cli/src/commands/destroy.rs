//! Destroy command - delete every tracked resource.

use super::apply::{cluster_label, delete_cluster, delete_node_pool, node_pool_label};
use super::{Action, Summary};
use crate::state::StateFile;
use anyhow::Result;
use ocp_core::ResourceApi;
use ocp_reconciler::Reconciler;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Run the destroy command.
pub async fn run(state_path: &Path, confirmed: bool, cancel: CancellationToken) -> Result<()> {
    let mut state = StateFile::load(state_path)?;
    if state.is_empty() {
        println!("Nothing to destroy.");
        return Ok(());
    }

    if !confirmed {
        println!("The following resources would be deleted:");
        if let Some(cluster) = &state.cluster {
            println!("  - {}", cluster_label(cluster));
        }
        for pool in &state.node_pools {
            println!("  - {}", node_pool_label(pool));
        }
        anyhow::bail!("Refusing to destroy without --yes");
    }

    let reconciler = super::connect(cancel)?;
    let summary = destroy(&reconciler, &mut state, state_path).await?;

    println!("Destroy complete:");
    println!("{summary}");
    Ok(())
}

/// Delete standalone pools first, then the cluster, saving after each.
pub async fn destroy<A: ResourceApi>(
    reconciler: &Reconciler<A>,
    state: &mut StateFile,
    state_path: &Path,
) -> Result<Summary> {
    let mut summary = Summary::default();

    for pool in state.node_pools.clone() {
        delete_node_pool(reconciler, &pool).await?;
        state.remove_node_pool(&pool.name);
        state.save(state_path)?;
        summary.push(Action::Delete, node_pool_label(&pool));
    }

    if let Some(cluster) = state.cluster.clone() {
        delete_cluster(reconciler, &cluster).await?;
        state.cluster = None;
        state.save(state_path)?;
        summary.push(Action::Delete, cluster_label(&cluster));
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocp_core::testing::{MockBackend, RecordedCall, ScriptedStatus};
    use ocp_core::{
        ClusterId, ClusterState, NodePoolId, NodePoolSpec, NodePoolState, OperationStatus,
        ProviderConfig,
    };

    fn reconciler(backend: MockBackend) -> Reconciler<MockBackend> {
        let config = ProviderConfig::builder().token("test").build().unwrap();
        Reconciler::new(backend, &config)
    }

    fn tracked_pool() -> NodePoolState {
        let mut pool = NodePoolState::declared(&NodePoolSpec {
            name: "batch".into(),
            cluster: Some(ClusterId::new("c-1")),
            flavor_id: "m1.large".into(),
            node_count: 2,
            autoscale: false,
            max_count: 2,
            labels: Vec::new(),
            taints: Vec::new(),
        });
        pool.id = Some(NodePoolId::new("np-2"));
        pool
    }

    fn tracked_cluster() -> ClusterState {
        ClusterState {
            id: ClusterId::new("c-1"),
            cluster_name: "prod".into(),
            cluster_version: "1.29".into(),
            master_flavor_id: "m1.medium".into(),
            master_count: 1,
            image: "ubuntu-22.04".into(),
            networking: "calico".into(),
            restriction_api: false,
            restriction_ips: Vec::new(),
            addons: Vec::new(),
            node_pool: Vec::new(),
            api_address: None,
            control_nodes: Vec::new(),
            status: "running".into(),
            status_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deletes_pools_before_cluster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ocp-state.json");
        let backend = MockBackend::new()
            .on_delete_cluster("op-delete")
            .with_operation(
                "op-delete",
                [ScriptedStatus::status(OperationStatus::Succeeded)],
            );
        let reconciler = reconciler(backend);
        let mut state = StateFile {
            cluster: Some(tracked_cluster()),
            node_pools: vec![tracked_pool()],
            ..StateFile::default()
        };

        // The pool is already gone on the backend side
        let summary = destroy(&reconciler, &mut state, &path).await.unwrap();

        assert_eq!(summary.count(Action::Delete), 2);
        assert_eq!(
            reconciler.api().mutations(),
            vec![
                RecordedCall::DeleteNodePool(NodePoolId::new("np-2")),
                RecordedCall::DeleteCluster(ClusterId::new("c-1")),
            ]
        );
        assert!(StateFile::load(&path).unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cluster_delete_keeps_it_tracked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ocp-state.json");
        let backend = MockBackend::new()
            .on_delete_cluster("op-delete")
            .with_operation(
                "op-delete",
                [ScriptedStatus::status(OperationStatus::Failed)],
            );
        let reconciler = reconciler(backend);
        let mut state = StateFile {
            cluster: Some(tracked_cluster()),
            ..StateFile::default()
        };

        assert!(destroy(&reconciler, &mut state, &path).await.is_err());
        assert!(state.cluster.is_some());
    }
}

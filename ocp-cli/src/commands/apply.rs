//! Apply command - reconcile the backend with a manifest.

use super::{Action, Summary};
use crate::manifest::Manifest;
use crate::state::StateFile;
use anyhow::Result;
use ocp_core::{ClusterState, NodePoolState, ResourceApi, same_name};
use ocp_reconciler::Reconciler;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Run the apply command.
pub async fn run(file: &Path, state_path: &Path, cancel: CancellationToken) -> Result<()> {
    let manifest = Manifest::load(file)?;
    let mut state = StateFile::load(state_path)?;
    let reconciler = super::connect(cancel)?;

    tracing::info!(
        manifest = %file.display(),
        state = %state_path.display(),
        "Applying manifest"
    );

    let summary = apply(&reconciler, &manifest, &mut state, state_path).await?;

    println!("Apply complete:");
    println!("{summary}");
    Ok(())
}

pub(crate) fn cluster_label(cluster: &ClusterState) -> String {
    format!("cluster {} ({})", cluster.cluster_name, cluster.id)
}

pub(crate) fn node_pool_label(pool: &NodePoolState) -> String {
    match &pool.id {
        Some(id) => format!("node pool {} ({})", pool.name, id),
        None => format!("node pool {}", pool.name),
    }
}

/// Bring the backend in line with `manifest`, saving `state` after every change.
///
/// Order: undeclared standalone pools are deleted, then the cluster is
/// created, updated or deleted, then declared standalone pools follow.
pub async fn apply<A: ResourceApi>(
    reconciler: &Reconciler<A>,
    manifest: &Manifest,
    state: &mut StateFile,
    state_path: &Path,
) -> Result<Summary> {
    let mut summary = Summary::default();

    let undeclared: Vec<NodePoolState> = state
        .node_pools
        .iter()
        .filter(|pool| {
            !manifest
                .node_pools
                .iter()
                .any(|spec| same_name(&spec.name, &pool.name))
        })
        .cloned()
        .collect();
    for pool in undeclared {
        delete_node_pool(reconciler, &pool).await?;
        state.remove_node_pool(&pool.name);
        state.save(state_path)?;
        summary.push(Action::Delete, node_pool_label(&pool));
    }

    match (&manifest.cluster, state.cluster.clone()) {
        (Some(spec), None) => {
            let created = reconciler.create_cluster(spec).await?;
            summary.push(Action::Create, cluster_label(&created));
            state.cluster = Some(created);
            state.save(state_path)?;
        }
        (Some(spec), Some(previous)) => match reconciler.read_cluster(&previous).await? {
            Some(current) => {
                let updated = reconciler.update_cluster(&current, spec).await?;
                let action = if updated == previous {
                    Action::Unchanged
                } else {
                    Action::Update
                };
                summary.push(action, cluster_label(&updated));
                if action == Action::Update {
                    state.cluster = Some(updated);
                    state.save(state_path)?;
                }
            }
            None => {
                tracing::warn!(
                    cluster_id = %previous.id,
                    "Tracked cluster is gone, creating it again"
                );
                let created = reconciler.create_cluster(spec).await?;
                summary.push(Action::Create, cluster_label(&created));
                state.cluster = Some(created);
                state.save(state_path)?;
            }
        },
        (None, Some(previous)) => {
            delete_cluster(reconciler, &previous).await?;
            state.cluster = None;
            state.save(state_path)?;
            summary.push(Action::Delete, cluster_label(&previous));
        }
        (None, None) => {}
    }

    let cluster_id = state.cluster.as_ref().map(|cluster| cluster.id.clone());
    for spec in manifest.resolved_node_pools(cluster_id.as_ref())? {
        let current = match state.node_pool(&spec.name).cloned() {
            Some(previous) => reconciler.read_node_pool(&previous).await?,
            None => None,
        };

        match current {
            Some(current) => {
                let updated = reconciler.update_node_pool(&current, &spec).await?;
                if Some(&updated) == state.node_pool(&spec.name) {
                    summary.push(Action::Unchanged, node_pool_label(&updated));
                } else {
                    summary.push(Action::Update, node_pool_label(&updated));
                    state.put_node_pool(updated);
                    state.save(state_path)?;
                }
            }
            None => {
                let created = reconciler.create_node_pool(&spec).await?;
                summary.push(Action::Create, node_pool_label(&created));
                state.put_node_pool(created);
                state.save(state_path)?;
            }
        }
    }

    Ok(summary)
}

/// Delete a cluster; one that is already gone counts as deleted.
pub(crate) async fn delete_cluster<A: ResourceApi>(
    reconciler: &Reconciler<A>,
    cluster: &ClusterState,
) -> Result<()> {
    match reconciler.delete_cluster(cluster).await {
        Err(err) if err.is_not_found() => {
            tracing::warn!(cluster_id = %cluster.id, "Cluster was already deleted");
            Ok(())
        }
        result => Ok(result?),
    }
}

/// Delete a node pool; one that is already gone counts as deleted.
pub(crate) async fn delete_node_pool<A: ResourceApi>(
    reconciler: &Reconciler<A>,
    pool: &NodePoolState,
) -> Result<()> {
    match reconciler.delete_node_pool(pool).await {
        Err(err) if err.is_not_found() => {
            tracing::warn!(node_pool = %pool.name, "Node pool was already deleted");
            Ok(())
        }
        result => Ok(result?),
    }
}

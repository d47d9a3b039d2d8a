//! Refresh command - update the state file from the backend.

use super::apply::{cluster_label, node_pool_label};
use super::{Action, Summary};
use crate::state::StateFile;
use anyhow::Result;
use ocp_core::ResourceApi;
use ocp_reconciler::Reconciler;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Run the refresh command.
pub async fn run(state_path: &Path, cancel: CancellationToken) -> Result<()> {
    let mut state = StateFile::load(state_path)?;
    if state.is_empty() {
        println!("Nothing tracked in {}.", state_path.display());
        return Ok(());
    }

    let reconciler = super::connect(cancel)?;
    let summary = refresh(&reconciler, &mut state, state_path).await?;

    println!("Refresh complete:");
    println!("{summary}");
    Ok(())
}

/// Re-read every tracked resource; vanished ones are dropped from state.
pub async fn refresh<A: ResourceApi>(
    reconciler: &Reconciler<A>,
    state: &mut StateFile,
    state_path: &Path,
) -> Result<Summary> {
    let mut summary = Summary::default();

    if let Some(previous) = state.cluster.clone() {
        match reconciler.read_cluster(&previous).await? {
            Some(current) => {
                let action = if current == previous {
                    Action::Unchanged
                } else {
                    Action::Update
                };
                summary.push(action, cluster_label(&current));
                state.cluster = Some(current);
            }
            None => {
                summary.push(Action::Delete, cluster_label(&previous));
                state.cluster = None;
            }
        }
    }

    let mut pools = Vec::with_capacity(state.node_pools.len());
    for previous in &state.node_pools {
        match reconciler.read_node_pool(previous).await? {
            Some(current) => {
                let action = if &current == previous {
                    Action::Unchanged
                } else {
                    Action::Update
                };
                summary.push(action, node_pool_label(&current));
                pools.push(current);
            }
            None => summary.push(Action::Delete, node_pool_label(previous)),
        }
    }
    state.node_pools = pools;

    if !summary.is_noop() {
        state.save(state_path)?;
    }
    Ok(summary)
}

//! Plan command - show what apply would do, without calling the backend.

use super::apply::{cluster_label, node_pool_label};
use super::{Action, Summary};
use crate::manifest::Manifest;
use crate::state::StateFile;
use anyhow::Result;
use ocp_core::{ClusterSpec, ClusterState, NodePoolScaling, same_name};
use ocp_reconciler::{carry_node_pools, plan_cluster_update};
use std::path::Path;

/// Run the plan command.
pub fn run(file: &Path, state_path: &Path) -> Result<()> {
    let manifest = Manifest::load(file)?;
    let state = StateFile::load(state_path)?;

    let summary = plan(&manifest, &state);
    println!("Plan (against {}):", state_path.display());
    println!("{summary}");

    let replaced = summary.count(Action::Replace);
    if replaced > 0 {
        println!();
        println!(
            "⚠ {replaced} resource(s) change immutable fields; destroy and re-create them instead"
        );
    }
    Ok(())
}

/// Compare the manifest with the tracked state.
pub fn plan(manifest: &Manifest, state: &StateFile) -> Summary {
    let mut summary = Summary::default();

    for pool in &state.node_pools {
        let declared = manifest
            .node_pools
            .iter()
            .any(|spec| same_name(&spec.name, &pool.name));
        if !declared {
            summary.push(Action::Delete, node_pool_label(pool));
        }
    }

    match (&manifest.cluster, &state.cluster) {
        (Some(spec), None) => {
            summary.push(Action::Create, format!("cluster {}", spec.cluster_name));
        }
        (Some(spec), Some(previous)) => {
            let (action, detail) = cluster_change(previous, spec);
            summary.push(action, format!("{}{detail}", cluster_label(previous)));
        }
        (None, Some(previous)) => summary.push(Action::Delete, cluster_label(previous)),
        (None, None) => {}
    }

    for spec in &manifest.node_pools {
        let Some(tracked) = state.node_pool(&spec.name) else {
            summary.push(Action::Create, format!("node pool {}", spec.name));
            continue;
        };

        let mut spec = spec.clone();
        if spec.cluster.is_none() {
            spec.cluster = tracked.cluster.clone();
        }

        let label = node_pool_label(tracked);
        if tracked.as_spec().requires_replacement(&spec) {
            summary.push(Action::Replace, label);
        } else if tracked.scaling() != spec.scaling() {
            let detail = scaling_change(&tracked.scaling(), &spec.scaling());
            summary.push(Action::Update, format!("{label}: {detail}"));
        } else {
            summary.push(Action::Unchanged, label);
        }
    }

    summary
}

fn cluster_change(previous: &ClusterState, desired: &ClusterSpec) -> (Action, String) {
    let replaced = previous.as_spec().replacement_fields(desired);
    if !replaced.is_empty() {
        return (Action::Replace, format!(" [{}]", replaced.join(", ")));
    }

    let mut details = Vec::new();
    let update = plan_cluster_update(previous, desired);
    if let Some(version) = &update.cluster_version {
        details.push(format!(
            "cluster_version {} → {}",
            previous.cluster_version, version
        ));
    }
    if update.restriction_api.is_some() {
        details.push("API restrictions".to_string());
    }

    let pools = carry_node_pools(&previous.node_pool, &desired.node_pool);
    for resize in ocp_reconciler::plan(&previous.node_pool, &pools) {
        details.push(format!(
            "node pool {}: {}",
            pools[resize.index].name,
            scaling_change(&resize.from, &resize.to)
        ));
    }

    if details.is_empty() {
        (Action::Unchanged, String::new())
    } else {
        (Action::Update, format!(": {}", details.join("; ")))
    }
}

fn scaling_change(from: &NodePoolScaling, to: &NodePoolScaling) -> String {
    let mut parts = Vec::new();
    if from.count != to.count {
        parts.push(format!("count {} → {}", from.count, to.count));
    }
    if from.autoscale != to.autoscale {
        parts.push(format!("autoscale {} → {}", from.autoscale, to.autoscale));
    }
    if from.max_count != to.max_count {
        parts.push(format!("max_count {} → {}", from.max_count, to.max_count));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocp_core::{ClusterId, NodePoolId, NodePoolSpec, NodePoolState};

    fn pool_spec(name: &str, count: u32) -> NodePoolSpec {
        NodePoolSpec {
            name: name.into(),
            cluster: None,
            flavor_id: "m1.large".into(),
            node_count: count,
            autoscale: false,
            max_count: count,
            labels: Vec::new(),
            taints: Vec::new(),
        }
    }

    fn cluster_spec() -> ClusterSpec {
        ClusterSpec {
            cluster_name: "prod".into(),
            cluster_version: "1.29".into(),
            master_flavor_id: "m1.medium".into(),
            master_count: 1,
            image: "ubuntu-22.04".into(),
            networking: "calico".into(),
            restriction_api: false,
            restriction_ips: Vec::new(),
            addons: Vec::new(),
            node_pool: vec![pool_spec("default", 3)],
        }
    }

    fn tracked_pool(spec: &NodePoolSpec, id: &str) -> NodePoolState {
        let mut pool = NodePoolState::declared(spec);
        pool.id = Some(NodePoolId::new(id));
        pool
    }

    fn tracked() -> StateFile {
        let spec = cluster_spec();
        let cluster = ClusterState {
            id: ClusterId::new("c-1"),
            cluster_name: spec.cluster_name.clone(),
            cluster_version: spec.cluster_version.clone(),
            master_flavor_id: spec.master_flavor_id.clone(),
            master_count: spec.master_count,
            image: spec.image.clone(),
            networking: spec.networking.clone(),
            restriction_api: false,
            restriction_ips: Vec::new(),
            addons: Vec::new(),
            node_pool: vec![tracked_pool(&spec.node_pool[0], "np-1")],
            api_address: None,
            control_nodes: Vec::new(),
            status: "running".into(),
            status_reason: None,
            created_at: None,
            updated_at: None,
        };
        let mut batch = pool_spec("batch", 2);
        batch.cluster = Some(ClusterId::new("c-1"));
        StateFile {
            cluster: Some(cluster),
            node_pools: vec![tracked_pool(&batch, "np-2")],
            ..StateFile::default()
        }
    }

    fn manifest() -> Manifest {
        Manifest {
            cluster: Some(cluster_spec()),
            node_pools: vec![pool_spec("batch", 2)],
        }
    }

    #[test]
    fn empty_state_plans_creation() {
        let summary = plan(&manifest(), &StateFile::default());
        assert_eq!(summary.count(Action::Create), 2);
    }

    #[test]
    fn matching_state_plans_nothing() {
        let summary = plan(&manifest(), &tracked());
        assert!(summary.is_noop());
        assert_eq!(summary.count(Action::Unchanged), 2);
    }

    #[test]
    fn resize_and_version_bump_are_updates() {
        let mut manifest = manifest();
        let cluster = manifest.cluster.as_mut().unwrap();
        cluster.cluster_version = "1.30".into();
        cluster.node_pool[0].node_count = 5;

        let summary = plan(&manifest, &tracked());

        assert_eq!(summary.count(Action::Update), 1);
        let (_, line) = &summary.changes[0];
        assert!(line.contains("cluster_version 1.29 → 1.30"));
        assert!(line.contains("node pool default: count 3 → 5"));
    }

    #[test]
    fn immutable_changes_need_replacement() {
        let mut manifest = manifest();
        manifest.cluster.as_mut().unwrap().image = "debian-12".into();
        manifest.node_pools[0].flavor_id = "m1.small".into();

        let summary = plan(&manifest, &tracked());
        assert_eq!(summary.count(Action::Replace), 2);
        assert!(summary.changes[0].1.contains("[image]"));
    }

    #[test]
    fn dropped_resources_are_deleted() {
        let summary = plan(&Manifest::default(), &tracked());
        assert_eq!(summary.count(Action::Delete), 2);
    }
}

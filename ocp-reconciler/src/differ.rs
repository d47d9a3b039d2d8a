//! Node pool differ.
//!
//! Pools are matched between the previously observed set and the newly
//! declared set by backend id. Only the scaling triple is compared; every
//! other field is either immutable or computed. A pool that changed gets one
//! update call, and the values the backend answers with overwrite the
//! declared record.
//!
//! Declared pools without a counterpart are left alone, and observed pools
//! that disappeared from the declaration are never deleted here.

use ocp_core::{NodePoolId, NodePoolScaling, NodePoolState, ResourceApi, Result};
use std::collections::HashMap;

/// One scaling update the differ intends to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate {
    /// Position of the pool in the declared slice.
    pub index: usize,
    /// Pool to update.
    pub id: NodePoolId,
    /// Previously observed triple.
    pub from: NodePoolScaling,
    /// Declared triple, sent as the update body.
    pub to: NodePoolScaling,
}

/// Outcome of [`NodePoolDiffer::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    /// Pools that received an update, with the values the backend applied.
    pub updated: Vec<(NodePoolId, NodePoolScaling)>,
    /// Names of declared pools that had no counterpart in the previous set.
    pub unmatched: Vec<String>,
}

impl DiffReport {
    /// True when no update call was issued.
    pub fn is_noop(&self) -> bool {
        self.updated.is_empty()
    }
}

/// Compute the updates needed to move `previous` to `declared`.
///
/// Pure; issues no calls.
pub fn plan(previous: &[NodePoolState], declared: &[NodePoolState]) -> Vec<PlannedUpdate> {
    let observed: HashMap<&NodePoolId, &NodePoolState> = previous
        .iter()
        .filter_map(|pool| pool.id.as_ref().map(|id| (id, pool)))
        .collect();

    declared
        .iter()
        .enumerate()
        .filter_map(|(index, pool)| {
            let id = pool.id.as_ref()?;
            let before = observed.get(id)?;
            let (from, to) = (before.scaling(), pool.scaling());
            (from != to).then(|| PlannedUpdate {
                index,
                id: id.clone(),
                from,
                to,
            })
        })
        .collect()
}

/// Applies node pool scaling changes through a [`ResourceApi`].
pub struct NodePoolDiffer<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: ResourceApi + ?Sized> NodePoolDiffer<'a, A> {
    /// Create a differ issuing calls through `api`.
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Send the planned updates and merge the answers into `declared`.
    ///
    /// Stops at the first failed call; pools already updated keep their
    /// merged values.
    pub async fn apply(
        &self,
        previous: &[NodePoolState],
        declared: &mut [NodePoolState],
    ) -> Result<DiffReport> {
        let mut report = DiffReport {
            unmatched: unmatched(previous, declared),
            ..DiffReport::default()
        };
        for name in &report.unmatched {
            tracing::debug!(node_pool = %name, "No previous state for node pool, skipping diff");
        }

        for update in plan(previous, declared) {
            tracing::info!(
                node_pool_id = %update.id,
                from_count = update.from.count,
                to_count = update.to.count,
                autoscale = update.to.autoscale,
                max_count = update.to.max_count,
                "Updating node pool scaling"
            );

            let applied = self.api.update_node_pool(&update.id, &update.to).await?;
            if applied != update.to {
                tracing::info!(
                    node_pool_id = %update.id,
                    count = applied.count,
                    autoscale = applied.autoscale,
                    max_count = applied.max_count,
                    "Backend adjusted node pool scaling"
                );
            }

            declared[update.index].apply_scaling(&applied);
            report.updated.push((update.id, applied));
        }

        Ok(report)
    }
}

fn unmatched(previous: &[NodePoolState], declared: &[NodePoolState]) -> Vec<String> {
    declared
        .iter()
        .filter(|pool| {
            pool.id
                .as_ref()
                .is_none_or(|id| !previous.iter().any(|p| p.id.as_ref() == Some(id)))
        })
        .map(|pool| pool.name.clone())
        .collect()
}

//! Resource reconcilers for OCP clusters and node pools.
//!
//! Every flow follows the same shape:
//!
//! - **create**: submit → operation handle → poll → re-fetch → project
//! - **read**: fetch → project, or `None` when the resource is gone
//! - **update**: compute the minimal partial update → send → merge the answer
//! - **delete**: submit → operation handle → poll
//!
//! The backend stays the source of truth; a [`Reconciler`] holds no state of
//! its own besides configuration and a cancellation token.

mod cluster;
mod node_pool;

pub use cluster::{carry_node_pools, plan_cluster_update};

use crate::poller::OperationPoller;
use ocp_core::{
    OcpError, OperationHandle, OperationRecord, ProviderConfig, ResourceApi, ResourceTimeouts,
    Result,
};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Drives clusters and node pools towards their declared state.
///
/// # Example
///
/// ```no_run
/// use ocp_core::{ClusterSpec, ProviderConfig};
/// use ocp_core::testing::MockBackend;
/// use ocp_reconciler::Reconciler;
///
/// # async fn example(spec: ClusterSpec) -> ocp_core::Result<()> {
/// let config = ProviderConfig::from_env()?;
/// let reconciler = Reconciler::new(MockBackend::new(), &config);
///
/// let state = reconciler.create_cluster(&spec).await?;
/// println!("cluster {} is {}", state.id, state.status);
/// # Ok(())
/// # }
/// ```
pub struct Reconciler<A> {
    api: A,
    poller: OperationPoller,
    cluster_timeouts: ResourceTimeouts,
    node_pool_timeouts: ResourceTimeouts,
    cancel: CancellationToken,
}

impl<A: ResourceApi> Reconciler<A> {
    /// Create a reconciler issuing calls through `api`.
    pub fn new(api: A, config: &ProviderConfig) -> Self {
        Self {
            api,
            poller: OperationPoller::new(config.poll()),
            cluster_timeouts: config.cluster_timeouts(),
            node_pool_timeouts: config.node_pool_timeouts(),
            cancel: CancellationToken::new(),
        }
    }

    /// Abort operation waits when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The backend this reconciler talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Token that aborts operation waits.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Wait for a submitted operation to finish.
    async fn await_operation(
        &self,
        handle: &OperationHandle,
        timeout: Duration,
    ) -> Result<OperationRecord> {
        self.poller
            .wait(&self.api, &handle.operation_id, timeout, &self.cancel)
            .await
    }

    /// Run a synchronous call sequence under a deadline.
    async fn within<T>(
        &self,
        action: String,
        timeout: Duration,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    action = %action,
                    timeout_secs = timeout.as_secs(),
                    "Deadline exceeded"
                );
                Err(OcpError::DeadlineExceeded { action, timeout })
            }
        }
    }
}

/// Id of the resource an operation produced.
fn primary_object(record: &OperationRecord) -> Result<&str> {
    record
        .primary_object_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            OcpError::malformed(format!(
                "operation {} succeeded without a primary_object_id",
                record
                    .id
                    .as_ref()
                    .map_or("<unknown>", |id| id.as_str())
            ))
        })
}

//! Poll-until-terminal state machine for backend operations.
//!
//! The poller turns a fire-and-forget operation into a synchronous result.
//! It keeps no state besides the elapsed time and the current interval:
//!
//! ```text
//! initial delay ─► lookup ─┬─ succeeded ──────► Ok(record)
//!                          ├─ failed/aborted ─► Err(OperationFailed/OperationAborted)
//!                          ├─ other error ────► Err(..)
//!                          └─ running / 404 ──► sleep(interval), interval *= 2 ─► lookup
//! ```
//!
//! The deadline is checked before every lookup and also bounds a lookup in
//! flight. Cancellation interrupts both the sleep and an in-flight lookup.

use ocp_core::{
    OcpError, OperationId, OperationRecord, OperationStatus, PollSettings, Progress, ResourceApi,
    Result,
};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Waits for backend operations to reach a terminal status.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationPoller {
    settings: PollSettings,
}

impl OperationPoller {
    /// Create a poller with the given timing policy.
    pub fn new(settings: PollSettings) -> Self {
        Self { settings }
    }

    /// Timing policy in use.
    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Poll `id` until it succeeds, fails, the deadline passes, or `cancel` fires.
    ///
    /// A 404 from the status lookup means the record is not visible yet and
    /// counts as in progress. Any other lookup error ends the wait.
    pub async fn wait<A: ResourceApi + ?Sized>(
        &self,
        api: &A,
        id: &OperationId,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<OperationRecord> {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut interval = self.settings.min_interval;

        tracing::info!(
            operation_id = %id,
            timeout_secs = timeout.as_secs(),
            "Waiting for operation"
        );

        self.pause(id, self.settings.initial_delay.min(timeout), cancel)
            .await?;

        loop {
            if started.elapsed() >= timeout {
                return Err(timed_out(id, started));
            }

            let lookup = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(id)),
                _ = tokio::time::sleep_until(deadline) => return Err(timed_out(id, started)),
                lookup = api.get_operation(id) => lookup,
            };

            match lookup {
                Ok(record) => match record.status {
                    OperationStatus::Succeeded => {
                        tracing::info!(
                            operation_id = %id,
                            operation_type = record.operation_type_or_unknown(),
                            elapsed_secs = started.elapsed().as_secs(),
                            "Operation succeeded"
                        );
                        return Ok(record);
                    }
                    OperationStatus::Failed => return Err(terminal_failure(id, &record, false)),
                    OperationStatus::Aborted => return Err(terminal_failure(id, &record, true)),
                    OperationStatus::InProgress | OperationStatus::Other(_) => {
                        tracing::debug!(
                            operation_id = %id,
                            status = %record.status,
                            step = record
                                .progress
                                .as_ref()
                                .and_then(Progress::current_step)
                                .unwrap_or("unknown"),
                            "Operation still running"
                        );
                    }
                },
                // Only a 404 is retried; a lookup that got no response is a transport error.
                Err(err) if err.is_not_found() => {
                    tracing::debug!(operation_id = %id, "Operation not visible yet");
                }
                Err(err) => {
                    tracing::warn!(operation_id = %id, error = %err, "Operation lookup failed");
                    return Err(err);
                }
            }

            let remaining = timeout.saturating_sub(started.elapsed());
            self.pause(id, interval.min(remaining), cancel).await?;
            interval = next_interval(interval, &self.settings);
        }
    }

    async fn pause(
        &self,
        id: &OperationId,
        delay: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(cancelled(id)),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

fn next_interval(current: Duration, settings: &PollSettings) -> Duration {
    current
        .saturating_mul(2)
        .min(settings.max_interval)
        .max(settings.min_interval)
}

fn timed_out(id: &OperationId, started: Instant) -> OcpError {
    let elapsed = started.elapsed();
    tracing::warn!(
        operation_id = %id,
        elapsed_secs = elapsed.as_secs(),
        "Operation did not finish in time"
    );
    OcpError::OperationTimeout {
        operation_id: id.to_string(),
        elapsed,
    }
}

fn cancelled(id: &OperationId) -> OcpError {
    tracing::info!(operation_id = %id, "Stopped waiting for operation: cancelled");
    OcpError::Cancelled {
        operation_id: id.to_string(),
    }
}

fn terminal_failure(id: &OperationId, record: &OperationRecord, aborted: bool) -> OcpError {
    let operation_id = id.to_string();
    let operation_type = record.operation_type_or_unknown().to_string();
    let step = record.failure_step().map(str::to_string);

    tracing::warn!(
        operation_id = %operation_id,
        operation_type = %operation_type,
        step = step.as_deref().unwrap_or("unavailable"),
        aborted,
        "Operation ended unsuccessfully"
    );

    if aborted {
        OcpError::OperationAborted {
            operation_id,
            operation_type,
            step,
        }
    } else {
        OcpError::OperationFailed {
            operation_id,
            operation_type,
            step,
        }
    }
}

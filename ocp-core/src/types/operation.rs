//! Asynchronous operation records.
//!
//! Mutating calls on the backend return an [`OperationHandle`]; the matching
//! [`OperationRecord`] is then polled until its status becomes terminal.

use super::ids::OperationId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a backend operation.
///
/// Any literal outside the known vocabulary decodes to [`OperationStatus::Other`]
/// and counts as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationStatus {
    /// Work is still running.
    InProgress,
    /// Terminal success.
    Succeeded,
    /// Terminal failure.
    Failed,
    /// Terminal failure, cancelled on the backend side.
    Aborted,
    /// A status the backend sent that this client does not recognise.
    Other(String),
}

impl OperationStatus {
    /// Wire value for in-progress operations.
    pub const IN_PROGRESS: &'static str = "in progress";
    /// Wire value for succeeded operations.
    pub const SUCCEEDED: &'static str = "succeeded";
    /// Wire value for failed operations.
    pub const FAILED: &'static str = "failed";
    /// Wire value for aborted operations.
    pub const ABORTED: &'static str = "aborted";

    /// Get the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => Self::IN_PROGRESS,
            Self::Succeeded => Self::SUCCEEDED,
            Self::Failed => Self::FAILED,
            Self::Aborted => Self::ABORTED,
            Self::Other(raw) => raw,
        }
    }

    /// True once no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Aborted)
    }
}

impl From<String> for OperationStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            Self::IN_PROGRESS => Self::InProgress,
            Self::SUCCEEDED => Self::Succeeded,
            Self::FAILED => Self::Failed,
            Self::ABORTED => Self::Aborted,
            _ => Self::Other(raw),
        }
    }
}

impl From<OperationStatus> for String {
    fn from(status: OperationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an operation's ordered step list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDetail {
    /// Step name, when the backend provides one.
    #[serde(default)]
    pub name: Option<String>,
    /// Remaining step attributes, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StepDetail {
    /// Create a named step with no extra attributes.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Structured progress of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Number of completed steps; doubles as the index of the step in flight.
    #[serde(default)]
    pub completed_steps: i64,
    /// Ordered list of all steps.
    #[serde(default)]
    pub steps_details: Vec<StepDetail>,
}

impl Progress {
    /// Name of the step at `steps_details[completed_steps]`.
    ///
    /// Returns `None` for negative or out-of-range indexes and unnamed steps.
    pub fn current_step(&self) -> Option<&str> {
        let index = usize::try_from(self.completed_steps).ok()?;
        self.steps_details.get(index)?.name.as_deref()
    }
}

/// Full operation record as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Operation identifier, when echoed by the backend.
    #[serde(default)]
    pub id: Option<OperationId>,
    /// Current status.
    pub status: OperationStatus,
    /// Kind of mutation the operation fulfils (e.g. "create_cluster").
    #[serde(default)]
    pub operation_type: Option<String>,
    /// Resource produced by the operation, set once it succeeds.
    #[serde(default)]
    pub primary_object_id: Option<String>,
    /// Step-level progress, if the backend reports it.
    #[serde(default)]
    pub progress: Option<Progress>,
}

impl OperationRecord {
    /// Create a record with the given status and no progress.
    pub fn new(status: OperationStatus) -> Self {
        Self {
            id: None,
            status,
            operation_type: None,
            primary_object_id: None,
            progress: None,
        }
    }

    /// Set the operation type.
    #[must_use]
    pub fn with_type(mut self, operation_type: impl Into<String>) -> Self {
        self.operation_type = Some(operation_type.into());
        self
    }

    /// Set the primary object id.
    #[must_use]
    pub fn with_primary_object(mut self, id: impl Into<String>) -> Self {
        self.primary_object_id = Some(id.into());
        self
    }

    /// Set the progress record.
    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Operation type, or `"unknown operation"` when missing.
    pub fn operation_type_or_unknown(&self) -> &str {
        self.operation_type.as_deref().unwrap_or("unknown operation")
    }

    /// Name of the step that was running when the operation stopped.
    pub fn failure_step(&self) -> Option<&str> {
        self.progress.as_ref()?.current_step()
    }
}

/// Reference to an operation returned by a mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    /// The operation to poll.
    pub operation_id: OperationId,
}

impl OperationHandle {
    /// Create a handle for the given operation.
    pub fn new(operation_id: impl Into<OperationId>) -> Self {
        Self {
            operation_id: operation_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_vocabulary_round_trips() {
        let status: OperationStatus = serde_json::from_value(json!("in progress")).unwrap();
        assert_eq!(status, OperationStatus::InProgress);
        assert!(!status.is_terminal());

        for (raw, terminal) in [("succeeded", true), ("failed", true), ("aborted", true)] {
            let status: OperationStatus = serde_json::from_value(json!(raw)).unwrap();
            assert_eq!(status.is_terminal(), terminal);
            assert_eq!(status.as_str(), raw);
        }
    }

    #[test]
    fn unknown_status_is_kept_and_non_terminal() {
        let status: OperationStatus = serde_json::from_value(json!("rolled back")).unwrap();
        assert_eq!(status, OperationStatus::Other("rolled back".into()));
        assert!(!status.is_terminal());
    }

    #[test]
    fn record_decodes_with_progress() {
        let record: OperationRecord = serde_json::from_value(json!({
            "id": "op-1",
            "status": "failed",
            "operation_type": "create_cluster",
            "progress": {
                "completed_steps": 1,
                "steps_details": [
                    {"name": "allocate_network", "status": "done"},
                    {"name": "provision_masters", "status": "error"}
                ]
            }
        }))
        .unwrap();

        assert_eq!(record.status, OperationStatus::Failed);
        assert_eq!(record.failure_step(), Some("provision_masters"));
        let first = &record.progress.as_ref().unwrap().steps_details[0];
        assert_eq!(first.extra.get("status"), Some(&json!("done")));
    }

    #[test]
    fn missing_status_is_a_decode_error() {
        let result = serde_json::from_value::<OperationRecord>(json!({
            "operation_type": "create_cluster"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_progress_has_no_step() {
        let past_end = Progress {
            completed_steps: 3,
            steps_details: vec![StepDetail::named("only")],
        };
        assert_eq!(past_end.current_step(), None);

        let negative = Progress {
            completed_steps: -1,
            steps_details: vec![StepDetail::named("only")],
        };
        assert_eq!(negative.current_step(), None);

        assert_eq!(Progress::default().current_step(), None);
    }

    #[test]
    fn unnamed_step_has_no_name() {
        let progress: Progress = serde_json::from_value(json!({
            "completed_steps": 0,
            "steps_details": [{"status": "error"}]
        }))
        .unwrap();
        assert_eq!(progress.current_step(), None);
    }
}

//! Test doubles for the backend.
//!
//! [`MockBackend`] implements [`ResourceApi`](crate::traits::ResourceApi) in
//! memory so the poller and reconciler can be driven deterministically:
//! operation status sequences are scripted, resources are canned, and every
//! call is recorded for later assertions.

mod backend;

pub use backend::{MockBackend, RecordedCall, ScriptedStatus};

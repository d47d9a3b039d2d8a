//! Traits at the boundary between the engine and the backend.

mod resource_api;

pub use resource_api::{ApiFuture, ResourceApi};

//! Rust client for the OCP (OneCloud Planet) backend API.
//!
//! This crate talks to the REST API that manages Kubernetes clusters and
//! their node pools, and implements [`ocp_core::ResourceApi`] so the
//! reconciler can drive it.
//!
//! # Features
//!
//! - Token authentication (`Authorization: OpenAPIToken <token>`)
//! - Cluster and node pool create/read/update/delete
//! - Operation status lookups
//! - Read-only catalogs: flavors, Kubernetes versions, networking, addons
//!
//! # Example
//!
//! ```no_run
//! use ocp_client::Client;
//! use ocp_core::ProviderConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProviderConfig::from_env()?;
//! let client = Client::new(&config)?;
//!
//! for flavor in client.flavors().await? {
//!     println!("{}: {} vCPU", flavor.name, flavor.vcpus);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Inherent methods return `Result<T, ClientError>`; through the
//! `ResourceApi` trait the same failures arrive as [`ocp_core::OcpError`]:
//!
//! ```no_run
//! # use ocp_client::{Client, ClientError};
//! # use ocp_core::{OperationId, ProviderConfig};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::new(&ProviderConfig::from_env()?)?;
//! match client.get_operation(&OperationId::new("op-1")).await {
//!     Ok(record) => println!("status: {}", record.status),
//!     Err(ClientError::Api { status: 404, .. }) => println!("not visible yet"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod catalog;
mod client;
mod clusters;
mod error;
mod node_pools;
mod operations;

pub use catalog::{ClusterAddon, ClusterVersion, Flavor, Image, Networking, Release};
pub use client::Client;
pub use error::{ClientError, Result};

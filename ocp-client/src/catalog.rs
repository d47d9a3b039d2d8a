//! Read-only catalogs: flavors, cluster versions, networking options, addons.

use crate::client::Client;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// An instance flavor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    /// Flavor id, used as `flavor_id` in specs.
    pub id: String,
    /// Flavor name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Virtual CPUs.
    #[serde(default)]
    pub vcpus: u32,
    /// Memory in MiB.
    #[serde(default)]
    pub memory_mb: u64,
    /// Memory in GiB.
    #[serde(default)]
    pub memory_gb: f64,
    /// Root disk in GiB.
    #[serde(default)]
    pub root_gb: u32,
    /// Ephemeral disk in GiB.
    #[serde(default)]
    pub ephemeral_gb: u32,
    /// Swap in MiB.
    #[serde(default)]
    pub swap: u32,
    /// Flavor group, if any.
    #[serde(default)]
    pub flavor_group: Option<String>,
    /// Whether the flavor cannot be ordered right now.
    #[serde(default)]
    pub out_of_stock: bool,
    /// Region the flavor belongs to.
    #[serde(default)]
    pub region: String,
}

#[derive(Debug, Deserialize)]
struct CreateOptions {
    #[serde(default)]
    flavor: Vec<Flavor>,
}

/// An OS image available for a Kubernetes version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Display name.
    pub name: String,
    /// Image name used in specs.
    #[serde(default)]
    pub image_name: String,
    /// Underlying OpenStack image id.
    #[serde(default)]
    pub openstack_id: String,
    /// OS distribution.
    #[serde(default)]
    pub os_distro: String,
}

/// A supported Kubernetes version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterVersion {
    /// Version id.
    pub id: String,
    /// Version string, used as `cluster_version` in specs.
    pub version: String,
    /// Images available for this version.
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A networking (CNI) option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Networking {
    /// Option id.
    pub id: String,
    /// Network plugin name.
    #[serde(rename = "network_name")]
    pub name: String,
    /// Plugin version.
    #[serde(default)]
    pub version: String,
}

/// An addon release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release id.
    pub id: String,
    /// Release version.
    pub version: String,
}

/// An installable cluster addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAddon {
    /// Addon id.
    pub id: String,
    /// Addon name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Available releases.
    #[serde(default)]
    pub releases: Vec<Release>,
}

impl Client {
    /// List instance flavors.
    pub async fn flavors(&self) -> Result<Vec<Flavor>> {
        let response = self.get("openstack/instances/create_options").await?;
        let options: CreateOptions = self.handle_response(response).await?;
        Ok(options.flavor)
    }

    /// List supported Kubernetes versions.
    pub async fn cluster_versions(&self) -> Result<Vec<ClusterVersion>> {
        let response = self.get("cluster/versions").await?;
        self.handle_response(response).await
    }

    /// List networking options.
    pub async fn networking(&self) -> Result<Vec<Networking>> {
        let response = self.get("cluster/networking").await?;
        self.handle_response(response).await
    }

    /// List installable addons.
    pub async fn cluster_addons(&self) -> Result<Vec<ClusterAddon>> {
        let response = self.get("cluster/addons").await?;
        self.handle_response(response).await
    }
}

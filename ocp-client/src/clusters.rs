//! Cluster operations.

use crate::client::Client;
use crate::error::Result;
use ocp_core::{
    Cluster, ClusterCreateRequest, ClusterId, ClusterPatch, ClusterUpdate, OperationHandle,
};

const CLUSTER_PATH: &str = "cluster/";

fn cluster_path(id: &ClusterId) -> String {
    format!("{CLUSTER_PATH}{id}/")
}

impl Client {
    /// Submit a cluster creation.
    ///
    /// The cluster is built asynchronously; poll the returned operation to
    /// learn the new cluster's id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn create_cluster(
        &self,
        request: &ClusterCreateRequest,
    ) -> Result<OperationHandle> {
        let response = self.post(CLUSTER_PATH, request).await?;
        self.handle_response(response).await
    }

    /// Get a cluster by id.
    ///
    /// Returns `Ok(None)` when the backend answers 404.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use ocp_client::Client;
    /// # use ocp_core::{ClusterId, ProviderConfig};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = Client::new(&ProviderConfig::from_env()?)?;
    /// match client.get_cluster(&ClusterId::new("c-1")).await? {
    ///     Some(cluster) => println!("{} is {}", cluster.cluster_name, cluster.status),
    ///     None => println!("gone"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_cluster(&self, id: &ClusterId) -> Result<Option<Cluster>> {
        let response = self.get(&cluster_path(id)).await?;
        self.handle_optional(response).await
    }

    /// Apply a partial update. Only the fields set in `update` are sent.
    pub async fn update_cluster(
        &self,
        id: &ClusterId,
        update: &ClusterUpdate,
    ) -> Result<ClusterPatch> {
        let response = self.patch(&cluster_path(id), update).await?;
        self.handle_response(response).await
    }

    /// Submit a cluster deletion.
    pub async fn delete_cluster(&self, id: &ClusterId) -> Result<OperationHandle> {
        let response = self.delete(&cluster_path(id)).await?;
        self.handle_response(response).await
    }
}

//! Operation status lookups.

use crate::client::Client;
use crate::error::Result;
use ocp_core::{OperationId, OperationRecord};

impl Client {
    /// Fetch the current record of an operation.
    ///
    /// A freshly submitted operation may not be visible yet; the backend then
    /// answers 404, surfaced as `ClientError::Api { status: 404, .. }`.
    pub async fn get_operation(&self, id: &OperationId) -> Result<OperationRecord> {
        let response = self.get(&format!("operations/{id}")).await?;
        self.handle_response(response).await
    }
}

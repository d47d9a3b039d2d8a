//! Operation command - wait for a backend operation to finish.

use anyhow::Result;
use ocp_core::OperationId;
use ocp_reconciler::OperationPoller;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Poll an operation until it reaches a terminal status.
pub async fn wait(id: &str, timeout_secs: u64, cancel: CancellationToken) -> Result<()> {
    let config = super::provider_config()?;
    let client = super::client(&config)?;
    let poller = OperationPoller::new(config.poll());
    let id = OperationId::new(id);

    let record = poller
        .wait(&client, &id, Duration::from_secs(timeout_secs), &cancel)
        .await?;

    println!("Operation {id}: {}", record.status);
    println!("  Type:    {}", record.operation_type_or_unknown());
    if let Some(object) = &record.primary_object_id {
        println!("  Object:  {object}");
    }
    Ok(())
}

use crate::traits::Publisher;
use crate::types::PublishError;
use async_trait::async_trait;
use tracing::info;

/// Dry-run publisher: logs the status and reports success.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    fn publisher_name(&self) -> String {
        "dry-run".to_string()
    }

    async fn publish(&self, status: &str) -> Result<(), PublishError> {
        info!("Dry run, not publishing: {}", status);
        Ok(())
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use super::command::Command;
use crate::infrastructure::queue::PublishError;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Enqueue a command, waiting at most the configured offer timeout.
    ///
    /// On failure the command (and its completion) is discarded; the caller
    /// reports overload to its own client.
    async fn publish_event(&self, command: Command) -> Result<(), PublishError>;
}

pub type EventPublisherArc = Arc<dyn EventPublisher>;

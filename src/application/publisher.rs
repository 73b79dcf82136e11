use std::time::Duration;

use async_trait::async_trait;

use crate::domain::command::Command;
use crate::domain::ports::EventPublisher;
use crate::infrastructure::queue::{EventQueue, PublishError};

/// Thread-safe façade over the event queue, used by every edge handler.
///
/// Delegates to [`EventQueue::offer`] with the configured offer timeout.
/// On failure the command's completion is never fulfilled here; reporting
/// overload to the client is the caller's job.
#[derive(Debug, Clone)]
pub struct CommandPublisher {
    queue: EventQueue,
    offer_timeout: Duration,
}

impl CommandPublisher {
    pub fn new(queue: EventQueue, offer_timeout: Duration) -> Self {
        Self {
            queue,
            offer_timeout,
        }
    }
}

#[async_trait]
impl EventPublisher for CommandPublisher {
    async fn publish_event(&self, command: Command) -> Result<(), PublishError> {
        match self.queue.offer(command, self.offer_timeout).await {
            Ok(()) => Ok(()),
            Err(PublishError::Closed) => {
                tracing::warn!("event queue closed while publishing");
                Err(PublishError::Closed)
            }
            Err(PublishError::Full) => Err(PublishError::Full),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::completion::Completion;
    use rust_decimal_macros::dec;

    fn create_command() -> Command {
        let (completion, _handle) = Completion::new();
        Command::Create {
            initial_amount: dec!(1),
            completion,
        }
    }

    #[tokio::test]
    async fn test_publish_succeeds_with_capacity() {
        let (queue, _receiver) = EventQueue::bounded(2);
        let publisher = CommandPublisher::new(queue, Duration::from_millis(10));
        assert!(publisher.publish_event(create_command()).await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_reports_overload_when_full() {
        let (queue, _receiver) = EventQueue::bounded(1);
        let publisher = CommandPublisher::new(queue, Duration::from_millis(10));

        publisher.publish_event(create_command()).await.unwrap();
        assert_eq!(
            publisher.publish_event(create_command()).await,
            Err(PublishError::Full)
        );
    }

    #[tokio::test]
    async fn test_publish_reports_closed_without_consumer() {
        let (queue, receiver) = EventQueue::bounded(1);
        drop(receiver);
        let publisher = CommandPublisher::new(queue, Duration::from_millis(10));

        assert_eq!(
            publisher.publish_event(create_command()).await,
            Err(PublishError::Closed)
        );
    }
}

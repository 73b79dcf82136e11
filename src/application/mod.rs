pub mod processor;
pub mod publisher;

use std::time::Duration;

use crate::infrastructure::queue::EventQueue;
use crate::infrastructure::store::AccountStore;

use processor::Processor;
use publisher::CommandPublisher;

/// Tunables of the event core. Defaults match the reference deployment:
/// 1024 queued commands, 100 ms offer timeout.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub queue_capacity: usize,
    pub offer_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            offer_timeout: Duration::from_millis(100),
        }
    }
}

/// Assemble the event core: bounded queue, publisher façade, and a processor
/// that is not yet started.
pub fn build(config: &EngineConfig) -> (CommandPublisher, Processor) {
    let (queue, receiver) = EventQueue::bounded(config.queue_capacity);
    let publisher = CommandPublisher::new(queue, config.offer_timeout);
    let processor = Processor::new(receiver, AccountStore::new());
    (publisher, processor)
}

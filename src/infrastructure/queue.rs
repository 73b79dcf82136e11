use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TryRecvError};

use crate::domain::command::Command;

/// Why an offer was rejected. Callers treat either case as overload; the
/// split exists so the closed case can be logged distinctly.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PublishError {
    #[error("event queue full")]
    Full,
    #[error("event queue closed")]
    Closed,
}

/// Producer side of the bounded command queue.
///
/// FIFO with respect to successful offers: commands offered by one producer
/// are drained in submission order, and cross-producer order follows the
/// real-time order in which offers complete.
#[derive(Debug, Clone)]
pub struct EventQueue {
    tx: mpsc::Sender<Command>,
}

/// Consumer side, owned by the single processor worker.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: mpsc::Receiver<Command>,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` pending commands.
    pub fn bounded(capacity: usize) -> (EventQueue, CommandReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (EventQueue { tx }, CommandReceiver { rx })
    }

    /// Enqueue a command, waiting at most `timeout` for free capacity.
    ///
    /// `Err(Full)` means the queue stayed full for the whole timeout; the
    /// command is dropped along with its completion.
    pub async fn offer(&self, command: Command, timeout: Duration) -> Result<(), PublishError> {
        match self.tx.send_timeout(command, timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(PublishError::Full),
            Err(SendTimeoutError::Closed(_)) => Err(PublishError::Closed),
        }
    }
}

impl CommandReceiver {
    /// Wait for the next command; `None` once all producers are gone.
    pub async fn next(&mut self) -> Option<Command> {
        self.rx.recv().await
    }

    /// Non-blocking take; `None` when the queue is currently empty.
    pub fn poll(&mut self) -> Option<Command> {
        match self.rx.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::completion::Completion;
    use rust_decimal_macros::dec;

    fn create_command(amount: rust_decimal::Decimal) -> Command {
        let (completion, _handle) = Completion::new();
        Command::Create {
            initial_amount: amount,
            completion,
        }
    }

    #[tokio::test]
    async fn test_offer_then_poll_is_fifo() {
        let (queue, mut receiver) = EventQueue::bounded(4);
        queue
            .offer(create_command(dec!(1)), Duration::from_millis(10))
            .await
            .unwrap();
        queue
            .offer(create_command(dec!(2)), Duration::from_millis(10))
            .await
            .unwrap();

        match receiver.poll() {
            Some(Command::Create { initial_amount, .. }) => assert_eq!(initial_amount, dec!(1)),
            other => panic!("unexpected command: {other:?}"),
        }
        match receiver.poll() {
            Some(Command::Create { initial_amount, .. }) => assert_eq!(initial_amount, dec!(2)),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(receiver.poll().is_none());
    }

    #[tokio::test]
    async fn test_offer_times_out_when_full() {
        let (queue, _receiver) = EventQueue::bounded(1);
        queue
            .offer(create_command(dec!(1)), Duration::from_millis(10))
            .await
            .unwrap();

        let result = queue
            .offer(create_command(dec!(2)), Duration::from_millis(10))
            .await;
        assert_eq!(result, Err(PublishError::Full));
    }

    #[tokio::test]
    async fn test_offer_fails_closed_when_consumer_gone() {
        let (queue, receiver) = EventQueue::bounded(1);
        drop(receiver);

        let result = queue
            .offer(create_command(dec!(1)), Duration::from_millis(10))
            .await;
        assert_eq!(result, Err(PublishError::Closed));
    }

    #[tokio::test]
    async fn test_next_wakes_on_offer() {
        let (queue, mut receiver) = EventQueue::bounded(1);

        let consumer = tokio::spawn(async move { receiver.next().await });
        queue
            .offer(create_command(dec!(7)), Duration::from_millis(100))
            .await
            .unwrap();
        drop(queue);

        match consumer.await.unwrap() {
            Some(Command::Create { initial_amount, .. }) => assert_eq!(initial_amount, dec!(7)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

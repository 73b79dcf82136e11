use tokio::sync::oneshot;

use crate::error::TransferError;

/// One-shot result cell carried by every command.
///
/// The worker fulfils the cell exactly once; both `succeed` and `fail`
/// consume it, so a second fulfilment does not compile. Dropping an
/// unfulfilled cell (a command abandoned during shutdown) resolves the
/// awaiting side with an internal error instead of hanging it.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<Result<String, TransferError>>,
}

/// Awaitable side of a [`Completion`], held by the submitting edge handler.
#[derive(Debug)]
pub struct CompletionHandle {
    rx: oneshot::Receiver<Result<String, TransferError>>,
}

impl Completion {
    pub fn new() -> (Completion, CompletionHandle) {
        let (tx, rx) = oneshot::channel();
        (Completion { tx }, CompletionHandle { rx })
    }

    /// Deliver the serialized success payload.
    pub fn succeed(self, payload: String) {
        let _ = self.tx.send(Ok(payload));
    }

    /// Deliver a failure. The awaiting side may already be gone (the client
    /// disconnected); that is not an error for the worker.
    pub fn fail(self, error: TransferError) {
        let _ = self.tx.send(Err(error));
    }
}

impl CompletionHandle {
    /// Await the single outcome of the command.
    pub async fn wait(self) -> Result<String, TransferError> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransferError::Internal(
                "command abandoned before completion".to_string(),
            )),
        }
    }
}

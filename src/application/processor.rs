use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::command::Command;
use crate::domain::completion::Completion;
use crate::error::{Result, TransferError};
use crate::infrastructure::queue::CommandReceiver;
use crate::infrastructure::store::AccountStore;

/// Drives the single worker that drains the event queue and owns all
/// account state.
///
/// Lifecycle is `New -> Running -> Stopped`: `start` spawns exactly one
/// consumer task (idempotent, only effective from `New`), `close` signals it
/// to stop and waits for the in-flight command to finish. Commands still
/// queued at close time are abandoned; dropping their completions resolves
/// any awaiters.
pub struct Processor {
    parts: Option<(CommandReceiver, AccountStore)>,
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Processor {
    pub fn new(receiver: CommandReceiver, store: AccountStore) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            parts: Some((receiver, store)),
            shutdown,
            handle: None,
        }
    }

    /// Launch the worker. Subsequent calls (or a call after `close`) are
    /// no-ops.
    pub fn start(&mut self) {
        let Some((receiver, store)) = self.parts.take() else {
            return;
        };
        let shutdown = self.shutdown.subscribe();
        self.handle = Some(tokio::spawn(Worker::new(store).run(receiver, shutdown)));
        tracing::info!("processor started");
    }

    /// Stop dequeuing and wait for the worker to exit. Idempotent; valid in
    /// any state.
    pub async fn close(&mut self) {
        // Called before start: never start at all.
        self.parts = None;
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                tracing::error!(error = %err, "processor worker terminated abnormally");
            }
        }
        tracing::info!("processor stopped");
    }
}

/// The single-writer executor. Only one instance ever exists per processor
/// and it exclusively owns the account store, which is why no locking is
/// needed anywhere in the command path.
struct Worker {
    store: AccountStore,
}

impl Worker {
    fn new(store: AccountStore) -> Self {
        Self { store }
    }

    async fn run(mut self, mut receiver: CommandReceiver, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                command = receiver.next() => match command {
                    Some(command) => self.handle(command),
                    // All publishers dropped; nothing can arrive anymore.
                    None => break,
                },
            }
        }
    }

    /// Dispatch by tag and fulfil the completion. A failing command is
    /// reported through its completion and never takes the worker down.
    fn handle(&mut self, command: Command) {
        match command {
            Command::Create {
                initial_amount,
                completion,
            } => finish("create", self.create(initial_amount), completion),
            Command::Info { id, completion } => finish("info", self.info(id), completion),
            Command::Transfer {
                from,
                to,
                amount,
                completion,
            } => finish("transfer", self.transfer(from, to, amount), completion),
        }
    }

    fn create(&mut self, initial_amount: Decimal) -> Result<String> {
        let balance = Balance::new(initial_amount)?;
        let account = Account::new(AccountId::generate(), balance);
        let payload = serialize(&account)?;

        tracing::info!(account = %account.id, amount = %balance, "account created");
        self.store.put(account);
        Ok(payload)
    }

    fn info(&self, id: AccountId) -> Result<String> {
        let account = self.store.get(&id).ok_or(TransferError::NotFound(id))?;
        tracing::info!(account = %id, amount = %account.amount, "balance queried");
        serialize(account)
    }

    fn transfer(&mut self, from: AccountId, to: AccountId, amount: Decimal) -> Result<String> {
        let from_balance = self
            .store
            .get(&from)
            .ok_or(TransferError::NotFound(from))?
            .amount;
        let to_balance = self
            .store
            .get(&to)
            .ok_or(TransferError::NotFound(to))?
            .amount;
        if amount < Decimal::ZERO {
            return Err(TransferError::InvalidArgument(
                "transfer amount should not be less than 0".to_string(),
            ));
        }
        if from_balance.value() < amount {
            return Err(TransferError::InsufficientFunds {
                account: from,
                available: from_balance.value(),
                requested: amount,
            });
        }

        // Validated no-op: both sides of the payload show the same balance.
        if from == to {
            let account = self.store.get(&from).ok_or(TransferError::NotFound(from))?;
            return serialize(&[account.clone(), account.clone()]);
        }

        // The credit side is validated before anything mutates: a rejected
        // transfer must leave the sum of balances untouched.
        if to_balance.checked_add(amount).is_none() {
            return Err(TransferError::Internal(format!("balance overflow on {to}")));
        }

        // Debit first, then credit. Intermediate state is never observable
        // because nothing else runs on this worker.
        let from_account = self
            .store
            .get_mut(&from)
            .ok_or(TransferError::NotFound(from))?;
        from_account.debit(amount)?;
        let from_after = from_account.clone();

        let to_account = self.store.get_mut(&to).ok_or(TransferError::NotFound(to))?;
        to_account.credit(amount)?;
        let to_after = to_account.clone();

        tracing::info!(%from, %to, %amount, "transfer applied");
        serialize(&[from_after, to_after])
    }
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| TransferError::Internal(err.to_string()))
}

fn finish(operation: &str, result: Result<String>, completion: Completion) {
    match result {
        Ok(payload) => completion.succeed(payload),
        Err(error) => {
            tracing::warn!(%operation, %error, "command rejected");
            completion.fail(error);
        }
    }
}

use rust_decimal::Decimal;

use super::account::AccountId;
use super::completion::Completion;

/// A user intent placed on the event queue, carrying the completion that the
/// worker fulfils with the serialized result.
///
/// Closed set of shapes, dispatched by tag in the worker; amounts arrive
/// unvalidated and are checked inside the worker, not at the edge.
#[derive(Debug)]
pub enum Command {
    Create {
        initial_amount: Decimal,
        completion: Completion,
    },
    Info {
        id: AccountId,
        completion: Completion,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        completion: Completion,
    },
}

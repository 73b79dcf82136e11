use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransferError;

/// Opaque identifier of an account.
///
/// Ids are generated exclusively by the processor when it handles a create
/// command, so collisions in the store are impossible by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccountId {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TransferError::InvalidArgument(format!("malformed account id: {s}")))
    }
}

/// A non-negative monetary value with exact decimal precision.
///
/// Wrapper around `rust_decimal::Decimal` so that a negative balance is
/// unrepresentable. Serializes as a decimal string, never a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Fails with `InvalidArgument` on negative values.
    pub fn new(value: Decimal) -> Result<Self, TransferError> {
        if value < Decimal::ZERO {
            Err(TransferError::InvalidArgument(
                "amount should not be less than 0".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Exact addition; `None` on decimal overflow.
    pub fn checked_add(self, amount: Decimal) -> Option<Self> {
        self.0.checked_add(amount).map(Self)
    }

    /// Exact subtraction; `None` when the result would be negative.
    pub fn checked_sub(self, amount: Decimal) -> Option<Self> {
        match self.0.checked_sub(amount) {
            Some(result) if result >= Decimal::ZERO => Some(Self(result)),
            _ => None,
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The account aggregate: a unique id paired with a non-negative balance.
///
/// Created and mutated only by the processor worker; the wire shape is
/// `{"uuid": ..., "amount": ...}` with the amount as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "uuid")]
    pub id: AccountId,
    pub amount: Balance,
}

impl Account {
    pub fn new(id: AccountId, amount: Balance) -> Self {
        Self { id, amount }
    }

    /// Adds funds. The amount must already be validated as non-negative.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), TransferError> {
        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or_else(|| TransferError::Internal(format!("balance overflow on {}", self.id)))?;
        Ok(())
    }

    /// Removes funds if the balance suffices.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), TransferError> {
        self.amount =
            self.amount
                .checked_sub(amount)
                .ok_or_else(|| TransferError::InsufficientFunds {
                    account: self.id,
                    available: self.amount.value(),
                    requested: amount,
                })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_rejects_negative() {
        assert!(Balance::new(dec!(0)).is_ok());
        assert!(Balance::new(dec!(10.5)).is_ok());
        assert!(matches!(
            Balance::new(dec!(-0.01)),
            Err(TransferError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_balance_checked_sub_never_goes_negative() {
        let balance = Balance::new(dec!(5)).unwrap();
        assert_eq!(balance.checked_sub(dec!(5)), Some(Balance::ZERO));
        assert_eq!(balance.checked_sub(dec!(5.0001)), None);
    }

    #[test]
    fn test_account_credit_and_debit() {
        let mut account = Account::new(AccountId::generate(), Balance::new(dec!(100)).unwrap());
        account.credit(dec!(0.5)).unwrap();
        assert_eq!(account.amount, Balance::new(dec!(100.5)).unwrap());

        account.debit(dec!(100.5)).unwrap();
        assert_eq!(account.amount, Balance::ZERO);
    }

    #[test]
    fn test_account_debit_insufficient() {
        let id = AccountId::generate();
        let mut account = Account::new(id, Balance::new(dec!(10)).unwrap());

        let result = account.debit(dec!(20));
        assert_eq!(
            result,
            Err(TransferError::InsufficientFunds {
                account: id,
                available: dec!(10),
                requested: dec!(20),
            })
        );
        // Failed debit leaves the balance untouched.
        assert_eq!(account.amount, Balance::new(dec!(10)).unwrap());
    }

    #[test]
    fn test_account_wire_shape() {
        let account = Account::new(AccountId::generate(), Balance::new(dec!(70)).unwrap());
        let json = serde_json::to_string(&account).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["uuid"].as_str().unwrap(), account.id.to_string());
        // Decimal amounts travel as strings to preserve every digit.
        assert_eq!(value["amount"], serde_json::json!("70"));

        let roundtrip: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, account);
    }

    #[test]
    fn test_account_id_parsing() {
        let id = AccountId::generate();
        assert_eq!(id.to_string().parse::<AccountId>().unwrap(), id);
        assert!(matches!(
            "not-a-uuid".parse::<AccountId>(),
            Err(TransferError::InvalidArgument(_))
        ));
    }
}

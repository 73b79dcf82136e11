use std::collections::HashMap;

use crate::domain::account::{Account, AccountId};

/// In-memory account map.
///
/// Deliberately unsynchronized: every call comes from the single processor
/// worker, which owns the store outright. Ids are generated by the worker,
/// so `put` has no collision path at runtime.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<AccountId, Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn get_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        self.accounts.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Balance;
    use rust_decimal_macros::dec;

    #[test]
    fn test_put_and_get() {
        let mut store = AccountStore::new();
        let account = Account::new(AccountId::generate(), Balance::new(dec!(50)).unwrap());

        store.put(account.clone());
        assert_eq!(store.get(&account.id), Some(&account));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_absent() {
        let store = AccountStore::new();
        assert!(store.get(&AccountId::generate()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_mut_mutates_live_aggregate() {
        let mut store = AccountStore::new();
        let account = Account::new(AccountId::generate(), Balance::new(dec!(10)).unwrap());
        let id = account.id;
        store.put(account);

        store.get_mut(&id).unwrap().credit(dec!(5)).unwrap();
        assert_eq!(
            store.get(&id).unwrap().amount,
            Balance::new(dec!(15)).unwrap()
        );
    }
}

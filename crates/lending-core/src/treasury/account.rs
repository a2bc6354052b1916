use serde::{Deserialize, Serialize};

use crate::types::{BankAccountId, Money};

/// A treasury bucket: a bank account or a cash box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: BankAccountId,
    pub name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub is_cash: bool,
    pub balance: Money,
}

impl BankAccount {
    pub fn new(id: impl Into<BankAccountId>, name: impl Into<String>, balance: Money) -> Self {
        BankAccount {
            id: id.into(),
            name: name.into(),
            account_number: String::new(),
            is_cash: false,
            balance,
        }
    }

    pub fn cash_box(id: impl Into<BankAccountId>, name: impl Into<String>, balance: Money) -> Self {
        BankAccount {
            is_cash: true,
            ..BankAccount::new(id, name, balance)
        }
    }

    pub fn has_funds(&self, amount: Money) -> bool {
        self.balance >= amount
    }
}

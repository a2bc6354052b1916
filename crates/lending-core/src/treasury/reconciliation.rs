//! Treasury reconciliation.
//!
//! Accounts are never allowed to go negative: a withdrawal or disbursement
//! larger than the balance is refused outright, never clamped. Every
//! function returns updated copies and leaves its inputs untouched, so the
//! caller can persist the account together with the ledger entry or not at
//! all.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::BankAccount;
use crate::error::LendingError;
use crate::types::Money;
use crate::LendingResult;

#[cfg(feature = "ledger")]
use crate::ledger::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreasuryMovement {
    Deposit(Money),
    Withdrawal(Money),
}

/// Aggregate of all treasury buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryPosition {
    pub total: Money,
    pub cash_total: Money,
    pub bank_total: Money,
    pub account_count: usize,
}

pub fn ensure_funds(account: &BankAccount, amount: Money) -> LendingResult<()> {
    if account.has_funds(amount) {
        return Ok(());
    }
    tracing::warn!(
        account_id = %account.id,
        requested = %amount,
        available = %account.balance,
        "treasury withdrawal refused"
    );
    Err(LendingError::InsufficientTreasuryFunds {
        account_id: account.id.clone(),
        requested: amount,
        available: account.balance,
    })
}

pub fn apply_movement(
    account: &BankAccount,
    movement: TreasuryMovement,
) -> LendingResult<BankAccount> {
    let mut updated = account.clone();
    match movement {
        TreasuryMovement::Deposit(amount) => {
            check_non_negative(amount)?;
            updated.balance += amount;
        }
        TreasuryMovement::Withdrawal(amount) => {
            check_non_negative(amount)?;
            ensure_funds(account, amount)?;
            updated.balance -= amount;
        }
    }
    Ok(updated)
}

/// Move funds between two treasury buckets, e.g. bank to cash box.
pub fn transfer_between(
    from: &BankAccount,
    to: &BankAccount,
    amount: Money,
) -> LendingResult<(BankAccount, BankAccount)> {
    if from.id == to.id {
        return Err(LendingError::InvalidInput {
            field: "to".into(),
            reason: "Source and destination accounts must differ".into(),
        });
    }
    if amount <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "amount".into(),
            reason: "Transfer amount must be positive".into(),
        });
    }
    let debited = apply_movement(from, TreasuryMovement::Withdrawal(amount))?;
    let credited = apply_movement(to, TreasuryMovement::Deposit(amount))?;
    Ok((debited, credited))
}

pub fn treasury_position(accounts: &[BankAccount]) -> TreasuryPosition {
    let (cash_total, bank_total) =
        accounts
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(cash, bank), a| {
                if a.is_cash {
                    (cash + a.balance, bank)
                } else {
                    (cash, bank + a.balance)
                }
            });
    TreasuryPosition {
        total: cash_total + bank_total,
        cash_total,
        bank_total,
        account_count: accounts.len(),
    }
}

/// Apply a ledger entry's cash effect to the account it names.
#[cfg(feature = "ledger")]
pub fn reconcile_transaction(
    account: &BankAccount,
    transaction: &Transaction,
) -> LendingResult<BankAccount> {
    match (&transaction.bank_account_id, transaction.treasury_movement()) {
        (Some(id), _) if *id != account.id => Err(LendingError::InvalidInput {
            field: "bank_account_id".into(),
            reason: format!(
                "Transaction {} names account {id}, not {}",
                transaction.id, account.id
            ),
        }),
        (Some(_), None) => Err(LendingError::InvalidInput {
            field: "bank_account_id".into(),
            reason: format!(
                "Redirection {} does not move treasury funds",
                transaction.id
            ),
        }),
        (Some(_), Some(movement)) => apply_movement(account, movement),
        (None, _) => Err(LendingError::InvalidInput {
            field: "bank_account_id".into(),
            reason: format!("Transaction {} names no treasury account", transaction.id),
        }),
    }
}

fn check_non_negative(amount: Money) -> LendingResult<()> {
    if amount < Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "amount".into(),
            reason: "Treasury amounts cannot be negative".into(),
        });
    }
    Ok(())
}

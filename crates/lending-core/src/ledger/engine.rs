use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::event::TransactionDraft;
use super::transaction::{Transaction, TransactionType};
use crate::client::Client;
use crate::error::LendingError;
use crate::treasury::account::BankAccount;
use crate::treasury::reconciliation::ensure_funds;
use crate::types::*;
use crate::LendingResult;

/// Fields an authorized actor may change on a recorded transaction.
///
/// The type is fixed; replacing a disbursement with a payment is a delete
/// followed by an append.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_paid: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Append an event to the tail of a client's chain.
///
/// `prior_tail` is the client's latest transaction (`None` for a new loan)
/// and `treasury` the account the event names, if any. The returned
/// transaction carries the recomputed `balance_after`; on error nothing is
/// produced.
#[instrument(level = "debug", skip_all, fields(client_id = %client.id, transaction_id = %draft.id))]
pub fn append_transaction(
    client: &Client,
    prior_tail: Option<&Transaction>,
    draft: TransactionDraft,
    treasury: Option<&BankAccount>,
) -> LendingResult<Transaction> {
    if draft.client_id != client.id {
        return Err(LendingError::ChainIntegrityViolation(format!(
            "Transaction {} targets client {}, not {}",
            draft.id, draft.client_id, client.id
        )));
    }

    let prior_balance = match prior_tail {
        Some(tail) => {
            check_tail(client, tail, draft.date)?;
            tail.balance_after
        }
        None => Decimal::ZERO,
    };

    let resolved = draft.event.resolve(prior_balance)?;
    let transaction_type = resolved.transaction_type;

    if prior_tail.is_none() && transaction_type.requires_prior_chain() {
        return Err(LendingError::ChainIntegrityViolation(format!(
            "Client {} has no ledger chain to apply {:?} to",
            client.id, transaction_type
        )));
    }

    if transaction_type.reduces_principal() && resolved.amount > prior_balance {
        tracing::warn!(
            client_id = %client.id,
            requested = %resolved.amount,
            outstanding = %prior_balance,
            "overpayment rejected"
        );
        return Err(LendingError::OverpaymentRejected {
            requested: resolved.amount,
            outstanding: prior_balance,
        });
    }

    check_treasury(&resolved.bank_account_id, treasury, transaction_type, resolved.amount)?;

    Ok(Transaction {
        id: draft.id,
        client_id: draft.client_id,
        date: draft.date,
        transaction_type,
        amount: resolved.amount,
        interest_paid: resolved.interest_paid,
        capital_paid: transaction_type.capital_paid(resolved.amount),
        balance_after: transaction_type.apply(prior_balance, resolved.amount),
        bank_account_id: resolved.bank_account_id,
        related_client_id: resolved.related_client_id,
        redirection_id: resolved.redirection_id,
        receipt: draft.receipt,
        notes: draft.notes,
    })
}

/// Re-walk a client's chain and rewrite every `balance_after`.
///
/// Entries are ordered by date; same-day entries keep their relative order.
/// A settlement's amount is reset to the balance it closes, and lending
/// entries are relabelled DISBURSEMENT or REFINANCE by the balance before
/// them. Replaying the result is a no-op.
#[instrument(level = "debug", skip(transactions), fields(entries = transactions.len()))]
pub fn recompute_chain(
    client_id: &str,
    transactions: &[Transaction],
) -> LendingResult<Vec<Transaction>> {
    let mut chain = transactions.to_vec();
    if let Some(foreign) = chain.iter().find(|t| t.client_id != client_id) {
        return Err(LendingError::ChainIntegrityViolation(format!(
            "Transaction {} belongs to client {}, not {client_id}",
            foreign.id, foreign.client_id
        )));
    }
    chain.sort_by_key(|t| t.date);

    let mut balance = Decimal::ZERO;
    let mut rewritten = 0usize;
    for tx in chain.iter_mut() {
        if tx.amount < Decimal::ZERO || tx.interest_paid < Decimal::ZERO {
            return Err(LendingError::InvalidInput {
                field: "amount".into(),
                reason: format!("Transaction {} carries a negative amount", tx.id),
            });
        }
        if tx.transaction_type.reduces_principal() && tx.amount > balance {
            tracing::warn!(
                client_id,
                transaction_id = %tx.id,
                requested = %tx.amount,
                outstanding = %balance,
                "chain would go negative"
            );
            return Err(LendingError::OverpaymentRejected {
                requested: tx.amount,
                outstanding: balance,
            });
        }
        // Settlements close whatever is outstanding when they are reached;
        // lending on a live balance is a refinance wherever it lands
        let (amount, transaction_type) = match tx.transaction_type {
            TransactionType::Settlement => (balance, TransactionType::Settlement),
            TransactionType::Disbursement | TransactionType::Refinance if balance > Decimal::ZERO => {
                (tx.amount, TransactionType::Refinance)
            }
            TransactionType::Disbursement | TransactionType::Refinance => {
                (tx.amount, TransactionType::Disbursement)
            }
            other => (tx.amount, other),
        };
        balance = transaction_type.apply(balance, amount);
        let capital_paid = transaction_type.capital_paid(amount);
        if tx.balance_after != balance
            || tx.capital_paid != capital_paid
            || tx.amount != amount
            || tx.transaction_type != transaction_type
        {
            rewritten += 1;
        }
        tx.amount = amount;
        tx.transaction_type = transaction_type;
        tx.balance_after = balance;
        tx.capital_paid = capital_paid;
    }

    tracing::debug!(client_id, rewritten, "chain recomputed");
    Ok(chain)
}

/// Apply an edit to one transaction and return the recomputed chain.
pub fn edit_transaction(
    client_id: &str,
    chain: &[Transaction],
    transaction_id: &str,
    edit: &TransactionEdit,
) -> LendingResult<Vec<Transaction>> {
    let mut edited = chain.to_vec();
    let tx = edited
        .iter_mut()
        .find(|t| t.id == transaction_id)
        .ok_or_else(|| not_found(transaction_id))?;

    if let Some(date) = edit.date {
        tx.date = date;
    }
    if let Some(amount) = edit.amount {
        if tx.transaction_type == TransactionType::PaymentInterest && !amount.is_zero() {
            return Err(LendingError::InvalidInput {
                field: "amount".into(),
                reason: "Interest-only payments carry no capital; edit interest_paid".into(),
            });
        }
        tx.amount = amount;
    }
    if let Some(interest) = edit.interest_paid {
        tx.interest_paid = interest;
    }
    if let Some(receipt) = &edit.receipt {
        tx.receipt = Some(receipt.clone());
    }
    if let Some(notes) = &edit.notes {
        tx.notes = notes.clone();
    }

    recompute_chain(client_id, &edited)
}

/// Remove one transaction and return the recomputed chain.
pub fn delete_transaction(
    client_id: &str,
    chain: &[Transaction],
    transaction_id: &str,
) -> LendingResult<Vec<Transaction>> {
    if !chain.iter().any(|t| t.id == transaction_id) {
        return Err(not_found(transaction_id));
    }
    let remaining: Vec<Transaction> = chain
        .iter()
        .filter(|t| t.id != transaction_id)
        .cloned()
        .collect();
    recompute_chain(client_id, &remaining)
}

/// Check that the stored balances match a fresh walk of the chain.
pub fn verify_chain(client_id: &str, chain: &[Transaction]) -> LendingResult<()> {
    let mut ordered = chain.to_vec();
    ordered.sort_by_key(|t| t.date);
    let recomputed = recompute_chain(client_id, &ordered)?;
    for (stored, fresh) in ordered.iter().zip(recomputed.iter()) {
        if stored.balance_after != fresh.balance_after {
            return Err(LendingError::ChainIntegrityViolation(format!(
                "Transaction {} records balance {} but the chain yields {}",
                stored.id, stored.balance_after, fresh.balance_after
            )));
        }
    }
    Ok(())
}

/// Latest transaction of a chain, the one new entries are appended after.
pub fn chain_tail(chain: &[Transaction]) -> Option<&Transaction> {
    // max_by_key returns the last of equal maxima, matching stable date order
    chain.iter().max_by_key(|t| t.date)
}

/// Outstanding balance according to the chain tail.
pub fn outstanding_balance(chain: &[Transaction]) -> Money {
    chain_tail(chain)
        .map(|t| t.balance_after)
        .unwrap_or(Decimal::ZERO)
}

fn check_tail(client: &Client, tail: &Transaction, date: NaiveDate) -> LendingResult<()> {
    if tail.client_id != client.id {
        return Err(LendingError::ChainIntegrityViolation(format!(
            "Chain tail {} belongs to client {}, not {}",
            tail.id, tail.client_id, client.id
        )));
    }
    if date < tail.date {
        return Err(LendingError::ChainIntegrityViolation(format!(
            "Transaction dated {date} precedes chain tail {} dated {}",
            tail.id, tail.date
        )));
    }
    if tail.balance_after < Decimal::ZERO {
        return Err(LendingError::ChainIntegrityViolation(format!(
            "Chain tail {} has negative balance {}",
            tail.id, tail.balance_after
        )));
    }
    Ok(())
}

fn check_treasury(
    named: &Option<BankAccountId>,
    treasury: Option<&BankAccount>,
    transaction_type: TransactionType,
    amount: Money,
) -> LendingResult<()> {
    match (named, treasury) {
        (None, None) => Ok(()),
        (Some(id), None) => Err(LendingError::InvalidInput {
            field: "bank_account_id".into(),
            reason: format!("Account {id} is named but was not supplied"),
        }),
        (None, Some(account)) => Err(LendingError::InvalidInput {
            field: "bank_account_id".into(),
            reason: format!("Account {} supplied but the event names none", account.id),
        }),
        (Some(id), Some(account)) if *id != account.id => Err(LendingError::InvalidInput {
            field: "bank_account_id".into(),
            reason: format!("Event names account {id} but {} was supplied", account.id),
        }),
        (Some(_), Some(account)) => {
            let outflow = matches!(
                transaction_type,
                TransactionType::Disbursement | TransactionType::Refinance
            );
            if outflow {
                ensure_funds(account, amount)
            } else {
                Ok(())
            }
        }
    }
}

fn not_found(transaction_id: &str) -> LendingError {
    LendingError::InvalidInput {
        field: "transaction_id".into(),
        reason: format!("Transaction {transaction_id} not found in chain"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::event::{DisbursementEvent, LedgerEvent, PaymentEvent};
    use rust_decimal_macros::dec;

    fn client() -> Client {
        Client::new(
            "c-1",
            "Marta",
            dec!(10),
            InterestMethod::Fixed,
            PaymentFrequency::Monthly,
            2,
        )
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn draft(id: &str, day: u32, event: LedgerEvent) -> TransactionDraft {
        TransactionDraft {
            id: id.into(),
            client_id: "c-1".into(),
            date: date(day),
            event,
            receipt: None,
            notes: String::new(),
        }
    }

    fn disburse(amount: Money) -> LedgerEvent {
        LedgerEvent::Disbursement(DisbursementEvent {
            amount,
            bank_account_id: None,
        })
    }

    fn pay(capital: Money, interest: Money) -> LedgerEvent {
        LedgerEvent::Payment(PaymentEvent {
            capital,
            interest,
            bank_account_id: None,
        })
    }

    #[test]
    fn test_append_first_disbursement() {
        let tx = append_transaction(&client(), None, draft("t1", 1, disburse(dec!(1_000_000))), None)
            .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Disbursement);
        assert_eq!(tx.balance_after, dec!(1_000_000));
        assert_eq!(tx.capital_paid, Decimal::ZERO);
    }

    #[test]
    fn test_payment_splits_capital_and_interest() {
        let c = client();
        let t1 = append_transaction(&c, None, draft("t1", 1, disburse(dec!(1_000_000))), None).unwrap();
        let t2 = append_transaction(&c, Some(&t1), draft("t2", 5, pay(dec!(500_000), dec!(100_000))), None)
            .unwrap();
        assert_eq!(t2.transaction_type, TransactionType::PaymentCapital);
        assert_eq!(t2.balance_after, dec!(500_000));
        assert_eq!(t2.capital_paid, dec!(500_000));
        assert_eq!(t2.interest_paid, dec!(100_000));
    }

    #[test]
    fn test_overpayment_rejected() {
        let c = client();
        let t1 = append_transaction(&c, None, draft("t1", 1, disburse(dec!(100_000))), None).unwrap();
        let err = append_transaction(&c, Some(&t1), draft("t2", 2, pay(dec!(100_001), dec!(0))), None)
            .unwrap_err();
        assert!(matches!(err, LendingError::OverpaymentRejected { .. }));
    }

    #[test]
    fn test_out_of_order_date_rejected() {
        let c = client();
        let t1 = append_transaction(&c, None, draft("t1", 10, disburse(dec!(100_000))), None).unwrap();
        let err = append_transaction(&c, Some(&t1), draft("t2", 9, pay(dec!(1), dec!(0))), None)
            .unwrap_err();
        assert!(matches!(err, LendingError::ChainIntegrityViolation(_)));
    }

    #[test]
    fn test_payment_without_chain_rejected() {
        let err = append_transaction(&client(), None, draft("t1", 1, pay(dec!(0), dec!(5))), None)
            .unwrap_err();
        assert!(matches!(err, LendingError::ChainIntegrityViolation(_)));
    }

    #[test]
    fn test_recompute_reorders_and_rewrites() {
        let c = client();
        let t1 = append_transaction(&c, None, draft("t1", 1, disburse(dec!(300))), None).unwrap();
        let t2 = append_transaction(&c, Some(&t1), draft("t2", 2, pay(dec!(100), dec!(0))), None).unwrap();
        let t3 = append_transaction(&c, Some(&t2), draft("t3", 3, pay(dec!(50), dec!(5))), None).unwrap();

        let mut corrupted = vec![t3, t1, t2];
        corrupted[0].balance_after = dec!(999);

        let chain = recompute_chain("c-1", &corrupted).unwrap();
        let ids: Vec<&str> = chain.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
        assert_eq!(chain[2].balance_after, dec!(150));
    }

    #[test]
    fn test_delete_makes_later_payment_overpay() {
        let c = client();
        let t1 = append_transaction(&c, None, draft("t1", 1, disburse(dec!(300))), None).unwrap();
        let t2 = append_transaction(&c, Some(&t1), draft("t2", 2, pay(dec!(100), dec!(0))), None).unwrap();
        let err = delete_transaction("c-1", &[t1, t2], "t1").unwrap_err();
        assert!(matches!(err, LendingError::OverpaymentRejected { .. }));
    }

    #[test]
    fn test_verify_chain_detects_tampering() {
        let c = client();
        let t1 = append_transaction(&c, None, draft("t1", 1, disburse(dec!(300))), None).unwrap();
        let mut t2 = append_transaction(&c, Some(&t1), draft("t2", 2, pay(dec!(100), dec!(0))), None)
            .unwrap();
        assert!(verify_chain("c-1", &[t1.clone(), t2.clone()]).is_ok());
        t2.balance_after = dec!(250);
        assert!(verify_chain("c-1", &[t1, t2]).is_err());
    }

    #[test]
    fn test_chain_tail_prefers_latest_same_day_entry() {
        let c = client();
        let t1 = append_transaction(&c, None, draft("t1", 1, disburse(dec!(300))), None).unwrap();
        let t2 = append_transaction(&c, Some(&t1), draft("t2", 1, pay(dec!(100), dec!(0))), None).unwrap();
        let chain = vec![t1, t2];
        assert_eq!(chain_tail(&chain).map(|t| t.id.as_str()), Some("t2"));
        assert_eq!(outstanding_balance(&chain), dec!(200));
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::posting::{book, Posting};
use crate::amortization::projection::compute_projection;
use crate::client::Client;
use crate::config::LendingConfig;
use crate::error::LendingError;
use crate::ledger::event::{
    DisbursementEvent, LedgerEvent, PaymentEvent, SettlementEvent, TransactionDraft,
};
use crate::ledger::transaction::{Transaction, TransactionType};
use crate::schedule::next_due_date;
use crate::treasury::account::BankAccount;
use crate::types::*;
use crate::LendingResult;

/// New money lent to an existing client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisbursementRequest {
    pub transaction_id: TransactionId,
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRequest {
    pub transaction_id: TransactionId,
    pub date: NaiveDate,
    #[serde(default)]
    pub capital: Money,
    #[serde(default)]
    pub interest: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub transaction_id: TransactionId,
    pub date: NaiveDate,
    #[serde(default)]
    pub interest: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Lend more to an existing client.
///
/// Booked as `DISBURSEMENT` when the client owes nothing and `REFINANCE`
/// otherwise. The cached installment is re-projected on the new balance and
/// the payment schedule restarts from the disbursement date.
pub fn disburse(
    client: &Client,
    tail: Option<&Transaction>,
    request: &DisbursementRequest,
    treasury: Option<&BankAccount>,
    config: &LendingConfig,
) -> LendingResult<ComputationOutput<Posting>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let draft = TransactionDraft {
        id: request.transaction_id.clone(),
        client_id: client.id.clone(),
        date: request.date,
        event: LedgerEvent::Disbursement(DisbursementEvent {
            amount: request.amount,
            bank_account_id: request.bank_account_id.clone(),
        }),
        receipt: request.receipt.clone(),
        notes: request.notes.clone(),
    };
    let (transaction, account) = book(client, tail, draft, treasury)?;

    let outstanding = transaction.balance_after;
    if client.exceeds_credit_limit(outstanding) {
        let message = format!(
            "Outstanding {outstanding} exceeds credit limit {}",
            client.credit_limit.unwrap_or_default()
        );
        if config.enforce_credit_limit {
            return Err(LendingError::InvalidInput {
                field: "amount".into(),
                reason: message,
            });
        }
        warnings.push(message);
    }

    let mut updated = client.clone();
    let projection = compute_projection(&updated.loan_terms(outstanding))?;
    updated.apply_projection(&projection);
    updated.status = ClientStatus::Active;
    if transaction.transaction_type == TransactionType::Disbursement {
        updated.credit_start_date = Some(request.date);
    }
    updated.next_payment_date = Some(next_due_date(request.date, updated.payment_frequency));

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Disbursement",
        &serde_json::json!({
            "amount": request.amount.to_string(),
            "type": transaction.transaction_type,
            "outstanding": outstanding.to_string(),
        }),
        warnings,
        elapsed,
        Posting {
            client: updated,
            transaction,
            account,
            redirection_id: None,
        },
    ))
}

/// Record a collection and advance the client's next due date.
pub fn collect_payment(
    client: &Client,
    tail: Option<&Transaction>,
    request: &CollectionRequest,
    treasury: Option<&BankAccount>,
) -> LendingResult<ComputationOutput<Posting>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let draft = TransactionDraft {
        id: request.transaction_id.clone(),
        client_id: client.id.clone(),
        date: request.date,
        event: LedgerEvent::Payment(PaymentEvent {
            capital: request.capital,
            interest: request.interest,
            bank_account_id: request.bank_account_id.clone(),
        }),
        receipt: request.receipt.clone(),
        notes: request.notes.clone(),
    };
    let (transaction, account) = book(client, tail, draft, treasury)?;

    let collected = transaction.cash_amount();
    if collected < client.installment_amount && transaction.balance_after > Decimal::ZERO {
        warnings.push(format!(
            "Collected {collected} is below the {} installment",
            client.installment_amount
        ));
    }
    if transaction.balance_after.is_zero() {
        warnings.push("Capital fully repaid; settle the loan to close it".into());
    }

    let mut updated = client.clone();
    let from = client.next_payment_date.unwrap_or(request.date);
    updated.next_payment_date = Some(next_due_date(from, client.payment_frequency));

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Payment collection",
        &serde_json::json!({
            "capital": request.capital.to_string(),
            "interest": request.interest.to_string(),
            "type": transaction.transaction_type,
        }),
        warnings,
        elapsed,
        Posting {
            client: updated,
            transaction,
            account,
            redirection_id: None,
        },
    ))
}

/// Close a loan: the outstanding capital is collected and the client goes
/// inactive.
pub fn settle_loan(
    client: &Client,
    tail: Option<&Transaction>,
    request: &SettlementRequest,
    treasury: Option<&BankAccount>,
) -> LendingResult<ComputationOutput<Posting>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let draft = TransactionDraft {
        id: request.transaction_id.clone(),
        client_id: client.id.clone(),
        date: request.date,
        event: LedgerEvent::Settlement(SettlementEvent {
            interest: request.interest,
            bank_account_id: request.bank_account_id.clone(),
        }),
        receipt: request.receipt.clone(),
        notes: request.notes.clone(),
    };
    let (transaction, account) = book(client, tail, draft, treasury)?;

    if client.is_awaiting_redirection() {
        warnings.push(format!(
            "Client is still owed {} through a redirection",
            client.pending_redirection_balance
        ));
    }

    let mut updated = client.clone();
    updated.status = ClientStatus::Inactive;
    updated.next_payment_date = None;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan settlement",
        &serde_json::json!({
            "capital_closed": transaction.amount.to_string(),
            "interest": request.interest.to_string(),
        }),
        warnings,
        elapsed,
        Posting {
            client: updated,
            transaction,
            account,
            redirection_id: None,
        },
    ))
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::Client;
use crate::error::LendingError;
use crate::ledger::engine::append_transaction;
use crate::ledger::event::{LedgerEvent, RedirectionDirection, RedirectionEvent, TransactionDraft};
use crate::ledger::transaction::Transaction;
use crate::treasury::account::BankAccount;
use crate::treasury::reconciliation::{apply_movement, TreasuryMovement};
use crate::types::*;
use crate::LendingResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectionTransition {
    /// NONE to WAITING
    Established,
    /// Still WAITING with a smaller pending balance
    PartiallyFunded,
    /// Pending balance reached zero; back to NONE
    Resolved,
}

/// Book debt on a client to be funded by other clients' collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectionOpening {
    pub transaction_id: TransactionId,
    pub date: NaiveDate,
    pub amount: Money,
    pub wait_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_client_id: Option<ClientId>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenedRedirection {
    pub redirection_id: RedirectionId,
    pub client: Client,
    pub transaction: Transaction,
    pub transition: RedirectionTransition,
}

/// A payment collected from one client and handed to a waiting one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedPayment {
    pub transaction_id: TransactionId,
    pub date: NaiveDate,
    #[serde(default)]
    pub capital: Money,
    #[serde(default)]
    pub interest: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Both sides of a routed payment. Persist together or not at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectionTransfer {
    pub redirection_id: RedirectionId,
    pub out_leg: Transaction,
    pub target: Client,
    pub transition: RedirectionTransition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryDelivery {
    pub client: Client,
    pub account: BankAccount,
    pub transition: RedirectionTransition,
}

/// Write the `REDIRECT_IN` leg and put the client in WAITING.
#[instrument(level = "debug", skip_all, fields(client_id = %client.id))]
pub fn open_redirection(
    client: &Client,
    tail: Option<&Transaction>,
    opening: RedirectionOpening,
) -> LendingResult<OpenedRedirection> {
    if client.is_awaiting_redirection() {
        return Err(LendingError::InvalidInput {
            field: "client_id".into(),
            reason: format!(
                "Client {} is already awaiting {} through a redirection",
                client.id, client.pending_redirection_balance
            ),
        });
    }

    let redirection_id = RedirectionId::new();
    let draft = TransactionDraft {
        id: opening.transaction_id,
        client_id: client.id.clone(),
        date: opening.date,
        event: LedgerEvent::Redirection(RedirectionEvent {
            direction: RedirectionDirection::In,
            amount: opening.amount,
            interest: Decimal::ZERO,
            related_client_id: opening.source_client_id,
            redirection_id,
        }),
        receipt: None,
        notes: opening.notes,
    };
    let transaction = append_transaction(client, tail, draft, None)?;

    let mut updated = client.clone();
    updated.pending_redirection_balance = opening.amount;
    updated.redirection_wait_days = opening.wait_days;
    updated.active_redirection_id = Some(redirection_id);

    tracing::debug!(%redirection_id, amount = %opening.amount, "redirection established");
    Ok(OpenedRedirection {
        redirection_id,
        client: updated,
        transaction,
        transition: RedirectionTransition::Established,
    })
}

/// Route a payment from `source` to the waiting `target`.
///
/// Writes the `REDIRECT_OUT` leg on the source, correlated with the
/// target's open `REDIRECT_IN` leg, and reduces the target's pending balance
/// by the cash routed (capital plus interest).
#[instrument(level = "debug", skip_all, fields(source_id = %source.id, target_id = %target.id))]
pub fn redirect_payment(
    source: &Client,
    source_tail: Option<&Transaction>,
    target: &Client,
    payment: &RoutedPayment,
) -> LendingResult<RedirectionTransfer> {
    if source.id == target.id {
        return Err(LendingError::InvalidInput {
            field: "target".into(),
            reason: "A client cannot fund its own redirection".into(),
        });
    }
    let redirection_id = match target.active_redirection_id {
        Some(id) if target.is_awaiting_redirection() => id,
        _ => {
            return Err(LendingError::InvalidInput {
                field: "target".into(),
                reason: format!("Client {} is not awaiting a redirection", target.id),
            })
        }
    };

    let cash = payment.capital + payment.interest;
    if cash > target.pending_redirection_balance {
        return Err(LendingError::InvalidInput {
            field: "capital".into(),
            reason: format!(
                "Routing {cash} exceeds the {} client {} is owed",
                target.pending_redirection_balance, target.id
            ),
        });
    }

    let draft = TransactionDraft {
        id: payment.transaction_id.clone(),
        client_id: source.id.clone(),
        date: payment.date,
        event: LedgerEvent::Redirection(RedirectionEvent {
            direction: RedirectionDirection::Out,
            amount: payment.capital,
            interest: payment.interest,
            related_client_id: Some(target.id.clone()),
            redirection_id,
        }),
        receipt: payment.receipt.clone(),
        notes: payment.notes.clone(),
    };
    let out_leg = append_transaction(source, source_tail, draft, None)?;

    let (target, transition) = reduce_pending(target, cash);
    tracing::debug!(%redirection_id, routed = %cash, ?transition, "payment redirected");

    Ok(RedirectionTransfer {
        redirection_id,
        out_leg,
        target,
        transition,
    })
}

/// Hand a waiting client their funds from treasury instead of from other
/// clients' collections. The debt was already booked by the `REDIRECT_IN`
/// leg, so no ledger entry is written.
pub fn deliver_from_treasury(
    client: &Client,
    account: &BankAccount,
    amount: Money,
) -> LendingResult<TreasuryDelivery> {
    if amount <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "amount".into(),
            reason: "Delivered amount must be positive".into(),
        });
    }
    if amount > client.pending_redirection_balance {
        return Err(LendingError::InvalidInput {
            field: "amount".into(),
            reason: format!(
                "Client {} is owed {}, cannot deliver {amount}",
                client.id, client.pending_redirection_balance
            ),
        });
    }

    let account = apply_movement(account, TreasuryMovement::Withdrawal(amount))?;
    let (client, transition) = reduce_pending(client, amount);
    Ok(TreasuryDelivery {
        client,
        account,
        transition,
    })
}

fn reduce_pending(client: &Client, amount: Money) -> (Client, RedirectionTransition) {
    let mut updated = client.clone();
    updated.pending_redirection_balance -= amount;
    if updated.pending_redirection_balance <= Decimal::ZERO {
        updated.pending_redirection_balance = Decimal::ZERO;
        updated.redirection_wait_days = 0;
        updated.active_redirection_id = None;
        (updated, RedirectionTransition::Resolved)
    } else {
        (updated, RedirectionTransition::PartiallyFunded)
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::treasury::reconciliation::TreasuryMovement;
use crate::types::*;

/// Ledger entry kinds and their effect on the outstanding balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// New debt on a client with no outstanding balance
    Disbursement,
    /// New principal on top of existing debt
    Refinance,
    PaymentCapital,
    /// Interest-only collection; never moves the balance
    PaymentInterest,
    /// Collected from this client and routed to fund another client
    RedirectOut,
    /// Debt funded by another client's routed payment instead of treasury
    RedirectIn,
    /// Loan closure
    Settlement,
}

impl TransactionType {
    /// Balance after applying an entry of this type for `amount` on top of `prior`.
    pub fn apply(&self, prior: Money, amount: Money) -> Money {
        match self {
            TransactionType::Disbursement
            | TransactionType::Refinance
            | TransactionType::RedirectIn => prior + amount,
            TransactionType::PaymentCapital | TransactionType::RedirectOut => prior - amount,
            TransactionType::PaymentInterest => prior,
            TransactionType::Settlement => Decimal::ZERO,
        }
    }

    pub fn reduces_principal(&self) -> bool {
        matches!(
            self,
            TransactionType::PaymentCapital | TransactionType::RedirectOut
        )
    }

    pub fn creates_debt(&self) -> bool {
        matches!(
            self,
            TransactionType::Disbursement | TransactionType::Refinance | TransactionType::RedirectIn
        )
    }

    pub fn is_redirection(&self) -> bool {
        matches!(
            self,
            TransactionType::RedirectOut | TransactionType::RedirectIn
        )
    }

    /// Entries that only make sense once the client owes something.
    pub fn requires_prior_chain(&self) -> bool {
        matches!(
            self,
            TransactionType::PaymentCapital
                | TransactionType::PaymentInterest
                | TransactionType::RedirectOut
                | TransactionType::Settlement
        )
    }

    /// Capital component recorded in `capital_paid`.
    pub fn capital_paid(&self, amount: Money) -> Money {
        match self {
            TransactionType::PaymentCapital
            | TransactionType::RedirectOut
            | TransactionType::Settlement => amount,
            _ => Decimal::ZERO,
        }
    }
}

/// One immutable ledger entry owned by a single client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub client_id: ClientId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Principal-affecting portion
    pub amount: Money,
    #[serde(default)]
    pub interest_paid: Money,
    #[serde(default)]
    pub capital_paid: Money,
    pub balance_after: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_client_id: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirection_id: Option<RedirectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl Transaction {
    /// Cash this entry moves in or out of its treasury account.
    ///
    /// Collections bring in capital and interest; redirect legs never touch
    /// treasury.
    pub fn treasury_movement(&self) -> Option<TreasuryMovement> {
        match self.transaction_type {
            TransactionType::Disbursement | TransactionType::Refinance => {
                Some(TreasuryMovement::Withdrawal(self.amount))
            }
            TransactionType::PaymentCapital
            | TransactionType::PaymentInterest
            | TransactionType::Settlement => {
                Some(TreasuryMovement::Deposit(self.amount + self.interest_paid))
            }
            TransactionType::RedirectOut | TransactionType::RedirectIn => None,
        }
    }

    /// Cash handled by the event: capital plus interest.
    pub fn cash_amount(&self) -> Money {
        self.amount + self.interest_paid
    }
}

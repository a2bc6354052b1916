use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionType;
use crate::error::LendingError;
use crate::types::*;
use crate::LendingResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementEvent {
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
}

/// A collection with a capital and an interest component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    #[serde(default)]
    pub capital: Money,
    #[serde(default)]
    pub interest: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectionDirection {
    /// Payment collected from this client, routed to `related_client_id`
    Out,
    /// Debt on this client funded by `related_client_id` rather than treasury
    In,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectionEvent {
    pub direction: RedirectionDirection,
    pub amount: Money,
    #[serde(default)]
    pub interest: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_client_id: Option<ClientId>,
    pub redirection_id: RedirectionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementEvent {
    /// Interest collected together with the closing capital
    #[serde(default)]
    pub interest: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
}

/// A monetary event on a client's loan. Each variant carries only the
/// fields that make sense for it; the stored [`TransactionType`] is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEvent {
    Disbursement(DisbursementEvent),
    Payment(PaymentEvent),
    Redirection(RedirectionEvent),
    Settlement(SettlementEvent),
}

/// Everything needed to append an event to a client's chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub id: TransactionId,
    pub client_id: ClientId,
    pub date: NaiveDate,
    pub event: LedgerEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// An event resolved against the prior balance.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedEvent {
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub interest_paid: Money,
    pub bank_account_id: Option<BankAccountId>,
    pub related_client_id: Option<ClientId>,
    pub redirection_id: Option<RedirectionId>,
}

impl LedgerEvent {
    pub fn bank_account_id(&self) -> Option<&BankAccountId> {
        match self {
            LedgerEvent::Disbursement(e) => e.bank_account_id.as_ref(),
            LedgerEvent::Payment(e) => e.bank_account_id.as_ref(),
            LedgerEvent::Settlement(e) => e.bank_account_id.as_ref(),
            LedgerEvent::Redirection(_) => None,
        }
    }

    pub(crate) fn resolve(&self, prior_balance: Money) -> LendingResult<ResolvedEvent> {
        match self {
            LedgerEvent::Disbursement(e) => {
                require_positive("amount", e.amount)?;
                let transaction_type = if prior_balance > Decimal::ZERO {
                    TransactionType::Refinance
                } else {
                    TransactionType::Disbursement
                };
                Ok(ResolvedEvent {
                    transaction_type,
                    amount: e.amount,
                    interest_paid: Decimal::ZERO,
                    bank_account_id: e.bank_account_id.clone(),
                    related_client_id: None,
                    redirection_id: None,
                })
            }
            LedgerEvent::Payment(e) => {
                require_non_negative("capital", e.capital)?;
                require_non_negative("interest", e.interest)?;
                let transaction_type = if e.capital > Decimal::ZERO {
                    TransactionType::PaymentCapital
                } else if e.interest > Decimal::ZERO {
                    TransactionType::PaymentInterest
                } else {
                    return Err(LendingError::InvalidInput {
                        field: "payment".into(),
                        reason: "Payment must collect capital, interest or both".into(),
                    });
                };
                Ok(ResolvedEvent {
                    transaction_type,
                    amount: e.capital,
                    interest_paid: e.interest,
                    bank_account_id: e.bank_account_id.clone(),
                    related_client_id: None,
                    redirection_id: None,
                })
            }
            LedgerEvent::Redirection(e) => {
                require_non_negative("interest", e.interest)?;
                let transaction_type = match e.direction {
                    RedirectionDirection::Out => {
                        require_non_negative("amount", e.amount)?;
                        if (e.amount + e.interest).is_zero() {
                            return Err(LendingError::InvalidInput {
                                field: "amount".into(),
                                reason: "Redirected payment cannot be empty".into(),
                            });
                        }
                        TransactionType::RedirectOut
                    }
                    RedirectionDirection::In => {
                        require_positive("amount", e.amount)?;
                        TransactionType::RedirectIn
                    }
                };
                Ok(ResolvedEvent {
                    transaction_type,
                    amount: e.amount,
                    interest_paid: e.interest,
                    bank_account_id: None,
                    related_client_id: e.related_client_id.clone(),
                    redirection_id: Some(e.redirection_id),
                })
            }
            LedgerEvent::Settlement(e) => {
                require_non_negative("interest", e.interest)?;
                Ok(ResolvedEvent {
                    transaction_type: TransactionType::Settlement,
                    amount: prior_balance,
                    interest_paid: e.interest,
                    bank_account_id: e.bank_account_id.clone(),
                    related_client_id: None,
                    redirection_id: None,
                })
            }
        }
    }
}

fn require_positive(field: &str, value: Money) -> LendingResult<()> {
    if value <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: field.into(),
            reason: "Must be positive".into(),
        });
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Money) -> LendingResult<()> {
    if value < Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: field.into(),
            reason: "Cannot be negative".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_disbursement_becomes_refinance_on_open_debt() {
        let event = LedgerEvent::Disbursement(DisbursementEvent {
            amount: dec!(100_000),
            bank_account_id: None,
        });
        assert_eq!(
            event.resolve(Decimal::ZERO).unwrap().transaction_type,
            TransactionType::Disbursement
        );
        assert_eq!(
            event.resolve(dec!(1)).unwrap().transaction_type,
            TransactionType::Refinance
        );
    }

    #[test]
    fn test_interest_only_payment() {
        let event = LedgerEvent::Payment(PaymentEvent {
            capital: Decimal::ZERO,
            interest: dec!(25_000),
            bank_account_id: None,
        });
        let resolved = event.resolve(dec!(500_000)).unwrap();
        assert_eq!(resolved.transaction_type, TransactionType::PaymentInterest);
        assert_eq!(resolved.amount, Decimal::ZERO);
        assert_eq!(resolved.interest_paid, dec!(25_000));
    }

    #[test]
    fn test_empty_payment_rejected() {
        let event = LedgerEvent::Payment(PaymentEvent {
            capital: Decimal::ZERO,
            interest: Decimal::ZERO,
            bank_account_id: None,
        });
        assert!(event.resolve(dec!(1)).is_err());
    }

    #[test]
    fn test_settlement_closes_prior_balance() {
        let event = LedgerEvent::Settlement(SettlementEvent {
            interest: dec!(10),
            bank_account_id: None,
        });
        let resolved = event.resolve(dec!(42_000)).unwrap();
        assert_eq!(resolved.amount, dec!(42_000));
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{"kind": "PAYMENT", "capital": "50000", "interest": "10000", "bank_account_id": "b1"}"#;
        let event: LedgerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.bank_account_id().map(String::as_str), Some("b1"));
    }
}

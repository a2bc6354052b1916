use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::projection::{LoanProjection, LoanTermsInput};
use crate::types::*;

/// A borrower and the terms of their current loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    #[serde(default)]
    pub identity_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Monthly nominal rate in percent
    pub interest_rate: Percent,
    #[serde(default)]
    pub interest_method: InterestMethod,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    pub loan_term_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment_date: Option<NaiveDate>,
    /// Cached from the last projection
    #[serde(default)]
    pub installment_amount: Money,
    #[serde(default)]
    pub installments_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Money>,
    /// Client who referred this one. Not owned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<ClientId>,
    #[serde(default)]
    pub status: ClientStatus,
    /// Funds this client is owed through a redirection but has not received
    #[serde(default)]
    pub pending_redirection_balance: Money,
    #[serde(default)]
    pub redirection_wait_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_redirection_id: Option<RedirectionId>,
}

impl Client {
    /// Minimal active client with the given loan terms and nothing cached.
    pub fn new(
        id: impl Into<ClientId>,
        name: impl Into<String>,
        interest_rate: Percent,
        interest_method: InterestMethod,
        payment_frequency: PaymentFrequency,
        loan_term_months: u32,
    ) -> Self {
        Client {
            id: id.into(),
            name: name.into(),
            identity_number: String::new(),
            address: String::new(),
            work_address: None,
            phone: None,
            interest_rate,
            interest_method,
            payment_frequency,
            loan_term_months,
            credit_start_date: None,
            next_payment_date: None,
            installment_amount: Decimal::ZERO,
            installments_count: 0,
            credit_limit: None,
            referrer_id: None,
            status: ClientStatus::Active,
            pending_redirection_balance: Decimal::ZERO,
            redirection_wait_days: 0,
            active_redirection_id: None,
        }
    }

    /// The client's loan terms applied to a principal.
    pub fn loan_terms(&self, principal: Money) -> LoanTermsInput {
        LoanTermsInput {
            principal,
            monthly_rate: self.interest_rate,
            term_months: self.loan_term_months,
            frequency: self.payment_frequency,
            method: self.interest_method,
        }
    }

    /// Cache installment amount and count from a projection.
    pub fn apply_projection(&mut self, projection: &LoanProjection) {
        self.installment_amount = projection.quota;
        self.installments_count = projection.total_installments;
    }

    pub fn is_awaiting_redirection(&self) -> bool {
        self.pending_redirection_balance > Decimal::ZERO
    }

    pub fn exceeds_credit_limit(&self, amount: Money) -> bool {
        self.credit_limit.is_some_and(|limit| amount > limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_host_payload() {
        let json = r#"{
            "id": "c-1",
            "name": "Ana Restrepo",
            "interest_rate": "10",
            "interest_method": "DIMINISHING",
            "payment_frequency": "WEEKLY",
            "loan_term_months": 3,
            "credit_start_date": "2024-05-01",
            "pending_redirection_balance": "200000",
            "redirection_wait_days": 3
        }"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.interest_method, InterestMethod::Diminishing);
        assert_eq!(client.payment_frequency, PaymentFrequency::Weekly);
        assert_eq!(client.status, ClientStatus::Active);
        assert!(client.is_awaiting_redirection());
        assert_eq!(client.installment_amount, Decimal::ZERO);
    }

    #[test]
    fn test_credit_limit() {
        let mut client = Client::new(
            "c-2",
            "Luis",
            dec!(5),
            InterestMethod::Fixed,
            PaymentFrequency::Monthly,
            6,
        );
        assert!(!client.exceeds_credit_limit(dec!(10_000_000)));
        client.credit_limit = Some(dec!(1_000_000));
        assert!(client.exceeds_credit_limit(dec!(1_000_001)));
        assert!(!client.exceeds_credit_limit(dec!(1_000_000)));
    }
}

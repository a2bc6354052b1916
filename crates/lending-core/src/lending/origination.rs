use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::posting::{book, Posting};
use crate::amortization::projection::compute_projection;
use crate::client::Client;
use crate::config::LendingConfig;
use crate::error::LendingError;
use crate::ledger::event::{DisbursementEvent, LedgerEvent, TransactionDraft};
use crate::redirection::transfer::{open_redirection, RedirectionOpening};
use crate::schedule::next_due_date;
use crate::treasury::account::BankAccount;
use crate::types::*;
use crate::LendingResult;

/// A new client and the loan that opens their ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginationRequest {
    pub client_id: ClientId,
    pub name: String,
    #[serde(default)]
    pub identity_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub principal: Money,
    /// Falls back to the configured default rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_method: Option<InterestMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_frequency: Option<PaymentFrequency>,
    pub loan_term_months: u32,
    pub credit_start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<ClientId>,
    pub transaction_id: TransactionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
    /// Book the loan now but fund it from other clients' collections
    #[serde(default)]
    pub is_redirection: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirection_wait_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirection_source_id: Option<ClientId>,
    #[serde(default)]
    pub notes: String,
}

/// Register a client and write the first leg of their loan.
///
/// A treasury-funded loan debits `treasury`; a redirected loan writes a
/// `REDIRECT_IN` leg and leaves the client WAITING for funds.
pub fn originate_loan(
    request: &OriginationRequest,
    treasury: Option<&BankAccount>,
    config: &LendingConfig,
) -> LendingResult<ComputationOutput<Posting>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    config.validate()?;

    if request.loan_term_months > config.max_term_months {
        return Err(LendingError::InvalidLoanTerms {
            field: "loan_term_months".into(),
            reason: format!(
                "Term of {} months exceeds the {} month maximum",
                request.loan_term_months, config.max_term_months
            ),
        });
    }

    let mut client = Client::new(
        request.client_id.clone(),
        request.name.clone(),
        request.interest_rate.unwrap_or(config.default_monthly_rate),
        request
            .interest_method
            .unwrap_or(config.default_interest_method),
        request
            .payment_frequency
            .unwrap_or(config.default_payment_frequency),
        request.loan_term_months,
    );
    client.identity_number = request.identity_number.clone();
    client.address = request.address.clone();
    client.work_address = request.work_address.clone();
    client.phone = request.phone.clone();
    client.credit_limit = request.credit_limit;
    client.referrer_id = request.referrer_id.clone();
    client.credit_start_date = Some(request.credit_start_date);
    client.next_payment_date = Some(next_due_date(
        request.credit_start_date,
        client.payment_frequency,
    ));

    let projection = compute_projection(&client.loan_terms(request.principal))?;
    client.apply_projection(&projection);

    if client.exceeds_credit_limit(request.principal) {
        let message = format!(
            "Principal {} exceeds credit limit {}",
            request.principal,
            client.credit_limit.unwrap_or_default()
        );
        if config.enforce_credit_limit {
            return Err(LendingError::InvalidInput {
                field: "principal".into(),
                reason: message,
            });
        }
        warnings.push(message);
    }

    let posting = if request.is_redirection {
        if request.bank_account_id.is_some() || treasury.is_some() {
            return Err(LendingError::InvalidInput {
                field: "bank_account_id".into(),
                reason: "A redirected loan is not funded from treasury".into(),
            });
        }
        let opened = open_redirection(
            &client,
            None,
            RedirectionOpening {
                transaction_id: request.transaction_id.clone(),
                date: request.credit_start_date,
                amount: request.principal,
                wait_days: request
                    .redirection_wait_days
                    .unwrap_or(config.default_redirection_wait_days),
                source_client_id: request.redirection_source_id.clone(),
                notes: request.notes.clone(),
            },
        )?;
        Posting {
            client: opened.client,
            transaction: opened.transaction,
            account: None,
            redirection_id: Some(opened.redirection_id),
        }
    } else {
        let draft = TransactionDraft {
            id: request.transaction_id.clone(),
            client_id: client.id.clone(),
            date: request.credit_start_date,
            event: LedgerEvent::Disbursement(DisbursementEvent {
                amount: request.principal,
                bank_account_id: request.bank_account_id.clone(),
            }),
            receipt: None,
            notes: request.notes.clone(),
        };
        let (transaction, account) = book(&client, None, draft, treasury)?;
        if account.is_none() {
            warnings.push("Disbursement not linked to a treasury account".into());
        }
        Posting {
            client,
            transaction,
            account,
            redirection_id: None,
        }
    };

    tracing::info!(
        client_id = %posting.client.id,
        principal = %request.principal,
        redirected = request.is_redirection,
        "loan originated"
    );

    let funding = if request.is_redirection {
        "REDIRECTION"
    } else {
        "TREASURY"
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan origination",
        &serde_json::json!({
            "principal": request.principal.to_string(),
            "quota": projection.quota.to_string(),
            "installments": projection.total_installments,
            "funding": funding,
        }),
        warnings,
        elapsed,
        posting,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::TransactionType;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn request() -> OriginationRequest {
        OriginationRequest {
            client_id: "c-100".into(),
            name: "Camila Ortiz".into(),
            identity_number: "1020304050".into(),
            address: "Cra 7 # 12-30".into(),
            work_address: None,
            phone: None,
            principal: dec!(1_000_000),
            interest_rate: Some(dec!(10)),
            interest_method: Some(InterestMethod::Fixed),
            payment_frequency: Some(PaymentFrequency::Monthly),
            loan_term_months: 1,
            credit_start_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            credit_limit: None,
            referrer_id: None,
            transaction_id: "tx-1".into(),
            bank_account_id: Some("bank-1".into()),
            is_redirection: false,
            redirection_wait_days: None,
            redirection_source_id: None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_treasury_funded_origination() {
        let account = BankAccount::new("bank-1", "Main", dec!(5_000_000));
        let out = originate_loan(&request(), Some(&account), &LendingConfig::default()).unwrap();
        let posting = out.result;
        assert_eq!(posting.transaction.transaction_type, TransactionType::Disbursement);
        assert_eq!(posting.transaction.balance_after, dec!(1_000_000));
        assert_eq!(posting.account.unwrap().balance, dec!(4_000_000));
        assert_eq!(posting.client.installment_amount, dec!(1_100_000));
        assert_eq!(posting.client.installments_count, 1);
        assert_eq!(
            posting.client.next_payment_date,
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_insufficient_treasury_blocks_origination() {
        let mut req = request();
        req.principal = dec!(600_000);
        let account = BankAccount::new("bank-1", "Main", dec!(500_000));
        let err = originate_loan(&req, Some(&account), &LendingConfig::default()).unwrap_err();
        assert!(matches!(err, LendingError::InsufficientTreasuryFunds { .. }));
    }

    #[test]
    fn test_redirected_origination_waits() {
        let mut req = request();
        req.is_redirection = true;
        req.bank_account_id = None;
        let out = originate_loan(&req, None, &LendingConfig::default()).unwrap();
        let posting = out.result;
        assert_eq!(posting.transaction.transaction_type, TransactionType::RedirectIn);
        assert!(posting.account.is_none());
        assert!(posting.redirection_id.is_some());
        assert_eq!(posting.client.pending_redirection_balance, dec!(1_000_000));
        assert_eq!(posting.client.redirection_wait_days, 3);
    }

    #[test]
    fn test_credit_limit_warns_or_rejects() {
        let mut req = request();
        req.credit_limit = Some(dec!(500_000));
        let account = BankAccount::new("bank-1", "Main", dec!(5_000_000));

        let out = originate_loan(&req, Some(&account), &LendingConfig::default()).unwrap();
        assert_eq!(out.warnings.len(), 1);

        let strict = LendingConfig {
            enforce_credit_limit: true,
            ..LendingConfig::default()
        };
        assert!(originate_loan(&req, Some(&account), &strict).is_err());
    }

    #[test]
    fn test_zero_principal_is_invalid_terms() {
        let mut req = request();
        req.principal = Decimal::ZERO;
        let err = originate_loan(&req, None, &LendingConfig::default()).unwrap_err();
        assert!(matches!(err, LendingError::InvalidLoanTerms { .. }));
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::projection::{compute_projection, LoanTermsInput};
use crate::error::LendingError;
use crate::schedule::due_dates;
use crate::types::*;
use crate::LendingResult;

/// Longest schedule a table is built for (100 years of daily installments).
pub const MAX_TABLE_ROWS: u32 = 36_000;

/// Input for an installment-by-installment breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationTableInput {
    #[serde(flatten)]
    pub terms: LoanTermsInput,
    /// Credit start date; due dates are advanced from here when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// A single installment row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub interest: Money,
    pub capital: Money,
    pub quota: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationTable {
    pub installments: Vec<Installment>,
    pub total_interest: Money,
    pub total_capital: Money,
    pub total_paid: Money,
}

/// Build the installment schedule for a loan.
///
/// FIXED spreads the flat interest evenly, each row taking the whole units
/// that have accrued since the previous one; DIMINISHING charges the
/// periodic rate on the opening balance. The final row absorbs rounding so
/// the loan closes at exactly zero.
pub fn build_amortization_table(
    input: &AmortizationTableInput,
) -> LendingResult<ComputationOutput<AmortizationTable>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = &input.terms;
    let projection = compute_projection(terms)?;
    let n = projection.total_installments;
    if n > MAX_TABLE_ROWS {
        return Err(LendingError::InvalidLoanTerms {
            field: "term_months".into(),
            reason: format!("{n} installments exceeds the {MAX_TABLE_ROWS} row table limit"),
        });
    }
    let n_dec = Decimal::from(n);
    let per_period = projection.total_interest / n_dec;
    let rate = terms.periodic_rate();

    let dates: Vec<Option<NaiveDate>> = match input.start_date {
        Some(start_date) => due_dates(start_date, terms.frequency, n)
            .into_iter()
            .map(Some)
            .collect(),
        None => vec![None; n as usize],
    };

    let mut installments = Vec::with_capacity(n as usize);
    let mut balance = terms.principal;
    let mut interest_charged = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for (idx, due_date) in dates.into_iter().enumerate() {
        let number = idx as u32 + 1;
        let is_last = number == n;
        let opening = balance;

        let interest = match terms.method {
            InterestMethod::Fixed if is_last => projection.total_interest - interest_charged,
            InterestMethod::Fixed => {
                round_currency(per_period * Decimal::from(number)) - interest_charged
            }
            InterestMethod::Diminishing => round_currency(opening * rate),
        };

        let capital = if is_last {
            opening
        } else {
            (projection.quota - interest).max(Decimal::ZERO).min(opening)
        };

        balance -= capital;
        interest_charged += interest;
        total_paid += capital + interest;

        installments.push(Installment {
            number,
            due_date,
            opening_balance: opening,
            interest,
            capital,
            quota: capital + interest,
            closing_balance: balance,
        });
    }

    if let Some(last) = installments.last() {
        let drift = (last.quota - projection.quota).abs();
        if drift > Decimal::from(n) {
            warnings.push(format!(
                "Final installment differs from quota by {drift} after rounding"
            ));
        }
    }

    let output = AmortizationTable {
        installments,
        total_interest: interest_charged,
        total_capital: terms.principal,
        total_paid,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Installment amortization table",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "monthly_rate_pct": terms.monthly_rate.to_string(),
            "term_months": terms.term_months,
            "frequency": terms.frequency,
            "method": terms.method,
            "quota": projection.quota.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

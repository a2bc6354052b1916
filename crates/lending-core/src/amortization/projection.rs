use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LendingError;
use crate::types::*;
use crate::LendingResult;

/// Loan terms as entered in the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTermsInput {
    pub principal: Money,
    /// Monthly nominal rate in percent (10 = 10% per month)
    pub monthly_rate: Percent,
    pub term_months: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub method: InterestMethod,
}

/// Result of projecting a loan. All amounts in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanProjection {
    /// Periodic installment
    pub quota: Money,
    pub total_interest: Money,
    pub total_installments: u32,
    pub first_period_interest: Money,
}

impl LoanTermsInput {
    /// `None` when `term × periods per month` does not fit in a `u32`.
    pub fn total_installments(&self) -> Option<u32> {
        self.term_months.checked_mul(self.frequency.periods_per_month())
    }

    /// Rate applied per installment period, as a fraction.
    pub fn periodic_rate(&self) -> Decimal {
        self.monthly_rate / dec!(100) / Decimal::from(self.frequency.periods_per_month())
    }
}

/// Project a loan's installment and interest totals.
///
/// Returns `None` when the terms cannot produce a projection (non-positive
/// principal, zero term, negative rate, or totals too large to represent). Cheap and deterministic; safe to
/// call on every keystroke of a simulator form.
pub fn project_loan(
    principal: Money,
    monthly_rate: Percent,
    term_months: u32,
    frequency: PaymentFrequency,
    method: InterestMethod,
) -> Option<LoanProjection> {
    let terms = LoanTermsInput {
        principal,
        monthly_rate,
        term_months,
        frequency,
        method,
    };
    compute_projection(&terms).ok()
}

/// Validating form of [`project_loan`] wrapped in the computation envelope.
pub fn simulate_loan(
    input: &LoanTermsInput,
) -> LendingResult<ComputationOutput<LoanProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let projection = compute_projection(input)?;

    if input.frequency == PaymentFrequency::Daily {
        warnings.push(
            "DAILY rate assumes a 30-day month; calendar due dates advance by real days".into(),
        );
    }
    if input.monthly_rate.is_zero() {
        warnings.push("Zero interest rate: installments repay principal only".into());
    }

    let methodology = match input.method {
        InterestMethod::Fixed => "Flat interest on original principal",
        InterestMethod::Diminishing => "Annuity amortization on declining balance",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "monthly_rate_pct": input.monthly_rate.to_string(),
            "term_months": input.term_months,
            "frequency": input.frequency,
            "method": input.method,
            "periods_per_month": input.frequency.periods_per_month(),
        }),
        warnings,
        elapsed,
        projection,
    ))
}

pub(crate) fn validate_terms(terms: &LoanTermsInput) -> LendingResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(LendingError::InvalidLoanTerms {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if terms.term_months == 0 {
        return Err(LendingError::InvalidLoanTerms {
            field: "term_months".into(),
            reason: "Term must be at least 1 month".into(),
        });
    }
    if terms.monthly_rate < Decimal::ZERO {
        return Err(LendingError::InvalidLoanTerms {
            field: "monthly_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if terms.total_installments().is_none() {
        return Err(LendingError::InvalidLoanTerms {
            field: "term_months".into(),
            reason: format!(
                "{} months at {} installments per month overflows the installment count",
                terms.term_months,
                terms.frequency.periods_per_month()
            ),
        });
    }
    Ok(())
}

pub(crate) fn compute_projection(terms: &LoanTermsInput) -> LendingResult<LoanProjection> {
    validate_terms(terms)?;

    let n = terms.total_installments().ok_or_else(|| overflow("term_months"))?;
    let n_dec = Decimal::from(n);
    let principal = terms.principal;

    match terms.method {
        InterestMethod::Fixed => {
            let total_interest = principal
                .checked_mul(terms.monthly_rate / dec!(100))
                .and_then(|i| i.checked_mul(Decimal::from(terms.term_months)))
                .ok_or_else(|| overflow("principal"))?;
            let repaid = principal
                .checked_add(total_interest)
                .ok_or_else(|| overflow("principal"))?;
            Ok(LoanProjection {
                quota: round_currency(repaid / n_dec),
                total_interest: round_currency(total_interest),
                total_installments: n,
                first_period_interest: round_currency(total_interest / n_dec),
            })
        }
        InterestMethod::Diminishing => {
            let rate = terms.periodic_rate();
            if rate.is_zero() {
                return Ok(LoanProjection {
                    quota: round_currency(principal / n_dec),
                    total_interest: Decimal::ZERO,
                    total_installments: n,
                    first_period_interest: Decimal::ZERO,
                });
            }

            // P·r·(1+r)^n / ((1+r)^n − 1), rearranged so the large factor only
            // appears as a reciprocal. Past Decimal range the reciprocal is
            // zero and the installment is the interest on the principal.
            let period_interest = principal
                .checked_mul(rate)
                .ok_or_else(|| overflow("principal"))?;
            let quota = match (Decimal::ONE + rate).checked_powu(u64::from(n)) {
                Some(factor) => period_interest / (Decimal::ONE - Decimal::ONE / factor),
                None => period_interest,
            };
            let total_interest = quota
                .checked_mul(n_dec)
                .map(|paid| paid - principal)
                .ok_or_else(|| overflow("term_months"))?;

            Ok(LoanProjection {
                quota: round_currency(quota),
                total_interest: round_currency(total_interest),
                total_installments: n,
                first_period_interest: round_currency(period_interest),
            })
        }
    }
}

fn overflow(field: &str) -> LendingError {
    LendingError::InvalidLoanTerms {
        field: field.into(),
        reason: "Loan totals exceed the representable range".into(),
    }
}

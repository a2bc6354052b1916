use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LendingError;
use crate::types::{InterestMethod, PaymentFrequency, Percent};
use crate::LendingResult;

/// Portfolio-wide defaults and limits applied by the lending workflows.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LendingConfig {
    #[serde(default)]
    pub default_interest_method: InterestMethod,
    #[serde(default)]
    pub default_payment_frequency: PaymentFrequency,
    #[serde(default = "default_monthly_rate")]
    pub default_monthly_rate: Percent,
    #[serde(default = "default_redirection_wait_days")]
    pub default_redirection_wait_days: u32,
    #[serde(default = "default_max_term_months")]
    pub max_term_months: u32,
    /// Reject disbursements above a client's credit limit instead of warning
    #[serde(default)]
    pub enforce_credit_limit: bool,
}

impl Default for LendingConfig {
    fn default() -> Self {
        LendingConfig {
            default_interest_method: InterestMethod::default(),
            default_payment_frequency: PaymentFrequency::default(),
            default_monthly_rate: default_monthly_rate(),
            default_redirection_wait_days: default_redirection_wait_days(),
            max_term_months: default_max_term_months(),
            enforce_credit_limit: false,
        }
    }
}

impl LendingConfig {
    pub fn validate(&self) -> LendingResult<()> {
        if self.default_monthly_rate < Decimal::ZERO {
            return Err(LendingError::InvalidInput {
                field: "default_monthly_rate".into(),
                reason: "Rate cannot be negative".into(),
            });
        }
        if self.max_term_months == 0 {
            return Err(LendingError::InvalidInput {
                field: "max_term_months".into(),
                reason: "Maximum term must be at least 1 month".into(),
            });
        }
        Ok(())
    }
}

fn default_monthly_rate() -> Percent {
    dec!(10)
}

fn default_redirection_wait_days() -> u32 {
    3
}

fn default_max_term_months() -> u32 {
    120
}

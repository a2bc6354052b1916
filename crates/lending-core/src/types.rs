use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// All monetary values. Whole currency units; no sub-unit is modeled.
pub type Money = Decimal;

/// Interest rates expressed as percentages (10 = 10% per month nominal).
pub type Percent = Decimal;

pub type ClientId = String;
pub type TransactionId = String;
pub type BankAccountId = String;

/// How interest accrues over the life of a loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterestMethod {
    /// Flat interest on the original principal, spread evenly across installments
    #[default]
    Fixed,
    /// Interest on the declining outstanding balance (annuity amortization)
    Diminishing,
}

/// How often installments fall due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Biweekly,
    #[default]
    Monthly,
}

impl PaymentFrequency {
    /// Installments per month used to split the monthly rate.
    ///
    /// `Daily` uses a fixed 30-day commercial month. This is a deliberate
    /// simplification for rate purposes; the calendar due-date advancer in
    /// [`crate::schedule`] adds real days and is intentionally not aligned.
    pub fn periods_per_month(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 1,
            PaymentFrequency::Biweekly => 2,
            PaymentFrequency::Weekly => 4,
            PaymentFrequency::Daily => 30,
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentFrequency::Daily => "DAILY",
            PaymentFrequency::Weekly => "WEEKLY",
            PaymentFrequency::Biweekly => "BIWEEKLY",
            PaymentFrequency::Monthly => "MONTHLY",
        };
        f.write_str(s)
    }
}

impl fmt::Display for InterestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterestMethod::Fixed => f.write_str("FIXED"),
            InterestMethod::Diminishing => f.write_str("DIMINISHING"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
}

/// Correlates the two legs of a cross-client redirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedirectionId(Uuid);

impl RedirectionId {
    pub fn new() -> Self {
        RedirectionId(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        RedirectionId(id)
    }
}

impl Default for RedirectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RedirectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Round to the nearest whole currency unit, halves away from zero.
pub fn round_currency(value: Money) -> Money {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "whole_currency_units".to_string(),
        },
    }
}

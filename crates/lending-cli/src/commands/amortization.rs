use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lending_core::amortization::projection::{simulate_loan, LoanTermsInput};
use lending_core::amortization::table::{build_amortization_table, AmortizationTableInput};
use lending_core::config::LendingConfig;
use lending_core::schedule::{due_dates, format_date, next_due_date, parse_date};
use lending_core::PaymentFrequency;

use super::parse_variant;
use crate::input;

/// Loan terms shared by `project` and `amortization-table`
#[derive(Args)]
pub struct TermsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount lent
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Monthly nominal rate in percent (defaults to the configured rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// daily, weekly, biweekly or monthly
    #[arg(long)]
    pub frequency: Option<String>,

    /// fixed or diminishing
    #[arg(long)]
    pub method: Option<String>,
}

impl TermsArgs {
    fn to_terms(&self, config: &LendingConfig) -> Result<LoanTermsInput, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let term_months = self.term.ok_or("--term is required (or provide --input)")?;
        let frequency = match &self.frequency {
            Some(raw) => parse_variant("frequency", raw)?,
            None => config.default_payment_frequency,
        };
        let method = match &self.method {
            Some(raw) => parse_variant("method", raw)?,
            None => config.default_interest_method,
        };
        Ok(LoanTermsInput {
            principal,
            monthly_rate: self.rate.unwrap_or(config.default_monthly_rate),
            term_months,
            frequency,
            method,
        })
    }
}

#[derive(Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub terms: TermsArgs,
}

pub fn run_project(
    args: ProjectArgs,
    config: &LendingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTermsInput = if let Some(ref path) = args.terms.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.terms.to_terms(config)?
    };

    let result = simulate_loan(&terms)?;
    Ok(serde_json::to_value(result)?)
}

#[derive(Args)]
pub struct AmortizationTableArgs {
    #[command(flatten)]
    pub terms: TermsArgs,

    /// Credit start date (YYYY-MM-DD); adds due dates to each installment
    #[arg(long)]
    pub start_date: Option<String>,
}

pub fn run_amortization_table(
    args: AmortizationTableArgs,
    config: &LendingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let table_input: AmortizationTableInput = if let Some(ref path) = args.terms.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        AmortizationTableInput {
            terms: args.terms.to_terms(config)?,
            start_date: args.start_date.as_deref().map(parse_date).transpose()?,
        }
    };

    let result = build_amortization_table(&table_input)?;
    Ok(serde_json::to_value(result)?)
}

#[derive(Args)]
pub struct NextDueArgs {
    /// Date to advance from (YYYY-MM-DD or ISO timestamp)
    #[arg(long)]
    pub date: String,

    /// daily, weekly, biweekly or monthly
    #[arg(long, default_value = "monthly")]
    pub frequency: String,

    /// List this many successive due dates
    #[arg(long)]
    pub count: Option<u32>,
}

pub fn run_next_due(args: NextDueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = parse_date(&args.date)?;
    let frequency: PaymentFrequency = parse_variant("frequency", &args.frequency)?;

    let mut value = json!({
        "date": format_date(start),
        "frequency": frequency,
        "next_due_date": format_date(next_due_date(start, frequency)),
    });
    if let Some(count) = args.count {
        let dates: Vec<String> = due_dates(start, frequency, count)
            .into_iter()
            .map(format_date)
            .collect();
        value["due_dates"] = json!(dates);
    }
    Ok(value)
}

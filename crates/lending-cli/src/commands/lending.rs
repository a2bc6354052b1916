use clap::Args;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use lending_core::client::Client;
use lending_core::config::LendingConfig;
use lending_core::ledger::transaction::Transaction;
use lending_core::lending::collection::{
    collect_payment, disburse, settle_loan, CollectionRequest, DisbursementRequest,
    SettlementRequest,
};
use lending_core::lending::origination::{originate_loan, OriginationRequest};
use lending_core::treasury::account::BankAccount;

use crate::input;

/// `{client, tail?, request, account?}`: a workflow step on an existing loan
#[derive(Deserialize)]
#[serde(bound = "R: DeserializeOwned")]
struct StepInput<R> {
    client: Client,
    #[serde(default)]
    tail: Option<Transaction>,
    request: R,
    #[serde(default)]
    account: Option<BankAccount>,
}

/// Arguments for loan origination
#[derive(Args)]
pub struct OriginateArgs {
    /// Path to JSON input file: `{request, account?}`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct OriginateInput {
    request: OriginationRequest,
    #[serde(default)]
    account: Option<BankAccount>,
}

pub fn run_originate(
    args: OriginateArgs,
    config: &LendingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let payload: OriginateInput = input::read_required(args.input.as_deref(), "originate")?;
    let result = originate_loan(&payload.request, payload.account.as_ref(), config)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a further disbursement
#[derive(Args)]
pub struct DisburseArgs {
    /// Path to JSON input file: `{client, tail?, request, account?}`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_disburse(
    args: DisburseArgs,
    config: &LendingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let step: StepInput<DisbursementRequest> =
        input::read_required(args.input.as_deref(), "disburse")?;
    let result = disburse(
        &step.client,
        step.tail.as_ref(),
        &step.request,
        step.account.as_ref(),
        config,
    )?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a payment collection
#[derive(Args)]
pub struct CollectArgs {
    /// Path to JSON input file: `{client, tail?, request, account?}`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_collect(args: CollectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let step: StepInput<CollectionRequest> = input::read_required(args.input.as_deref(), "collect")?;
    let result = collect_payment(
        &step.client,
        step.tail.as_ref(),
        &step.request,
        step.account.as_ref(),
    )?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for closing a loan
#[derive(Args)]
pub struct SettleArgs {
    /// Path to JSON input file: `{client, tail?, request, account?}`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_settle(args: SettleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let step: StepInput<SettlementRequest> = input::read_required(args.input.as_deref(), "settle")?;
    let result = settle_loan(
        &step.client,
        step.tail.as_ref(),
        &step.request,
        step.account.as_ref(),
    )?;
    Ok(serde_json::to_value(result)?)
}

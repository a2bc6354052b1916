use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use lending_core::client::Client;
use lending_core::config::LendingConfig;
use lending_core::ledger::engine::TransactionEdit;
use lending_core::ledger::event::TransactionDraft;
use lending_core::ledger::transaction::Transaction;
use lending_core::treasury::account::BankAccount;
use lending_core::treasury::reconciliation::TreasuryMovement;
use lending_core::{ClientId, PaymentFrequency};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<'a, T: Deserialize<'a>>(input_json: &'a str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn to_json(value: &impl serde::Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization & schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn project_loan(input_json: String) -> NapiResult<String> {
    let input: lending_core::amortization::projection::LoanTermsInput = parse(&input_json)?;
    let output =
        lending_core::amortization::projection::simulate_loan(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn amortization_table(input_json: String) -> NapiResult<String> {
    let input: lending_core::amortization::table::AmortizationTableInput = parse(&input_json)?;
    let output = lending_core::amortization::table::build_amortization_table(&input)
        .map_err(to_napi_error)?;
    to_json(&output)
}

/// Date strings in, date string out; timestamps are truncated to their date.
#[napi]
pub fn next_due_date(start: String, frequency: String) -> NapiResult<String> {
    let frequency: PaymentFrequency =
        serde_json::from_value(serde_json::Value::String(frequency)).map_err(to_napi_error)?;
    lending_core::schedule::next_due_date_str(&start, frequency).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AppendInput {
    client: Client,
    #[serde(default)]
    tail: Option<Transaction>,
    draft: TransactionDraft,
    #[serde(default)]
    account: Option<BankAccount>,
}

#[napi]
pub fn append_transaction(input_json: String) -> NapiResult<String> {
    let input: AppendInput = parse(&input_json)?;
    let output = lending_core::ledger::engine::append_transaction(
        &input.client,
        input.tail.as_ref(),
        input.draft,
        input.account.as_ref(),
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct ChainInput {
    client_id: ClientId,
    transactions: Vec<Transaction>,
}

#[napi]
pub fn recompute_chain(input_json: String) -> NapiResult<String> {
    let input: ChainInput = parse(&input_json)?;
    let output = lending_core::ledger::engine::recompute_chain(&input.client_id, &input.transactions)
        .map_err(to_napi_error)?;
    to_json(&output)
}

/// Resolves to `true`; a mismatch rejects with the offending transaction.
#[napi]
pub fn verify_chain(input_json: String) -> NapiResult<bool> {
    let input: ChainInput = parse(&input_json)?;
    lending_core::ledger::engine::verify_chain(&input.client_id, &input.transactions)
        .map_err(to_napi_error)?;
    Ok(true)
}

#[derive(Deserialize)]
struct EditInput {
    client_id: ClientId,
    transactions: Vec<Transaction>,
    transaction_id: String,
    #[serde(default)]
    edit: Option<TransactionEdit>,
}

#[napi]
pub fn edit_transaction(input_json: String) -> NapiResult<String> {
    let input: EditInput = parse(&input_json)?;
    let edit = input.edit.unwrap_or_default();
    let output = lending_core::ledger::engine::edit_transaction(
        &input.client_id,
        &input.transactions,
        &input.transaction_id,
        &edit,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn delete_transaction(input_json: String) -> NapiResult<String> {
    let input: EditInput = parse(&input_json)?;
    let output = lending_core::ledger::engine::delete_transaction(
        &input.client_id,
        &input.transactions,
        &input.transaction_id,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn summarize_client(input_json: String) -> NapiResult<String> {
    let input: ChainInput = parse(&input_json)?;
    let output = lending_core::ledger::summary::summarize_client(&input.client_id, &input.transactions)
        .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn portfolio_summary(input_json: String) -> NapiResult<String> {
    let chains: Vec<ChainInput> = parse(&input_json)?;
    let chains: Vec<(ClientId, Vec<Transaction>)> = chains
        .into_iter()
        .map(|c| (c.client_id, c.transactions))
        .collect();
    let output = lending_core::ledger::summary::portfolio_summary(&chains).map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Redirection
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StatusInput {
    client: Client,
    today: NaiveDate,
}

#[napi]
pub fn redirection_status(input_json: String) -> NapiResult<String> {
    let input: StatusInput = parse(&input_json)?;
    let output = lending_core::redirection::status::redirection_status(&input.client, input.today);
    to_json(&output)
}

#[derive(Deserialize)]
struct OpenInput {
    client: Client,
    #[serde(default)]
    tail: Option<Transaction>,
    opening: lending_core::redirection::transfer::RedirectionOpening,
}

#[napi]
pub fn open_redirection(input_json: String) -> NapiResult<String> {
    let input: OpenInput = parse(&input_json)?;
    let output = lending_core::redirection::transfer::open_redirection(
        &input.client,
        input.tail.as_ref(),
        input.opening,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct RouteInput {
    source: Client,
    #[serde(default)]
    source_tail: Option<Transaction>,
    target: Client,
    payment: lending_core::redirection::transfer::RoutedPayment,
}

#[napi]
pub fn redirect_payment(input_json: String) -> NapiResult<String> {
    let input: RouteInput = parse(&input_json)?;
    let output = lending_core::redirection::transfer::redirect_payment(
        &input.source,
        input.source_tail.as_ref(),
        &input.target,
        &input.payment,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct DeliveryInput {
    client: Client,
    account: BankAccount,
    amount: Decimal,
}

#[napi]
pub fn deliver_from_treasury(input_json: String) -> NapiResult<String> {
    let input: DeliveryInput = parse(&input_json)?;
    let output = lending_core::redirection::transfer::deliver_from_treasury(
        &input.client,
        &input.account,
        input.amount,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn find_orphaned_legs(input_json: String) -> NapiResult<String> {
    let transactions: Vec<Transaction> = parse(&input_json)?;
    let output = lending_core::redirection::audit::find_orphaned_legs(&transactions);
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Treasury
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ReconcileInput {
    account: BankAccount,
    transaction: Transaction,
}

#[napi]
pub fn reconcile_transaction(input_json: String) -> NapiResult<String> {
    let input: ReconcileInput = parse(&input_json)?;
    let output =
        lending_core::treasury::reconciliation::reconcile_transaction(&input.account, &input.transaction)
            .map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct MovementInput {
    account: BankAccount,
    movement: TreasuryMovement,
}

#[napi]
pub fn apply_movement(input_json: String) -> NapiResult<String> {
    let input: MovementInput = parse(&input_json)?;
    let output = lending_core::treasury::reconciliation::apply_movement(&input.account, input.movement)
        .map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct TransferInput {
    from: BankAccount,
    to: BankAccount,
    amount: Decimal,
}

#[napi]
pub fn transfer_between(input_json: String) -> NapiResult<String> {
    let input: TransferInput = parse(&input_json)?;
    let (from, to) =
        lending_core::treasury::reconciliation::transfer_between(&input.from, &input.to, input.amount)
            .map_err(to_napi_error)?;
    to_json(&serde_json::json!({ "from": from, "to": to }))
}

#[napi]
pub fn treasury_position(input_json: String) -> NapiResult<String> {
    let accounts: Vec<BankAccount> = parse(&input_json)?;
    let output = lending_core::treasury::reconciliation::treasury_position(&accounts);
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Lending workflows
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct OriginateInput {
    request: lending_core::lending::origination::OriginationRequest,
    #[serde(default)]
    account: Option<BankAccount>,
    #[serde(default)]
    config: Option<LendingConfig>,
}

#[napi]
pub fn originate_loan(input_json: String) -> NapiResult<String> {
    let input: OriginateInput = parse(&input_json)?;
    let config = input.config.unwrap_or_default();
    let output = lending_core::lending::origination::originate_loan(
        &input.request,
        input.account.as_ref(),
        &config,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
#[serde(bound = "R: serde::de::DeserializeOwned")]
struct StepInput<R> {
    client: Client,
    #[serde(default)]
    tail: Option<Transaction>,
    request: R,
    #[serde(default)]
    account: Option<BankAccount>,
    #[serde(default)]
    config: Option<LendingConfig>,
}

#[napi]
pub fn disburse(input_json: String) -> NapiResult<String> {
    let input: StepInput<lending_core::lending::collection::DisbursementRequest> =
        parse(&input_json)?;
    let config = input.config.unwrap_or_default();
    let output = lending_core::lending::collection::disburse(
        &input.client,
        input.tail.as_ref(),
        &input.request,
        input.account.as_ref(),
        &config,
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn collect_payment(input_json: String) -> NapiResult<String> {
    let input: StepInput<lending_core::lending::collection::CollectionRequest> =
        parse(&input_json)?;
    let output = lending_core::lending::collection::collect_payment(
        &input.client,
        input.tail.as_ref(),
        &input.request,
        input.account.as_ref(),
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn settle_loan(input_json: String) -> NapiResult<String> {
    let input: StepInput<lending_core::lending::collection::SettlementRequest> =
        parse(&input_json)?;
    let output = lending_core::lending::collection::settle_loan(
        &input.client,
        input.tail.as_ref(),
        &input.request,
        input.account.as_ref(),
    )
    .map_err(to_napi_error)?;
    to_json(&output)
}

use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use lending_core::client::Client;
use lending_core::ledger::engine::{append_transaction, recompute_chain, verify_chain};
use lending_core::ledger::event::TransactionDraft;
use lending_core::ledger::summary::portfolio_summary;
use lending_core::ledger::transaction::Transaction;
use lending_core::redirection::audit::find_orphaned_legs;
use lending_core::treasury::account::BankAccount;
use lending_core::treasury::reconciliation::reconcile_transaction;
use lending_core::ClientId;

use crate::input;

/// Arguments for appending an event to a chain
#[derive(Args)]
pub struct AppendArgs {
    /// Path to JSON input file: `{client, tail?, draft, account?}`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct AppendInput {
    client: Client,
    #[serde(default)]
    tail: Option<Transaction>,
    draft: TransactionDraft,
    #[serde(default)]
    account: Option<BankAccount>,
}

pub fn run_append(args: AppendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payload: AppendInput = input::read_required(args.input.as_deref(), "append")?;

    let transaction = append_transaction(
        &payload.client,
        payload.tail.as_ref(),
        payload.draft,
        payload.account.as_ref(),
    )?;
    let account = payload
        .account
        .as_ref()
        .map(|account| reconcile_transaction(account, &transaction))
        .transpose()?;

    Ok(json!({
        "transaction": transaction,
        "account": account,
    }))
}

/// Arguments for recomputing a client's chain
#[derive(Args)]
pub struct RecomputeArgs {
    /// Path to JSON input file: `{client_id, transactions}`
    #[arg(long)]
    pub input: Option<String>,

    /// Only check stored balances; fail on the first mismatch
    #[arg(long)]
    pub verify: bool,
}

#[derive(Deserialize)]
struct ChainInput {
    client_id: ClientId,
    transactions: Vec<Transaction>,
}

pub fn run_recompute(args: RecomputeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let chain: ChainInput = input::read_required(args.input.as_deref(), "recompute")?;

    if args.verify {
        verify_chain(&chain.client_id, &chain.transactions)?;
        return Ok(json!({
            "client_id": chain.client_id,
            "verified": true,
            "transaction_count": chain.transactions.len(),
        }));
    }

    let transactions = recompute_chain(&chain.client_id, &chain.transactions)?;
    let outstanding_balance = transactions
        .last()
        .map(|t| t.balance_after)
        .unwrap_or_default();
    Ok(json!({
        "client_id": chain.client_id,
        "outstanding_balance": outstanding_balance,
        "transactions": transactions,
    }))
}

/// Arguments for the portfolio summary
#[derive(Args)]
pub struct SummaryArgs {
    /// Path to JSON input file: `{chains: [{client_id, transactions}]}`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct PortfolioInput {
    chains: Vec<ChainInput>,
}

pub fn run_summary(args: SummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio: PortfolioInput = input::read_required(args.input.as_deref(), "summary")?;

    let chains: Vec<(ClientId, Vec<Transaction>)> = portfolio
        .chains
        .into_iter()
        .map(|c| (c.client_id, c.transactions))
        .collect();
    let all: Vec<Transaction> = chains
        .iter()
        .flat_map(|(_, txs)| txs.iter().cloned())
        .collect();

    let summary = portfolio_summary(&chains)?;
    let orphans = find_orphaned_legs(&all);
    if !orphans.is_empty() {
        tracing::warn!(count = orphans.len(), "orphaned redirection legs found");
    }

    let mut value = serde_json::to_value(summary)?;
    value["orphaned_legs"] = serde_json::to_value(orphans)?;
    Ok(value)
}

use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use lending_core::ledger::transaction::Transaction;
use lending_core::treasury::account::BankAccount;
use lending_core::treasury::reconciliation::{reconcile_transaction, treasury_position};

use crate::input;

/// Arguments for reconciling a ledger entry against treasury
#[derive(Args)]
pub struct ReconcileArgs {
    /// Path to JSON input file: `{account, transaction}` or `{accounts}`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReconcileInput {
    Entry {
        account: BankAccount,
        transaction: Transaction,
    },
    Position {
        accounts: Vec<BankAccount>,
    },
}

pub fn run_reconcile(args: ReconcileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payload: ReconcileInput = input::read_required(args.input.as_deref(), "reconcile")?;

    match payload {
        ReconcileInput::Entry {
            account,
            transaction,
        } => {
            let updated = reconcile_transaction(&account, &transaction)?;
            Ok(json!({
                "account_id": updated.id,
                "previous_balance": account.balance,
                "balance": updated.balance,
                "movement": transaction.treasury_movement(),
            }))
        }
        ReconcileInput::Position { accounts } => {
            Ok(serde_json::to_value(treasury_position(&accounts))?)
        }
    }
}

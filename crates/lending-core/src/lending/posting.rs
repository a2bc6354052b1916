use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::ledger::engine::append_transaction;
use crate::ledger::event::TransactionDraft;
use crate::ledger::transaction::Transaction;
use crate::treasury::account::BankAccount;
use crate::treasury::reconciliation::reconcile_transaction;
use crate::types::RedirectionId;
use crate::LendingResult;

/// Records produced by one workflow step. The host writes all of them in a
/// single storage transaction, serialised per client and per account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub client: Client,
    pub transaction: Transaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<BankAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirection_id: Option<RedirectionId>,
}

/// Append a draft and apply its cash effect to the named account.
pub(crate) fn book(
    client: &Client,
    tail: Option<&Transaction>,
    draft: TransactionDraft,
    treasury: Option<&BankAccount>,
) -> LendingResult<(Transaction, Option<BankAccount>)> {
    let transaction = append_transaction(client, tail, draft, treasury)?;
    let account = treasury
        .map(|account| reconcile_transaction(account, &transaction))
        .transpose()?;
    Ok((transaction, account))
}

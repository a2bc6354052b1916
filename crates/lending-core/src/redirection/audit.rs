use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ledger::transaction::{Transaction, TransactionType};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrphanReason {
    /// Legacy leg written before legs were correlated
    MissingRedirectionId,
    /// `REDIRECT_OUT` whose redirection has no `REDIRECT_IN` leg
    NoMatchingRedirectIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanedLeg {
    pub transaction_id: TransactionId,
    pub client_id: ClientId,
    pub reason: OrphanReason,
}

/// Redirect legs across the portfolio that cannot be paired.
///
/// An open `REDIRECT_IN` with no outgoing legs yet is a client still
/// waiting, not an orphan.
pub fn find_orphaned_legs(transactions: &[Transaction]) -> Vec<OrphanedLeg> {
    let opened: HashSet<RedirectionId> = transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::RedirectIn)
        .filter_map(|t| t.redirection_id)
        .collect();

    transactions
        .iter()
        .filter(|t| t.transaction_type.is_redirection())
        .filter_map(|t| {
            let reason = match (t.transaction_type, t.redirection_id) {
                (_, None) => OrphanReason::MissingRedirectionId,
                (TransactionType::RedirectOut, Some(id)) if !opened.contains(&id) => {
                    OrphanReason::NoMatchingRedirectIn
                }
                _ => return None,
            };
            Some(OrphanedLeg {
                transaction_id: t.id.clone(),
                client_id: t.client_id.clone(),
                reason,
            })
        })
        .collect()
}

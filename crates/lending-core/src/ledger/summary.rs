use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::recompute_chain;
use super::transaction::{Transaction, TransactionType};
use crate::types::*;
use crate::LendingResult;

/// Per-client profitability roll-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLedgerSummary {
    pub client_id: ClientId,
    pub outstanding_balance: Money,
    /// Disbursements, refinances and redirected-in funding
    pub total_lent: Money,
    pub capital_returned: Money,
    pub interest_earned: Money,
    pub redirected_out: Money,
    pub redirected_in: Money,
    pub transaction_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_outstanding: Money,
    pub total_lent: Money,
    pub capital_returned: Money,
    pub interest_earned: Money,
    /// Clients with a positive outstanding balance
    pub active_borrowers: usize,
    pub clients: Vec<ClientLedgerSummary>,
}

/// Summarise a client's chain. The chain is recomputed first, so stale
/// stored balances cannot leak into the totals.
pub fn summarize_client(
    client_id: &str,
    chain: &[Transaction],
) -> LendingResult<ClientLedgerSummary> {
    let chain = recompute_chain(client_id, chain)?;

    let mut summary = ClientLedgerSummary {
        client_id: client_id.to_string(),
        outstanding_balance: chain
            .last()
            .map(|t| t.balance_after)
            .unwrap_or(Decimal::ZERO),
        total_lent: Decimal::ZERO,
        capital_returned: Decimal::ZERO,
        interest_earned: Decimal::ZERO,
        redirected_out: Decimal::ZERO,
        redirected_in: Decimal::ZERO,
        transaction_count: chain.len(),
        last_payment_date: None,
    };

    for tx in &chain {
        summary.interest_earned += tx.interest_paid;
        summary.capital_returned += tx.capital_paid;
        match tx.transaction_type {
            TransactionType::Disbursement | TransactionType::Refinance => {
                summary.total_lent += tx.amount;
            }
            TransactionType::RedirectIn => {
                summary.total_lent += tx.amount;
                summary.redirected_in += tx.amount;
            }
            TransactionType::RedirectOut => {
                summary.redirected_out += tx.amount;
                summary.last_payment_date = Some(tx.date);
            }
            TransactionType::PaymentCapital
            | TransactionType::PaymentInterest
            | TransactionType::Settlement => {
                summary.last_payment_date = Some(tx.date);
            }
        }
    }

    Ok(summary)
}

/// Aggregate summaries over every client chain in the portfolio.
pub fn portfolio_summary(chains: &[(ClientId, Vec<Transaction>)]) -> LendingResult<PortfolioSummary> {
    let clients = chains
        .iter()
        .map(|(client_id, chain)| summarize_client(client_id, chain))
        .collect::<LendingResult<Vec<_>>>()?;

    let mut total_outstanding = Decimal::ZERO;
    let mut total_lent = Decimal::ZERO;
    let mut capital_returned = Decimal::ZERO;
    let mut interest_earned = Decimal::ZERO;
    let mut active_borrowers = 0;
    for s in &clients {
        total_outstanding += s.outstanding_balance;
        total_lent += s.total_lent;
        capital_returned += s.capital_returned;
        interest_earned += s.interest_earned;
        if s.outstanding_balance > Decimal::ZERO {
            active_borrowers += 1;
        }
    }

    Ok(PortfolioSummary {
        total_outstanding,
        total_lent,
        capital_returned,
        interest_earned,
        active_borrowers,
        clients,
    })
}

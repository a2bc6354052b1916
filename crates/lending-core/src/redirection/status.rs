use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::types::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectionState {
    None,
    Waiting,
    /// Still waiting after the agreed grace period. Derived, never stored.
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectionStatus {
    pub state: RedirectionState,
    /// Negative once overdue; `None` when nothing is pending
    pub remaining_wait_days: Option<i64>,
    pub pending_balance: Money,
}

/// Days of grace left: `wait_days − (today − credit_start_date)`.
///
/// A client without a credit start date is treated as starting today.
pub fn remaining_wait_days(client: &Client, today: NaiveDate) -> i64 {
    let days_passed = client
        .credit_start_date
        .map(|start| (today - start).num_days())
        .unwrap_or(0);
    i64::from(client.redirection_wait_days) - days_passed
}

pub fn redirection_status(client: &Client, today: NaiveDate) -> RedirectionStatus {
    if !client.is_awaiting_redirection() {
        return RedirectionStatus {
            state: RedirectionState::None,
            remaining_wait_days: None,
            pending_balance: client.pending_redirection_balance,
        };
    }

    let remaining = remaining_wait_days(client, today);
    let state = if remaining < 0 {
        RedirectionState::Overdue
    } else {
        RedirectionState::Waiting
    };

    RedirectionStatus {
        state,
        remaining_wait_days: Some(remaining),
        pending_balance: client.pending_redirection_balance,
    }
}

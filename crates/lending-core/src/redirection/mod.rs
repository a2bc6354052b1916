//! Cross-client redirection of collected payments.
//!
//! A client enters WAITING when debt is booked for them through a
//! `REDIRECT_IN` leg but the cash has not been handed over yet. Payments
//! collected from other clients are then routed to them (`REDIRECT_OUT`
//! legs sharing the same [`RedirectionId`](crate::types::RedirectionId))
//! until the pending balance reaches zero.

pub mod audit;
pub mod status;
pub mod transfer;

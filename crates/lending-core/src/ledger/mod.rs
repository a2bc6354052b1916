//! Per-client transaction ledger.
//!
//! Every `balance_after` is produced here and nowhere else: either when a
//! transaction is appended to the tail of a client's chain, or when the
//! whole chain is re-walked after an edit or delete.

pub mod engine;
pub mod event;
pub mod summary;
pub mod transaction;

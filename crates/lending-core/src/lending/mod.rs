//! Loan officer workflows built on the ledger, treasury and redirection
//! modules. Each returns a [`posting::Posting`] holding every record the host
//! must persist together.

pub mod collection;
pub mod origination;
pub mod posting;

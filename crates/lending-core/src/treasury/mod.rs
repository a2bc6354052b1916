pub mod account;
pub mod reconciliation;

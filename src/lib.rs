//! Ledger engine for a small cash teller: accounts identified by PIN and
//! name, withdrawals and deposits in 50,000 notes, persisted to a flat
//! `pin|username|balance` file.

pub mod account;
pub mod config;
pub mod engine;
pub mod error;
pub mod receipt;
pub mod record;
pub mod store;
pub mod transaction;

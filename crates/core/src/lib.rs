//! Domain logic for driftwatch.
//!
//! Everything in this crate is free of database and HTTP concerns: the
//! threshold evaluator, threshold and report validation, the alert status
//! lifecycle, naming helpers, and the injectable TTL cache used by the API.

pub mod alert;
pub mod cache;
pub mod error;
pub mod naming;
pub mod paging;
pub mod report;
pub mod threshold;
pub mod types;

//! Report evaluation.
//!
//! [`threshold_check`] runs after a report's metrics are committed and turns
//! threshold violations into stored alerts.

pub mod threshold_check;

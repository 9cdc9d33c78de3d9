//! Alert status lifecycle.
//!
//! Alerts are created `active` from a threshold violation and move once to
//! either `dismissed` (acknowledged as noise) or `resolved` (the regression
//! was fixed). Both end states are terminal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status of a persisted alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Dismissed,
    Resolved,
}

/// All valid status strings, in lifecycle order.
pub const VALID_ALERT_STATUSES: &[&str] = &["active", "dismissed", "resolved"];

impl AlertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dismissed => "dismissed",
            Self::Resolved => "resolved",
        }
    }

    /// Parse a status string, e.g. from a query parameter or a database row.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(Self::Active),
            "dismissed" => Ok(Self::Dismissed),
            "resolved" => Ok(Self::Resolved),
            other => Err(CoreError::Validation(format!(
                "Unknown alert status: '{other}'. Valid statuses: {}",
                VALID_ALERT_STATUSES.join(", ")
            ))),
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Check that an alert may move from `from` to `to`.
pub fn validate_transition(from: AlertStatus, to: AlertStatus) -> Result<(), CoreError> {
    match (from, to) {
        (AlertStatus::Active, AlertStatus::Dismissed | AlertStatus::Resolved) => Ok(()),
        _ => Err(CoreError::Conflict(format!(
            "Alert cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        ))),
    }
}

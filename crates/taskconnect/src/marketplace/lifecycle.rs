//! Application status state machine.
//!
//! ```text
//! pending ──accept──▶ accepted
//!    │
//!    └────reject──▶ rejected
//! ```
//!
//! Both outcomes are terminal. A decision against a non-pending application fails and leaves
//! the record untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Application;
use super::error::MarketplaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome a professional body records for a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub const fn target(self) -> ApplicationStatus {
        match self {
            Decision::Accept => ApplicationStatus::Accepted,
            Decision::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Computes the status reached by applying `decision` to `current`.
pub fn transition(
    current: ApplicationStatus,
    decision: Decision,
) -> Result<ApplicationStatus, ApplicationStatus> {
    match current {
        ApplicationStatus::Pending => Ok(decision.target()),
        terminal => Err(terminal),
    }
}

impl Application {
    /// Records `decision`. Only a pending application can be decided, and only once.
    pub fn decide(
        &mut self,
        decision: Decision,
        decided_at: DateTime<Utc>,
    ) -> Result<(), MarketplaceError> {
        let next = transition(self.status, decision).map_err(|current| {
            MarketplaceError::InvalidTransition {
                application: self.id,
                current,
            }
        })?;

        self.status = next;
        self.decided_at = Some(decided_at);
        Ok(())
    }
}

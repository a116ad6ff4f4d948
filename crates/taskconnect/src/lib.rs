//! TaskConnect: a job marketplace where professional bodies post jobs, workers apply,
//! and the posting body adjudicates each application exactly once.

pub mod auth;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod reporting;
pub mod telemetry;

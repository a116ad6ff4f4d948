//! Activity statistics and the narrator collaborator that turns them into prose.

pub mod narrator;
pub mod summary;

pub use narrator::{NarratorError, PlainNarrator, ReportNarrator};
pub use summary::{ActivityReport, ActivitySummary, StatusBreakdown, WindowCounts, REPORT_WINDOWS};

use std::fmt::Write as _;

use super::summary::ActivitySummary;

/// Outbound hook that turns summary statistics into descriptive text.
///
/// Implementations may call a remote text-generation service; failures never affect stored
/// jobs or applications.
pub trait ReportNarrator: Send + Sync {
    fn narrate(&self, summary: &ActivitySummary) -> Result<String, NarratorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NarratorError {
    #[error("narrator transport unavailable: {0}")]
    Transport(String),
    #[error("narrator returned an empty report")]
    Empty,
}

/// Deterministic narrator that renders the statistics as plain sentences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainNarrator;

fn share(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

impl ReportNarrator for PlainNarrator {
    fn narrate(&self, summary: &ActivitySummary) -> Result<String, NarratorError> {
        let mut text = String::new();
        let totals = summary.applications;

        // Writing into a String cannot fail.
        let _ = writeln!(
            text,
            "TaskConnect activity as of {}.",
            summary.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        let _ = writeln!(
            text,
            "{} workers and {} professional bodies are registered; {} jobs have been posted.",
            summary.workers, summary.professional_bodies, summary.jobs
        );
        let _ = writeln!(
            text,
            "{} applications in total: {} pending, {} accepted ({:.1}%), {} rejected ({:.1}%).",
            totals.total,
            totals.pending,
            totals.accepted,
            share(totals.accepted, totals.total),
            totals.rejected,
            share(totals.rejected, totals.total),
        );

        for window in &summary.windows {
            let _ = writeln!(
                text,
                "Last {} days: {} jobs posted, {} applications ({} pending, {} accepted, {} rejected).",
                window.days,
                window.jobs_posted,
                window.applications.total,
                window.applications.pending,
                window.applications.accepted,
                window.applications.rejected,
            );
        }

        if totals.pending > 0 {
            let _ = writeln!(
                text,
                "{} applications are still awaiting a decision.",
                totals.pending
            );
        }

        Ok(text)
    }
}

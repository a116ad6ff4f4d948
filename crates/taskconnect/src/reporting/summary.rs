use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::marketplace::domain::Job;
use crate::marketplace::lifecycle::ApplicationStatus;
use crate::marketplace::repository::AccountTotals;

/// Trailing windows, in days, reported alongside the all-time totals.
pub const REPORT_WINDOWS: [u32; 3] = [7, 30, 365];

/// Application counts split by current status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl StatusBreakdown {
    fn record(&mut self, status: ApplicationStatus) {
        self.total += 1;
        match status {
            ApplicationStatus::Pending => self.pending += 1,
            ApplicationStatus::Accepted => self.accepted += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }
}

/// Activity inside one trailing window ending at the report time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowCounts {
    pub days: u32,
    pub jobs_posted: usize,
    pub applications: StatusBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub generated_at: DateTime<Utc>,
    pub workers: usize,
    pub professional_bodies: usize,
    pub jobs: usize,
    pub applications: StatusBreakdown,
    pub windows: Vec<WindowCounts>,
}

impl ActivitySummary {
    /// Jobs count toward a window by creation time, applications by applied-at time.
    pub fn compute(jobs: &[Job], accounts: AccountTotals, now: DateTime<Utc>) -> Self {
        let mut applications = StatusBreakdown::default();
        let mut windows: Vec<WindowCounts> = REPORT_WINDOWS
            .iter()
            .map(|days| WindowCounts {
                days: *days,
                jobs_posted: 0,
                applications: StatusBreakdown::default(),
            })
            .collect();

        let within = |at: DateTime<Utc>, days: u32| {
            at <= now && now - at <= Duration::days(i64::from(days))
        };

        for job in jobs {
            for window in windows.iter_mut() {
                if within(job.created_at, window.days) {
                    window.jobs_posted += 1;
                }
            }

            for application in &job.applications {
                applications.record(application.status);
                for window in windows.iter_mut() {
                    if within(application.applied_at, window.days) {
                        window.applications.record(application.status);
                    }
                }
            }
        }

        Self {
            generated_at: now,
            workers: accounts.workers,
            professional_bodies: accounts.professional_bodies,
            jobs: jobs.len(),
            applications,
            windows,
        }
    }
}

/// Summary statistics plus the narrator's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityReport {
    pub summary: ActivitySummary,
    pub report: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::domain::{Application, JobId, ProfessionalBodyId, WorkerId};
    use crate::marketplace::lifecycle::Decision;

    fn job_aged(now: DateTime<Utc>, days: i64) -> Job {
        Job {
            id: JobId::new(),
            title: "Task".to_string(),
            description: "desc".to_string(),
            category: None,
            location: "Leeds".to_string(),
            budget: 40.0,
            posted_by: ProfessionalBodyId::new(),
            created_at: now - Duration::days(days),
            applications: Vec::new(),
        }
    }

    fn application_aged(job: &Job, now: DateTime<Utc>, days: i64, decision: Option<Decision>) -> Application {
        let mut application = Application::pending(job.id, WorkerId::new(), now - Duration::days(days));
        if let Some(decision) = decision {
            application.decide(decision, now).expect("pending");
        }
        application
    }

    #[test]
    fn windows_count_by_creation_and_application_time() {
        let now = Utc::now();
        let mut recent = job_aged(now, 2);
        let recent_apps = vec![
            application_aged(&recent, now, 1, None),
            application_aged(&recent, now, 20, Some(Decision::Accept)),
        ];
        recent.applications = recent_apps;
        let mut old = job_aged(now, 200);
        old.applications = vec![application_aged(&old, now, 400, Some(Decision::Reject))];

        let summary = ActivitySummary::compute(
            &[recent, old],
            AccountTotals {
                workers: 3,
                professional_bodies: 2,
            },
            now,
        );

        assert_eq!(summary.jobs, 2);
        assert_eq!(summary.workers, 3);
        assert_eq!(
            summary.applications,
            StatusBreakdown {
                total: 3,
                pending: 1,
                accepted: 1,
                rejected: 1
            }
        );

        let week = summary.windows[0];
        assert_eq!((week.days, week.jobs_posted, week.applications.total), (7, 1, 1));
        let month = summary.windows[1];
        assert_eq!((month.jobs_posted, month.applications.accepted), (1, 1));
        let year = summary.windows[2];
        assert_eq!((year.jobs_posted, year.applications.total, year.applications.rejected), (2, 2, 0));
    }

    #[test]
    fn empty_marketplace_reports_zeroes() {
        let summary = ActivitySummary::compute(&[], AccountTotals::default(), Utc::now());
        assert_eq!(summary.windows.len(), REPORT_WINDOWS.len());
        assert!(summary.windows.iter().all(|window| window.jobs_posted == 0));
        assert_eq!(summary.applications, StatusBreakdown::default());
    }
}

//! Read projections over the job collection.
//!
//! Joins against owners and applicants are explicit lookups; a failed join never drops a
//! record, it substitutes the placeholders defined here.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::access::is_self_owned;
use super::domain::{ApplicationId, Job, JobId, ProfessionalBodyId, Worker, WorkerId};
use super::lifecycle::ApplicationStatus;

pub const UNKNOWN_OWNER: &str = "Unknown";
pub const UNCATEGORIZED: &str = "Uncategorized";
pub const UNKNOWN_NAME: &str = "Unknown";
pub const MISSING_EMAIL: &str = "Not provided";
pub const NOT_APPLICABLE: &str = "N/A";

/// Display names of job owners keyed by identity. Absent entries resolve to [`UNKNOWN_OWNER`].
pub type OwnerNames = HashMap<ProfessionalBodyId, String>;
/// Applicant accounts keyed by identity. Absent entries resolve to placeholders.
pub type Applicants = HashMap<WorkerId, Worker>;

fn owner_name(owners: &OwnerNames, owner: &ProfessionalBodyId) -> String {
    owners
        .get(owner)
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_OWNER)
        .to_string()
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Public view of a job with its owner resolved to a display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobListing {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub location: String,
    pub budget: f64,
    pub posted_by: String,
    pub owner_id: ProfessionalBodyId,
    pub created_at: DateTime<Utc>,
    pub application_count: usize,
}

impl JobListing {
    pub fn from_job(job: &Job, owners: &OwnerNames) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            description: job.description.clone(),
            category: job.category.clone(),
            location: job.location.clone(),
            budget: job.budget,
            posted_by: owner_name(owners, &job.posted_by),
            owner_id: job.posted_by,
            created_at: job.created_at,
            application_count: job.applications.len(),
        }
    }
}

/// Parent job fields attached to an application view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub location: String,
    pub budget: f64,
    pub posted_by: String,
}

impl JobSummary {
    fn from_job(job: &Job, owners: &OwnerNames) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            description: job.description.clone(),
            category: job.category.clone(),
            location: job.location.clone(),
            budget: job.budget,
            posted_by: owner_name(owners, &job.posted_by),
        }
    }
}

/// Applicant profile shown to the adjudicating body. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantSummary {
    pub id: WorkerId,
    pub name: String,
    pub email: String,
    pub category: String,
    pub skills: BTreeSet<String>,
    pub experience: u32,
    pub availability: String,
}

impl ApplicantSummary {
    pub fn resolve(id: WorkerId, worker: Option<&Worker>) -> Self {
        match worker {
            Some(worker) => Self {
                id,
                name: or_placeholder(&worker.name, UNKNOWN_NAME),
                email: or_placeholder(&worker.email, MISSING_EMAIL),
                category: or_placeholder(&worker.category, NOT_APPLICABLE),
                skills: worker.skills.clone(),
                experience: worker.experience,
                availability: or_placeholder(&worker.availability, NOT_APPLICABLE),
            },
            None => Self {
                id,
                name: UNKNOWN_NAME.to_string(),
                email: MISSING_EMAIL.to_string(),
                category: NOT_APPLICABLE.to_string(),
                skills: BTreeSet::new(),
                experience: 0,
                availability: NOT_APPLICABLE.to_string(),
            },
        }
    }
}

/// One application paired with its parent job and applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    pub job: JobSummary,
    pub worker: ApplicantSummary,
}

/// Every job, in the order given, with owners resolved.
pub fn public_listing(jobs: &[Job], owners: &OwnerNames) -> Vec<JobListing> {
    jobs.iter()
        .map(|job| JobListing::from_job(job, owners))
        .collect()
}

/// Jobs the worker has not applied to (in any status) and does not own, grouped by category.
pub fn available_by_category(
    worker: &WorkerId,
    jobs: &[Job],
    owners: &OwnerNames,
) -> BTreeMap<String, Vec<JobListing>> {
    let mut grouped: BTreeMap<String, Vec<JobListing>> = BTreeMap::new();

    for job in jobs {
        if job.application_from(worker).is_some() || is_self_owned(worker, job) {
            continue;
        }

        let category = job
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .unwrap_or(UNCATEGORIZED)
            .to_string();

        grouped
            .entry(category)
            .or_default()
            .push(JobListing::from_job(job, owners));
    }

    grouped
}

/// The worker's own applications across all jobs.
pub fn worker_applications(
    worker: &WorkerId,
    jobs: &[Job],
    owners: &OwnerNames,
    applicants: &Applicants,
) -> Vec<ApplicationView> {
    jobs.iter()
        .flat_map(|job| {
            job.applications
                .iter()
                .filter(|application| application.worker == *worker)
                .map(move |application| (job, application))
        })
        .map(|(job, application)| ApplicationView {
            id: application.id,
            status: application.status,
            applied_at: application.applied_at,
            decided_at: application.decided_at,
            job: JobSummary::from_job(job, owners),
            worker: ApplicantSummary::resolve(application.worker, applicants.get(&application.worker)),
        })
        .collect()
}

/// Every application embedded in the given jobs. Callers pass only jobs the body owns.
pub fn received_applications(
    jobs: &[Job],
    owners: &OwnerNames,
    applicants: &Applicants,
) -> Vec<ApplicationView> {
    jobs.iter()
        .flat_map(|job| {
            job.applications
                .iter()
                .map(move |application| (job, application))
        })
        .map(|(job, application)| ApplicationView {
            id: application.id,
            status: application.status,
            applied_at: application.applied_at,
            decided_at: application.decided_at,
            job: JobSummary::from_job(job, owners),
            worker: ApplicantSummary::resolve(application.worker, applicants.get(&application.worker)),
        })
        .collect()
}

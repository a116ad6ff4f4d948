use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::access;
use super::accounts::{
    LoginCredentials, ProfessionalBodyProfileUpdate, ProfessionalBodyRegistration,
    WorkerProfileUpdate, WorkerRegistration,
};
use super::domain::{
    Application, ApplicationId, Job, JobDraft, JobId, ProfessionalBody, ProfessionalBodyId,
    ProfessionalBodyProfile, Worker, WorkerId, WorkerProfile,
};
use super::error::MarketplaceError;
use super::lifecycle::Decision;
use super::repository::{MarketplaceRepository, RepositoryError};
use super::visibility::{self, Applicants, ApplicationView, JobListing, OwnerNames};
use crate::auth::{
    hash_password, verify_password, CredentialAuthority, CredentialError, IssuedToken, Principal,
    Role,
};
use crate::reporting::{ActivityReport, ActivitySummary, NarratorError, ReportNarrator};

/// Service composing the store, the credential authority, and the report narrator.
pub struct MarketplaceService<R, N> {
    repository: Arc<R>,
    narrator: Arc<N>,
    credentials: Arc<CredentialAuthority>,
}

fn email_conflict(email: &str) -> impl FnOnce(RepositoryError) -> MarketplaceError + '_ {
    move |err| match err {
        RepositoryError::Conflict => MarketplaceError::email_taken(email),
        other => other.into(),
    }
}

impl<R, N> MarketplaceService<R, N>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    pub fn new(repository: Arc<R>, narrator: Arc<N>, credentials: CredentialAuthority) -> Self {
        Self {
            repository,
            narrator,
            credentials: Arc::new(credentials),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Resolve a bearer token into the caller's principal.
    pub fn authenticate(&self, token: &str) -> Result<Principal, MarketplaceError> {
        self.credentials.verify(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            MarketplaceError::from(err)
        })
    }

    /// Register a worker account. Runs bcrypt, so async callers should use a blocking task.
    pub fn register_worker(
        &self,
        registration: WorkerRegistration,
    ) -> Result<WorkerProfile, MarketplaceError> {
        registration.validate()?;
        let experience = registration.experience_years()?;
        let email = registration.email.trim().to_string();
        if self.repository.worker_by_email(&email)?.is_some() {
            return Err(email_conflict(&email)(RepositoryError::Conflict));
        }

        let password_hash = hash_password(&registration.password, self.credentials.password_cost())?;
        let worker = Worker {
            id: WorkerId::new(),
            name: registration.name.trim().to_string(),
            email: email.clone(),
            password_hash,
            category: registration.category.trim().to_string(),
            skills: registration
                .skills
                .iter()
                .map(|skill| skill.trim().to_string())
                .filter(|skill| !skill.is_empty())
                .collect(),
            experience,
            availability: registration.availability.trim().to_string(),
        };

        let stored = self
            .repository
            .insert_worker(worker)
            .map_err(email_conflict(&email))?;
        info!(worker_id = %stored.id, "worker registered");
        Ok(stored.profile())
    }

    pub fn register_professional_body(
        &self,
        registration: ProfessionalBodyRegistration,
    ) -> Result<ProfessionalBodyProfile, MarketplaceError> {
        registration.validate()?;
        let email = registration.email.trim().to_string();
        if self.repository.professional_body_by_email(&email)?.is_some() {
            return Err(email_conflict(&email)(RepositoryError::Conflict));
        }

        let password_hash = hash_password(&registration.password, self.credentials.password_cost())?;
        let body = ProfessionalBody {
            id: ProfessionalBodyId::new(),
            name: registration.name.trim().to_string(),
            email: email.clone(),
            password_hash,
            body_type: registration.body_type.trim().to_string(),
            location: registration.location.trim().to_string(),
            description: registration.description.trim().to_string(),
        };

        let stored = self
            .repository
            .insert_professional_body(body)
            .map_err(email_conflict(&email))?;
        info!(professional_body_id = %stored.id, "professional body registered");
        Ok(stored.profile())
    }

    /// Verify credentials for the given role and issue a bearer token.
    pub fn login(
        &self,
        role: Role,
        credentials: &LoginCredentials,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, MarketplaceError> {
        let account = match role {
            Role::Worker => self
                .repository
                .worker_by_email(&credentials.email)?
                .map(|worker| (worker.id.0, worker.password_hash)),
            Role::ProfessionalBody => self
                .repository
                .professional_body_by_email(&credentials.email)?
                .map(|body| (body.id.0, body.password_hash)),
        };

        let Some((id, password_hash)) = account else {
            warn!(%role, "login attempt for unknown account");
            return Err(CredentialError::InvalidLogin.into());
        };
        if !verify_password(&credentials.password, &password_hash)? {
            warn!(%role, account_id = %id, "login attempt with wrong password");
            return Err(CredentialError::InvalidLogin.into());
        }

        let issued = self.credentials.issue(&Principal::new(id, role), now)?;
        info!(%role, account_id = %id, expires_at = %issued.expires_at, "login succeeded");
        Ok(issued)
    }

    pub fn worker_profile(&self, principal: &Principal) -> Result<WorkerProfile, MarketplaceError> {
        let id = access::acting_worker(principal)?;
        self.load_worker(&id).map(|worker| worker.profile())
    }

    pub fn update_worker_profile(
        &self,
        principal: &Principal,
        update: WorkerProfileUpdate,
    ) -> Result<WorkerProfile, MarketplaceError> {
        let id = access::acting_worker(principal)?;
        let profile = self.repository.update_worker(&id, |worker| {
            update.apply(worker);
            Ok(worker.profile())
        })?;
        info!(worker_id = %id, "worker profile updated");
        Ok(profile)
    }

    pub fn professional_body_profile(
        &self,
        principal: &Principal,
    ) -> Result<ProfessionalBodyProfile, MarketplaceError> {
        let id = access::acting_professional_body(principal)?;
        self.load_professional_body(&id).map(|body| body.profile())
    }

    pub fn update_professional_body_profile(
        &self,
        principal: &Principal,
        update: ProfessionalBodyProfileUpdate,
    ) -> Result<ProfessionalBodyProfile, MarketplaceError> {
        let id = access::acting_professional_body(principal)?;
        let profile = self.repository.update_professional_body(&id, |body| {
            update.apply(body);
            Ok(body.profile())
        })?;
        info!(professional_body_id = %id, "professional body profile updated");
        Ok(profile)
    }

    /// Publish a job owned by the calling professional body.
    pub fn post_job(
        &self,
        principal: &Principal,
        draft: JobDraft,
        now: DateTime<Utc>,
    ) -> Result<JobListing, MarketplaceError> {
        let owner = access::acting_professional_body(principal)?;
        let body = self.load_professional_body(&owner)?;
        let job = draft.into_job(owner, now)?;

        let stored = self.repository.insert_job(job)?;
        info!(job_id = %stored.id, professional_body_id = %owner, "job posted");

        let owners = OwnerNames::from([(owner, body.name)]);
        Ok(JobListing::from_job(&stored, &owners))
    }

    /// Every job, newest first. Open to unauthenticated callers.
    pub fn list_jobs(&self) -> Result<Vec<JobListing>, MarketplaceError> {
        let jobs = self.repository.jobs()?;
        let owners = self.owner_names(&jobs)?;
        Ok(visibility::public_listing(&jobs, &owners))
    }

    pub fn available_jobs(
        &self,
        principal: &Principal,
    ) -> Result<BTreeMap<String, Vec<JobListing>>, MarketplaceError> {
        let worker = access::acting_worker(principal)?;
        let jobs = self.repository.jobs()?;
        let owners = self.owner_names(&jobs)?;
        Ok(visibility::available_by_category(&worker, &jobs, &owners))
    }

    /// Create a pending application. The duplicate check and the append share one atomic
    /// job update.
    pub fn apply(
        &self,
        principal: &Principal,
        job_id: &JobId,
        now: DateTime<Utc>,
    ) -> Result<Application, MarketplaceError> {
        let worker = access::acting_worker(principal)?;
        self.load_worker(&worker)?;

        let application = self.repository.update_job(job_id, |job| {
            access::ensure_not_self_owned(&worker, job)?;
            if let Some(existing) = job.application_from(&worker) {
                return Err(MarketplaceError::Duplicate {
                    resource: "application",
                    detail: format!(
                        "worker {worker} already applied to job {} ({})",
                        job.id, existing.status
                    ),
                });
            }

            let application = Application::pending(job.id, worker, now);
            job.applications.push(application.clone());
            Ok(application)
        });

        match &application {
            Ok(application) => info!(
                application_id = %application.id,
                job_id = %job_id,
                worker_id = %worker,
                "application submitted"
            ),
            Err(err) => warn!(job_id = %job_id, worker_id = %worker, error = %err, "apply refused"),
        }
        application
    }

    /// The caller's applications: sent ones for a worker, received ones for a professional body.
    pub fn my_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationView>, MarketplaceError> {
        match principal.role {
            Role::Worker => {
                let worker = access::acting_worker(principal)?;
                let jobs = self.repository.jobs_applied_to_by(&worker)?;
                let owners = self.owner_names(&jobs)?;
                let applicants = self.applicants(&jobs)?;
                Ok(visibility::worker_applications(
                    &worker,
                    &jobs,
                    &owners,
                    &applicants,
                ))
            }
            Role::ProfessionalBody => {
                let owner = access::acting_professional_body(principal)?;
                let jobs = self.repository.jobs_posted_by(&owner)?;
                let owners = self.owner_names(&jobs)?;
                let applicants = self.applicants(&jobs)?;
                Ok(visibility::received_applications(&jobs, &owners, &applicants))
            }
        }
    }

    /// Applications of a single job, for its owner.
    pub fn job_applications(
        &self,
        principal: &Principal,
        job_id: &JobId,
    ) -> Result<Vec<ApplicationView>, MarketplaceError> {
        let owner = access::acting_professional_body(principal)?;
        let job = self
            .repository
            .job(job_id)?
            .ok_or_else(|| MarketplaceError::not_found("job", job_id))?;
        access::ensure_job_owner(&owner, &job)?;

        let jobs = [job];
        let owners = self.owner_names(&jobs)?;
        let applicants = self.applicants(&jobs)?;
        Ok(visibility::received_applications(&jobs, &owners, &applicants))
    }

    pub fn accept(
        &self,
        principal: &Principal,
        application_id: &ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<Application, MarketplaceError> {
        self.decide(principal, application_id, Decision::Accept, now)
    }

    pub fn reject(
        &self,
        principal: &Principal,
        application_id: &ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<Application, MarketplaceError> {
        self.decide(principal, application_id, Decision::Reject, now)
    }

    /// Move a pending application to a terminal status. Ownership and state are checked
    /// inside the atomic job update, so concurrent decisions cannot both succeed.
    pub fn decide(
        &self,
        principal: &Principal,
        application_id: &ApplicationId,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<Application, MarketplaceError> {
        let owner = access::acting_professional_body(principal)?;
        let job_id = self
            .repository
            .job_for_application(application_id)?
            .ok_or_else(|| MarketplaceError::not_found("application", application_id))?;

        let decided = self.repository.update_job(&job_id, |job| {
            access::ensure_job_owner(&owner, job)?;
            let application = job
                .application_mut(application_id)
                .ok_or_else(|| MarketplaceError::not_found("application", application_id))?;
            application.decide(decision, now)?;
            Ok(application.clone())
        });

        match &decided {
            Ok(application) => info!(
                application_id = %application_id,
                job_id = %job_id,
                status = %application.status,
                "application decided"
            ),
            Err(err) => warn!(
                application_id = %application_id,
                job_id = %job_id,
                error = %err,
                "application decision refused"
            ),
        }
        decided
    }

    /// Aggregate marketplace activity and hand it to the narrator. Stored data is only read.
    pub fn activity_report(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport, MarketplaceError> {
        let jobs = self.repository.jobs()?;
        let accounts = self.repository.account_totals()?;
        let summary = ActivitySummary::compute(&jobs, accounts, now);

        let report = self
            .narrator
            .narrate(&summary)
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(NarratorError::Empty)
                } else {
                    Ok(text)
                }
            })
            .map_err(|err| {
                warn!(error = %err, "report narration failed");
                MarketplaceError::UpstreamUnavailable {
                    collaborator: "report narrator",
                    reason: err.to_string(),
                }
            })?;

        debug!(
            role = %principal.role,
            jobs = summary.jobs,
            applications = summary.applications.total,
            "activity report generated"
        );
        Ok(ActivityReport { summary, report })
    }

    fn load_worker(&self, id: &WorkerId) -> Result<Worker, MarketplaceError> {
        self.repository
            .worker(id)?
            .ok_or_else(|| MarketplaceError::not_found("worker", id))
    }

    fn load_professional_body(
        &self,
        id: &ProfessionalBodyId,
    ) -> Result<ProfessionalBody, MarketplaceError> {
        self.repository
            .professional_body(id)?
            .ok_or_else(|| MarketplaceError::not_found("professional body", id))
    }

    fn owner_names(&self, jobs: &[Job]) -> Result<OwnerNames, MarketplaceError> {
        let ids: BTreeSet<ProfessionalBodyId> = jobs.iter().map(|job| job.posted_by).collect();
        let mut owners = OwnerNames::new();
        for id in ids {
            if let Some(body) = self.repository.professional_body(&id)? {
                owners.insert(id, body.name);
            }
        }
        Ok(owners)
    }

    fn applicants(&self, jobs: &[Job]) -> Result<Applicants, MarketplaceError> {
        let ids: BTreeSet<WorkerId> = jobs
            .iter()
            .flat_map(|job| job.applications.iter().map(|application| application.worker))
            .collect();
        let mut applicants = Applicants::new();
        for id in ids {
            if let Some(worker) = self.repository.worker(&id)? {
                applicants.insert(id, worker);
            }
        }
        Ok(applicants)
    }
}

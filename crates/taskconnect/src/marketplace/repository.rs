use super::domain::{
    ApplicationId, Job, JobId, ProfessionalBody, ProfessionalBodyId, Worker, WorkerId,
};
use super::error::MarketplaceError;

/// Storage abstraction so the service can be exercised in isolation.
///
/// Implementations must run [`MarketplaceRepository::update_job`] as an atomic
/// read-modify-write of a single job document.
pub trait MarketplaceRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the email is already registered.
    fn insert_worker(&self, worker: Worker) -> Result<Worker, RepositoryError>;
    fn worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError>;
    fn worker_by_email(&self, email: &str) -> Result<Option<Worker>, RepositoryError>;
    /// Runs `mutate` against the stored worker and writes it back only when `mutate` succeeds
    /// and no other worker holds the resulting email.
    fn update_worker<T, F>(&self, id: &WorkerId, mutate: F) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut Worker) -> Result<T, MarketplaceError>;

    fn insert_professional_body(
        &self,
        body: ProfessionalBody,
    ) -> Result<ProfessionalBody, RepositoryError>;
    fn professional_body(
        &self,
        id: &ProfessionalBodyId,
    ) -> Result<Option<ProfessionalBody>, RepositoryError>;
    fn professional_body_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProfessionalBody>, RepositoryError>;
    /// Same contract as [`MarketplaceRepository::update_worker`].
    fn update_professional_body<T, F>(
        &self,
        id: &ProfessionalBodyId,
        mutate: F,
    ) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut ProfessionalBody) -> Result<T, MarketplaceError>;

    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// All jobs, newest first.
    fn jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    /// Jobs owned by `owner`, newest first.
    fn jobs_posted_by(&self, owner: &ProfessionalBodyId) -> Result<Vec<Job>, RepositoryError>;
    /// Jobs carrying an application from `worker`, newest first.
    fn jobs_applied_to_by(&self, worker: &WorkerId) -> Result<Vec<Job>, RepositoryError>;
    /// Resolves the parent job of an application through the application index.
    fn job_for_application(&self, id: &ApplicationId) -> Result<Option<JobId>, RepositoryError>;

    /// Runs `mutate` against the stored job under the store's single-document guarantee.
    /// The job is written back, and new applications indexed, only when `mutate` succeeds.
    fn update_job<T, F>(&self, id: &JobId, mutate: F) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut Job) -> Result<T, MarketplaceError>;

    fn account_totals(&self) -> Result<AccountTotals, RepositoryError>;
}

/// Registered account counts used by activity reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountTotals {
    pub workers: usize,
    pub professional_bodies: usize,
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    ApplicationId, Job, JobId, ProfessionalBody, ProfessionalBodyId, Worker, WorkerId,
};
use super::error::MarketplaceError;
use super::repository::{AccountTotals, MarketplaceRepository, RepositoryError};

#[derive(Debug, Default)]
struct Collections {
    workers: HashMap<WorkerId, Worker>,
    professional_bodies: HashMap<ProfessionalBodyId, ProfessionalBody>,
    jobs: HashMap<JobId, Job>,
    application_index: HashMap<ApplicationId, JobId>,
}

/// Process-local store. A single lock makes every job update atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMarketplace {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryMarketplace {
    fn lock(&self) -> Result<MutexGuard<'_, Collections>, RepositoryError> {
        self.collections
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

fn same_email(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

fn newest_first(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    jobs
}

impl MarketplaceRepository for InMemoryMarketplace {
    fn insert_worker(&self, worker: Worker) -> Result<Worker, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.workers.contains_key(&worker.id)
            || guard
                .workers
                .values()
                .any(|existing| same_email(&existing.email, &worker.email))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.workers.insert(worker.id, worker.clone());
        Ok(worker)
    }

    fn worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError> {
        Ok(self.lock()?.workers.get(id).cloned())
    }

    fn worker_by_email(&self, email: &str) -> Result<Option<Worker>, RepositoryError> {
        Ok(self
            .lock()?
            .workers
            .values()
            .find(|worker| same_email(&worker.email, email))
            .cloned())
    }

    fn update_worker<T, F>(&self, id: &WorkerId, mutate: F) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut Worker) -> Result<T, MarketplaceError>,
    {
        let mut guard = self.lock()?;
        let mut working = guard
            .workers
            .get(id)
            .cloned()
            .ok_or_else(|| MarketplaceError::not_found("worker", id))?;

        let outcome = mutate(&mut working)?;

        if guard
            .workers
            .values()
            .any(|existing| existing.id != *id && same_email(&existing.email, &working.email))
        {
            return Err(MarketplaceError::email_taken(&working.email));
        }
        guard.workers.insert(*id, working);
        Ok(outcome)
    }

    fn insert_professional_body(
        &self,
        body: ProfessionalBody,
    ) -> Result<ProfessionalBody, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.professional_bodies.contains_key(&body.id)
            || guard
                .professional_bodies
                .values()
                .any(|existing| same_email(&existing.email, &body.email))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.professional_bodies.insert(body.id, body.clone());
        Ok(body)
    }

    fn professional_body(
        &self,
        id: &ProfessionalBodyId,
    ) -> Result<Option<ProfessionalBody>, RepositoryError> {
        Ok(self.lock()?.professional_bodies.get(id).cloned())
    }

    fn professional_body_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProfessionalBody>, RepositoryError> {
        Ok(self
            .lock()?
            .professional_bodies
            .values()
            .find(|body| same_email(&body.email, email))
            .cloned())
    }

    fn update_professional_body<T, F>(
        &self,
        id: &ProfessionalBodyId,
        mutate: F,
    ) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut ProfessionalBody) -> Result<T, MarketplaceError>,
    {
        let mut guard = self.lock()?;
        let mut working = guard
            .professional_bodies
            .get(id)
            .cloned()
            .ok_or_else(|| MarketplaceError::not_found("professional body", id))?;

        let outcome = mutate(&mut working)?;

        if guard
            .professional_bodies
            .values()
            .any(|existing| existing.id != *id && same_email(&existing.email, &working.email))
        {
            return Err(MarketplaceError::email_taken(&working.email));
        }
        guard.professional_bodies.insert(*id, working);
        Ok(outcome)
    }

    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        for application in &job.applications {
            guard.application_index.insert(application.id, job.id);
        }
        guard.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    fn job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.get(id).cloned())
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        let jobs = self.lock()?.jobs.values().cloned().collect();
        Ok(newest_first(jobs))
    }

    fn jobs_posted_by(&self, owner: &ProfessionalBodyId) -> Result<Vec<Job>, RepositoryError> {
        let jobs = self
            .lock()?
            .jobs
            .values()
            .filter(|job| job.is_owned_by(owner))
            .cloned()
            .collect();
        Ok(newest_first(jobs))
    }

    fn jobs_applied_to_by(&self, worker: &WorkerId) -> Result<Vec<Job>, RepositoryError> {
        let jobs = self
            .lock()?
            .jobs
            .values()
            .filter(|job| job.application_from(worker).is_some())
            .cloned()
            .collect();
        Ok(newest_first(jobs))
    }

    fn job_for_application(&self, id: &ApplicationId) -> Result<Option<JobId>, RepositoryError> {
        Ok(self.lock()?.application_index.get(id).copied())
    }

    fn update_job<T, F>(&self, id: &JobId, mutate: F) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut Job) -> Result<T, MarketplaceError>,
    {
        let mut guard = self.lock()?;
        let mut working = guard
            .jobs
            .get(id)
            .cloned()
            .ok_or_else(|| MarketplaceError::not_found("job", id))?;

        let outcome = mutate(&mut working)?;

        for application in &working.applications {
            guard.application_index.insert(application.id, working.id);
        }
        guard.jobs.insert(working.id, working);
        Ok(outcome)
    }

    fn account_totals(&self) -> Result<AccountTotals, RepositoryError> {
        let guard = self.lock()?;
        Ok(AccountTotals {
            workers: guard.workers.len(),
            professional_bodies: guard.professional_bodies.len(),
        })
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::auth::{CredentialAuthority, Principal, Role};
use crate::marketplace::accounts::{
    ExperienceInput, LoginCredentials, ProfessionalBodyRegistration, WorkerRegistration,
};
use crate::marketplace::domain::{
    ApplicationId, BudgetInput, Job, JobDraft, JobId, ProfessionalBody, ProfessionalBodyId,
    Worker, WorkerId,
};
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::memory::InMemoryMarketplace;
use crate::marketplace::repository::{AccountTotals, MarketplaceRepository, RepositoryError};
use crate::marketplace::{marketplace_router, MarketplaceService};
use crate::reporting::{ActivitySummary, NarratorError, PlainNarrator, ReportNarrator};

pub(super) const TEST_SECRET: &str = "marketplace-test-secret";
pub(super) const PASSWORD: &str = "correct horse battery";

pub(super) type TestService = MarketplaceService<InMemoryMarketplace, PlainNarrator>;

pub(super) fn credentials() -> CredentialAuthority {
    CredentialAuthority::new(TEST_SECRET, Duration::minutes(60), 4)
}

pub(super) fn build_service() -> (TestService, Arc<InMemoryMarketplace>) {
    let repository = Arc::new(InMemoryMarketplace::default());
    let service =
        MarketplaceService::new(repository.clone(), Arc::new(PlainNarrator), credentials());
    (service, repository)
}

pub(super) fn service_with_narrator<N>(narrator: N) -> MarketplaceService<InMemoryMarketplace, N>
where
    N: ReportNarrator + 'static,
{
    MarketplaceService::new(
        Arc::new(InMemoryMarketplace::default()),
        Arc::new(narrator),
        credentials(),
    )
}

pub(super) fn worker_registration(name: &str, email: &str) -> WorkerRegistration {
    WorkerRegistration {
        name: name.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        category: "Plumbing".to_string(),
        skills: vec!["pipes".to_string(), "soldering".to_string()],
        experience: Some(ExperienceInput::Years(5)),
        availability: "weekdays".to_string(),
    }
}

pub(super) fn body_registration(name: &str, email: &str) -> ProfessionalBodyRegistration {
    ProfessionalBodyRegistration {
        name: name.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        body_type: "Council".to_string(),
        location: "Leeds".to_string(),
        description: "Housing maintenance".to_string(),
    }
}

pub(super) fn login(email: &str) -> LoginCredentials {
    LoginCredentials {
        email: email.to_string(),
        password: PASSWORD.to_string(),
    }
}

pub(super) fn register_worker<R, N>(
    service: &MarketplaceService<R, N>,
    name: &str,
    email: &str,
) -> Principal
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let profile = service
        .register_worker(worker_registration(name, email))
        .expect("worker registers");
    Principal::new(profile.id.0, Role::Worker)
}

pub(super) fn register_body<R, N>(
    service: &MarketplaceService<R, N>,
    name: &str,
    email: &str,
) -> Principal
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let profile = service
        .register_professional_body(body_registration(name, email))
        .expect("professional body registers");
    Principal::new(profile.id.0, Role::ProfessionalBody)
}

pub(super) fn draft(title: &str, category: Option<&str>, budget: f64) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: format!("{title} at the community centre"),
        category: category.map(str::to_string),
        location: "Leeds".to_string(),
        budget: BudgetInput::Amount(budget),
    }
}

pub(super) fn post<R, N>(
    service: &MarketplaceService<R, N>,
    owner: &Principal,
    title: &str,
    category: Option<&str>,
) -> JobId
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    service
        .post_job(owner, draft(title, category, 50.0), Utc::now())
        .expect("job posts")
        .id
}

pub(super) struct FailingNarrator;

impl ReportNarrator for FailingNarrator {
    fn narrate(&self, _summary: &ActivitySummary) -> Result<String, NarratorError> {
        Err(NarratorError::Transport("connection refused".to_string()))
    }
}

pub(super) struct BlankNarrator;

impl ReportNarrator for BlankNarrator {
    fn narrate(&self, _summary: &ActivitySummary) -> Result<String, NarratorError> {
        Ok("   ".to_string())
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

pub(super) struct UnavailableRepository;

impl MarketplaceRepository for UnavailableRepository {
    fn insert_worker(&self, _worker: Worker) -> Result<Worker, RepositoryError> {
        Err(offline())
    }

    fn worker(&self, _id: &WorkerId) -> Result<Option<Worker>, RepositoryError> {
        Err(offline())
    }

    fn worker_by_email(&self, _email: &str) -> Result<Option<Worker>, RepositoryError> {
        Err(offline())
    }

    fn update_worker<T, F>(&self, _id: &WorkerId, _mutate: F) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut Worker) -> Result<T, MarketplaceError>,
    {
        Err(offline().into())
    }

    fn insert_professional_body(
        &self,
        _body: ProfessionalBody,
    ) -> Result<ProfessionalBody, RepositoryError> {
        Err(offline())
    }

    fn professional_body(
        &self,
        _id: &ProfessionalBodyId,
    ) -> Result<Option<ProfessionalBody>, RepositoryError> {
        Err(offline())
    }

    fn professional_body_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<ProfessionalBody>, RepositoryError> {
        Err(offline())
    }

    fn update_professional_body<T, F>(
        &self,
        _id: &ProfessionalBodyId,
        _mutate: F,
    ) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut ProfessionalBody) -> Result<T, MarketplaceError>,
    {
        Err(offline().into())
    }

    fn insert_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        Err(offline())
    }

    fn job(&self, _id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Err(offline())
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Err(offline())
    }

    fn jobs_posted_by(&self, _owner: &ProfessionalBodyId) -> Result<Vec<Job>, RepositoryError> {
        Err(offline())
    }

    fn jobs_applied_to_by(&self, _worker: &WorkerId) -> Result<Vec<Job>, RepositoryError> {
        Err(offline())
    }

    fn job_for_application(&self, _id: &ApplicationId) -> Result<Option<JobId>, RepositoryError> {
        Err(offline())
    }

    fn update_job<T, F>(&self, _id: &JobId, _mutate: F) -> Result<T, MarketplaceError>
    where
        F: FnOnce(&mut Job) -> Result<T, MarketplaceError>,
    {
        Err(offline().into())
    }

    fn account_totals(&self) -> Result<AccountTotals, RepositoryError> {
        Err(offline())
    }
}

pub(super) fn router_with_service<R, N>(service: Arc<MarketplaceService<R, N>>) -> axum::Router
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    marketplace_router(service)
}

pub(super) fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

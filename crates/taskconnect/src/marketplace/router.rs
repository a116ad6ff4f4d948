use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{Map, Value};

use super::accounts::{
    LoginCredentials, ProfessionalBodyProfileUpdate, ProfessionalBodyRegistration,
    WorkerProfileUpdate, WorkerRegistration,
};
use super::domain::{
    Application, ApplicationId, JobDraft, JobId, ProfessionalBodyProfile, WorkerProfile,
};
use super::error::MarketplaceError;
use super::lifecycle::Decision;
use super::repository::MarketplaceRepository;
use super::service::MarketplaceService;
use super::visibility::{ApplicationView, JobListing};
use crate::auth::{CredentialError, IssuedToken, Principal, Role};
use crate::reporting::{ActivityReport, ReportNarrator};

type Service<R, N> = Arc<MarketplaceService<R, N>>;
type Reply<T> = Result<(StatusCode, Json<T>), MarketplaceError>;
/// Request body whose rejection is answered with the marketplace error payload.
type Body<T> = Result<Json<T>, JsonRejection>;

/// Router builder exposing the account, job, application, and report endpoints.
pub fn marketplace_router<R, N>(service: Service<R, N>) -> Router
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    Router::new()
        .route("/api/auth/register/worker", post(register_worker::<R, N>))
        .route(
            "/api/auth/register/professional-body",
            post(register_professional_body::<R, N>),
        )
        .route("/api/auth/login/worker", post(login_worker::<R, N>))
        .route(
            "/api/auth/login/professional-body",
            post(login_professional_body::<R, N>),
        )
        .route(
            "/api/user/worker/me",
            get(worker_profile::<R, N>).put(update_worker_profile::<R, N>),
        )
        .route(
            "/api/user/professional-body/me",
            get(professional_body_profile::<R, N>).put(update_professional_body_profile::<R, N>),
        )
        .route("/api/jobs", get(list_jobs::<R, N>).post(post_job::<R, N>))
        .route("/api/jobs/available", get(available_jobs::<R, N>))
        .route("/api/jobs/applications", get(my_applications::<R, N>))
        .route("/api/jobs/report", get(activity_report::<R, N>))
        .route("/api/jobs/:job_id/apply", post(apply::<R, N>))
        .route(
            "/api/jobs/:job_id/applications",
            get(job_applications::<R, N>),
        )
        .route(
            "/api/jobs/applications/:application_id/accept",
            post(accept::<R, N>),
        )
        .route(
            "/api/jobs/applications/:application_id/reject",
            post(reject::<R, N>),
        )
        .with_state(service)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialError::Missing)?;
    let header = header.to_str().map_err(|_| CredentialError::Invalid)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(CredentialError::Invalid)?
        .trim();

    if token.is_empty() {
        return Err(CredentialError::Missing);
    }
    Ok(token)
}

fn principal<R, N>(
    service: &Service<R, N>,
    headers: &HeaderMap,
) -> Result<Principal, MarketplaceError>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let token = bearer_token(headers)?;
    service.authenticate(token)
}

fn parse_id<T: FromStr>(resource: &str, raw: &str) -> Result<T, MarketplaceError> {
    raw.parse::<T>().map_err(|_| {
        MarketplaceError::ValidationFailed(format!("'{raw}' is not a valid {resource} id"))
    })
}

/// Runs credential hashing off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, MarketplaceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, MarketplaceError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| MarketplaceError::UpstreamUnavailable {
            collaborator: "credential service",
            reason: err.to_string(),
        })?
}

async fn register_worker<R, N>(
    State(service): State<Service<R, N>>,
    registration: Body<WorkerRegistration>,
) -> Reply<WorkerProfile>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let Json(registration) = registration?;
    let profile = blocking(move || service.register_worker(registration)).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn register_professional_body<R, N>(
    State(service): State<Service<R, N>>,
    registration: Body<ProfessionalBodyRegistration>,
) -> Reply<ProfessionalBodyProfile>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let Json(registration) = registration?;
    let profile = blocking(move || service.register_professional_body(registration)).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn login<R, N>(
    service: Service<R, N>,
    role: Role,
    credentials: LoginCredentials,
) -> Reply<IssuedToken>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let issued = blocking(move || service.login(role, &credentials, Utc::now())).await?;
    Ok((StatusCode::OK, Json(issued)))
}

async fn login_worker<R, N>(
    State(service): State<Service<R, N>>,
    credentials: Body<LoginCredentials>,
) -> Reply<IssuedToken>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let Json(credentials) = credentials?;
    login(service, Role::Worker, credentials).await
}

async fn login_professional_body<R, N>(
    State(service): State<Service<R, N>>,
    credentials: Body<LoginCredentials>,
) -> Reply<IssuedToken>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let Json(credentials) = credentials?;
    login(service, Role::ProfessionalBody, credentials).await
}

async fn worker_profile<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
) -> Reply<WorkerProfile>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let profile = service.worker_profile(&principal)?;
    Ok((StatusCode::OK, Json(profile)))
}

async fn update_worker_profile<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
    fields: Body<Map<String, Value>>,
) -> Reply<WorkerProfile>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let Json(fields) = fields?;
    let update = WorkerProfileUpdate::from_fields(&fields)?;
    let profile = service.update_worker_profile(&principal, update)?;
    Ok((StatusCode::OK, Json(profile)))
}

async fn professional_body_profile<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
) -> Reply<ProfessionalBodyProfile>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let profile = service.professional_body_profile(&principal)?;
    Ok((StatusCode::OK, Json(profile)))
}

async fn update_professional_body_profile<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
    fields: Body<Map<String, Value>>,
) -> Reply<ProfessionalBodyProfile>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let Json(fields) = fields?;
    let update = ProfessionalBodyProfileUpdate::from_fields(&fields)?;
    let profile = service.update_professional_body_profile(&principal, update)?;
    Ok((StatusCode::OK, Json(profile)))
}

async fn list_jobs<R, N>(State(service): State<Service<R, N>>) -> Reply<Vec<JobListing>>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    Ok((StatusCode::OK, Json(service.list_jobs()?)))
}

async fn post_job<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
    draft: Body<JobDraft>,
) -> Reply<JobListing>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let Json(draft) = draft?;
    let listing = service.post_job(&principal, draft, Utc::now())?;
    Ok((StatusCode::CREATED, Json(listing)))
}

async fn available_jobs<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
) -> Reply<BTreeMap<String, Vec<JobListing>>>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    Ok((StatusCode::OK, Json(service.available_jobs(&principal)?)))
}

async fn my_applications<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
) -> Reply<Vec<ApplicationView>>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    Ok((StatusCode::OK, Json(service.my_applications(&principal)?)))
}

async fn apply<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Reply<Application>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let job_id: JobId = parse_id("job", &job_id)?;
    let application = service.apply(&principal, &job_id, Utc::now())?;
    Ok((StatusCode::CREATED, Json(application)))
}

async fn job_applications<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Reply<Vec<ApplicationView>>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let job_id: JobId = parse_id("job", &job_id)?;
    Ok((
        StatusCode::OK,
        Json(service.job_applications(&principal, &job_id)?),
    ))
}

async fn decide<R, N>(
    service: Service<R, N>,
    headers: HeaderMap,
    application_id: String,
    decision: Decision,
) -> Reply<Application>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let application_id: ApplicationId = parse_id("application", &application_id)?;
    let application = service.decide(&principal, &application_id, decision, Utc::now())?;
    Ok((StatusCode::OK, Json(application)))
}

async fn accept<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Reply<Application>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    decide(service, headers, application_id, Decision::Accept).await
}

async fn reject<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Reply<Application>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    decide(service, headers, application_id, Decision::Reject).await
}

async fn activity_report<R, N>(
    State(service): State<Service<R, N>>,
    headers: HeaderMap,
) -> Reply<ActivityReport>
where
    R: MarketplaceRepository + 'static,
    N: ReportNarrator + 'static,
{
    let principal = principal(&service, &headers)?;
    let report = service.activity_report(&principal, Utc::now())?;
    Ok((StatusCode::OK, Json(report)))
}

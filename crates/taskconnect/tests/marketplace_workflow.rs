//! End-to-end marketplace scenarios driven through the public service facade and HTTP router.

mod common {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use taskconnect::auth::{CredentialAuthority, Principal, Role};
    use taskconnect::marketplace::{
        ExperienceInput, InMemoryMarketplace, MarketplaceService, ProfessionalBodyRegistration,
        WorkerRegistration,
    };
    use taskconnect::reporting::PlainNarrator;

    pub(super) type Service = MarketplaceService<InMemoryMarketplace, PlainNarrator>;

    pub(super) fn service() -> Service {
        MarketplaceService::new(
            Arc::new(InMemoryMarketplace::default()),
            Arc::new(PlainNarrator),
            CredentialAuthority::new("workflow-secret", Duration::minutes(30), 4),
        )
    }

    pub(super) fn body(service: &Service, name: &str, email: &str) -> Principal {
        let profile = service
            .register_professional_body(ProfessionalBodyRegistration {
                name: name.to_string(),
                email: email.to_string(),
                password: "s3cret-pass".to_string(),
                body_type: "Housing association".to_string(),
                location: "Leeds".to_string(),
                description: String::new(),
            })
            .expect("register body");
        Principal::new(profile.id.0, Role::ProfessionalBody)
    }

    pub(super) fn worker(service: &Service, name: &str, email: &str, category: &str) -> Principal {
        let profile = service
            .register_worker(WorkerRegistration {
                name: name.to_string(),
                email: email.to_string(),
                password: "s3cret-pass".to_string(),
                category: category.to_string(),
                skills: vec!["general".to_string()],
                experience: Some(ExperienceInput::Years(2)),
                availability: "evenings".to_string(),
            })
            .expect("register worker");
        Principal::new(profile.id.0, Role::Worker)
    }

    pub(super) fn now() -> chrono::DateTime<Utc> {
        Utc::now()
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use taskconnect::auth::Role;
use taskconnect::marketplace::{
    marketplace_router, ApplicationStatus, BudgetInput, JobDraft, LoginCredentials,
    MarketplaceError,
};
use tower::ServiceExt;

use common::*;

fn draft(title: &str, category: Option<&str>, budget: f64) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: format!("{title}, tools provided"),
        category: category.map(str::to_string),
        location: "Leeds".to_string(),
        budget: BudgetInput::Amount(budget),
    }
}

#[test]
fn two_workers_compete_for_one_job() {
    let service = service();
    let acme = body(&service, "Acme Housing", "acme@example.com");
    let wendy = worker(&service, "Wendy", "wendy@example.com", "Plumbing");
    let walter = worker(&service, "Walter", "walter@example.com", "Plumbing");

    let job = service
        .post_job(&acme, draft("Fix sink", Some("Plumbing"), 50.0), now())
        .expect("post job");
    let first = service.apply(&wendy, &job.id, now()).expect("wendy applies");
    let second = service.apply(&walter, &job.id, now()).expect("walter applies");

    service.accept(&acme, &first.id, now()).expect("accept wendy");
    service.reject(&acme, &second.id, now()).expect("reject walter");

    let received = service.my_applications(&acme).expect("received applications");
    let statuses: Vec<_> = received.iter().map(|view| view.status).collect();
    assert_eq!(statuses.len(), 2);
    assert!(statuses.contains(&ApplicationStatus::Accepted));
    assert!(statuses.contains(&ApplicationStatus::Rejected));

    for (principal, expected) in [
        (&wendy, ApplicationStatus::Accepted),
        (&walter, ApplicationStatus::Rejected),
    ] {
        let mine = service.my_applications(principal).expect("own applications");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, expected);
        assert_eq!(mine[0].job.title, "Fix sink");
        assert!(service
            .available_jobs(principal)
            .expect("available view")
            .is_empty());
    }

    assert!(matches!(
        service.accept(&acme, &second.id, now()),
        Err(MarketplaceError::InvalidTransition { .. })
    ));
}

#[test]
fn report_reflects_marketplace_activity() {
    let service = service();
    let acme = body(&service, "Acme Housing", "acme@example.com");
    let wendy = worker(&service, "Wendy", "wendy@example.com", "Cleaning");

    let job = service
        .post_job(&acme, draft("Deep clean", None, 120.0), now())
        .expect("post job");
    service.apply(&wendy, &job.id, now()).expect("apply");

    let report = service.activity_report(&acme, now()).expect("report");
    assert_eq!(report.summary.jobs, 1);
    assert_eq!(report.summary.applications.pending, 1);
    assert!(report.report.contains("awaiting a decision"));
}

#[tokio::test]
async fn login_token_drives_the_http_surface() {
    let service = service();
    body(&service, "Acme Housing", "acme@example.com");
    let token = service
        .login(
            Role::ProfessionalBody,
            &LoginCredentials {
                email: "acme@example.com".to_string(),
                password: "s3cret-pass".to_string(),
            },
            now(),
        )
        .expect("login")
        .token;
    let router = marketplace_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/jobs")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"title":"Mow lawn","description":"Front and back","location":"York","budget":30}"#,
                ))
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(Request::get("/api/jobs").body(Body::empty()).expect("request"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let jobs: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(jobs[0]["title"], "Mow lawn");
    assert_eq!(jobs[0]["posted_by"], "Acme Housing");
    assert_eq!(jobs[0]["category"], Value::Null);
}

use crate::infra::{local_marketplace, LocalMarketplace};
use chrono::{Duration, Utc};
use clap::Args;
use taskconnect::auth::{CredentialAuthority, Principal, Role};
use taskconnect::config::DEVELOPMENT_JWT_SECRET;
use taskconnect::error::AppError;
use taskconnect::marketplace::{
    BudgetInput, ExperienceInput, JobDraft, LoginCredentials, MarketplaceError,
    ProfessionalBodyRegistration, WorkerRegistration,
};

const DEMO_PASSWORD: &str = "demo-password";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Title of the job posted by the demo professional body.
    #[arg(long, default_value = "Fix sink")]
    pub(crate) title: String,
    /// Category of the demo job; pass an empty string to leave it uncategorized.
    #[arg(long, default_value = "Plumbing")]
    pub(crate) category: String,
    /// Budget of the demo job.
    #[arg(long, default_value_t = 50.0)]
    pub(crate) budget: f64,
    /// Skip the activity report at the end of the demo.
    #[arg(long)]
    pub(crate) skip_report: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        title,
        category,
        budget,
        skip_report,
    } = args;

    // Minimum bcrypt cost for throwaway demo accounts.
    let credentials = CredentialAuthority::new(DEVELOPMENT_JWT_SECRET, Duration::minutes(15), 4);
    let marketplace = local_marketplace(credentials);

    println!("TaskConnect marketplace demo");
    walkthrough(&marketplace, &title, &category, budget, skip_report).map_err(|err| {
        println!("  Demo stopped: {err}");
        AppError::from(err)
    })
}

fn walkthrough(
    marketplace: &LocalMarketplace,
    title: &str,
    category: &str,
    budget: f64,
    skip_report: bool,
) -> Result<(), MarketplaceError> {
    let body = marketplace.register_professional_body(ProfessionalBodyRegistration {
        name: "Northside Housing Trust".to_string(),
        email: "jobs@northside.example".to_string(),
        password: DEMO_PASSWORD.to_string(),
        body_type: "Housing association".to_string(),
        location: "Leeds".to_string(),
        description: "Maintains 400 social homes".to_string(),
    })?;
    let worker = marketplace.register_worker(WorkerRegistration {
        name: "Wendy Hughes".to_string(),
        email: "wendy@tradespeople.example".to_string(),
        password: DEMO_PASSWORD.to_string(),
        category: "Plumbing".to_string(),
        skills: vec!["pipework".to_string(), "leak detection".to_string()],
        experience: Some(ExperienceInput::Years(6)),
        availability: "weekdays".to_string(),
    })?;
    println!("  Registered professional body {} ({})", body.name, body.id);
    println!("  Registered worker {} ({})", worker.name, worker.id);

    let token = marketplace.login(
        Role::ProfessionalBody,
        &LoginCredentials {
            email: body.email.clone(),
            password: DEMO_PASSWORD.to_string(),
        },
        Utc::now(),
    )?;
    println!("  Professional body token expires at {}", token.expires_at);
    let body = marketplace.authenticate(&token.token)?;
    let worker = Principal::new(worker.id.0, Role::Worker);

    let job = marketplace.post_job(
        &body,
        JobDraft {
            title: title.to_string(),
            description: "Kitchen sink is leaking under the cabinet".to_string(),
            category: Some(category.to_string()),
            location: "Leeds".to_string(),
            budget: BudgetInput::Amount(budget),
        },
        Utc::now(),
    )?;
    println!(
        "\nPosted job '{}' for {:.2} by {} ({})",
        job.title, job.budget, job.posted_by, job.id
    );

    println!("\nAvailable jobs for the worker");
    for (group, jobs) in marketplace.available_jobs(&worker)? {
        for listing in jobs {
            println!("- [{}] {} ({:.2})", group, listing.title, listing.budget);
        }
    }

    let application = marketplace.apply(&worker, &job.id, Utc::now())?;
    println!(
        "\nApplication {} submitted: {}",
        application.id, application.status
    );
    if let Err(err) = marketplace.apply(&worker, &job.id, Utc::now()) {
        println!("  Second application refused: {err}");
    }

    let accepted = marketplace.accept(&body, &application.id, Utc::now())?;
    println!("  Application {}: {}", accepted.id, accepted.status);
    if let Err(err) = marketplace.reject(&body, &application.id, Utc::now()) {
        println!("  Late rejection refused: {err}");
    }

    println!("\nApplications received");
    for view in marketplace.my_applications(&body)? {
        println!(
            "- {} by {} <{}>: {}",
            view.job.title, view.worker.name, view.worker.email, view.status
        );
    }

    if !skip_report {
        let report = marketplace.activity_report(&body, Utc::now())?;
        println!("\nActivity report");
        for line in report.report.lines() {
            println!("  {line}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(budget: f64) -> DemoArgs {
        DemoArgs {
            title: "Fix sink".to_string(),
            category: "Plumbing".to_string(),
            budget,
            skip_report: true,
        }
    }

    #[test]
    fn demo_completes_with_defaults() {
        assert!(run_demo(args(50.0)).is_ok());
    }

    #[test]
    fn failed_walkthrough_is_returned_to_the_caller() {
        match run_demo(args(0.0)) {
            Err(AppError::Marketplace(MarketplaceError::ValidationFailed(message))) => {
                assert!(message.contains("budget"))
            }
            other => panic!("expected demo failure, got {other:?}"),
        }
    }
}

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MarketplaceError;
use super::lifecycle::ApplicationStatus;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::from_str(s.trim())?))
            }
        }
    };
}

identifier!(
    /// Identity of a registered worker account.
    WorkerId
);
identifier!(
    /// Identity of a registered professional body account.
    ProfessionalBodyId
);
identifier!(
    /// Identity of a posted job.
    JobId
);
identifier!(
    /// Globally unique identity of an application, independent of its parent job.
    ApplicationId
);

/// Stored worker account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub category: String,
    pub skills: BTreeSet<String>,
    pub experience: u32,
    pub availability: String,
}

impl Worker {
    pub fn profile(&self) -> WorkerProfile {
        WorkerProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            category: self.category.clone(),
            skills: self.skills.clone(),
            experience: self.experience,
            availability: self.availability.clone(),
        }
    }
}

/// Worker account without credential material, safe to return to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub id: WorkerId,
    pub name: String,
    pub email: String,
    pub category: String,
    pub skills: BTreeSet<String>,
    pub experience: u32,
    pub availability: String,
}

/// Stored professional body account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalBody {
    pub id: ProfessionalBodyId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(rename = "type")]
    pub body_type: String,
    pub location: String,
    pub description: String,
}

impl ProfessionalBody {
    pub fn profile(&self) -> ProfessionalBodyProfile {
        ProfessionalBodyProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            body_type: self.body_type.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalBodyProfile {
    pub id: ProfessionalBodyId,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub body_type: String,
    pub location: String,
    pub description: String,
}

/// A posted job together with the applications it exclusively owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub location: String,
    pub budget: f64,
    pub posted_by: ProfessionalBodyId,
    pub created_at: DateTime<Utc>,
    pub applications: Vec<Application>,
}

impl Job {
    pub fn is_owned_by(&self, owner: &ProfessionalBodyId) -> bool {
        self.posted_by == *owner
    }

    pub fn application_from(&self, worker: &WorkerId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| application.worker == *worker)
    }

    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| application.id == *id)
    }

    pub fn application_mut(&mut self, id: &ApplicationId) -> Option<&mut Application> {
        self.applications
            .iter_mut()
            .find(|application| application.id == *id)
    }
}

/// A worker's request to perform a job. Lives inside its parent [`Job`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub worker: WorkerId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl Application {
    pub fn pending(job_id: JobId, worker: WorkerId, applied_at: DateTime<Utc>) -> Self {
        Self {
            id: ApplicationId::new(),
            job_id,
            worker,
            status: ApplicationStatus::Pending,
            applied_at,
            decided_at: None,
        }
    }
}

/// Budget as submitted by clients; forms frequently send numbers as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BudgetInput {
    Amount(f64),
    Text(String),
}

impl BudgetInput {
    fn parse(&self) -> Result<f64, MarketplaceError> {
        let amount = match self {
            BudgetInput::Amount(amount) => *amount,
            BudgetInput::Text(raw) => raw.trim().parse::<f64>().map_err(|_| {
                MarketplaceError::ValidationFailed(format!("budget '{raw}' is not a number"))
            })?,
        };

        if !amount.is_finite() || amount <= 0.0 {
            return Err(MarketplaceError::ValidationFailed(
                "budget must be a positive number".to_string(),
            ));
        }
        Ok(amount)
    }
}

/// Job fields supplied by a professional body when posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    pub location: String,
    pub budget: BudgetInput,
}

impl JobDraft {
    /// Validates the draft and builds a job owned by `owner`.
    pub fn into_job(
        self,
        owner: ProfessionalBodyId,
        created_at: DateTime<Utc>,
    ) -> Result<Job, MarketplaceError> {
        let budget = self.budget.parse()?;
        let title = required("title", self.title)?;
        let description = required("description", self.description)?;
        let location = required("location", self.location)?;
        let category = self
            .category
            .map(|category| category.trim().to_string())
            .filter(|category| !category.is_empty());

        Ok(Job {
            id: JobId::new(),
            title,
            description,
            category,
            location,
            budget,
            posted_by: owner,
            created_at,
            applications: Vec::new(),
        })
    }
}

pub(crate) fn required(field: &str, value: String) -> Result<String, MarketplaceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MarketplaceError::ValidationFailed(format!(
            "{field} is required"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(budget: BudgetInput) -> JobDraft {
        JobDraft {
            title: " Fix sink ".to_string(),
            description: "Kitchen sink leaks".to_string(),
            category: Some("Plumbing".to_string()),
            location: "Leeds".to_string(),
            budget,
        }
    }

    #[test]
    fn into_job_trims_fields_and_sets_owner() {
        let owner = ProfessionalBodyId::new();
        let job = draft(BudgetInput::Amount(50.0))
            .into_job(owner, Utc::now())
            .expect("valid draft");

        assert_eq!(job.title, "Fix sink");
        assert_eq!(job.posted_by, owner);
        assert_eq!(job.budget, 50.0);
        assert!(job.applications.is_empty());
    }

    #[test]
    fn numeric_budget_strings_are_accepted() {
        let job = draft(BudgetInput::Text("75.5".to_string()))
            .into_job(ProfessionalBodyId::new(), Utc::now())
            .expect("numeric string budget");
        assert_eq!(job.budget, 75.5);
    }

    #[test]
    fn non_numeric_and_non_positive_budgets_fail_validation() {
        for budget in [
            BudgetInput::Text("fifty".to_string()),
            BudgetInput::Amount(0.0),
            BudgetInput::Amount(-3.0),
        ] {
            match draft(budget).into_job(ProfessionalBodyId::new(), Utc::now()) {
                Err(MarketplaceError::ValidationFailed(_)) => {}
                other => panic!("expected validation failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_category_is_stored_as_missing() {
        let mut blank = draft(BudgetInput::Amount(10.0));
        blank.category = Some("   ".to_string());
        let job = blank
            .into_job(ProfessionalBodyId::new(), Utc::now())
            .expect("valid draft");
        assert_eq!(job.category, None);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut untitled = draft(BudgetInput::Amount(10.0));
        untitled.title = "  ".to_string();
        match untitled.into_job(ProfessionalBodyId::new(), Utc::now()) {
            Err(MarketplaceError::ValidationFailed(message)) => {
                assert!(message.contains("title"))
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn identifiers_parse_from_strings() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().expect("round trips");
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ApplicationId>().is_err());
    }

    #[test]
    fn budget_input_deserializes_numbers_and_strings() {
        let number: BudgetInput = serde_json::from_str("50").expect("number");
        let text: BudgetInput = serde_json::from_str("\"50\"").expect("string");
        assert_eq!(number, BudgetInput::Amount(50.0));
        assert_eq!(text, BudgetInput::Text("50".to_string()));
    }
}

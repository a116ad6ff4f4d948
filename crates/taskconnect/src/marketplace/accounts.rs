//! Registration payloads and whitelisted profile updates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{required, ProfessionalBody, Worker};
use super::error::MarketplaceError;

const WORKER_FIELDS: [&str; 6] = [
    "name",
    "email",
    "category",
    "skills",
    "experience",
    "availability",
];
const PROFESSIONAL_BODY_FIELDS: [&str; 5] = ["name", "email", "type", "location", "description"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub category: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Option<ExperienceInput>,
    pub availability: String,
}

/// Years of experience as clients send them: a whole number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExperienceInput {
    Years(u32),
    Text(String),
}

impl ExperienceInput {
    /// Blank text counts as no experience.
    pub(crate) fn years(&self) -> Result<u32, MarketplaceError> {
        match self {
            ExperienceInput::Years(years) => Ok(*years),
            ExperienceInput::Text(raw) if raw.trim().is_empty() => Ok(0),
            ExperienceInput::Text(raw) => {
                raw.trim().parse::<u32>().map_err(|_| invalid_experience())
            }
        }
    }
}

fn invalid_experience() -> MarketplaceError {
    MarketplaceError::ValidationFailed("experience must be a number".to_string())
}

impl WorkerRegistration {
    pub(crate) fn experience_years(&self) -> Result<u32, MarketplaceError> {
        self.experience.as_ref().map_or(Ok(0), ExperienceInput::years)
    }

    /// Checks required fields; the password is hashed by the caller.
    pub(crate) fn validate(&self) -> Result<(), MarketplaceError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("category", &self.category),
            ("availability", &self.availability),
        ] {
            required(field, value.clone())?;
        }
        self.experience_years()?;
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalBodyRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "type")]
    pub body_type: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
}

impl ProfessionalBodyRegistration {
    pub(crate) fn validate(&self) -> Result<(), MarketplaceError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("type", &self.body_type),
            ("location", &self.location),
        ] {
            required(field, value.clone())?;
        }
        validate_email(&self.email)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn validate_email(email: &str) -> Result<(), MarketplaceError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(MarketplaceError::ValidationFailed(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}

fn reject_unknown_fields(
    fields: &Map<String, Value>,
    allowed: &[&str],
) -> Result<(), MarketplaceError> {
    let invalid: Vec<&str> = fields
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect();

    if invalid.is_empty() {
        return Ok(());
    }

    Err(MarketplaceError::ValidationFailed(format!(
        "only {} can be updated; found invalid fields: {}",
        allowed.join(", "),
        invalid.join(", ")
    )))
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, MarketplaceError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => required(key, value.clone()).map(Some),
        Some(_) => Err(MarketplaceError::ValidationFailed(format!(
            "{key} must be a string"
        ))),
    }
}

fn experience_field(fields: &Map<String, Value>) -> Result<Option<u32>, MarketplaceError> {
    match fields.get("experience") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .map(Some)
            .ok_or_else(invalid_experience),
        Some(Value::String(raw)) => ExperienceInput::Text(raw.clone()).years().map(Some),
        Some(_) => Err(invalid_experience()),
    }
}

fn skills_field(fields: &Map<String, Value>) -> Result<Option<BTreeSet<String>>, MarketplaceError> {
    match fields.get("skills") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(skill) => Ok(skill.trim().to_string()),
                _ => Err(MarketplaceError::ValidationFailed(
                    "skills must be an array of strings".to_string(),
                )),
            })
            .filter(|skill| !matches!(skill, Ok(value) if value.is_empty()))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Some),
        Some(_) => Err(MarketplaceError::ValidationFailed(
            "skills must be an array".to_string(),
        )),
    }
}

/// Partial worker update restricted to the owner-editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub category: Option<String>,
    pub skills: Option<BTreeSet<String>>,
    pub experience: Option<u32>,
    pub availability: Option<String>,
}

impl WorkerProfileUpdate {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, MarketplaceError> {
        reject_unknown_fields(fields, &WORKER_FIELDS)?;
        let update = Self {
            name: text_field(fields, "name")?,
            email: text_field(fields, "email")?,
            category: text_field(fields, "category")?,
            skills: skills_field(fields)?,
            experience: experience_field(fields)?,
            availability: text_field(fields, "availability")?,
        };
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        Ok(update)
    }

    pub fn apply(self, worker: &mut Worker) {
        if let Some(name) = self.name {
            worker.name = name;
        }
        if let Some(email) = self.email {
            worker.email = email;
        }
        if let Some(category) = self.category {
            worker.category = category;
        }
        if let Some(skills) = self.skills {
            worker.skills = skills;
        }
        if let Some(experience) = self.experience {
            worker.experience = experience;
        }
        if let Some(availability) = self.availability {
            worker.availability = availability;
        }
    }
}

/// Partial professional body update restricted to the owner-editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfessionalBodyProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub body_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl ProfessionalBodyProfileUpdate {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, MarketplaceError> {
        reject_unknown_fields(fields, &PROFESSIONAL_BODY_FIELDS)?;
        let description = match fields.get("description") {
            None | Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value.trim().to_string()),
            Some(_) => {
                return Err(MarketplaceError::ValidationFailed(
                    "description must be a string".to_string(),
                ))
            }
        };
        let update = Self {
            name: text_field(fields, "name")?,
            email: text_field(fields, "email")?,
            body_type: text_field(fields, "type")?,
            location: text_field(fields, "location")?,
            description,
        };
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        Ok(update)
    }

    pub fn apply(self, body: &mut ProfessionalBody) {
        if let Some(name) = self.name {
            body.name = name;
        }
        if let Some(email) = self.email {
            body.email = email;
        }
        if let Some(body_type) = self.body_type {
            body.body_type = body_type;
        }
        if let Some(location) = self.location {
            body.location = location;
        }
        if let Some(description) = self.description {
            body.description = description;
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_listed_in_the_error() {
        let update = fields(json!({ "name": "Ada", "password": "x", "role": "admin" }));
        match WorkerProfileUpdate::from_fields(&update) {
            Err(MarketplaceError::ValidationFailed(message)) => {
                assert!(message.contains("password"));
                assert!(message.contains("role"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn experience_accepts_numeric_strings_only() {
        let update = WorkerProfileUpdate::from_fields(&fields(json!({ "experience": "7" })))
            .expect("numeric string");
        assert_eq!(update.experience, Some(7));

        for bad in [json!("seven"), json!(-1), json!(2.5), json!(true)] {
            let result = WorkerProfileUpdate::from_fields(&fields(json!({ "experience": bad })));
            assert!(
                matches!(result, Err(MarketplaceError::ValidationFailed(_))),
                "{result:?}"
            );
        }
    }

    #[test]
    fn skills_must_be_an_array() {
        let result = WorkerProfileUpdate::from_fields(&fields(json!({ "skills": "welding" })));
        match result {
            Err(MarketplaceError::ValidationFailed(message)) => {
                assert_eq!(message, "skills must be an array")
            }
            other => panic!("expected validation failure, got {other:?}"),
        }

        let update = WorkerProfileUpdate::from_fields(&fields(
            json!({ "skills": ["welding", " welding ", "", "tiling"] }),
        ))
        .expect("array of strings");
        let skills = update.skills.expect("skills present");
        assert_eq!(skills.len(), 2);
    }

    #[test]
    fn professional_body_update_maps_type_field() {
        let update =
            ProfessionalBodyProfileUpdate::from_fields(&fields(json!({ "type": "Council" })))
                .expect("valid update");
        assert_eq!(update.body_type.as_deref(), Some("Council"));

        let result =
            ProfessionalBodyProfileUpdate::from_fields(&fields(json!({ "skills": ["x"] })));
        assert!(matches!(result, Err(MarketplaceError::ValidationFailed(_))));
    }

    #[test]
    fn registration_requires_a_plausible_email() {
        let registration = WorkerRegistration {
            name: "Ada".to_string(),
            email: "ada-at-example".to_string(),
            password: "secret".to_string(),
            category: "Plumbing".to_string(),
            skills: Vec::new(),
            experience: None,
            availability: "weekdays".to_string(),
        };
        assert!(matches!(
            registration.validate(),
            Err(MarketplaceError::ValidationFailed(_))
        ));
    }

    #[test]
    fn registration_experience_accepts_numbers_and_numeric_text() {
        let registration: WorkerRegistration = serde_json::from_value(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret",
            "category": "Plumbing",
            "experience": "3",
            "availability": "weekdays"
        }))
        .expect("string experience deserializes");
        assert_eq!(registration.experience_years().expect("numeric"), 3);

        let cases = [
            (Some(ExperienceInput::Years(4)), Some(4)),
            (Some(ExperienceInput::Text(" 12 ".to_string())), Some(12)),
            (Some(ExperienceInput::Text("  ".to_string())), Some(0)),
            (None, Some(0)),
            (Some(ExperienceInput::Text("three".to_string())), None),
        ];
        for (experience, expected) in cases {
            let registration = WorkerRegistration {
                experience: experience.clone(),
                ..registration.clone()
            };
            match expected {
                Some(years) => assert_eq!(registration.experience_years().ok(), Some(years)),
                None => assert!(
                    matches!(
                        registration.validate(),
                        Err(MarketplaceError::ValidationFailed(_))
                    ),
                    "{experience:?}"
                ),
            }
        }
    }

    #[test]
    fn login_credentials_debug_hides_password() {
        let credentials = LoginCredentials {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}

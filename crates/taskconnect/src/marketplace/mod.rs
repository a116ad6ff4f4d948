//! Job marketplace: accounts, job postings, applications, and their adjudication.
//!
//! Every operation receives the caller's [`Principal`](crate::auth::Principal) explicitly.
//! Applications live inside their parent job and change state only through
//! [`MarketplaceRepository::update_job`], so a decision on one application is applied as a
//! single atomic write of its job.

pub mod access;
pub mod accounts;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use accounts::{
    ExperienceInput, LoginCredentials, ProfessionalBodyProfileUpdate,
    ProfessionalBodyRegistration, WorkerProfileUpdate, WorkerRegistration,
};
pub use domain::{
    Application, ApplicationId, BudgetInput, Job, JobDraft, JobId, ProfessionalBody,
    ProfessionalBodyId, ProfessionalBodyProfile, Worker, WorkerId, WorkerProfile,
};
pub use error::{AccessDenied, ErrorKind, MarketplaceError};
pub use lifecycle::{ApplicationStatus, Decision};
pub use memory::InMemoryMarketplace;
pub use repository::{AccountTotals, MarketplaceRepository, RepositoryError};
pub use router::marketplace_router;
pub use service::MarketplaceService;
pub use visibility::{ApplicantSummary, ApplicationView, JobListing, JobSummary};

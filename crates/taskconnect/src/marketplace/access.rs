//! Role-based access rules.
//!
//! Every check takes the authenticated [`Principal`] explicitly and either narrows it to the
//! account kind the operation needs or returns [`AccessDenied`]. Ownership checks run only
//! after the target has been located, so a missing record reports `NotFound` first.

use super::domain::{Job, ProfessionalBodyId, WorkerId};
use super::error::{AccessDenied, MarketplaceError};
use crate::auth::{Principal, Role};

pub fn require_role(principal: &Principal, required: Role) -> Result<(), MarketplaceError> {
    if principal.role == required {
        Ok(())
    } else {
        Err(AccessDenied::RoleMismatch {
            required,
            actual: principal.role,
        }
        .into())
    }
}

/// The caller acting as a worker on its own record.
pub fn acting_worker(principal: &Principal) -> Result<WorkerId, MarketplaceError> {
    require_role(principal, Role::Worker)?;
    Ok(WorkerId(principal.id.0))
}

/// The caller acting as a professional body on its own record.
pub fn acting_professional_body(
    principal: &Principal,
) -> Result<ProfessionalBodyId, MarketplaceError> {
    require_role(principal, Role::ProfessionalBody)?;
    Ok(ProfessionalBodyId(principal.id.0))
}

pub fn ensure_job_owner(body: &ProfessionalBodyId, job: &Job) -> Result<(), MarketplaceError> {
    if job.is_owned_by(body) {
        Ok(())
    } else {
        Err(AccessDenied::NotOwner {
            job: job.id,
            owner: job.posted_by,
        }
        .into())
    }
}

/// A job counts as self-owned when its owner identity equals the worker's identity.
pub fn is_self_owned(worker: &WorkerId, job: &Job) -> bool {
    job.posted_by.0 == worker.0
}

pub fn ensure_not_self_owned(worker: &WorkerId, job: &Job) -> Result<(), MarketplaceError> {
    if is_self_owned(worker, job) {
        Err(AccessDenied::SelfOwnedJob { job: job.id }.into())
    } else {
        Ok(())
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account kind fixed at registration. Drives every access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Worker,
    ProfessionalBody,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::ProfessionalBody => "professional-body",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "worker" => Ok(Role::Worker),
            "professional-body" => Ok(Role::ProfessionalBody),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Identity carried by a verified credential, before it is narrowed to an account kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub Uuid);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Authenticated caller passed explicitly into every marketplace operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self {
            id: PrincipalId(id),
            role,
        }
    }
}

//! Employee (company membership) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EmployeeRole {
    Owner,
    Admin,
    Member,
}

impl EmployeeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::Owner => "Owner",
            EmployeeRole::Admin => "Admin",
            EmployeeRole::Member => "Member",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Owner" => Some(EmployeeRole::Owner),
            "Admin" => Some(EmployeeRole::Admin),
            "Member" => Some(EmployeeRole::Member),
            _ => None,
        }
    }
}

/// Links a [`User`](super::user::User) to a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub role: EmployeeRole,
    pub position: Option<String>,
    /// Permission keys, e.g. `tasks.create`.
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn is_owner(&self) -> bool {
        self.role == EmployeeRole::Owner
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployee {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub role: EmployeeRole,
    pub position: Option<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEmployee {
    pub role: Option<EmployeeRole>,
    pub position: Option<Option<String>>,
    pub permissions: Option<Vec<String>>,
}

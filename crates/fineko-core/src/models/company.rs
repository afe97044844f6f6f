//! Company (tenant) domain model.
//!
//! A company is the unit of data isolation. Every business document is
//! scoped to exactly one company through its `companyId`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionTier {
    Trial,
    Basic,
    Pro,
    Enterprise,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Trial => "Trial",
            SubscriptionTier::Basic => "Basic",
            SubscriptionTier::Pro => "Pro",
            SubscriptionTier::Enterprise => "Enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Trial" => Some(SubscriptionTier::Trial),
            "Basic" => Some(SubscriptionTier::Basic),
            "Pro" => Some(SubscriptionTier::Pro),
            "Enterprise" => Some(SubscriptionTier::Enterprise),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    /// The user who created the company. Exactly one per company.
    pub owner_id: Uuid,
    pub tier: SubscriptionTier,
    pub trial_ends: DateTime<Utc>,
    /// End of the paid period, if any.
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Whether the company may still use the product at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.tier {
            SubscriptionTier::Trial => now < self.trial_ends,
            _ => self.expires_at.is_none_or(|exp| now < exp),
        }
    }
}

/// Descriptive profile created alongside every company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: Uuid,
    pub company_id: Uuid,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<u32>,
    pub trial_ends: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a company together with its owner link and
/// profile.
#[derive(Debug, Clone)]
pub struct CreateCompany {
    pub name: String,
    pub owner_id: Uuid,
    /// Position recorded on the owner's employee link.
    pub owner_position: Option<String>,
    pub trial_ends: DateTime<Utc>,
}

/// Result of the atomic company creation batch.
#[derive(Debug, Clone)]
pub struct CreatedCompany {
    pub company: Company,
    pub owner: super::employee::Employee,
    pub profile: CompanyProfile,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub tier: Option<SubscriptionTier>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCompanyProfile {
    pub description: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<u32>,
}

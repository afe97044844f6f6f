//! Knowledge base (instructions) and business-process maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, TenantEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    pub author_id: Uuid,
    /// Employees allowed to read. Empty means everyone in the company.
    #[serde(default)]
    pub access: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Instruction {
    pub fn is_visible_to(&self, employee_id: Uuid) -> bool {
        self.access.is_empty() || self.author_id == employee_id || self.access.contains(&employee_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstruction {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub author_id: Uuid,
    pub access: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstructionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Vec<Uuid>>,
}

impl TenantEntity for Instruction {
    const COLLECTION: Collection = Collection::Instructions;
    const ENTITY: &'static str = "instruction";
    type New = NewInstruction;
    type Patch = InstructionPatch;
}

/// A lane of a process diagram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStage {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub responsible_id: Option<Uuid>,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub stages: Vec<ProcessStage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProcess {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<Uuid>,
    pub stages: Vec<ProcessStage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<ProcessStage>>,
}

impl TenantEntity for Process {
    const COLLECTION: Collection = Collection::Processes;
    const ENTITY: &'static str = "process";
    type New = NewProcess;
    type Patch = ProcessPatch;
}

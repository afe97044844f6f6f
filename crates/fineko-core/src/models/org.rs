//! Org-structure chart: divisions, departments and their sections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, TenantEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub head_id: Option<Uuid>,
    /// Position on the chart, left to right.
    #[serde(default)]
    pub order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDivision {
    pub name: String,
    pub head_id: Option<Uuid>,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DivisionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl TenantEntity for Division {
    const COLLECTION: Collection = Collection::Divisions;
    const ENTITY: &'static str = "division";
    type New = NewDivision;
    type Patch = DivisionPatch;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub head_id: Option<Uuid>,
    #[serde(default)]
    pub employee_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub company_id: Uuid,
    pub division_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub head_id: Option<Uuid>,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
    pub division_id: Uuid,
    pub name: String,
    pub head_id: Option<Uuid>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
}

impl TenantEntity for Department {
    const COLLECTION: Collection = Collection::Departments;
    const ENTITY: &'static str = "department";
    type New = NewDepartment;
    type Patch = DepartmentPatch;
}

//! Recurring task template domain model.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, TenantEntity};

/// When a template produces a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Recurrence {
    Daily,
    /// ISO weekdays, Monday = 1 … Sunday = 7.
    Weekly { days: Vec<u8> },
    /// Day of month. Months shorter than `day` fire on their last day.
    Monthly { day: u8 },
    /// Every `days` days counted from the start date.
    Interval { days: u32 },
}

impl Recurrence {
    /// Whether a template starting on `start` fires on `date`.
    pub fn occurs_on(&self, start: NaiveDate, date: NaiveDate) -> bool {
        if date < start {
            return false;
        }
        match self {
            Recurrence::Daily => true,
            Recurrence::Weekly { days } => {
                let weekday = date.weekday().number_from_monday() as u8;
                days.contains(&weekday)
            }
            Recurrence::Monthly { day } => {
                let last = last_day_of_month(date);
                let target = u32::from(*day).clamp(1, last);
                date.day() == target
            }
            Recurrence::Interval { days } => {
                if *days == 0 {
                    return false;
                }
                let elapsed = (date - start).num_days();
                elapsed % i64::from(*days) == 0
            }
        }
    }
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(31, |last| last.day())
}

/// One task produced by a template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTask {
    pub date: NaiveDate,
    pub task_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assignee_id: Uuid,
    pub reporter_id: Uuid,
    pub recurrence: Recurrence,
    pub start_date: NaiveDate,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub expected_time: Option<u32>,
    #[serde(default)]
    pub result_id: Option<Uuid>,
    #[serde(default)]
    pub history: Vec<GeneratedTask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Template {
    /// Due on `date` and not generated for it yet.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.recurrence.occurs_on(self.start_date, date)
            && !self.history.iter().any(|h| h.date == date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Uuid,
    pub reporter_id: Uuid,
    pub recurrence: Recurrence,
    pub start_date: NaiveDate,
    pub is_active: bool,
    pub expected_time: Option<u32>,
    pub result_id: Option<Uuid>,
    pub history: Vec<GeneratedTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_time: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<GeneratedTask>>,
}

impl TenantEntity for Template {
    const COLLECTION: Collection = Collection::Templates;
    const ENTITY: &'static str = "template";
    type New = NewTemplate;
    type Patch = TemplatePatch;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn nothing_fires_before_start() {
        assert!(!Recurrence::Daily.occurs_on(d(2026, 3, 10), d(2026, 3, 9)));
        assert!(Recurrence::Daily.occurs_on(d(2026, 3, 10), d(2026, 3, 10)));
    }

    #[test]
    fn weekly_matches_iso_weekdays() {
        // 2026-10-12 is a Monday.
        let rule = Recurrence::Weekly { days: vec![1, 5] };
        let start = d(2026, 10, 1);
        assert!(rule.occurs_on(start, d(2026, 10, 12)));
        assert!(!rule.occurs_on(start, d(2026, 10, 13)));
        assert!(rule.occurs_on(start, d(2026, 10, 16)));
    }

    #[test]
    fn monthly_clamps_to_last_day() {
        let rule = Recurrence::Monthly { day: 31 };
        let start = d(2026, 1, 1);
        assert!(rule.occurs_on(start, d(2026, 2, 28)));
        assert!(!rule.occurs_on(start, d(2026, 2, 27)));
        assert!(rule.occurs_on(start, d(2026, 4, 30)));
        assert!(rule.occurs_on(start, d(2026, 12, 31)));
    }

    #[test]
    fn interval_counts_from_start() {
        let rule = Recurrence::Interval { days: 3 };
        let start = d(2026, 5, 1);
        assert!(rule.occurs_on(start, d(2026, 5, 1)));
        assert!(!rule.occurs_on(start, d(2026, 5, 2)));
        assert!(rule.occurs_on(start, d(2026, 5, 4)));
        assert!(!Recurrence::Interval { days: 0 }.occurs_on(start, d(2026, 5, 1)));
    }

    #[test]
    fn recurrence_serializes_with_type_tag() {
        let json = serde_json::to_value(Recurrence::Weekly { days: vec![2] }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "weekly", "days": [2] }));
    }
}

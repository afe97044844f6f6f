//! Structured summary accumulated across audit turns.
//!
//! The summary has a schema-suggested shape but free-form content, so it is
//! modelled as a recursive value tree rather than a fixed struct. Unknown
//! and partially filled fields are always tolerated.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum SummaryValue {
    #[default]
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<SummaryValue>),
    Map(BTreeMap<String, SummaryValue>),
}

impl SummaryValue {
    pub fn empty_map() -> Self {
        SummaryValue::Map(BTreeMap::new())
    }

    /// Carries no information: null, whitespace-only text, an empty list,
    /// or a map whose values are all blank.
    pub fn is_blank(&self) -> bool {
        match self {
            SummaryValue::Null => true,
            SummaryValue::Bool(_) | SummaryValue::Num(_) => false,
            SummaryValue::Str(s) => s.trim().is_empty(),
            SummaryValue::List(items) => items.is_empty(),
            SummaryValue::Map(map) => map.values().all(SummaryValue::is_blank),
        }
    }

    /// Merge `update` into `self`.
    ///
    /// Maps merge key by key. A blank update never erases existing data;
    /// any other update replaces the current value.
    pub fn merge(&mut self, update: SummaryValue) {
        if update.is_blank() {
            return;
        }
        match (self, update) {
            (SummaryValue::Map(current), SummaryValue::Map(incoming)) => {
                for (key, value) in incoming {
                    match current.get_mut(&key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            if !value.is_blank() {
                                current.insert(key, value);
                            }
                        }
                    }
                }
            }
            (slot, incoming) => *slot = incoming,
        }
    }

    /// Look up a dotted path such as `companyProfile.industry`.
    pub fn get(&self, path: &str) -> Option<&SummaryValue> {
        path.split('.').try_fold(self, |node, key| match node {
            SummaryValue::Map(map) => map.get(key),
            SummaryValue::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SummaryValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Render as indented plain text, skipping blank branches.
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_into(self, 0, &mut out);
        out
    }

    fn scalar_text(&self) -> Option<String> {
        match self {
            SummaryValue::Bool(true) => Some("так".into()),
            SummaryValue::Bool(false) => Some("ні".into()),
            SummaryValue::Num(n) => Some(format_number(*n)),
            SummaryValue::Str(s) => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for SummaryValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SummaryValue::Null,
            serde_json::Value::Bool(b) => SummaryValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(SummaryValue::Null, SummaryValue::Num),
            serde_json::Value::String(s) => SummaryValue::Str(s),
            serde_json::Value::Array(items) => {
                SummaryValue::List(items.into_iter().map(SummaryValue::from).collect())
            }
            serde_json::Value::Object(map) => SummaryValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, SummaryValue::from(v)))
                    .collect(),
            ),
        }
    }
}

fn render_into(value: &SummaryValue, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match value {
        SummaryValue::Map(map) => {
            for (key, child) in map.iter().filter(|(_, v)| !v.is_blank()) {
                let label = humanize_key(key);
                match child.scalar_text() {
                    Some(text) => {
                        let _ = writeln!(out, "{indent}{label}: {text}");
                    }
                    None => {
                        let _ = writeln!(out, "{indent}{label}:");
                        render_into(child, depth + 1, out);
                    }
                }
            }
        }
        SummaryValue::List(items) => {
            for item in items.iter().filter(|v| !v.is_blank()) {
                match item.scalar_text() {
                    Some(text) => {
                        let _ = writeln!(out, "{indent}- {text}");
                    }
                    None => {
                        let _ = writeln!(out, "{indent}-");
                        render_into(item, depth + 1, out);
                    }
                }
            }
        }
        SummaryValue::Null => {}
        scalar => {
            if let Some(text) = scalar.scalar_text() {
                let _ = writeln!(out, "{indent}{text}");
            }
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// `companyProfile` / `company_profile` → `Company profile`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.extend(c.to_lowercase());
        } else {
            current.extend(c.to_lowercase());
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(value: serde_json::Value) -> SummaryValue {
        SummaryValue::from(value)
    }

    #[test]
    fn merge_fills_gaps_and_keeps_existing_fields() {
        let mut summary = v(json!({
            "companyProfile": { "industry": "меблі" },
            "team": { "size": 12 }
        }));
        summary.merge(v(json!({
            "companyProfile": { "city": "Львів" },
            "finance": { "revenue": "2 млн" }
        })));

        assert_eq!(
            summary.get("companyProfile.industry").and_then(SummaryValue::as_str),
            Some("меблі")
        );
        assert_eq!(
            summary.get("companyProfile.city").and_then(SummaryValue::as_str),
            Some("Львів")
        );
        assert_eq!(summary.get("team.size"), Some(&SummaryValue::Num(12.0)));
        assert!(summary.get("finance.revenue").is_some());
    }

    #[test]
    fn merge_overwrites_non_blank_values() {
        let mut summary = v(json!({ "team": { "size": 12 } }));
        summary.merge(v(json!({ "team": { "size": 15 } })));
        assert_eq!(summary.get("team.size"), Some(&SummaryValue::Num(15.0)));
    }

    #[test]
    fn blank_updates_never_erase() {
        let mut summary = v(json!({
            "companyProfile": { "industry": "меблі", "channels": ["Instagram"] }
        }));
        summary.merge(v(json!({
            "companyProfile": { "industry": "", "channels": [], "city": null }
        })));

        assert_eq!(
            summary.get("companyProfile.industry").and_then(SummaryValue::as_str),
            Some("меблі")
        );
        assert_eq!(
            summary.get("companyProfile.channels.0").and_then(SummaryValue::as_str),
            Some("Instagram")
        );
        assert!(summary.get("companyProfile.city").is_none());
    }

    #[test]
    fn merge_into_null_takes_update() {
        let mut summary = SummaryValue::Null;
        summary.merge(v(json!({ "goals": "вийти на ринок ЄС" })));
        assert!(!summary.is_blank());
    }

    #[test]
    fn blankness_is_recursive() {
        assert!(v(json!({ "a": { "b": "", "c": [] } })).is_blank());
        assert!(!v(json!({ "a": { "b": false } })).is_blank());
        assert!(!SummaryValue::Num(0.0).is_blank());
    }

    #[test]
    fn render_walks_nested_structures() {
        let summary = v(json!({
            "companyProfile": { "industry": "меблі", "yearsOnMarket": 7 },
            "products": ["дивани", { "name": "крісла", "share": 0.3 }],
            "empty": {}
        }));
        let text = summary.render();

        assert!(text.contains("Company profile:\n"));
        assert!(text.contains("  Industry: меблі\n"));
        assert!(text.contains("  Years on market: 7\n"));
        assert!(text.contains("Products:\n  - дивани\n"));
        assert!(text.contains("    Share: 0.3\n"));
        assert!(!text.contains("Empty"));
    }

    #[test]
    fn untagged_serde_round_trips_json_shapes() {
        let raw = json!({ "a": [1, "x", true, null], "b": { "c": 2.5 } });
        let parsed: SummaryValue = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(parsed, v(raw));
    }

    #[test]
    fn humanize_handles_camel_and_snake_case() {
        assert_eq!(humanize_key("companyProfile"), "Company profile");
        assert_eq!(humanize_key("sales_channels"), "Sales channels");
        assert_eq!(humanize_key("team"), "Team");
    }
}

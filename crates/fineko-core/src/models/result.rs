//! Result (long-term goal) domain model.
//!
//! A result owns a recursive tree of sub-results. Tasks and templates link
//! to a result through their own `resultId`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FinekoError, FinekoResult};
use crate::store::{Collection, TenantEntity};

/// Deepest allowed sub-result nesting, counting the first level as 1.
pub const MAX_SUB_RESULT_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubResult {
    pub id: Uuid,
    pub name: String,
    pub completed: bool,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    #[serde(default)]
    pub sub_results: Vec<SubResult>,
}

impl SubResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            completed: false,
            deadline: None,
            assignee_id: None,
            sub_results: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessResult {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub deadline: NaiveDate,
    pub assignee_id: Uuid,
    pub reporter_id: Uuid,
    pub status: ResultStatus,
    #[serde(default)]
    pub sub_results: Vec<SubResult>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessResult {
    /// Find a sub-result anywhere in the tree.
    pub fn find_sub_result(&self, id: Uuid) -> Option<&SubResult> {
        find_in(&self.sub_results, id)
    }

    /// Share of leaf sub-results that are completed, in `0.0..=1.0`.
    /// A result without sub-results reports its own status.
    pub fn progress(&self) -> f64 {
        let (done, total) = count_leaves(&self.sub_results);
        if total == 0 {
            return if self.status == ResultStatus::Completed { 1.0 } else { 0.0 };
        }
        done as f64 / total as f64
    }
}

fn find_in(nodes: &[SubResult], id: Uuid) -> Option<&SubResult> {
    nodes.iter().find_map(|node| {
        if node.id == id {
            Some(node)
        } else {
            find_in(&node.sub_results, id)
        }
    })
}

/// Number of levels in the forest; `0` when empty.
pub fn tree_height(nodes: &[SubResult]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + tree_height(&node.sub_results))
        .max()
        .unwrap_or(0)
}

/// Reject a forest that would reach below [`MAX_SUB_RESULT_DEPTH`] when
/// placed `base_depth` levels down (`0` for the top level).
pub fn check_depth(nodes: &[SubResult], base_depth: usize) -> FinekoResult<()> {
    if base_depth + tree_height(nodes) > MAX_SUB_RESULT_DEPTH {
        return Err(FinekoError::validation(format!(
            "sub-results can be nested at most {MAX_SUB_RESULT_DEPTH} levels deep"
        )));
    }
    Ok(())
}

/// Mutable lookup returning the node and its depth (1-based).
pub fn find_sub_result_mut(
    nodes: &mut [SubResult],
    id: Uuid,
    depth: usize,
) -> Option<(&mut SubResult, usize)> {
    for node in nodes.iter_mut() {
        if node.id == id {
            return Some((node, depth));
        }
        if let Some(found) = find_sub_result_mut(&mut node.sub_results, id, depth + 1) {
            return Some(found);
        }
    }
    None
}

/// Remove a sub-result (and its subtree). Returns whether it was found.
pub fn remove_sub_result(nodes: &mut Vec<SubResult>, id: Uuid) -> bool {
    if let Some(pos) = nodes.iter().position(|n| n.id == id) {
        nodes.remove(pos);
        return true;
    }
    nodes
        .iter_mut()
        .any(|node| remove_sub_result(&mut node.sub_results, id))
}

fn count_leaves(nodes: &[SubResult]) -> (usize, usize) {
    nodes.iter().fold((0, 0), |(done, total), node| {
        if node.sub_results.is_empty() {
            (done + usize::from(node.completed), total + 1)
        } else {
            let (d, t) = count_leaves(&node.sub_results);
            (done + d, total + t)
        }
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResult {
    pub title: String,
    pub description: Option<String>,
    pub deadline: NaiveDate,
    pub assignee_id: Uuid,
    pub reporter_id: Uuid,
    pub status: ResultStatus,
    pub sub_results: Vec<SubResult>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResultStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_results: Option<Vec<SubResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

impl TenantEntity for BusinessResult {
    const COLLECTION: Collection = Collection::Results;
    const ENTITY: &'static str = "result";
    type New = NewResult;
    type Patch = ResultPatch;

    fn validate_new(input: &NewResult) -> FinekoResult<()> {
        check_depth(&input.sub_results, 0)
    }

    fn validate_patch(patch: &ResultPatch) -> FinekoResult<()> {
        match &patch.sub_results {
            Some(tree) => check_depth(tree, 0),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<SubResult> {
        let mut a = SubResult::new("a");
        let mut a1 = SubResult::new("a1");
        a1.completed = true;
        a.sub_results.push(a1);
        a.sub_results.push(SubResult::new("a2"));
        let mut b = SubResult::new("b");
        b.completed = true;
        vec![a, b]
    }

    #[test]
    fn mutable_lookup_reports_depth() {
        let mut nodes = tree();
        let a2 = nodes[0].sub_results[1].id;
        let (node, depth) = find_sub_result_mut(&mut nodes, a2, 1).unwrap();
        assert_eq!(node.name, "a2");
        assert_eq!(depth, 2);
    }

    #[test]
    fn remove_drops_whole_subtree() {
        let mut nodes = tree();
        let a = nodes[0].id;
        assert!(remove_sub_result(&mut nodes, a));
        assert_eq!(nodes.len(), 1);
        assert!(!remove_sub_result(&mut nodes, a));
    }

    fn chain(levels: usize) -> SubResult {
        let mut node = SubResult::new(format!("level {levels}"));
        for level in (1..levels).rev() {
            let mut parent = SubResult::new(format!("level {level}"));
            parent.sub_results.push(node);
            node = parent;
        }
        node
    }

    #[test]
    fn height_counts_the_deepest_branch() {
        assert_eq!(tree_height(&[]), 0);
        assert_eq!(tree_height(&tree()), 2);
        assert_eq!(tree_height(&[chain(4), SubResult::new("leaf")]), 4);
    }

    #[test]
    fn depth_check_accounts_for_placement() {
        assert!(check_depth(&[chain(MAX_SUB_RESULT_DEPTH)], 0).is_ok());
        assert!(check_depth(&[chain(MAX_SUB_RESULT_DEPTH + 1)], 0).is_err());
        assert!(check_depth(&[chain(2)], MAX_SUB_RESULT_DEPTH - 2).is_ok());
        assert!(check_depth(&[chain(2)], MAX_SUB_RESULT_DEPTH - 1).is_err());
    }

    #[test]
    fn leaf_counting_ignores_parents() {
        assert_eq!(count_leaves(&tree()), (2, 3));
    }
}

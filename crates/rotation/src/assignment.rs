//! Assignment modes and the position-indexed rotation formula.
//!
//! The assignee of occurrence `k` depends only on `k`, the pool and the mode,
//! never on what happened to earlier occurrences. Completing, skipping or
//! regenerating therefore never has to look backward.

use std::fmt;
use std::str::FromStr;

use chores_core::UserId;
use serde::{Deserialize, Serialize};

/// Mode tag as stored on a chore definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentMode {
    Fixed,
    RoundRobin,
    Mixed,
}

impl fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentMode::Fixed => write!(f, "FIXED"),
            AssignmentMode::RoundRobin => write!(f, "ROUND_ROBIN"),
            AssignmentMode::Mixed => write!(f, "MIXED"),
        }
    }
}

impl FromStr for AssignmentMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FIXED" => Ok(AssignmentMode::Fixed),
            "ROUND_ROBIN" => Ok(AssignmentMode::RoundRobin),
            "MIXED" => Ok(AssignmentMode::Mixed),
            other => Err(format!("unknown assignment mode: '{}'", other)),
        }
    }
}

/// Who is responsible for a definition's occurrences: the mode together with
/// the data that mode needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Assignment {
    /// The same set of users every time.
    Fixed {
        #[serde(rename = "fixedAssigneeIds")]
        fixed: Vec<UserId>,
    },
    /// Exactly one pool member, taking turns in pool order.
    RoundRobin {
        #[serde(rename = "roundRobinPoolIds")]
        pool: Vec<UserId>,
    },
    /// The fixed set plus one rotating pool member.
    Mixed {
        #[serde(rename = "fixedAssigneeIds", default)]
        fixed: Vec<UserId>,
        #[serde(rename = "roundRobinPoolIds")]
        pool: Vec<UserId>,
    },
}

impl Assignment {
    /// Build from the flat storage shape (mode tag + both id lists).
    /// Lists the mode does not use are ignored.
    pub fn from_parts(mode: AssignmentMode, fixed: Vec<UserId>, pool: Vec<UserId>) -> Self {
        match mode {
            AssignmentMode::Fixed => Assignment::Fixed { fixed },
            AssignmentMode::RoundRobin => Assignment::RoundRobin { pool },
            AssignmentMode::Mixed => Assignment::Mixed { fixed, pool },
        }
    }

    pub fn mode(&self) -> AssignmentMode {
        match self {
            Assignment::Fixed { .. } => AssignmentMode::Fixed,
            Assignment::RoundRobin { .. } => AssignmentMode::RoundRobin,
            Assignment::Mixed { .. } => AssignmentMode::Mixed,
        }
    }

    pub fn fixed_ids(&self) -> &[UserId] {
        match self {
            Assignment::Fixed { fixed } | Assignment::Mixed { fixed, .. } => fixed,
            Assignment::RoundRobin { .. } => &[],
        }
    }

    pub fn pool(&self) -> &[UserId] {
        match self {
            Assignment::RoundRobin { pool } | Assignment::Mixed { pool, .. } => pool,
            Assignment::Fixed { .. } => &[],
        }
    }

    /// A rotating mode with nobody to rotate through.
    pub fn has_empty_pool(&self) -> bool {
        self.mode() != AssignmentMode::Fixed && self.pool().is_empty()
    }

    /// Assignee set for the occurrence at `position`.
    pub fn assignees_at(&self, position: u64) -> AssigneeSet {
        self.assignees_at_offset(position, 0)
    }

    /// Assignee set for `position` when the rotation's first slot falls on
    /// position `offset` instead of 0. Positions before `offset` wrap
    /// backwards through the pool.
    pub fn assignees_at_offset(&self, position: u64, offset: u64) -> AssigneeSet {
        match self {
            Assignment::Fixed { fixed } => AssigneeSet {
                assigned_user_ids: ordered_set(fixed.iter()),
                rotation_index: None,
            },
            Assignment::RoundRobin { pool } => match rotation_slot(pool, position, offset) {
                Some(index) => AssigneeSet {
                    assigned_user_ids: vec![pool[index].clone()],
                    rotation_index: Some(index),
                },
                None => AssigneeSet::default(),
            },
            Assignment::Mixed { fixed, pool } => match rotation_slot(pool, position, offset) {
                Some(index) => AssigneeSet {
                    assigned_user_ids: ordered_set(fixed.iter().chain(std::iter::once(&pool[index]))),
                    rotation_index: Some(index),
                },
                None => AssigneeSet {
                    assigned_user_ids: ordered_set(fixed.iter()),
                    rotation_index: None,
                },
            },
        }
    }
}

/// Result of evaluating an [`Assignment`] at one position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeSet {
    pub assigned_user_ids: Vec<UserId>,
    /// Pool index picked for this position; `None` when nothing rotated.
    pub rotation_index: Option<usize>,
}

impl AssigneeSet {
    /// Nobody is responsible. Generation does not materialize such occurrences.
    pub fn is_empty(&self) -> bool {
        self.assigned_user_ids.is_empty()
    }
}

/// Assignee set for the flat storage shape. Equivalent to
/// `Assignment::from_parts(mode, ..).assignees_at(position)`.
pub fn assignees_for_position(
    mode: AssignmentMode,
    fixed: &[UserId],
    pool: &[UserId],
    position: u64,
) -> AssigneeSet {
    Assignment::from_parts(mode, fixed.to_vec(), pool.to_vec()).assignees_at(position)
}

fn rotation_slot(pool: &[UserId], position: u64, offset: u64) -> Option<usize> {
    if pool.is_empty() {
        return None;
    }
    let shifted = i128::from(position) - i128::from(offset);
    Some(shifted.rem_euclid(pool.len() as i128) as usize)
}

/// Keep the first occurrence of every id, preserving order.
fn ordered_set<'a>(ids: impl Iterator<Item = &'a UserId>) -> Vec<UserId> {
    let mut out: Vec<UserId> = Vec::new();
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

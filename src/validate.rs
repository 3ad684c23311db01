//! Structural checks run by the editing surface before an edge is recorded.
//!
//! The rest of the crate assumes edges already passed these checks but never
//! relies on it for termination.

use std::collections::BTreeSet;

use crate::ir::RelationshipEdge;

pub const MAX_PARENTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationshipError {
    #[error("{0} cannot be related to themselves")]
    SelfRelationship(String),
    #[error("{parent} is already a parent of {child}")]
    DuplicateParent { parent: String, child: String },
    #[error("{child} already has two parents ({existing})")]
    TooManyParents { child: String, existing: String },
    #[error("{a} and {b} are already partners")]
    DuplicatePartnership { a: String, b: String },
}

/// Checks that `parent` may be recorded as a parent of `child`.
pub fn validate_parent_addition(
    child: &str,
    parent: &str,
    edges: &[RelationshipEdge],
) -> Result<(), RelationshipError> {
    if child == parent {
        return Err(RelationshipError::SelfRelationship(child.to_string()));
    }
    let existing: BTreeSet<&str> = edges
        .iter()
        .filter(|edge| edge.is_parent() && edge.target == child)
        .map(|edge| edge.source.as_str())
        .collect();
    if existing.contains(parent) {
        return Err(RelationshipError::DuplicateParent {
            parent: parent.to_string(),
            child: child.to_string(),
        });
    }
    if existing.len() >= MAX_PARENTS {
        return Err(RelationshipError::TooManyParents {
            child: child.to_string(),
            existing: existing.into_iter().collect::<Vec<_>>().join(", "),
        });
    }
    Ok(())
}

/// Checks that a Partner or Divorced edge may be added between `a` and `b`.
pub fn validate_partner_addition(
    a: &str,
    b: &str,
    edges: &[RelationshipEdge],
) -> Result<(), RelationshipError> {
    if a == b {
        return Err(RelationshipError::SelfRelationship(a.to_string()));
    }
    if edges
        .iter()
        .any(|edge| edge.is_partnership() && edge.connects(a, b))
    {
        return Err(RelationshipError::DuplicatePartnership {
            a: a.to_string(),
            b: b.to_string(),
        });
    }
    Ok(())
}

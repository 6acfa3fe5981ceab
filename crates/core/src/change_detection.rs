//! Field-level change detection for threshold records.
//!
//! The reconciler only writes an existing record when [`detect_change`]
//! reports it as [`ChangeKind::Updated`]. Which value fields are compared
//! depends on the *desired* record's type:
//!
//! | desired type          | compared fields                                   |
//! |-----------------------|---------------------------------------------------|
//! | any                   | `group_id`, `approved_by` (case-insensitive)      |
//! | `DetectionSpecialist` | `in_warning_threshold`, `full_threshold`          |
//! | `Group`               | `at_risk_threshold`, `no_detection_threshold`     |
//! | unrecognized id       | nothing beyond the first row                      |
//!
//! `threshold_type_id` is not compared on its own. Switching a record's type
//! only counts as a change when the newly selected pair differs from what is
//! persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::threshold_type::{ThresholdType, ThresholdTypeId};
use crate::types::DbId;

/// Outcome for a single record during a reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// New record (`id == 0`) written with a generated id.
    Inserted,
    /// Existing record that differed from storage and was rewritten.
    Updated,
    /// Existing record identical to storage under the comparison rules.
    Unchanged,
    /// Persisted record absent from the desired set.
    Deleted,
    /// Desired record referenced an id that has no persisted row.
    Missing,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Deleted => "deleted",
            Self::Missing => "missing",
        }
    }

    /// Whether records with this outcome belong in the changed-set.
    pub fn is_reportable(&self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of the fields that participate in change detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSnapshot<'a> {
    pub group_id: Option<DbId>,
    pub threshold_type_id: ThresholdTypeId,
    pub approved_by: Option<&'a str>,
    pub at_risk_threshold: Option<Decimal>,
    pub no_detection_threshold: Option<Decimal>,
    pub in_warning_threshold: Option<Decimal>,
    pub full_threshold: Option<Decimal>,
}

/// Compare a desired record with its persisted counterpart.
///
/// Returns [`ChangeKind::Updated`] or [`ChangeKind::Unchanged`].
pub fn detect_change(desired: &ThresholdSnapshot<'_>, persisted: &ThresholdSnapshot<'_>) -> ChangeKind {
    if differs(desired, persisted) {
        ChangeKind::Updated
    } else {
        ChangeKind::Unchanged
    }
}

fn differs(d: &ThresholdSnapshot<'_>, p: &ThresholdSnapshot<'_>) -> bool {
    if d.group_id != p.group_id {
        return true;
    }

    if !approvers_match(d.approved_by, p.approved_by) {
        return true;
    }

    match ThresholdType::from_id(d.threshold_type_id) {
        Some(ThresholdType::DetectionSpecialist) => {
            d.in_warning_threshold != p.in_warning_threshold
                || d.full_threshold != p.full_threshold
        }
        Some(ThresholdType::Group) => {
            d.at_risk_threshold != p.at_risk_threshold
                || d.no_detection_threshold != p.no_detection_threshold
        }
        None => false,
    }
}

/// Case-insensitive approver comparison. `None` only matches `None`.
pub fn approvers_match(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b || a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}

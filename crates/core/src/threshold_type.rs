//! Threshold type discriminator stored in `thresholds.threshold_type_id`.
//!
//! The type selects which pair of value columns is meaningful for a record:
//!
//! - `DetectionSpecialist` -- `in_warning_threshold` / `full_threshold`
//! - `Group`               -- `at_risk_threshold` / `no_detection_threshold`
//!
//! The column is a plain `SMALLINT` without a lookup table, so values outside
//! the known set can exist in storage. [`ThresholdType::from_id`] returns
//! `None` for those and callers decide how to treat them.

use serde::{Deserialize, Serialize};

/// Raw value of `thresholds.threshold_type_id`.
pub type ThresholdTypeId = i16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdType {
    DetectionSpecialist,
    Group,
}

impl ThresholdType {
    pub const DETECTION_SPECIALIST_ID: ThresholdTypeId = 0;
    pub const GROUP_ID: ThresholdTypeId = 1;

    /// Map a stored id to a known type, or `None` if unrecognized.
    pub fn from_id(id: ThresholdTypeId) -> Option<Self> {
        match id {
            Self::DETECTION_SPECIALIST_ID => Some(Self::DetectionSpecialist),
            Self::GROUP_ID => Some(Self::Group),
            _ => None,
        }
    }

    pub fn id(self) -> ThresholdTypeId {
        match self {
            Self::DetectionSpecialist => Self::DETECTION_SPECIALIST_ID,
            Self::Group => Self::GROUP_ID,
        }
    }

    /// Human-readable name used in notification e-mails.
    pub fn label(self) -> &'static str {
        match self {
            Self::DetectionSpecialist => "Detection Specialist",
            Self::Group => "Group",
        }
    }

    /// Label of the lower (warning) value of the active pair.
    pub fn warning_label(self) -> &'static str {
        match self {
            Self::DetectionSpecialist => "In Warning",
            Self::Group => "At Risk Of No Operator Available",
        }
    }

    /// Label of the upper (full) value of the active pair.
    pub fn full_label(self) -> &'static str {
        match self {
            Self::DetectionSpecialist => "Full",
            Self::Group => "No Operator Available",
        }
    }
}

impl std::fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

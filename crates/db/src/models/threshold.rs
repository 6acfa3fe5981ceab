//! Threshold configuration models.

use dx_core::change_detection::ThresholdSnapshot;
use dx_core::error::CoreError;
use dx_core::threshold_type::{ThresholdType, ThresholdTypeId};
use dx_core::threshold_validation::{validate_threshold_scales, validate_threshold_values};
use dx_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// A row from the `thresholds` table.
///
/// The same struct carries caller-supplied desired state into
/// [`ThresholdRepo::reconcile`](crate::repositories::ThresholdRepo::reconcile):
/// `id == 0` marks a record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(default)]
    pub id: DbId,
    pub group_id: Option<DbId>,
    pub threshold_type_id: ThresholdTypeId,
    pub created_by: Option<String>,
    pub created_date: Option<Timestamp>,
    pub updated_by: Option<String>,
    pub updated_date: Option<Timestamp>,
    pub approved_by: Option<String>,
    pub at_risk_threshold: Option<Decimal>,
    pub no_detection_threshold: Option<Decimal>,
    pub in_warning_threshold: Option<Decimal>,
    pub full_threshold: Option<Decimal>,
}

impl Threshold {
    /// Whether this record still needs an insert.
    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    /// The known type of this record, if its id is recognized.
    pub fn threshold_type(&self) -> Option<ThresholdType> {
        ThresholdType::from_id(self.threshold_type_id)
    }

    /// `(warning, full)` values of the pair selected by the type.
    ///
    /// Any id other than detection specialist selects the group pair.
    pub fn active_values(&self) -> (Option<Decimal>, Option<Decimal>) {
        match self.threshold_type() {
            Some(ThresholdType::DetectionSpecialist) => {
                (self.in_warning_threshold, self.full_threshold)
            }
            _ => (self.at_risk_threshold, self.no_detection_threshold),
        }
    }

    /// Fields that take part in change detection.
    pub fn snapshot(&self) -> ThresholdSnapshot<'_> {
        ThresholdSnapshot {
            group_id: self.group_id,
            threshold_type_id: self.threshold_type_id,
            approved_by: self.approved_by.as_deref(),
            at_risk_threshold: self.at_risk_threshold,
            no_detection_threshold: self.no_detection_threshold,
            in_warning_threshold: self.in_warning_threshold,
            full_threshold: self.full_threshold,
        }
    }

    /// Check that every present fractional value lies within `[0, 1]` and
    /// fits the stored precision.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_threshold_values(&self.named_values())
    }

    /// Check only that every present value can be stored without rounding.
    pub fn validate_scale(&self) -> Result<(), CoreError> {
        validate_threshold_scales(&self.named_values())
    }

    fn named_values(&self) -> [(&'static str, Option<Decimal>); 4] {
        [
            ("at_risk_threshold", self.at_risk_threshold),
            ("no_detection_threshold", self.no_detection_threshold),
            ("in_warning_threshold", self.in_warning_threshold),
            ("full_threshold", self.full_threshold),
        ]
    }
}

// ---------------------------------------------------------------------------
// ThresholdFilter
// ---------------------------------------------------------------------------

/// Optional narrowing conditions for [`ThresholdRepo::list`](crate::repositories::ThresholdRepo::list).
///
/// Every set field adds an `AND` condition; the default filter matches all
/// rows. `id == 0` means "no id condition".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThresholdFilter {
    #[serde(default)]
    pub id: DbId,
    pub group_id: Option<DbId>,
    pub threshold_type_id: Option<ThresholdTypeId>,
}

//! Per-visit clinical measurements and notes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One visit's data. Every field is nullable: a freshly registered patient
/// has a chart row whose visit is entirely empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Visit date; null when missing or unparseable
    pub visit_date: Option<NaiveDate>,
    /// Chief complaint
    pub complaint: Option<String>,
    /// Physical examination findings
    pub physical_examination: Option<String>,
    /// Systolic blood pressure, mmHg
    pub systolic_bp: Option<f64>,
    /// Diastolic blood pressure, mmHg
    pub diastolic_bp: Option<f64>,
    /// Body temperature
    pub temperature: Option<f64>,
    /// Blood glucose
    pub glucose: Option<f64>,
    /// Total cholesterol
    pub cholesterol: Option<f64>,
    /// Hemoglobin
    pub hemoglobin: Option<f64>,
    /// Anything else the clinician recorded
    pub other_notes: Option<String>,
}

impl Visit {
    /// Start a visit on the given date.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            visit_date: Some(date),
            ..Self::default()
        }
    }

    /// True when no visit data has been recorded (a registration-only row).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

//! The denormalized chart row: one (patient, visit) pair.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Patient, Visit};
use crate::store::age_years;

/// One row of the chart table. Patient attributes are repeated on every
/// visit row; a patient with no visits yet is a single row with an empty
/// [`Visit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    /// Static patient attributes, copied forward onto every visit row
    pub patient: Patient,
    /// Age in whole years, derived from date of birth at load time.
    /// The stored column is advisory only and overwritten on every load.
    pub age: Option<i64>,
    /// This row's visit data
    pub visit: Visit,
}

impl ChartRow {
    /// Registration row for a new patient: no visit data, age derived once
    /// from the supplied date of birth.
    pub fn registration(patient: Patient, today: NaiveDate) -> Self {
        let age = patient.date_of_birth.map(|dob| age_years(dob, today));
        Self {
            patient,
            age,
            visit: Visit::default(),
        }
    }

    /// Visit row built by copying a prior row's patient attributes forward.
    pub fn follow_up(prior: &ChartRow, visit: Visit) -> Self {
        Self {
            patient: prior.patient.clone(),
            age: prior.age,
            visit,
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient.patient_id
    }
}

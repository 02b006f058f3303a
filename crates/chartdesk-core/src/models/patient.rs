//! Patient identity and static chart attributes.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Gender as recorded on the chart.
///
/// The enumeration is open: any value outside the standard three is kept
/// verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
    /// Free-form value outside the standard enumeration.
    Unlisted(String),
}

impl From<String> for Gender {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            "Other" => Gender::Other,
            _ => Gender::Unlisted(s),
        }
    }
}

impl From<Gender> for String {
    fn from(g: Gender) -> Self {
        g.to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("Male"),
            Gender::Female => f.write_str("Female"),
            Gender::Other => f.write_str("Other"),
            Gender::Unlisted(s) => f.write_str(s),
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unlisted(String::new())
    }
}

/// Static patient attributes, repeated on every chart row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Operator-assigned identifier. Uniqueness is NOT enforced by default;
    /// see `StoreConfig::enforce_unique_ids`.
    pub patient_id: String,
    /// Patient name
    pub name: String,
    /// Date of birth; null when missing or unparseable
    pub date_of_birth: Option<NaiveDate>,
    /// Gender (open enumeration)
    pub gender: Gender,
    /// Medical history, free text
    pub medical_history: String,
    /// Known allergies, free text
    pub allergies: String,
}

impl Patient {
    /// Create a patient with required fields; everything else starts empty.
    pub fn new(patient_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            name: name.into(),
            date_of_birth: None,
            gender: Gender::default(),
            medical_history: String::new(),
            allergies: String::new(),
        }
    }
}

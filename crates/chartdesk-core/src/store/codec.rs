//! CSV wire format for the chart table.
//!
//! Keeps the model <-> storage mapping out of the domain types: [`RawRow`]
//! mirrors the file's 17 columns as they appear on disk (dates as strings),
//! and normalization into typed [`ChartRow`]s happens here.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::dates::{age_years, parse_inferred, parse_strict, DATE_FMT};
use super::{DateParsing, StoreError, StoreResult};
use crate::models::{ChartRow, Gender, Patient, Visit};

/// Column order of the backing file. Must stay in sync with [`RawRow`].
const HEADERS: [&str; 17] = [
    "Patient ID",
    "Patient Name",
    "Date of Birth",
    "Age",
    "Gender",
    "Medical History",
    "Allergies",
    "Visit Date",
    "Complaint",
    "Physical Examination",
    "Systolic BP",
    "Diastolic BP",
    "Temperature",
    "Glucose",
    "Cholesterol",
    "Hemoglobin",
    "Other Notes",
];

/// One row exactly as stored: date columns are raw strings so that a
/// malformed date reaches the normalization step instead of failing the
/// whole read.
#[derive(Debug, Serialize, Deserialize)]
struct RawRow {
    #[serde(rename = "Patient ID")]
    patient_id: String,
    #[serde(rename = "Patient Name")]
    patient_name: String,
    #[serde(rename = "Date of Birth")]
    date_of_birth: String,
    /// Advisory only; recomputed from Date of Birth on every load.
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Medical History")]
    medical_history: String,
    #[serde(rename = "Allergies")]
    allergies: String,
    #[serde(rename = "Visit Date")]
    visit_date: String,
    #[serde(rename = "Complaint")]
    complaint: Option<String>,
    #[serde(rename = "Physical Examination")]
    physical_examination: Option<String>,
    #[serde(rename = "Systolic BP")]
    systolic_bp: Option<f64>,
    #[serde(rename = "Diastolic BP")]
    diastolic_bp: Option<f64>,
    #[serde(rename = "Temperature")]
    temperature: Option<f64>,
    #[serde(rename = "Glucose")]
    glucose: Option<f64>,
    #[serde(rename = "Cholesterol")]
    cholesterol: Option<f64>,
    #[serde(rename = "Hemoglobin")]
    hemoglobin: Option<f64>,
    #[serde(rename = "Other Notes")]
    other_notes: Option<String>,
}

impl RawRow {
    fn normalize(self, mode: DateParsing, today: NaiveDate) -> StoreResult<ChartRow> {
        let date_of_birth =
            normalize_date("Date of Birth", &self.date_of_birth, parse_strict, mode)?;
        let visit_date = normalize_date("Visit Date", &self.visit_date, parse_inferred, mode)?;
        // The stored Age cell is ignored: the column is derived.
        let age = date_of_birth.map(|dob| age_years(dob, today));

        Ok(ChartRow {
            patient: Patient {
                patient_id: self.patient_id,
                name: self.patient_name,
                date_of_birth,
                gender: Gender::from(self.gender),
                medical_history: self.medical_history,
                allergies: self.allergies,
            },
            age,
            visit: Visit {
                visit_date,
                complaint: self.complaint,
                physical_examination: self.physical_examination,
                systolic_bp: self.systolic_bp,
                diastolic_bp: self.diastolic_bp,
                temperature: self.temperature,
                glucose: self.glucose,
                cholesterol: self.cholesterol,
                hemoglobin: self.hemoglobin,
                other_notes: self.other_notes,
            },
        })
    }

    fn denormalize(row: &ChartRow) -> Self {
        Self {
            patient_id: row.patient.patient_id.clone(),
            patient_name: row.patient.name.clone(),
            date_of_birth: format_date(row.patient.date_of_birth),
            age: row.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: row.patient.gender.to_string(),
            medical_history: row.patient.medical_history.clone(),
            allergies: row.patient.allergies.clone(),
            visit_date: format_date(row.visit.visit_date),
            complaint: row.visit.complaint.clone(),
            physical_examination: row.visit.physical_examination.clone(),
            systolic_bp: row.visit.systolic_bp,
            diastolic_bp: row.visit.diastolic_bp,
            temperature: row.visit.temperature,
            glucose: row.visit.glucose,
            cholesterol: row.visit.cholesterol,
            hemoglobin: row.visit.hemoglobin,
            other_notes: row.visit.other_notes.clone(),
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FMT).to_string())
        .unwrap_or_default()
}

fn normalize_date(
    column: &'static str,
    raw: &str,
    parse: fn(&str) -> Option<NaiveDate>,
    mode: DateParsing,
) -> StoreResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match parse(raw) {
        Some(date) => Ok(Some(date)),
        None => match mode {
            DateParsing::Lenient => {
                warn!(column, value = raw, "unparseable date coerced to null");
                Ok(None)
            }
            DateParsing::Strict => Err(StoreError::ParseFailure {
                column,
                value: raw.to_string(),
            }),
        },
    }
}

/// Read and normalize the whole table. A missing or unreadable file is
/// [`StoreError::StorageUnavailable`].
pub(super) fn read_table(
    path: &Path,
    mode: DateParsing,
    today: NaiveDate,
) -> StoreResult<Vec<ChartRow>> {
    let file = File::open(path).map_err(|source| StoreError::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawRow>() {
        rows.push(result?.normalize(mode, today)?);
    }
    Ok(rows)
}

/// Serialize the whole table, overwriting the file. An empty table still
/// gets its header row so a later load sees the expected columns.
pub(super) fn write_table(path: &Path, rows: &[ChartRow]) -> StoreResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(HEADERS)?;
    }
    for row in rows {
        writer.serialize(RawRow::denormalize(row))?;
    }
    writer.flush()?;
    Ok(())
}

//! Flat-file record store: load, derive, append, persist.
//!
//! The whole table is read on every load, held in memory for one
//! interaction, and rewritten in full on every save. There is no atomic
//! rename, no backup, and no file locking, so a second process writing the
//! same file is unsafe. This matches the tool's intended single-operator,
//! single-process usage.

mod codec;
mod dates;

pub use dates::{age_years, parse_inferred, parse_strict, DATE_FMT};

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{ChartRow, Patient, Visit};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("chart file unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed chart file: {0}")]
    Malformed(#[from] csv::Error),

    #[error("unparseable {column} value {value:?}")]
    ParseFailure { column: &'static str, value: String },

    #[error("duplicate patient ID: {0}")]
    DuplicatePatient(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// How unparseable non-empty date cells are handled at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateParsing {
    /// Coerce to null.
    #[default]
    Lenient,
    /// Fail the load with [`StoreError::ParseFailure`].
    Strict,
}

/// Store configuration. Defaults are permissive: lenient dates, duplicate
/// patient IDs accepted.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub date_parsing: DateParsing,
    pub unique_patient_ids: bool,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            date_parsing: DateParsing::default(),
            unique_patient_ids: false,
        }
    }

    /// Reject loads containing unparseable dates instead of coercing them
    /// to null.
    pub fn strict_dates(mut self) -> Self {
        self.date_parsing = DateParsing::Strict;
        self
    }

    /// Reject `create_patient` calls whose ID already exists in the table.
    pub fn enforce_unique_ids(mut self) -> Self {
        self.unique_patient_ids = true;
        self
    }
}

/// The chart table and its backing file, for one operator session.
///
/// An explicit store instance rather than process-wide state: independent
/// sessions and tests each get their own.
pub struct ChartStore {
    config: StoreConfig,
    rows: Vec<ChartRow>,
}

impl ChartStore {
    /// Open the store and load the table. Fails with
    /// [`StoreError::StorageUnavailable`] when the backing file is missing
    /// or unreadable; callers that want a fresh table use
    /// [`ChartStore::create_empty`].
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let mut store = Self {
            config,
            rows: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Bootstrap a header-only backing file and open the store over it.
    /// Overwrites whatever was at the path.
    pub fn create_empty(config: StoreConfig) -> StoreResult<Self> {
        codec::write_table(&config.path, &[])?;
        info!(path = %config.path.display(), "initialized empty chart file");
        Self::open(config)
    }

    /// Re-read the whole table from disk, normalizing the date columns and
    /// recomputing Age for every row from today's wall clock.
    pub fn load(&mut self) -> StoreResult<&[ChartRow]> {
        let today = Local::now().date_naive();
        self.rows = codec::read_table(&self.config.path, self.config.date_parsing, today)?;
        debug!(rows = self.rows.len(), "loaded chart table");
        Ok(&self.rows)
    }

    /// The in-memory table as of the last load or mutation.
    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Serialize the entire in-memory table over the backing file.
    pub fn save(&self) -> StoreResult<()> {
        codec::write_table(&self.config.path, &self.rows)?;
        info!(rows = self.rows.len(), "saved chart table");
        Ok(())
    }

    /// Append one visit row for `patient_id`, copying the patient's static
    /// attributes forward from their most recent row, then persist and
    /// reload. A visit for an unknown ID is not rejected; its
    /// copied-forward attributes are simply empty.
    pub fn append_visit(&mut self, patient_id: &str, visit: Visit) -> StoreResult<()> {
        let row = match self
            .rows
            .iter()
            .rev()
            .find(|r| r.patient_id() == patient_id)
        {
            Some(prior) => ChartRow::follow_up(prior, visit),
            None => ChartRow {
                patient: Patient::new(patient_id, ""),
                age: None,
                visit,
            },
        };
        self.rows.push(row);
        self.save()?;
        self.load()?;
        Ok(())
    }

    /// Append one registration row for a new patient (all visit fields
    /// null, Age derived once from the supplied date of birth), then
    /// persist and reload. Duplicate IDs are accepted unless the store was
    /// configured with [`StoreConfig::enforce_unique_ids`].
    pub fn create_patient(&mut self, patient: Patient) -> StoreResult<()> {
        if self.config.unique_patient_ids
            && self.rows.iter().any(|r| r.patient_id() == patient.patient_id)
        {
            return Err(StoreError::DuplicatePatient(patient.patient_id));
        }
        let today = Local::now().date_naive();
        self.rows.push(ChartRow::registration(patient, today));
        self.save()?;
        self.load()?;
        Ok(())
    }

    /// Unique patient IDs in order of first appearance.
    pub fn patient_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !ids.contains(&row.patient_id()) {
                ids.push(row.patient_id());
            }
        }
        ids
    }

    /// All rows for one patient, in table order.
    pub fn history(&self, patient_id: &str) -> Vec<&ChartRow> {
        self.rows
            .iter()
            .filter(|r| r.patient_id() == patient_id)
            .collect()
    }

    /// The first row for `patient_id` whose visit falls on `date`. Visits
    /// are not deduplicated, so several rows may share a date; the first
    /// match is the one shown.
    pub fn visit_on(&self, patient_id: &str, date: NaiveDate) -> Option<&ChartRow> {
        self.rows
            .iter()
            .find(|r| r.patient_id() == patient_id && r.visit.visit_date == Some(date))
    }
}

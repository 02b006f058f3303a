//! Chartdesk Core Library
//!
//! Single-operator clinical chart storage over one flat CSV table.
//!
//! # Architecture
//!
//! ```text
//! Console session ──> ChartStore ──> patient_data.csv
//!      │                  │
//!      │   load()         │  read whole table, normalize dates,
//!      │ <────────────────│  derive Age per row
//!      │                  │
//!      │   append_visit / │  copy-forward patient attributes,
//!      │   create_patient │  append row, rewrite whole file, reload
//! ```
//!
//! Each row of the table is a denormalized (patient, visit) pair; a
//! patient with no visits yet is one row with an empty visit. Age is a
//! derived column, recomputed from Date of Birth on every load.
//!
//! # Modules
//!
//! - [`models`]: domain types (Patient, Visit, ChartRow)
//! - [`store`]: the flat-file record store (load / derive / append / persist)

pub mod models;
pub mod store;

// Re-export commonly used types
pub use models::{ChartRow, Gender, Patient, Visit};
pub use store::{ChartStore, DateParsing, StoreConfig, StoreError, StoreResult};

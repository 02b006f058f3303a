//! Record store integration tests over real on-disk chart files.

use chartdesk_core::store::age_years;
use chartdesk_core::{ChartStore, Gender, Patient, StoreConfig, StoreError, Visit};
use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: &str = "Patient ID,Patient Name,Date of Birth,Age,Gender,Medical History,\
Allergies,Visit Date,Complaint,Physical Examination,Systolic BP,Diastolic BP,Temperature,\
Glucose,Cholesterol,Hemoglobin,Other Notes";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn chart_path(dir: &TempDir) -> PathBuf {
    dir.path().join("patient_data.csv")
}

/// Write a chart file with the given data rows and open a store over it.
fn seed_store(dir: &TempDir, data_rows: &[&str]) -> ChartStore {
    let mut contents = String::from(HEADER);
    for row in data_rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    std::fs::write(chart_path(dir), contents).unwrap();
    ChartStore::open(StoreConfig::new(chart_path(dir))).unwrap()
}

fn jane_doe() -> Patient {
    Patient {
        patient_id: "P2".into(),
        name: "Jane Doe".into(),
        date_of_birth: Some(d(2000, 1, 1)),
        gender: Gender::Female,
        medical_history: "asthma".into(),
        allergies: "none".into(),
    }
}

#[test]
fn test_missing_file_is_storage_unavailable() {
    let dir = TempDir::new().unwrap();
    let result = ChartStore::open(StoreConfig::new(chart_path(&dir)));
    assert!(matches!(
        result,
        Err(StoreError::StorageUnavailable { .. })
    ));
}

#[test]
fn test_create_empty_bootstraps_header_only_file() {
    let dir = TempDir::new().unwrap();
    let store = ChartStore::create_empty(StoreConfig::new(chart_path(&dir))).unwrap();
    assert!(store.rows().is_empty());

    let contents = std::fs::read_to_string(chart_path(&dir)).unwrap();
    assert_eq!(contents.trim_end(), HEADER);
}

#[test]
fn test_null_dob_yields_null_age() {
    let dir = TempDir::new().unwrap();
    let store = seed_store(
        &dir,
        &["P1,Mary Major,,,Female,,,2023-01-01,checkup,,120,80,36.6,90,180,13.5,"],
    );
    assert_eq!(store.rows().len(), 1);
    assert_eq!(store.rows()[0].patient.date_of_birth, None);
    assert_eq!(store.rows()[0].age, None);
}

#[test]
fn test_lenient_load_coerces_bad_dates_to_null() {
    let dir = TempDir::new().unwrap();
    let store = seed_store(
        &dir,
        &["P1,Mary Major,circa 1990,,Female,,,whenever,checkup,,120,80,36.6,90,180,13.5,"],
    );
    let row = &store.rows()[0];
    assert_eq!(row.patient.date_of_birth, None);
    assert_eq!(row.visit.visit_date, None);
    // The rest of the row is kept.
    assert_eq!(row.visit.systolic_bp, Some(120.0));
}

#[test]
fn test_strict_load_rejects_bad_dob() {
    let dir = TempDir::new().unwrap();
    seed_store(
        &dir,
        &["P1,Mary Major,circa 1990,,Female,,,,,,,,,,,,"],
    );
    let result = ChartStore::open(StoreConfig::new(chart_path(&dir)).strict_dates());
    assert!(matches!(
        result,
        Err(StoreError::ParseFailure {
            column: "Date of Birth",
            ..
        })
    ));
}

#[test]
fn test_dob_parsing_is_strict_but_visit_date_is_inferred() {
    let dir = TempDir::new().unwrap();
    // Slash-formatted dates: accepted for Visit Date, coerced to null for DOB.
    let store = seed_store(
        &dir,
        &["P1,Mary Major,1990/01/01,,Female,,,2023/01/01,,,,,,,,,"],
    );
    let row = &store.rows()[0];
    assert_eq!(row.patient.date_of_birth, None);
    assert_eq!(row.visit.visit_date, Some(d(2023, 1, 1)));
}

#[test]
fn test_append_visit_adds_one_row_and_copies_patient_forward() {
    let dir = TempDir::new().unwrap();
    let mut store = seed_store(
        &dir,
        &[
            "P1,Mary Major,1990-01-01,33,Female,hypertension,sulfa,2023-01-01,headache,unremarkable,120,80,36.6,90,180,13.5,",
        ],
    );
    let prior_count = store.rows().len();

    let visit = Visit {
        systolic_bp: Some(130.0),
        diastolic_bp: Some(85.0),
        ..Visit::on(d(2024, 6, 1))
    };
    store.append_visit("P1", visit).unwrap();

    assert_eq!(store.rows().len(), prior_count + 1);

    let history = store.history("P1");
    assert_eq!(history.len(), 2);
    let new_row = history[1];
    assert_eq!(new_row.visit.visit_date, Some(d(2024, 6, 1)));
    assert_eq!(new_row.visit.systolic_bp, Some(130.0));
    // Static attributes copied from the prior row.
    assert_eq!(new_row.patient.name, "Mary Major");
    assert_eq!(new_row.patient.date_of_birth, Some(d(1990, 1, 1)));
    assert_eq!(new_row.patient.gender, Gender::Female);
    assert_eq!(new_row.patient.medical_history, "hypertension");
    assert_eq!(new_row.patient.allergies, "sulfa");
}

#[test]
fn test_append_visit_copies_from_most_recent_row() {
    let dir = TempDir::new().unwrap();
    // Two rows share the ID but disagree on the name; the later one wins.
    let mut store = seed_store(
        &dir,
        &[
            "P1,Mary Major,1990-01-01,,Female,,,2023-01-01,,,,,,,,,",
            "P1,Mary Major-Minor,1990-01-01,,Female,,,2023-06-01,,,,,,,,,",
        ],
    );
    store.append_visit("P1", Visit::on(d(2024, 6, 1))).unwrap();
    assert_eq!(store.rows()[2].patient.name, "Mary Major-Minor");
}

#[test]
fn test_append_visit_for_unknown_patient_is_not_rejected() {
    let dir = TempDir::new().unwrap();
    let mut store = ChartStore::create_empty(StoreConfig::new(chart_path(&dir))).unwrap();

    store.append_visit("GHOST", Visit::on(d(2024, 6, 1))).unwrap();

    assert_eq!(store.rows().len(), 1);
    let row = &store.rows()[0];
    assert_eq!(row.patient_id(), "GHOST");
    assert_eq!(row.patient.name, "");
    assert_eq!(row.patient.date_of_birth, None);
    assert_eq!(row.age, None);
    assert_eq!(row.visit.visit_date, Some(d(2024, 6, 1)));
}

#[test]
fn test_create_patient_produces_one_registration_row() {
    let dir = TempDir::new().unwrap();
    let mut store = ChartStore::create_empty(StoreConfig::new(chart_path(&dir))).unwrap();

    store.create_patient(jane_doe()).unwrap();

    assert_eq!(store.rows().len(), 1);
    let row = &store.rows()[0];
    assert_eq!(row.patient_id(), "P2");
    assert_eq!(row.patient.name, "Jane Doe");
    assert!(row.visit.is_empty());

    // Age follows the 365-day-year convention, so it may trail the
    // calendar difference by one around the birthday.
    let calendar_years = i64::from(Local::now().year()) - 2000;
    let age = row.age.unwrap();
    assert!(
        age == calendar_years || age == calendar_years - 1,
        "age {} not within one year of {}",
        age,
        calendar_years
    );
}

#[test]
fn test_create_patient_accepts_duplicate_ids_by_default() {
    let dir = TempDir::new().unwrap();
    let mut store = ChartStore::create_empty(StoreConfig::new(chart_path(&dir))).unwrap();

    store.create_patient(jane_doe()).unwrap();
    store.create_patient(jane_doe()).unwrap();

    assert_eq!(store.rows().len(), 2);
    assert_eq!(store.history("P2").len(), 2);
    // Still one entry in the selector list.
    assert_eq!(store.patient_ids(), vec!["P2"]);
}

#[test]
fn test_unique_ids_flag_rejects_duplicate_create() {
    let dir = TempDir::new().unwrap();
    let mut store =
        ChartStore::create_empty(StoreConfig::new(chart_path(&dir)).enforce_unique_ids())
            .unwrap();

    store.create_patient(jane_doe()).unwrap();
    let result = store.create_patient(jane_doe());
    assert!(matches!(result, Err(StoreError::DuplicatePatient(id)) if id == "P2"));
    assert_eq!(store.rows().len(), 1);
}

#[test]
fn test_save_then_load_round_trips_the_table() {
    let dir = TempDir::new().unwrap();
    let mut store = ChartStore::create_empty(StoreConfig::new(chart_path(&dir))).unwrap();

    let mut patient = jane_doe();
    patient.medical_history = "notes, with commas".into();
    store.create_patient(patient).unwrap();
    store
        .append_visit(
            "P2",
            Visit {
                complaint: Some("fever".into()),
                temperature: Some(38.2),
                other_notes: Some("line one\nline two".into()),
                ..Visit::on(d(2024, 6, 1))
            },
        )
        .unwrap();

    let before: Vec<_> = store.rows().to_vec();

    // A second store over the same file sees the identical table
    // (Age is recomputed on load, from the same stored DOB).
    let reopened = ChartStore::open(StoreConfig::new(chart_path(&dir))).unwrap();
    assert_eq!(reopened.rows(), &before[..]);
}

#[test]
fn test_visit_on_returns_first_match_for_a_date() {
    let dir = TempDir::new().unwrap();
    // Two visits on the same date silently coexist; lookups see the first.
    let store = seed_store(
        &dir,
        &[
            "P1,Mary Major,1990-01-01,,Female,,,2023-01-01,morning,,118,,,,,,",
            "P1,Mary Major,1990-01-01,,Female,,,2023-01-01,afternoon,,125,,,,,,",
        ],
    );
    let row = store.visit_on("P1", d(2023, 1, 1)).unwrap();
    assert_eq!(row.visit.complaint.as_deref(), Some("morning"));
    assert_eq!(store.visit_on("P1", d(2023, 1, 2)), None);
}

#[test]
fn test_patient_ids_in_first_appearance_order() {
    let dir = TempDir::new().unwrap();
    let store = seed_store(
        &dir,
        &[
            "P3,Carol,1985-03-03,,Female,,,,,,,,,,,,",
            "P1,Alice,1990-01-01,,Female,,,2023-01-01,,,,,,,,,",
            "P3,Carol,1985-03-03,,Female,,,2023-02-02,,,,,,,,,",
        ],
    );
    assert_eq!(store.patient_ids(), vec!["P3", "P1"]);
}

#[test]
fn test_age_matches_365_day_convention_for_fixed_dates() {
    let dob = d(1990, 1, 1);
    let today = Local::now().date_naive();
    let dir = TempDir::new().unwrap();
    let store = seed_store(
        &dir,
        &["P1,Mary Major,1990-01-01,,Female,,,,,,,,,,,,"],
    );
    assert_eq!(store.rows()[0].age, Some(age_years(dob, today)));
}

//! Interactive chart console.
//!
//! A two-mode session over one chart file: select an existing patient
//! (view history, browse a visit, add a visit) or register a new patient.
//! The session takes no flags; the backing file path is fixed.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use chartdesk_core::store::parse_strict;
use chartdesk_core::{ChartRow, ChartStore, Gender, Patient, StoreConfig, StoreError, Visit};
use chrono::{Local, NaiveDate};
use tracing_subscriber::EnvFilter;

/// Fixed backing file path, in the working directory.
const DATA_FILE: &str = "patient_data.csv";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut store = open_store()?;

    loop {
        println!();
        println!("=== Chartdesk ===");
        println!("  1) Select patient");
        println!("  2) Create new patient");
        println!("  q) Quit");
        let action = match prompt("Action") {
            Ok(action) => action,
            Err(e) if is_input_closed(&e) => break,
            Err(e) => return Err(e),
        };
        let outcome = match action.as_str() {
            "1" => select_patient(&mut store),
            "2" => create_patient(&mut store),
            "q" | "Q" => break,
            _ => {
                println!("Unrecognized choice.");
                Ok(())
            }
        };
        match outcome {
            Ok(()) => {}
            // A stream that closes mid-form also ends the session.
            Err(e) if is_input_closed(&e) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Open the store; a missing chart file is reported and the operator may
/// choose to start a fresh one.
fn open_store() -> Result<ChartStore> {
    match ChartStore::open(StoreConfig::new(DATA_FILE)) {
        Ok(store) => Ok(store),
        Err(StoreError::StorageUnavailable { path, source }) => {
            println!("Chart file {} is unavailable: {}", path.display(), source);
            if confirm("Create an empty chart file here?")? {
                ChartStore::create_empty(StoreConfig::new(DATA_FILE))
                    .context("initializing chart file")
            } else {
                bail!("no chart file; nothing to do")
            }
        }
        Err(e) => Err(e).context("opening chart store"),
    }
}

// =========================================================================
// Select Patient mode
// =========================================================================

fn select_patient(store: &mut ChartStore) -> Result<()> {
    let ids: Vec<String> = store.patient_ids().iter().map(|s| s.to_string()).collect();
    if ids.is_empty() {
        println!("No patients on file.");
        return Ok(());
    }

    println!("Patients:");
    for (i, id) in ids.iter().enumerate() {
        println!("  {}) {}", i + 1, id);
    }
    let choice = prompt("Patient number")?;
    let Some(id) = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|n| ids.get(n))
        .cloned()
    else {
        println!("Unrecognized choice.");
        return Ok(());
    };

    loop {
        show_general_info(store, &id);
        show_vitals_over_time(store, &id);
        println!("[v] view a previous visit  [a] add visit  [b] back");
        match prompt("Choice")?.as_str() {
            "v" => view_previous_visit(store, &id)?,
            "a" => add_visit(store, &id)?,
            "b" | "" => break,
            _ => println!("Unrecognized choice."),
        }
    }
    Ok(())
}

fn show_general_info(store: &ChartStore, id: &str) {
    let history = store.history(id);
    let Some(row) = history.first() else {
        println!("No chart data for {}.", id);
        return;
    };
    println!();
    println!("== General Information ==");
    println!("Patient ID:       {}", id);
    println!("Name:             {}", row.patient.name);
    println!("Date of Birth:    {}", fmt_date(row.patient.date_of_birth));
    println!("Age:              {}", fmt_int(row.age));
    println!("Gender:           {}", row.patient.gender);
    println!("Medical History:  {}", row.patient.medical_history);
    println!("Allergies:        {}", row.patient.allergies);
}

/// The vitals series tabulated per visit, one row per visit date.
fn show_vitals_over_time(store: &ChartStore, id: &str) {
    let visits: Vec<&ChartRow> = store
        .history(id)
        .into_iter()
        .filter(|r| !r.visit.is_empty())
        .collect();
    if visits.is_empty() {
        println!("\nNo visits recorded yet.");
        return;
    }
    println!();
    println!("== Medical Data Over Time ==");
    println!(
        "{:<12} {:>12} {:>9} {:>12} {:>11}",
        "Visit Date", "Systolic BP", "Glucose", "Cholesterol", "Hemoglobin"
    );
    for row in visits {
        println!(
            "{:<12} {:>12} {:>9} {:>12} {:>11}",
            fmt_date(row.visit.visit_date),
            fmt_num(row.visit.systolic_bp),
            fmt_num(row.visit.glucose),
            fmt_num(row.visit.cholesterol),
            fmt_num(row.visit.hemoglobin),
        );
    }
}

fn view_previous_visit(store: &ChartStore, id: &str) -> Result<()> {
    let raw = prompt("Visit date (YYYY-MM-DD)")?;
    let Some(date) = parse_strict(&raw) else {
        println!("Unrecognized date.");
        return Ok(());
    };
    match store.visit_on(id, date) {
        Some(row) => {
            println!();
            println!("== Visit on {} ==", fmt_date(row.visit.visit_date));
            println!("Complaint:             {}", fmt_text(&row.visit.complaint));
            println!(
                "Physical Examination:  {}",
                fmt_text(&row.visit.physical_examination)
            );
            println!("Systolic BP:           {}", fmt_num(row.visit.systolic_bp));
            println!("Diastolic BP:          {}", fmt_num(row.visit.diastolic_bp));
            println!("Temperature:           {}", fmt_num(row.visit.temperature));
            println!("Glucose:               {}", fmt_num(row.visit.glucose));
            println!("Cholesterol:           {}", fmt_num(row.visit.cholesterol));
            println!("Hemoglobin:            {}", fmt_num(row.visit.hemoglobin));
            println!("Other Notes:           {}", fmt_text(&row.visit.other_notes));
        }
        None => println!("No visit data available for the selected date."),
    }
    Ok(())
}

fn add_visit(store: &mut ChartStore, id: &str) -> Result<()> {
    let today = Local::now().date_naive();
    println!();
    println!("== Current Visit ==");
    let visit = Visit {
        visit_date: Some(prompt_date(&format!("Visit Date [{}]", today), today)?),
        complaint: Some(prompt("Complaint")?),
        physical_examination: Some(prompt("Physical Examination")?),
        systolic_bp: Some(prompt_number("Systolic Blood Pressure")?),
        diastolic_bp: Some(prompt_number("Diastolic Blood Pressure")?),
        temperature: Some(prompt_number("Temperature")?),
        glucose: Some(prompt_number("Glucose")?),
        cholesterol: Some(prompt_number("Cholesterol")?),
        hemoglobin: Some(prompt_number("Hemoglobin")?),
        other_notes: Some(prompt("Other Notes")?),
    };
    store.append_visit(id, visit).context("saving visit")?;
    println!("New visit entry added successfully.");
    Ok(())
}

// =========================================================================
// Create New Patient mode
// =========================================================================

fn create_patient(store: &mut ChartStore) -> Result<()> {
    println!();
    println!("== Create New Patient Account ==");
    let patient_id = prompt("Patient ID")?;
    let name = prompt("Patient Name")?;
    let dob_raw = prompt("Date of Birth (YYYY-MM-DD)")?;
    let date_of_birth = parse_strict(&dob_raw);
    if date_of_birth.is_none() && !dob_raw.is_empty() {
        println!("Unrecognized date; leaving Date of Birth empty.");
    }
    let patient = Patient {
        patient_id,
        name,
        date_of_birth,
        gender: Gender::from(prompt("Gender (Male/Female/Other)")?),
        medical_history: prompt("Medical History")?,
        allergies: prompt("Allergies")?,
    };
    match store.create_patient(patient) {
        Ok(()) => println!("New patient account created successfully."),
        Err(StoreError::DuplicatePatient(id)) => {
            println!("Patient ID {} already exists; nothing saved.", id)
        }
        Err(e) => return Err(e).context("saving patient"),
    }
    Ok(())
}

// =========================================================================
// Prompt helpers
// =========================================================================

fn prompt(label: &str) -> Result<String> {
    prompt_from(&mut io::stdin().lock(), label)
}

/// Read one trimmed line. A closed input stream (zero bytes read) is an
/// `UnexpectedEof` error so the session can end instead of looping on
/// empty reads.
fn prompt_from(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(line.trim().to_string())
}

fn is_input_closed(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::UnexpectedEof)
}

/// Numeric form fields default to zero on empty or unparseable input.
fn prompt_number(label: &str) -> Result<f64> {
    Ok(prompt(label)?.parse().unwrap_or(0.0))
}

/// Date form fields fall back to the supplied default.
fn prompt_date(label: &str, default: NaiveDate) -> Result<NaiveDate> {
    Ok(parse_strict(&prompt(label)?).unwrap_or(default))
}

fn confirm(label: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N]", label))?;
    Ok(matches!(answer.as_str(), "y" | "Y"))
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

fn fmt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn fmt_num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn fmt_text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

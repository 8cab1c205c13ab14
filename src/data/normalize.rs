//! Explicit-schema conversion of raw tables into typed records.

use chrono::{NaiveDateTime, NaiveTime};
use log::{debug, info, warn};

use super::model::{
    CrimeCode, CrimeCodeTable, Incident, IncidentTable, MoCodeTable, RawTable, VictimSex,
};
use super::schema::{self, rename_incident_columns};
use crate::error::{CrimeStatsError, Result};

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

/// Parse a report/occurrence date-time. Empty is missing; any other
/// deviation from the fixed format is fatal.
pub fn parse_date_time(value: &str, row: usize, column: &str) -> Result<Option<NaiveDateTime>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(value, schema::DATE_TIME_FORMAT)
        .map(Some)
        .map_err(|_| CrimeStatsError::DateParse {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Parse a 24-hour time of day, zero-padding to four digits first
/// (`930` → `09:30`).
pub fn parse_time_of_day(value: &str, row: usize, column: &str) -> Result<Option<NaiveTime>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let padded = format!("{value:0>4}");
    NaiveTime::parse_from_str(&padded, schema::TIME_OF_DAY_FORMAT)
        .map(Some)
        .map_err(|_| CrimeStatsError::TimeParse {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Integer cell; a zero fraction (`510.0`) is accepted. Anything else,
/// including exponents and out-of-range values, is a missing value.
pub fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if !fraction.bytes().all(|b| b == b'0') {
        return None;
    }
    whole.parse::<i64>().ok()
}

fn parse_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// ---------------------------------------------------------------------------
// Incident table
// ---------------------------------------------------------------------------

/// Column positions resolved once per table.
struct IncidentColumns {
    date_reported: usize,
    date_occurred: usize,
    time_occurred: usize,
    area_name: usize,
    crime_code: usize,
    victim_age: usize,
    victim_sex: usize,
    record_id: Option<usize>,
    district_no: Option<usize>,
    crime_description: Option<usize>,
    mo_codes: Option<usize>,
    premises_code: Option<usize>,
    premises_description: Option<usize>,
    weapon_code: Option<usize>,
}

impl IncidentColumns {
    fn resolve(raw: &RawTable) -> Result<Self> {
        Ok(Self {
            date_reported: raw.require(schema::DATE_REPORTED)?,
            date_occurred: raw.require(schema::DATE_OCCURRED)?,
            time_occurred: raw.require(schema::TIME_OCCURRED)?,
            area_name: raw.require(schema::AREA_NAME)?,
            crime_code: raw.require(schema::CRIME_CODE)?,
            victim_age: raw.require(schema::VICTIM_AGE)?,
            victim_sex: raw.require(schema::VICTIM_SEX)?,
            record_id: raw.column_index(schema::RECORD_ID),
            district_no: raw.column_index(schema::DISTRICT_NO),
            crime_description: raw.column_index(schema::CRIME_CODE_DESC),
            mo_codes: raw.column_index(schema::MO_CODES),
            premises_code: raw.column_index(schema::PREMISES_CODE),
            premises_description: raw.column_index(schema::PREMISES_DESC),
            weapon_code: raw.column_index(schema::WEAPON_CODE),
        })
    }
}

/// Rename the incident columns to their canonical names, validate the
/// schema, and parse every row.
///
/// Fails on a missing required column or a malformed date/time. Bad ages
/// and crime codes become `None` and are dropped later by the aggregations.
pub fn normalize_incidents(mut raw: RawTable) -> Result<IncidentTable> {
    rename_incident_columns(&mut raw.headers);
    let cols = IncidentColumns::resolve(&raw)?;

    let optional_text = |row: usize, col: Option<usize>| col.and_then(|c| parse_text(raw.cell(row, c)));
    let optional_int = |row: usize, col: Option<usize>| col.and_then(|c| parse_int(raw.cell(row, c)));

    let mut incidents = Vec::with_capacity(raw.len());
    let mut bad_ages = 0usize;
    for row in 0..raw.len() {
        let age_text = raw.cell(row, cols.victim_age).trim();
        let victim_age = parse_int(age_text).and_then(|a| i32::try_from(a).ok());
        if victim_age.is_none() && !age_text.is_empty() {
            bad_ages += 1;
        }

        let incident = Incident {
            record_id: optional_text(row, cols.record_id),
            reported_at: parse_date_time(
                raw.cell(row, cols.date_reported),
                row,
                schema::DATE_REPORTED,
            )?,
            time_of_day: parse_time_of_day(
                raw.cell(row, cols.time_occurred),
                row,
                schema::TIME_OCCURRED,
            )?,
            area_name: raw.cell(row, cols.area_name).trim().to_string(),
            district_no: optional_int(row, cols.district_no),
            crime_code: parse_int(raw.cell(row, cols.crime_code)),
            crime_description: optional_text(row, cols.crime_description),
            mo_codes: cols
                .mo_codes
                .map(|c| raw.cell(row, c).split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            premises_code: optional_int(row, cols.premises_code),
            premises_description: optional_text(row, cols.premises_description),
            weapon_code: optional_int(row, cols.weapon_code),
            victim_age,
            victim_sex: VictimSex::from_code(raw.cell(row, cols.victim_sex)),
            ..Incident::default()
        }
        .with_occurred_at(parse_date_time(
            raw.cell(row, cols.date_occurred),
            row,
            schema::DATE_OCCURRED,
        )?);

        incidents.push(incident);
    }

    if bad_ages > 0 {
        debug!("{bad_ages} incident rows have a non-numeric victim age");
    }
    info!("Normalized {} incident rows", incidents.len());

    Ok(IncidentTable {
        incidents,
        column_names: raw.headers,
    })
}

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Build the crime-code lookup. Rows whose code is not an integer are
/// skipped; for duplicate codes the first row wins.
pub fn normalize_crime_codes(raw: &RawTable) -> Result<CrimeCodeTable> {
    let code_col = raw.require(schema::LOOKUP_CODE)?;
    let desc_col = raw.require(schema::LOOKUP_DESCRIPTION)?;
    let category_col = raw.column_index(schema::LOOKUP_CATEGORY);

    let mut entries = Vec::with_capacity(raw.len());
    for row in 0..raw.len() {
        let Some(code) = parse_int(raw.cell(row, code_col)) else {
            warn!(
                "Skipping crime code row {row}: '{}' is not a code",
                raw.cell(row, code_col)
            );
            continue;
        };
        entries.push(CrimeCode {
            code,
            description: raw.cell(row, desc_col).trim().to_string(),
            category: category_col.and_then(|c| parse_text(raw.cell(row, c))),
        });
    }

    let (table, duplicates) = CrimeCodeTable::from_entries(entries);
    if !duplicates.is_empty() {
        warn!("Crime code lookup repeats codes {duplicates:?}; keeping first entries");
    }
    Ok(table)
}

pub fn normalize_mo_codes(raw: &RawTable) -> Result<MoCodeTable> {
    let code_col = raw.require(schema::LOOKUP_CODE)?;
    let desc_col = raw.require(schema::LOOKUP_DESCRIPTION)?;

    let mut table = MoCodeTable::default();
    for row in 0..raw.len() {
        if let Some(code) = parse_text(raw.cell(row, code_col)) {
            table.insert(code, raw.cell(row, desc_col).trim());
        }
    }
    Ok(table)
}

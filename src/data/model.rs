use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

use crate::error::{CrimeStatsError, Result};

// ---------------------------------------------------------------------------
// RawTable – a delimited table as read from disk
// ---------------------------------------------------------------------------

/// A loaded table before any schema is applied: normalized headers and
/// string cells. Short rows read as empty cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Table label used in error messages (`incidents`, `crime codes`, …).
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Position of a column by exact (normalized) name.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Position of a column the schema cannot do without.
    pub fn require(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| CrimeStatsError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Cell text at `row`/`col`, empty when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// VictimSex
// ---------------------------------------------------------------------------

/// Victim sex code. Declaration order gives the report order (F before M).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VictimSex {
    Female,
    Male,
    /// Any other non-empty code (`X`, `H`, …).
    Other(String),
}

impl VictimSex {
    /// Parse a sex code; blank text is a missing value. Only the exact
    /// codes `M` and `F` map to the binary variants, so `"M "` is `Other`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "F" => Some(VictimSex::Female),
            "M" => Some(VictimSex::Male),
            other if other.trim().is_empty() => None,
            other => Some(VictimSex::Other(other.to_string())),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            VictimSex::Female => "F",
            VictimSex::Male => "M",
            VictimSex::Other(code) => code,
        }
    }

    /// Only `M` and `F` take part in the demographic breakdown.
    pub fn is_binary(&self) -> bool {
        matches!(self, VictimSex::Female | VictimSex::Male)
    }
}

impl fmt::Display for VictimSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for VictimSex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// AgeBucket
// ---------------------------------------------------------------------------

/// Victim age partitioned into half-open ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBucket {
    /// `[1, 18)`
    Adolescent,
    /// `[18, 22)`
    YoungAdult,
    /// `[22, 60)`
    Adult,
    /// `[60, ∞)`
    Senior,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::Adolescent,
        AgeBucket::YoungAdult,
        AgeBucket::Adult,
        AgeBucket::Senior,
    ];

    /// Lower bounds of each bucket, in `ALL` order.
    const LOWER_BOUNDS: [i32; 4] = [1, 18, 22, 60];

    /// Bucket for an age, or `None` when the age is below 1.
    pub fn from_age(age: i32) -> Option<Self> {
        Self::LOWER_BOUNDS
            .iter()
            .zip(Self::ALL)
            .rev()
            .find(|(lower, _)| age >= **lower)
            .map(|(_, bucket)| bucket)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Adolescent => "Adolescent",
            AgeBucket::YoungAdult => "Young Adult",
            AgeBucket::Adult => "Adult",
            AgeBucket::Senior => "Senior",
        }
    }

    /// Position in `ALL`, used to index pivoted columns.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for AgeBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Incident – one row of the incident table
// ---------------------------------------------------------------------------

/// One reported crime after normalization.
#[derive(Debug, Clone, Default)]
pub struct Incident {
    pub record_id: Option<String>,
    pub reported_at: Option<NaiveDateTime>,
    pub occurred_at: Option<NaiveDateTime>,
    pub time_of_day: Option<NaiveTime>,
    /// Derived from `occurred_at`.
    pub year: Option<i32>,
    pub area_name: String,
    pub district_no: Option<i64>,
    pub crime_code: Option<i64>,
    pub crime_description: Option<String>,
    pub mo_codes: Vec<String>,
    pub premises_code: Option<i64>,
    pub premises_description: Option<String>,
    pub weapon_code: Option<i64>,
    pub victim_age: Option<i32>,
    pub victim_sex: Option<VictimSex>,
}

impl Incident {
    /// Set the occurrence date and keep the derived year in step.
    pub fn with_occurred_at(mut self, occurred_at: Option<NaiveDateTime>) -> Self {
        self.occurred_at = occurred_at;
        self.year = occurred_at.map(|dt| dt.year());
        self
    }

    pub fn age_bucket(&self) -> Option<AgeBucket> {
        self.victim_age.and_then(AgeBucket::from_age)
    }
}

/// The normalized incident table.
#[derive(Debug, Clone, Default)]
pub struct IncidentTable {
    pub incidents: Vec<Incident>,
    /// Canonical column names the table was built from.
    pub column_names: Vec<String>,
}

impl IncidentTable {
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// One entry of the crime-code lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrimeCode {
    pub code: i64,
    pub description: String,
    pub category: Option<String>,
}

/// Crime code → description and category. Partial: not every incident code
/// has an entry.
#[derive(Debug, Clone, Default)]
pub struct CrimeCodeTable {
    entries: Vec<CrimeCode>,
    index: HashMap<i64, usize>,
}

impl CrimeCodeTable {
    /// Build the table; later duplicates of a code are ignored and returned
    /// so the caller can report them.
    pub fn from_entries(entries: Vec<CrimeCode>) -> (Self, Vec<i64>) {
        let mut table = CrimeCodeTable::default();
        let mut duplicates = Vec::new();
        for entry in entries {
            if table.index.contains_key(&entry.code) {
                duplicates.push(entry.code);
                continue;
            }
            table.index.insert(entry.code, table.entries.len());
            table.entries.push(entry);
        }
        (table, duplicates)
    }

    pub fn get(&self, code: i64) -> Option<&CrimeCode> {
        self.index.get(&code).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CrimeCode] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// MO code → description. Reference data only.
#[derive(Debug, Clone, Default)]
pub struct MoCodeTable {
    descriptions: BTreeMap<String, String>,
}

impl MoCodeTable {
    pub fn insert(&mut self, code: impl Into<String>, description: impl Into<String>) {
        self.descriptions
            .entry(code.into())
            .or_insert_with(|| description.into());
    }

    /// Description for a code as it appears in an incident's MO list.
    /// Lookups written without leading zeros (`100` for `0100`) also match.
    pub fn describe(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        self.descriptions
            .get(code)
            .or_else(|| self.descriptions.get(code.trim_start_matches('0')))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

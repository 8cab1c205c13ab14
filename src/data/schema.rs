//! Column naming: header clean-up, the canonical rename table and the
//! explicit column lists each table is validated against.

/// Report and occurrence date-time format, e.g. `03/01/2020 12:00:00 AM`.
pub const DATE_TIME_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Time-of-day format after zero-padding to four digits, e.g. `0930`.
pub const TIME_OF_DAY_FORMAT: &str = "%H%M";

// Canonical incident columns.
pub const RECORD_ID: &str = "DR_NO";
pub const DATE_REPORTED: &str = "Date_Rptd";
pub const DATE_OCCURRED: &str = "DATE_OCC";
pub const TIME_OCCURRED: &str = "TIME_OCC";
pub const AREA_NAME: &str = "AREA_NAME";
pub const DISTRICT_NO: &str = "District_No";
pub const CRIME_CODE: &str = "Crime_Code";
pub const CRIME_CODE_DESC: &str = "Crime_Code_Desc";
pub const MO_CODES: &str = "MO_Codes";
pub const PREMISES_CODE: &str = "Premisis_Code";
pub const PREMISES_DESC: &str = "Premisis_Desc";
pub const WEAPON_CODE: &str = "Weapon_Code";
pub const VICTIM_AGE: &str = "Vict_Age";
pub const VICTIM_SEX: &str = "Vict_Sex";

// Lookup columns.
pub const LOOKUP_CODE: &str = "Code";
pub const LOOKUP_DESCRIPTION: &str = "Description";
pub const LOOKUP_CATEGORY: &str = "Category";

/// Source name → canonical name for the incident table.
pub const INCIDENT_RENAMES: [(&str, &str); 7] = [
    ("Rpt_Dist_No", DISTRICT_NO),
    ("Crm_Cd", CRIME_CODE),
    ("Crm_Cd_Desc", CRIME_CODE_DESC),
    ("Mocodes", MO_CODES),
    ("Premis_Cd", PREMISES_CODE),
    ("Premis_Desc", PREMISES_DESC),
    ("Weapon_Used_Cd", WEAPON_CODE),
];

/// Columns the incident schema cannot do without.
pub const INCIDENT_REQUIRED: [&str; 7] = [
    DATE_REPORTED,
    DATE_OCCURRED,
    TIME_OCCURRED,
    AREA_NAME,
    CRIME_CODE,
    VICTIM_AGE,
    VICTIM_SEX,
];

/// Columns carried when present.
pub const INCIDENT_OPTIONAL: [&str; 7] = [
    RECORD_ID,
    DISTRICT_NO,
    CRIME_CODE_DESC,
    MO_CODES,
    PREMISES_CODE,
    PREMISES_DESC,
    WEAPON_CODE,
];

/// Trim a header and join its words with underscores:
/// `" Rpt Dist No "` → `"Rpt_Dist_No"`.
pub fn normalize_header(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Canonical name for a (normalized) incident header.
pub fn canonical_incident_column(name: &str) -> &str {
    INCIDENT_RENAMES
        .iter()
        .find(|(source, _)| *source == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Apply the rename table to every incident header in place.
pub fn rename_incident_columns(headers: &mut [String]) {
    for header in headers.iter_mut() {
        if let Some((_, canonical)) = INCIDENT_RENAMES
            .iter()
            .find(|(source, _)| *source == header.as_str())
        {
            *header = canonical.to_string();
        }
    }
}

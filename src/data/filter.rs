use std::collections::BTreeSet;

use super::model::{AgeBucket, Incident, IncidentTable, VictimSex};

// ---------------------------------------------------------------------------
// Row predicates for the demographic breakdown
// ---------------------------------------------------------------------------

/// Set of area names an aggregation is restricted to.
pub type AreaSelection = BTreeSet<String>;

/// An incident that passed the demographic filter, with its keys resolved.
#[derive(Debug, Clone, Copy)]
pub struct DemographicRow<'a> {
    pub incident: &'a Incident,
    pub sex: &'a VictimSex,
    pub bucket: AgeBucket,
}

impl<'a> DemographicRow<'a> {
    pub fn area(&self) -> &'a str {
        &self.incident.area_name
    }
}

/// Resolve the demographic keys of an incident.
///
/// A row passes when:
/// * the victim sex is `M` or `F`
/// * the victim age falls into an [`AgeBucket`]
/// * the area name is not blank
fn demographic_row(incident: &Incident) -> Option<DemographicRow<'_>> {
    if incident.area_name.is_empty() {
        return None;
    }
    let sex = incident.victim_sex.as_ref().filter(|s| s.is_binary())?;
    let bucket = incident.age_bucket()?;
    Some(DemographicRow {
        incident,
        sex,
        bucket,
    })
}

/// All incidents eligible for the demographic breakdown, in table order.
pub fn demographic_rows(table: &IncidentTable) -> Vec<DemographicRow<'_>> {
    table.incidents.iter().filter_map(demographic_row).collect()
}

/// Restrict rows to the selected areas. An empty selection keeps nothing.
pub fn in_areas<'a>(rows: &[DemographicRow<'a>], areas: &AreaSelection) -> Vec<DemographicRow<'a>> {
    rows.iter()
        .filter(|row| areas.contains(row.area()))
        .copied()
        .collect()
}

//! Crime-code join and the most frequent crime types.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::data::model::{CrimeCode, CrimeCodeTable, Incident, IncidentTable};

/// An incident paired with its lookup entry; `None` when the code is absent
/// from the lookup or the incident has no code.
#[derive(Debug, Clone, Copy)]
pub struct JoinedIncident<'a> {
    pub incident: &'a Incident,
    pub crime_code: Option<&'a CrimeCode>,
}

/// One row of the crime-type ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrimeTypeCount {
    pub code: i64,
    pub description: String,
    pub category: Option<String>,
    pub instances: u64,
}

/// Left join of incidents to the crime-code lookup. Every incident is kept.
pub fn left_join<'a>(table: &'a IncidentTable, codes: &'a CrimeCodeTable) -> Vec<JoinedIncident<'a>> {
    let joined: Vec<JoinedIncident<'a>> = table
        .incidents
        .iter()
        .map(|incident| JoinedIncident {
            incident,
            crime_code: incident.crime_code.and_then(|code| codes.get(code)),
        })
        .collect();

    let unmatched = joined.iter().filter(|j| j.crime_code.is_none()).count();
    debug!(
        "Crime code join: {} matched, {unmatched} unmatched",
        joined.len() - unmatched
    );
    joined
}

/// The `n` most frequent crime codes that have a lookup entry.
///
/// Sorted by count descending, ties by code ascending. Incidents whose code
/// has no lookup entry are not ranked.
pub fn top_crime_types(table: &IncidentTable, codes: &CrimeCodeTable, n: usize) -> Vec<CrimeTypeCount> {
    let mut counts: HashMap<i64, (&CrimeCode, u64)> = HashMap::new();
    for joined in left_join(table, codes) {
        if let Some(entry) = joined.crime_code {
            counts.entry(entry.code).or_insert((entry, 0)).1 += 1;
        }
    }

    let mut ranked: Vec<(&CrimeCode, u64)> = counts.into_values().collect();
    ranked.sort_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then(a.code.cmp(&b.code)));
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(entry, instances)| CrimeTypeCount {
            code: entry.code,
            description: entry.description.clone(),
            category: entry.category.clone(),
            instances,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(codes: &[(i64, &str)]) -> CrimeCodeTable {
        CrimeCodeTable::from_entries(
            codes
                .iter()
                .map(|&(code, desc)| CrimeCode {
                    code,
                    description: desc.to_string(),
                    category: Some("Theft".to_string()),
                })
                .collect(),
        )
        .0
    }

    fn incidents(codes: &[Option<i64>]) -> IncidentTable {
        IncidentTable {
            incidents: codes
                .iter()
                .map(|&crime_code| Incident {
                    crime_code,
                    ..Incident::default()
                })
                .collect(),
            column_names: vec![],
        }
    }

    #[test]
    fn test_left_join_keeps_unmatched_rows() {
        let codes = lookup(&[(510, "VEHICLE - STOLEN")]);
        let table = incidents(&[Some(510), Some(999), None]);
        let joined = left_join(&table, &codes);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0].crime_code.map(|c| c.code), Some(510));
        assert!(joined[1].crime_code.is_none());
        assert!(joined[2].crime_code.is_none());
    }

    #[test]
    fn test_ranking_excludes_unmatched_codes() {
        let codes = lookup(&[(510, "VEHICLE - STOLEN"), (624, "BATTERY")]);
        let table = incidents(&[Some(999), Some(999), Some(999), Some(510), Some(624), Some(624)]);
        let top = top_crime_types(&table, &codes, 10);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].code, top[0].instances), (624, 2));
        assert_eq!((top[1].code, top[1].instances), (510, 1));
        assert_eq!(top[1].description, "VEHICLE - STOLEN");
        assert_eq!(top[1].category.as_deref(), Some("Theft"));
    }

    #[test]
    fn test_ties_break_by_code_ascending() {
        let codes = lookup(&[(330, "BURGLARY FROM VEHICLE"), (230, "ASSAULT"), (510, "VEHICLE - STOLEN")]);
        let table = incidents(&[Some(510), Some(330), Some(230), Some(330), Some(230)]);
        let top = top_crime_types(&table, &codes, 10);
        let order: Vec<i64> = top.iter().map(|t| t.code).collect();
        assert_eq!(order, vec![230, 330, 510]);
    }

    #[test]
    fn test_top_n_limits_and_orders() {
        let entries: Vec<(i64, String)> = (1..=15).map(|c| (c, format!("crime {c}"))).collect();
        let codes = lookup(&entries.iter().map(|(c, d)| (*c, d.as_str())).collect::<Vec<_>>());
        let mut rows = Vec::new();
        for code in 1..=15i64 {
            for _ in 0..code {
                rows.push(Some(code));
            }
        }
        let top = top_crime_types(&incidents(&rows), &codes, 10);

        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].instances >= w[1].instances));
        assert!(top.iter().all(|t| !t.description.is_empty()));
        assert_eq!(top[0].code, 15);
        assert_eq!(top[9].code, 6);
    }
}

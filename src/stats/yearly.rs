//! Incident counts per occurrence year.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

use crate::config::YearCutoff;
use crate::data::model::IncidentTable;

/// Number of incidents that occurred in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

/// Count incidents per occurrence year, ascending, then apply `cutoff`.
///
/// Rows without an occurrence date are not counted. With
/// [`YearCutoff::DropLatest`] the last entry in sorted order is removed,
/// whatever its value, so a gap in the years does not change which one goes.
pub fn yearly_counts(table: &IncidentTable, cutoff: YearCutoff) -> Vec<YearCount> {
    let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
    let mut undated = 0u64;
    for incident in &table.incidents {
        match incident.year {
            Some(year) => *by_year.entry(year).or_default() += 1,
            None => undated += 1,
        }
    }
    if undated > 0 {
        debug!("{undated} incidents have no occurrence date");
    }

    let mut counts: Vec<YearCount> = by_year
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect();

    match cutoff {
        YearCutoff::DropLatest => {
            if let Some(dropped) = counts.pop() {
                info!(
                    "Dropping {} ({} incidents) as the incomplete latest year",
                    dropped.year, dropped.count
                );
            }
        }
        YearCutoff::Before(limit) => counts.retain(|c| c.year < limit),
        YearCutoff::KeepAll => {}
    }
    counts
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::Incident;

    fn table(years: &[i32]) -> IncidentTable {
        IncidentTable {
            incidents: years
                .iter()
                .map(|&y| {
                    let dt = NaiveDate::from_ymd_opt(y, 6, 1)
                        .unwrap()
                        .and_hms_opt(12, 0, 0)
                        .unwrap();
                    Incident::default().with_occurred_at(Some(dt))
                })
                .collect(),
            column_names: vec![],
        }
    }

    fn pairs(counts: &[YearCount]) -> Vec<(i32, u64)> {
        counts.iter().map(|c| (c.year, c.count)).collect()
    }

    #[test]
    fn test_drops_latest_year() {
        let counts = yearly_counts(&table(&[2020, 2021, 2022, 2022]), YearCutoff::DropLatest);
        assert_eq!(pairs(&counts), vec![(2020, 1), (2021, 1)]);
    }

    #[test]
    fn test_drop_latest_is_by_sort_order_with_gaps() {
        let counts = yearly_counts(&table(&[2024, 2019, 2019, 2021]), YearCutoff::DropLatest);
        assert_eq!(pairs(&counts), vec![(2019, 2), (2021, 1)]);
    }

    #[test]
    fn test_counts_match_source_rows_per_year() {
        let years = [2020, 2020, 2021, 2020, 2023, 2021, 2023, 2023, 2025];
        let counts = yearly_counts(&table(&years), YearCutoff::DropLatest);
        for c in &counts {
            let expected = years.iter().filter(|&&y| y == c.year).count() as u64;
            assert_eq!(c.count, expected);
        }
        assert!(counts.iter().all(|c| c.year != 2025));
        assert!(counts.windows(2).all(|w| w[0].year < w[1].year));
    }

    #[test]
    fn test_explicit_cutoff_year() {
        let counts = yearly_counts(&table(&[2020, 2021, 2022]), YearCutoff::Before(2022));
        assert_eq!(pairs(&counts), vec![(2020, 1), (2021, 1)]);
        let counts = yearly_counts(&table(&[2020, 2021]), YearCutoff::Before(2025));
        assert_eq!(pairs(&counts), vec![(2020, 1), (2021, 1)]);
    }

    #[test]
    fn test_keep_all_and_undated_rows() {
        let mut t = table(&[2020, 2021]);
        t.incidents.push(Incident::default());
        let counts = yearly_counts(&t, YearCutoff::KeepAll);
        assert_eq!(pairs(&counts), vec![(2020, 1), (2021, 1)]);
    }

    #[test]
    fn test_empty_table() {
        assert!(yearly_counts(&IncidentTable::default(), YearCutoff::DropLatest).is_empty());
    }
}

//! Victim breakdown by area, sex and age bucket.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Serialize;

use crate::data::filter::{demographic_rows, in_areas, AreaSelection, DemographicRow};
use crate::data::model::{AgeBucket, IncidentTable, VictimSex};

/// Incidents for one (area, sex, age bucket) group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemographicCount {
    pub area: String,
    pub sex: VictimSex,
    pub bucket: AgeBucket,
    pub incidents: u64,
}

/// Age-bucket percentages for one (area, sex) pair; `shares` is indexed in
/// [`AgeBucket::ALL`] order and sums to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeShareRow {
    pub area: String,
    pub sex: VictimSex,
    pub shares: [f64; 4],
}

impl AgeShareRow {
    pub fn share(&self, bucket: AgeBucket) -> f64 {
        self.shares[bucket.index()]
    }
}

/// Incident counts for one (area, age bucket) pair with one column per sex.
/// A missing cell means no incidents of that sex in the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SexPivotRow {
    pub area: String,
    pub bucket: AgeBucket,
    pub female: Option<u64>,
    pub male: Option<u64>,
}

/// Area with its number of demographically eligible incidents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaCount {
    pub area: String,
    pub incidents: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicBreakdown {
    /// All (area, sex, bucket) groups, sorted by area, sex, bucket.
    pub counts: Vec<DemographicCount>,
    /// `counts` pivoted to (area, bucket) × sex.
    pub sex_pivot: Vec<SexPivotRow>,
    /// Most frequent areas, count descending, ties by name.
    pub top_areas: Vec<AreaCount>,
    /// Age-bucket percentages for the top areas, sorted by area and sex.
    pub age_shares: Vec<AgeShareRow>,
}

type GroupKey<'a> = (&'a str, &'a VictimSex, AgeBucket);

fn group_counts<'a>(rows: &[DemographicRow<'a>]) -> BTreeMap<GroupKey<'a>, u64> {
    let mut groups = BTreeMap::new();
    for row in rows {
        *groups.entry((row.area(), row.sex, row.bucket)).or_default() += 1;
    }
    groups
}

/// The `n` areas with the most rows; ties resolve by area name.
fn most_frequent_areas(rows: &[DemographicRow<'_>], n: usize) -> Vec<AreaCount> {
    let mut by_area: HashMap<&str, u64> = HashMap::new();
    for row in rows {
        *by_area.entry(row.area()).or_default() += 1;
    }
    let mut areas: Vec<AreaCount> = by_area
        .into_iter()
        .map(|(area, incidents)| AreaCount {
            area: area.to_string(),
            incidents,
        })
        .collect();
    areas.sort_by(|a, b| b.incidents.cmp(&a.incidents).then_with(|| a.area.cmp(&b.area)));
    areas.truncate(n);
    areas
}

fn sex_pivot(groups: &BTreeMap<GroupKey<'_>, u64>) -> Vec<SexPivotRow> {
    let mut pivot: BTreeMap<(&str, AgeBucket), SexPivotRow> = BTreeMap::new();
    for (&(area, sex, bucket), &count) in groups {
        let row = pivot.entry((area, bucket)).or_insert_with(|| SexPivotRow {
            area: area.to_string(),
            bucket,
            female: None,
            male: None,
        });
        match sex {
            VictimSex::Female => row.female = Some(count),
            VictimSex::Male => row.male = Some(count),
            VictimSex::Other(_) => {}
        }
    }
    pivot.into_values().collect()
}

fn age_shares(groups: &BTreeMap<GroupKey<'_>, u64>) -> Vec<AgeShareRow> {
    let mut per_pair: BTreeMap<(&str, &VictimSex), [u64; 4]> = BTreeMap::new();
    for (&(area, sex, bucket), &count) in groups {
        per_pair.entry((area, sex)).or_default()[bucket.index()] += count;
    }

    per_pair
        .into_iter()
        .map(|((area, sex), counts)| {
            let total: u64 = counts.iter().sum();
            let shares = counts.map(|c| c as f64 / total as f64 * 100.0);
            AgeShareRow {
                area: area.to_string(),
                sex: sex.clone(),
                shares,
            }
        })
        .collect()
}

/// Break eligible incidents down by area, victim sex and age bucket, and
/// compute age-bucket percentages for the `top_areas` most frequent areas.
///
/// Only victims recorded as `M` or `F` with an age of at least 1 are counted.
pub fn demographic_breakdown(table: &IncidentTable, top_areas: usize) -> DemographicBreakdown {
    let rows = demographic_rows(table);
    debug!(
        "Demographic breakdown over {} of {} incidents",
        rows.len(),
        table.len()
    );

    let groups = group_counts(&rows);
    let counts = groups
        .iter()
        .map(|(&(area, sex, bucket), &incidents)| DemographicCount {
            area: area.to_string(),
            sex: sex.clone(),
            bucket,
            incidents,
        })
        .collect();

    let top = most_frequent_areas(&rows, top_areas);
    let selection: AreaSelection = top.iter().map(|a| a.area.clone()).collect();
    let top_groups = group_counts(&in_areas(&rows, &selection));

    DemographicBreakdown {
        counts,
        sex_pivot: sex_pivot(&groups),
        top_areas: top,
        age_shares: age_shares(&top_groups),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Incident;

    fn table(rows: &[(&str, &str, i32)]) -> IncidentTable {
        IncidentTable {
            incidents: rows
                .iter()
                .map(|&(area, sex, age)| Incident {
                    area_name: area.to_string(),
                    victim_sex: VictimSex::from_code(sex),
                    victim_age: Some(age),
                    ..Incident::default()
                })
                .collect(),
            column_names: vec![],
        }
    }

    #[test]
    fn test_counts_group_and_sort() {
        let t = table(&[
            ("Newton", "M", 30),
            ("Central", "M", 30),
            ("Central", "F", 19),
            ("Central", "M", 45),
            ("Central", "X", 45),
            ("Central", "M", 0),
        ]);
        let breakdown = demographic_breakdown(&t, 5);
        let keys: Vec<(&str, &str, AgeBucket, u64)> = breakdown
            .counts
            .iter()
            .map(|c| (c.area.as_str(), c.sex.code(), c.bucket, c.incidents))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Central", "F", AgeBucket::YoungAdult, 1),
                ("Central", "M", AgeBucket::Adult, 2),
                ("Newton", "M", AgeBucket::Adult, 1),
            ]
        );
    }

    #[test]
    fn test_age_shares_sum_to_hundred() {
        let t = table(&[
            ("Central", "M", 10),
            ("Central", "M", 19),
            ("Central", "M", 30),
            ("Central", "F", 70),
            ("Central", "F", 30),
            ("Central", "F", 30),
            ("Newton", "F", 5),
        ]);
        let breakdown = demographic_breakdown(&t, 5);
        assert_eq!(breakdown.age_shares.len(), 3);
        for row in &breakdown.age_shares {
            let sum: f64 = row.shares.iter().sum();
            assert!((sum - 100.0).abs() < 0.01, "{} {} sums to {sum}", row.area, row.sex);
        }

        let central_f = &breakdown.age_shares[0];
        assert_eq!((central_f.area.as_str(), central_f.sex.code()), ("Central", "F"));
        assert!((central_f.share(AgeBucket::Adult) - 200.0 / 3.0).abs() < 1e-9);
        assert!((central_f.share(AgeBucket::Senior) - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(central_f.share(AgeBucket::Adolescent), 0.0);
    }

    #[test]
    fn test_age_shares_limited_to_top_areas() {
        let mut rows = Vec::new();
        for (i, area) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
            for _ in 0..(10 - i) {
                rows.push((*area, "M", 30));
            }
        }
        let breakdown = demographic_breakdown(&table(&rows), 5);
        let areas: Vec<&str> = breakdown.top_areas.iter().map(|a| a.area.as_str()).collect();
        assert_eq!(areas, vec!["A", "B", "C", "D", "E"]);
        assert!(breakdown.age_shares.iter().all(|r| r.area != "F"));
        assert!(breakdown.counts.iter().any(|c| c.area == "F"));
    }

    #[test]
    fn test_top_area_ties_break_by_name() {
        let t = table(&[("Zed", "M", 30), ("Alpha", "F", 30), ("Mid", "F", 30)]);
        let breakdown = demographic_breakdown(&t, 2);
        let areas: Vec<&str> = breakdown.top_areas.iter().map(|a| a.area.as_str()).collect();
        assert_eq!(areas, vec!["Alpha", "Mid"]);
    }

    #[test]
    fn test_blank_area_is_not_ranked() {
        let t = table(&[("", "M", 30), ("", "M", 30), ("Central", "M", 30), ("Central", " F", 30)]);
        let breakdown = demographic_breakdown(&t, 5);
        let counts: Vec<(&str, u64)> = breakdown
            .counts
            .iter()
            .map(|c| (c.area.as_str(), c.incidents))
            .collect();
        assert_eq!(counts, vec![("Central", 1)]);
        let areas: Vec<&str> = breakdown.top_areas.iter().map(|a| a.area.as_str()).collect();
        assert_eq!(areas, vec!["Central"]);
        assert!(breakdown.age_shares.iter().all(|r| !r.area.is_empty()));
        assert!(breakdown.sex_pivot.iter().all(|r| !r.area.is_empty()));
    }

    #[test]
    fn test_sex_pivot_marks_missing_cells() {
        let t = table(&[("Central", "M", 30), ("Central", "M", 31), ("Central", "F", 65)]);
        let breakdown = demographic_breakdown(&t, 5);
        assert_eq!(
            breakdown.sex_pivot,
            vec![
                SexPivotRow {
                    area: "Central".into(),
                    bucket: AgeBucket::Adult,
                    female: None,
                    male: Some(2),
                },
                SexPivotRow {
                    area: "Central".into(),
                    bucket: AgeBucket::Senior,
                    female: Some(1),
                    male: None,
                },
            ]
        );
    }

    #[test]
    fn test_no_eligible_rows() {
        let breakdown = demographic_breakdown(&table(&[("Central", "X", 30)]), 5);
        assert!(breakdown.counts.is_empty());
        assert!(breakdown.top_areas.is_empty());
        assert!(breakdown.age_shares.is_empty());
    }
}

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crime_stats::config::{PipelineConfig, SourcePaths, YearCutoff};
use crime_stats::data::model::AgeBucket;
use crime_stats::{pipeline, report, CrimeStatsError};
use zip::write::SimpleFileOptions;

const INCIDENT_HEADER: &str = "DR_NO,Date Rptd,DATE OCC,TIME OCC,AREA,AREA NAME,Rpt Dist No,Crm Cd,Crm Cd Desc,Mocodes,Vict Age,Vict Sex,Premis Cd,Premis Desc,Weapon Used Cd";

fn incident(id: u32, year: i32, area: &str, code: i64, age: &str, sex: &str) -> String {
    format!(
        "{id},01/05/{year} 12:00:00 AM,01/03/{year} 12:00:00 AM,930,01,{area},0101,{code},DESC,0444 0913,{age},{sex},101,STREET,"
    )
}

fn write_data_dir(dir: &Path, incident_rows: &[String]) {
    std::fs::write(
        dir.join("Crime_Codes.csv"),
        "Code,Description,Category\n510,VEHICLE - STOLEN,Theft\n624,BATTERY - SIMPLE ASSAULT,Assault\n330,BURGLARY FROM VEHICLE,Burglary\n",
    )
    .unwrap();
    std::fs::write(dir.join("MO_Codes.csv"), "Code,Description\n0444,Pushed\n0913,Victim knew suspect\n").unwrap();

    let mut body = String::from(INCIDENT_HEADER);
    body.push('\n');
    for row in incident_rows {
        body.push_str(row);
        body.push('\n');
    }
    let mut zip = zip::ZipWriter::new(File::create(dir.join("Crime_Data_from_2020_to_Present.zip")).unwrap());
    zip.start_file("Crime_Data_from_2020_to_Present.csv", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(body.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[test]
fn test_end_to_end_drops_latest_year() {
    let dir = tempfile::tempdir().unwrap();
    write_data_dir(
        dir.path(),
        &[
            incident(1, 2020, "Central", 510, "30", "M"),
            incident(2, 2021, "Central", 624, "19", "F"),
            incident(3, 2022, "Newton", 510, "70", "F"),
            incident(4, 2022, "Newton", 999, "0", "X"),
        ],
    );

    let config = PipelineConfig::new(SourcePaths::in_dir(dir.path()));
    let analysis = pipeline::run(&config).unwrap();

    assert_eq!(analysis.total_incidents, 4);
    let years: Vec<(i32, u64)> = analysis.yearly.iter().map(|y| (y.year, y.count)).collect();
    assert_eq!(years, vec![(2020, 1), (2021, 1)]);

    let codes: Vec<(i64, u64)> = analysis
        .top_crime_types
        .iter()
        .map(|t| (t.code, t.instances))
        .collect();
    assert_eq!(codes, vec![(510, 2), (624, 1)]);
    assert_eq!(analysis.top_crime_types[0].category.as_deref(), Some("Theft"));

    let demographics = &analysis.demographics;
    assert_eq!(demographics.counts.len(), 3);
    for row in &demographics.age_shares {
        let sum: f64 = row.shares.iter().sum();
        assert!((sum - 100.0).abs() < 0.01);
    }
    let newton = demographics
        .age_shares
        .iter()
        .find(|r| r.area == "Newton")
        .unwrap();
    assert_eq!(newton.share(AgeBucket::Senior), 100.0);

    let tables = report::render_tables(&analysis).unwrap();
    assert!(tables.contains("VEHICLE - STOLEN"));
    let json = report::render_json(&analysis).unwrap();
    assert!(json.contains("\"year\": 2020"));
}

#[test]
fn test_explicit_cutoff_keeps_complete_years() {
    let dir = tempfile::tempdir().unwrap();
    write_data_dir(
        dir.path(),
        &[
            incident(1, 2019, "Central", 510, "30", "M"),
            incident(2, 2021, "Central", 510, "30", "M"),
            incident(3, 2021, "Central", 330, "30", "M"),
        ],
    );

    let mut config = PipelineConfig::new(SourcePaths::in_dir(dir.path()));
    config.year_cutoff = YearCutoff::Before(2030);
    let analysis = pipeline::run(&config).unwrap();
    let years: Vec<(i32, u64)> = analysis.yearly.iter().map(|y| (y.year, y.count)).collect();
    assert_eq!(years, vec![(2019, 1), (2021, 2)]);
}

#[test]
fn test_malformed_date_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    write_data_dir(
        dir.path(),
        &[
            incident(1, 2020, "Central", 510, "30", "M"),
            "2,2020-01-05,2020-01-03,930,01,Central,0101,510,DESC,,30,M,101,STREET,".to_string(),
        ],
    );

    let config = PipelineConfig::new(SourcePaths::in_dir(dir.path()));
    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, CrimeStatsError::DateParse { row: 1, .. }));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new(SourcePaths::in_dir(dir.path()));
    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, CrimeStatsError::FileRead { .. }));
}

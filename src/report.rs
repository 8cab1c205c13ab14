use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::FormatOptions;
use arrow::util::pretty::pretty_format_batches_with_options;

use crate::data::model::AgeBucket;
use crate::error::Result;
use crate::pipeline::Analysis;
use crate::stats::demographics::{AgeShareRow, DemographicCount, SexPivotRow};
use crate::stats::{CrimeTypeCount, YearCount};

// ---------------------------------------------------------------------------
// Record batches – one per summary table
// ---------------------------------------------------------------------------

pub fn yearly_batch(counts: &[YearCount]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Year", DataType::Int32, false),
        Field::new("Crimes", DataType::UInt64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(counts.iter().map(|c| c.year))),
        Arc::new(UInt64Array::from_iter_values(counts.iter().map(|c| c.count))),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

pub fn crime_types_batch(types: &[CrimeTypeCount]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Crime_Code", DataType::Int64, false),
        Field::new("Description", DataType::Utf8, false),
        Field::new("Category", DataType::Utf8, true),
        Field::new("Instances", DataType::UInt64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(types.iter().map(|t| t.code))),
        Arc::new(StringArray::from_iter_values(types.iter().map(|t| t.description.as_str()))),
        Arc::new(StringArray::from(
            types.iter().map(|t| t.category.as_deref()).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from_iter_values(types.iter().map(|t| t.instances))),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

pub fn demographic_counts_batch(counts: &[DemographicCount]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("AREA_NAME", DataType::Utf8, false),
        Field::new("Vict_Sex", DataType::Utf8, false),
        Field::new("age_group", DataType::Utf8, false),
        Field::new("Incidents", DataType::UInt64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(counts.iter().map(|c| c.area.as_str()))),
        Arc::new(StringArray::from_iter_values(counts.iter().map(|c| c.sex.code()))),
        Arc::new(StringArray::from_iter_values(counts.iter().map(|c| c.bucket.label()))),
        Arc::new(UInt64Array::from_iter_values(counts.iter().map(|c| c.incidents))),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Percentages rounded to two decimals; one column per age bucket.
pub fn age_share_batch(rows: &[AgeShareRow]) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new("AREA_NAME", DataType::Utf8, false),
        Field::new("Vict_Sex", DataType::Utf8, false),
    ];
    fields.extend(
        AgeBucket::ALL
            .iter()
            .map(|b| Field::new(b.label(), DataType::Float64, false)),
    );

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.area.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.sex.code()))),
    ];
    for bucket in AgeBucket::ALL {
        columns.push(Arc::new(Float64Array::from_iter_values(
            rows.iter().map(|r| (r.share(bucket) * 100.0).round() / 100.0),
        )));
    }
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

pub fn sex_pivot_batch(rows: &[SexPivotRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("AREA_NAME", DataType::Utf8, false),
        Field::new("age_group", DataType::Utf8, false),
        Field::new("F", DataType::UInt64, true),
        Field::new("M", DataType::UInt64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.area.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.bucket.label()))),
        Arc::new(UInt64Array::from(rows.iter().map(|r| r.female).collect::<Vec<_>>())),
        Arc::new(UInt64Array::from(rows.iter().map(|r| r.male).collect::<Vec<_>>())),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn section(out: &mut String, title: &str, batch: &RecordBatch) -> Result<()> {
    let options = FormatOptions::default().with_null("N/A");
    let table = pretty_format_batches_with_options(std::slice::from_ref(batch), &options)?;
    out.push_str(title);
    out.push('\n');
    out.push_str(&table.to_string());
    out.push_str("\n\n");
    Ok(())
}

/// All summaries as text tables.
pub fn render_tables(analysis: &Analysis) -> Result<String> {
    let demographics = &analysis.demographics;
    let mut out = format!(
        "{} incidents (year cutoff: {})\n\n",
        analysis.total_incidents, analysis.year_cutoff
    );
    section(&mut out, "Number of Crimes per Year", &yearly_batch(&analysis.yearly)?)?;
    section(
        &mut out,
        "Top Crimes by Count with Category",
        &crime_types_batch(&analysis.top_crime_types)?,
    )?;
    section(
        &mut out,
        "Incidents by Area, Sex and Age Group",
        &demographic_counts_batch(&demographics.counts)?,
    )?;
    section(
        &mut out,
        "Incidents by Area and Age Group per Sex",
        &sex_pivot_batch(&demographics.sex_pivot)?,
    )?;
    section(
        &mut out,
        "Percentage of Crimes by Age Group (top areas)",
        &age_share_batch(&demographics.age_shares)?,
    )?;
    Ok(out)
}

pub fn render_json(analysis: &Analysis) -> Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

#[cfg(test)]
mod tests {
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::UInt64Type;

    use super::*;
    use crate::data::model::VictimSex;

    #[test]
    fn test_crime_types_batch_keeps_null_category() {
        let batch = crime_types_batch(&[
            CrimeTypeCount {
                code: 510,
                description: "VEHICLE - STOLEN".into(),
                category: Some("Theft".into()),
                instances: 12,
            },
            CrimeTypeCount {
                code: 624,
                description: "BATTERY - SIMPLE ASSAULT".into(),
                category: None,
                instances: 7,
            },
        ])
        .unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert!(batch.column(2).is_null(1));
        assert_eq!(batch.column(3).as_primitive::<UInt64Type>().value(0), 12);
    }

    #[test]
    fn test_age_share_batch_has_column_per_bucket() {
        let batch = age_share_batch(&[AgeShareRow {
            area: "Central".into(),
            sex: VictimSex::Male,
            shares: [10.0, 20.0, 200.0 / 3.0, 100.0 / 30.0],
        }])
        .unwrap();
        let names: Vec<String> = batch.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(
            names,
            vec!["AREA_NAME", "Vict_Sex", "Adolescent", "Young Adult", "Adult", "Senior"]
        );
        let adult = batch.column(4).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(adult.value(0), 66.67);
    }

    #[test]
    fn test_sex_pivot_renders_missing_as_na() {
        let analysis_rows = [SexPivotRow {
            area: "Central".into(),
            bucket: AgeBucket::Senior,
            female: Some(3),
            male: None,
        }];
        let mut out = String::new();
        section(&mut out, "pivot", &sex_pivot_batch(&analysis_rows).unwrap()).unwrap();
        assert!(out.contains("N/A"));
        assert!(out.contains("Senior"));
    }

    #[test]
    fn test_yearly_batch() {
        let batch = yearly_batch(&[YearCount { year: 2020, count: 5 }]).unwrap();
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.schema().field(0).name(), "Year");
    }
}

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use zip::write::SimpleFileOptions;

use crime_stats::config::{CRIME_CODES_FILE, INCIDENTS_FILE, MO_CODES_FILE};

/// Write a deterministic synthetic data directory for crime-stats
#[derive(Parser, Debug)]
#[command(name = "generate-sample")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    /// Number of incident rows
    #[arg(long, default_value_t = 5000)]
    rows: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a, T>(&mut self, items: &'a [(T, u64)]) -> &'a T {
        let total: u64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.below(total);
        for (item, weight) in items {
            if roll < *weight {
                return item;
            }
            roll -= weight;
        }
        &items[items.len() - 1].0
    }
}

// (code, description, category); codes 999 and 888 appear in incidents only.
const CRIME_CODES: [(i64, &str, &str); 8] = [
    (510, "VEHICLE - STOLEN", "Theft"),
    (624, "BATTERY - SIMPLE ASSAULT", "Assault"),
    (330, "BURGLARY FROM VEHICLE", "Burglary"),
    (740, "VANDALISM - FELONY", "Vandalism"),
    (310, "BURGLARY", "Burglary"),
    (230, "ASSAULT WITH DEADLY WEAPON", "Assault"),
    (354, "THEFT OF IDENTITY", "Theft"),
    (440, "THEFT PLAIN - PETTY", "Theft"),
];

const MO_CODES: [(&str, &str); 5] = [
    ("0100", "Suspect Impersonate"),
    ("0344", "Removes vict property"),
    ("0416", "Hit-Hit w/ weapon"),
    ("0444", "Pushed"),
    ("1822", "Stranger"),
];

const AREAS: [(&str, u64); 7] = [
    ("Central", 9),
    ("77th Street", 8),
    ("Pacific", 7),
    ("Southwest", 6),
    ("Hollywood", 5),
    ("Newton", 3),
    ("Topanga", 2),
];

const HEADERS: [&str; 15] = [
    "DR_NO",
    "Date Rptd",
    "DATE OCC",
    "TIME OCC",
    "AREA",
    "AREA NAME",
    "Rpt Dist No",
    "Crm Cd",
    "Crm Cd Desc",
    "Mocodes",
    "Vict Age",
    "Vict Sex",
    "Premis Cd",
    "Premis Desc",
    "Weapon Used Cd",
];

fn incident_row(rng: &mut SimpleRng, id: usize) -> Vec<String> {
    let year = *rng.weighted(&[(2020, 20), (2021, 21), (2022, 24), (2023, 22), (2024, 12), (2025, 3)]);
    let month = 1 + rng.below(12);
    let day = 1 + rng.below(28);
    let reported_day = (day + rng.below(3)).min(28);
    let hour = rng.below(24);
    let minute = rng.below(60);

    let area = *rng.weighted(&AREAS);
    let area_idx = AREAS.iter().position(|a| a.0 == area).unwrap_or(0);

    let code_weights = [(510, 30), (624, 22), (330, 18), (740, 12), (310, 10), (230, 8), (354, 6), (440, 6), (999, 5), (888, 3)];
    let code = *rng.weighted(&code_weights);
    let description = CRIME_CODES
        .iter()
        .find(|c| c.0 == code)
        .map(|c| c.1)
        .unwrap_or("OTHER MISCELLANEOUS CRIME");

    let age = match rng.below(20) {
        0 => "0".to_string(),
        1 => "-1".to_string(),
        _ => (2 + rng.below(85)).to_string(),
    };
    let sex = *rng.weighted(&[("M", 45), ("F", 42), ("X", 8), ("", 5)]);
    let mo = (0..1 + rng.below(3))
        .map(|_| MO_CODES[rng.below(MO_CODES.len() as u64) as usize].0)
        .collect::<Vec<_>>()
        .join(" ");
    let weapon = if code == 230 || code == 624 { "400" } else { "" };

    vec![
        format!("{}", 200_000_000 + id),
        format!("{month:02}/{reported_day:02}/{year} 12:00:00 AM"),
        format!("{month:02}/{day:02}/{year} 12:00:00 AM"),
        format!("{}", hour * 100 + minute),
        format!("{:02}", area_idx + 1),
        area.to_string(),
        format!("{:04}", (area_idx + 1) * 100 + rng.below(50) as usize),
        code.to_string(),
        description.to_string(),
        mo,
        age,
        sex.to_string(),
        "101".to_string(),
        "STREET".to_string(),
        weapon.to_string(),
    ]
}

fn write_csv<W: Write>(writer: W, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(headers)?;
    for row in rows {
        csv.write_record(row)?;
    }
    csv.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .map(|h| Field::new(*h, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let columns: Vec<ArrayRef> = (0..HEADERS.len())
        .map(|col| {
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r[col].as_str()))) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let codes: Vec<Vec<String>> = CRIME_CODES
        .iter()
        .map(|(code, desc, cat)| vec![code.to_string(), desc.to_string(), cat.to_string()])
        .collect();
    write_csv(
        File::create(args.out_dir.join(CRIME_CODES_FILE))?,
        &["Code", "Description", "Category"],
        &codes,
    )?;

    let mo: Vec<Vec<String>> = MO_CODES
        .iter()
        .map(|(code, desc)| vec![code.to_string(), desc.to_string()])
        .collect();
    write_csv(
        File::create(args.out_dir.join(MO_CODES_FILE))?,
        &["Code", "Description"],
        &mo,
    )?;

    let rows: Vec<Vec<String>> = (0..args.rows).map(|id| incident_row(&mut rng, id)).collect();

    let zip_path = args.out_dir.join(INCIDENTS_FILE);
    let mut zip = zip::ZipWriter::new(File::create(&zip_path)?);
    zip.start_file("Crime_Data_from_2020_to_Present.csv", SimpleFileOptions::default())?;
    write_csv(&mut zip, &HEADERS, &rows)?;
    zip.finish()?;

    let parquet_path = args.out_dir.join("Crime_Data_from_2020_to_Present.parquet");
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} incidents to {} and {}",
        rows.len(),
        zip_path.display(),
        parquet_path.display()
    );
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic regional coverage table as CSV and Parquet.
#[derive(Debug, Parser)]
struct Args {
    /// Directory the files are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const REGIONS: [&str; 17] = [
    "NCR",
    "CAR",
    "Region I",
    "Region II",
    "Region III",
    "Region IV-A",
    "MIMAROPA",
    "Region V",
    "Region VI",
    "Region VII",
    "Region VIII",
    "Region IX",
    "Region X",
    "Region XI",
    "Region XII",
    "Caraga",
    "BARMM",
];

const ANTIGENS: [&str; 7] = ["BCG", "HepB", "Penta3", "OPV3", "IPV", "MCV1", "MCV2"];
const INDICATORS: [&str; 2] = ["Fully Immunized Child", "Completely Immunized Child"];

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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Default)]
struct Columns {
    region: Vec<String>,
    category: Vec<&'static str>,
    vaccine: Vec<String>,
    rate: Vec<f64>,
}

impl Columns {
    fn push(&mut self, region: &str, category: &'static str, vaccine: &str, rate: f64) {
        self.region.push(region.to_string());
        self.category.push(category);
        self.vaccine.push(vaccine.to_string());
        self.rate.push(rate);
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();
    for region in REGIONS {
        // Target population in thousands
        let population = round1(rng.gauss(120.0, 45.0).max(15.0));
        cols.push(region, "Demographic", "Target Population", population);

        let baseline = rng.gauss(82.0, 8.0);
        for antigen in ANTIGENS {
            let rate = rng.gauss(baseline, 5.0).clamp(20.0, 100.0);
            cols.push(region, "Basic Antigen", antigen, round1(rate));
        }
        for indicator in INDICATORS {
            let rate = rng.gauss(baseline - 8.0, 6.0).clamp(10.0, 100.0);
            cols.push(region, "Summary Indicator", indicator, round1(rate));
        }
    }
    cols
}

fn write_csv(cols: &Columns, path: &std::path::Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(["Region", "Category", "Vaccine", "Coverage_Rate"])?;
    for i in 0..cols.rate.len() {
        let rate = cols.rate[i].to_string();
        writer.write_record([
            cols.region[i].as_str(),
            cols.category[i],
            cols.vaccine[i].as_str(),
            rate.as_str(),
        ])?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(cols: &Columns, path: &std::path::Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Region", DataType::Utf8, false),
        Field::new("Category", DataType::Utf8, false),
        Field::new("Vaccine", DataType::Utf8, false),
        Field::new("Coverage_Rate", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                cols.region.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(cols.category.clone())),
            Arc::new(StringArray::from(
                cols.vaccine.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(cols.rate.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let cols = generate(&mut rng);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let csv_path = args.out_dir.join("vaccination_data.csv");
    let parquet_path = args.out_dir.join("vaccination_data.parquet");

    write_csv(&cols, &csv_path)?;
    write_parquet(&cols, &parquet_path)?;

    println!(
        "Wrote {} rows for {} regions to {} and {}",
        cols.rate.len(),
        REGIONS.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

use std::fmt;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::error::ArrowError;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;
use thiserror::Error;

use super::model::{Category, Dataset, Record, SourceFormat};

/// Column names every source must provide.
pub const REGION_COLUMN: &str = "Region";
pub const CATEGORY_COLUMN: &str = "Category";
pub const VACCINE_COLUMN: &str = "Vaccine";
pub const RATE_COLUMN: &str = "Coverage_Rate";

const REQUIRED_COLUMNS: [&str; 4] = [REGION_COLUMN, CATEGORY_COLUMN, VACCINE_COLUMN, RATE_COLUMN];

/// Cell contents read as a missing rate, as dataframe CSV readers do by default.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a source could not be turned into a [`Dataset`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading file")]
    Io(#[from] std::io::Error),
    #[error("parsing CSV")]
    Csv(#[from] csv::Error),
    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),
    #[error("reading parquet")]
    Parquet(#[from] ParquetError),
    #[error("decoding arrow data")]
    Arrow(#[from] ArrowError),
    #[error("missing '{0}' column")]
    MissingColumn(&'static str),
    #[error("row {row}: {message}")]
    MalformedRow { row: usize, message: String },
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

/// The backing source is absent or unreadable. Fatal for the render that
/// asked for it: nothing downstream may run without a dataset.
#[derive(Debug, Error)]
#[error("data source '{}' is unavailable", .path.display())]
pub struct DataUnavailable {
    pub path: PathBuf,
    #[source]
    pub cause: LoadError,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a coverage table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least `Region, Category, Vaccine, Coverage_Rate`
/// * `.json`    – `[{ "Region": ..., "Category": ..., "Vaccine": ..., "Coverage_Rate": ... }, ...]`
/// * `.parquet` – the same four columns, string + numeric
pub fn load_file(path: &Path) -> Result<Dataset, DataUnavailable> {
    let result = load_by_extension(path);
    match result {
        Ok(ds) => {
            log::info!(
                "Loaded {} rows ({} regions, {} skipped) from {}",
                ds.len(),
                ds.regions.len(),
                ds.skipped_rows,
                path.display()
            );
            Ok(ds)
        }
        Err(cause) => Err(DataUnavailable {
            path: path.to_path_buf(),
            cause,
        }),
    }
}

fn load_by_extension(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(std::fs::read(path)?),
        "json" => parse_json(std::fs::read(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Row assembly shared by all formats
// ---------------------------------------------------------------------------

/// One source row before interpretation. Field names follow the file headers.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Vaccine")]
    vaccine: String,
    #[serde(rename = "Coverage_Rate", deserialize_with = "rate_cell")]
    coverage_rate: Option<f64>,
}

/// A rate cell: a number, or `None` for blank, null and NA markers.
fn rate_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    struct RateVisitor;

    impl<'de> Visitor<'de> for RateVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a coverage rate or a missing-value marker")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() || MISSING_MARKERS.contains(&v) {
                return Ok(None);
            }
            v.parse::<f64>()
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(RateVisitor)
}

/// Collect raw rows into a dataset. Rows with a missing rate (blank, null,
/// NA marker or NaN) are skipped, not zero-filled.
fn assemble<I>(rows: I, format: SourceFormat, source: Vec<u8>) -> Result<Dataset, LoadError>
where
    I: IntoIterator<Item = Result<RawRow, LoadError>>,
{
    let mut records = Vec::new();
    let mut skipped = 0;

    for (row_no, row) in rows.into_iter().enumerate() {
        let row = row?;
        let Some(value) = row.coverage_rate.filter(|v| !v.is_nan()) else {
            log::warn!("row {row_no}: missing {RATE_COLUMN}, skipping");
            skipped += 1;
            continue;
        };
        if !value.is_finite() {
            return Err(LoadError::MalformedRow {
                row: row_no,
                message: format!("{RATE_COLUMN} is infinite"),
            });
        }
        records.push(Record::new(
            row.region.trim(),
            Category::parse(&row.category),
            row.vaccine.trim(),
            value,
        ));
    }

    Ok(Dataset::from_records(records, format, source, skipped))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV bytes. Columns are located by header name; extra columns are
/// ignored.
pub fn parse_csv(bytes: Vec<u8>) -> Result<Dataset, LoadError> {
    let rows = {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());

        let headers = reader.headers()?.clone();
        for col in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == col) {
                return Err(LoadError::MissingColumn(col));
            }
        }

        reader
            .deserialize::<RawRow>()
            .map(|r| r.map_err(LoadError::from))
            .collect::<Vec<_>>()
    };

    assemble(rows, SourceFormat::Csv, bytes)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Region": "NCR", "Category": "Basic Antigen", "Vaccine": "BCG", "Coverage_Rate": 91.2 },
///   ...
/// ]
/// ```
pub fn parse_json(bytes: Vec<u8>) -> Result<Dataset, LoadError> {
    let values: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;

    let rows = values
        .into_iter()
        .map(|value| {
            if let Some(obj) = value.as_object() {
                for col in REQUIRED_COLUMNS {
                    if !obj.contains_key(col) {
                        return Err(LoadError::MissingColumn(col));
                    }
                }
            }
            serde_json::from_value::<RawRow>(value).map_err(LoadError::from)
        })
        .collect::<Vec<_>>();

    assemble(rows, SourceFormat::Json, bytes)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file.
///
/// Expected schema:
/// - `Region`, `Category`, `Vaccine`: Utf8 or LargeUtf8
/// - `Coverage_Rate`: any numeric type; nulls are blank observations
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let source = std::fs::read(path)?;
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut rows = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let column = |name: &'static str| -> Result<ArrayRef, LoadError> {
            schema
                .index_of(name)
                .map(|i| batch.column(i).clone())
                .map_err(|_| LoadError::MissingColumn(name))
        };

        let region = cast(&column(REGION_COLUMN)?, &DataType::Utf8)?;
        let category = cast(&column(CATEGORY_COLUMN)?, &DataType::Utf8)?;
        let vaccine = cast(&column(VACCINE_COLUMN)?, &DataType::Utf8)?;
        let rate = column(RATE_COLUMN)?;
        if !rate.data_type().is_numeric() {
            return Err(LoadError::MalformedRow {
                row: offset,
                message: format!("{RATE_COLUMN} has type {:?}", rate.data_type()),
            });
        }
        let rate = cast(&rate, &DataType::Float64)?;

        let region = region.as_string::<i32>();
        let category = category.as_string::<i32>();
        let vaccine = vaccine.as_string::<i32>();
        let rate = rate.as_primitive::<Float64Type>();

        for i in 0..batch.num_rows() {
            let row_no = offset + i;
            if region.is_null(i) || category.is_null(i) {
                rows.push(Err(LoadError::MalformedRow {
                    row: row_no,
                    message: "null region or category".to_string(),
                }));
                continue;
            }
            rows.push(Ok(RawRow {
                region: region.value(i).to_string(),
                category: category.value(i).to_string(),
                vaccine: if vaccine.is_null(i) {
                    String::new()
                } else {
                    vaccine.value(i).to_string()
                },
                coverage_rate: (!rate.is_null(i)).then(|| rate.value(i)),
            }));
        }
        offset += batch.num_rows();
    }

    assemble(rows, SourceFormat::Parquet, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
Region,Category,Vaccine,Coverage_Rate
A,Demographic,Target Population,1000
A,Summary Indicator,BCG,80
B,Demographic,Target Population,2000
B,Summary Indicator,BCG,90
";

    #[test]
    fn test_parse_csv_keeps_source_order() {
        let ds = parse_csv(SAMPLE.as_bytes().to_vec()).unwrap();

        assert_eq!(ds.len(), 4);
        assert_eq!(ds.format, SourceFormat::Csv);
        assert_eq!(ds.regions, vec!["A", "B"]);
        assert_eq!(ds.records[1].category, Category::SummaryIndicator);
        assert_eq!(ds.records[1].vaccine, "BCG");
        assert_eq!(ds.records[2].value, 2000.0);
        assert_eq!(ds.source, SAMPLE.as_bytes());
    }

    #[test]
    fn test_parse_csv_ignores_extra_columns() {
        let text = "Year,Region,Category,Vaccine,Coverage_Rate,Note\n2022,A,Basic Antigen,BCG,75.5,x\n";
        let ds = parse_csv(text.as_bytes().to_vec()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].value, 75.5);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let text = "Region,Category,Coverage_Rate\nA,Basic Antigen,80\n";
        let err = parse_csv(text.as_bytes().to_vec()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Vaccine")));
    }

    #[test]
    fn test_parse_csv_blank_rate_is_skipped() {
        let text = "Region,Category,Vaccine,Coverage_Rate\nA,Basic Antigen,BCG,\nA,Basic Antigen,OPV,70\n";
        let ds = parse_csv(text.as_bytes().to_vec()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows, 1);
        assert_eq!(ds.records[0].vaccine, "OPV");
    }

    #[test]
    fn test_parse_csv_non_numeric_rate_fails() {
        let text = "Region,Category,Vaccine,Coverage_Rate\nA,Basic Antigen,BCG,high\n";
        assert!(matches!(
            parse_csv(text.as_bytes().to_vec()),
            Err(LoadError::Csv(_))
        ));
    }

    #[test]
    fn test_parse_csv_missing_markers_are_skipped() {
        for marker in MISSING_MARKERS.iter().chain(&["", "  ", "NAN"]) {
            let text = format!(
                "Region,Category,Vaccine,Coverage_Rate\nA,Basic Antigen,BCG,{marker}\nA,Basic Antigen,OPV,70\n"
            );
            let ds = parse_csv(text.into_bytes())
                .unwrap_or_else(|e| panic!("{marker:?} rejected: {e}"));
            assert_eq!(ds.len(), 1, "{marker:?}");
            assert_eq!(ds.skipped_rows, 1, "{marker:?}");
            assert_eq!(ds.records[0].vaccine, "OPV");
        }
    }

    #[test]
    fn test_parse_csv_infinite_rate_fails() {
        let text = "Region,Category,Vaccine,Coverage_Rate\nA,Basic Antigen,BCG,inf\n";
        assert!(matches!(
            parse_csv(text.as_bytes().to_vec()),
            Err(LoadError::MalformedRow { row: 0, .. })
        ));
    }

    #[test]
    fn test_parse_json_string_rates() {
        let text = r#"[
            {"Region": "A", "Category": "Basic Antigen", "Vaccine": "BCG", "Coverage_Rate": "NA"},
            {"Region": "A", "Category": "Basic Antigen", "Vaccine": "OPV", "Coverage_Rate": "72.5"},
            {"Region": "B", "Category": "Basic Antigen", "Vaccine": "BCG", "Coverage_Rate": 64}
        ]"#;
        let ds = parse_json(text.as_bytes().to_vec()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 1);
        assert_eq!(ds.records[0].value, 72.5);
        assert_eq!(ds.records[1].value, 64.0);
    }

    #[test]
    fn test_parse_json_records() {
        let text = r#"[
            {"Region": "A", "Category": "Basic Antigen", "Vaccine": "BCG", "Coverage_Rate": 80},
            {"Region": "B", "Category": "Basic Antigen", "Vaccine": "BCG", "Coverage_Rate": null}
        ]"#;
        let ds = parse_json(text.as_bytes().to_vec()).unwrap();
        assert_eq!(ds.format, SourceFormat::Json);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows, 1);
    }

    #[test]
    fn test_parse_json_missing_column() {
        let text = r#"[{"Region": "A", "Category": "Basic Antigen", "Coverage_Rate": 80}]"#;
        let err = parse_json(text.as_bytes().to_vec()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Vaccine")));
    }

    #[test]
    fn test_load_file_missing_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vaccination_data.csv");

        let err = load_file(&path).unwrap_err();
        assert_eq!(err.path, path);
        assert!(matches!(err.cause, LoadError::Io(_)));
        let rendered = format!("{:#}", anyhow::Error::from(err));
        assert!(rendered.contains("is unavailable: reading file: "));
    }

    #[test]
    fn test_load_file_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        fs::write(&path, b"not a table").unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err.cause, LoadError::UnsupportedFormat(ref e) if e == "xlsx"));
    }

    #[test]
    fn test_load_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new(REGION_COLUMN, DataType::Utf8, false),
            Field::new(CATEGORY_COLUMN, DataType::Utf8, false),
            Field::new(VACCINE_COLUMN, DataType::Utf8, true),
            Field::new(RATE_COLUMN, DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A", "A", "B"])),
                Arc::new(StringArray::from(vec![
                    "Demographic",
                    "Basic Antigen",
                    "Basic Antigen",
                ])),
                Arc::new(StringArray::from(vec![Some("Total"), Some("BCG"), None])),
                Arc::new(Float64Array::from(vec![Some(1000.0), Some(80.0), None])),
            ],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.format, SourceFormat::Parquet);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 1);
        assert_eq!(ds.records[0].category, Category::Demographic);
        assert_eq!(ds.records[1].value, 80.0);
        assert_eq!(ds.source, fs::read(&path).unwrap());
    }
}

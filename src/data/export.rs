use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};

use super::loader::{CATEGORY_COLUMN, RATE_COLUMN, REGION_COLUMN, VACCINE_COLUMN};
use super::model::{Dataset, SourceFormat};

/// Default file name offered by the save dialog.
pub const DEFAULT_EXPORT_NAME: &str = "vaccination_data.csv";

/// CSV bytes for the full dataset.
///
/// A CSV source is returned byte-for-byte. Other sources are re-serialised
/// from the loaded records with the canonical headers.
pub fn export_bytes(dataset: &Dataset) -> Result<Cow<'_, [u8]>> {
    if dataset.format == SourceFormat::Csv {
        return Ok(Cow::Borrowed(&dataset.source));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([REGION_COLUMN, CATEGORY_COLUMN, VACCINE_COLUMN, RATE_COLUMN])?;
    for rec in &dataset.records {
        let rate = rec.value.to_string();
        writer.write_record([
            rec.region.as_str(),
            rec.category.label(),
            rec.vaccine.as_str(),
            rate.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flushing CSV export")?;
    Ok(Cow::Owned(bytes))
}

/// Write the export to `path`.
pub fn save_export(dataset: &Dataset, path: &Path) -> Result<()> {
    let bytes = export_bytes(dataset)?;
    std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_csv, parse_json};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_csv_export_is_byte_identical() {
        // odd spacing and quoting must survive untouched
        let text = "Region,Category,Vaccine,Coverage_Rate\r\n\"A\", Basic Antigen ,BCG,80.50\r\n";
        let ds = parse_csv(text.as_bytes().to_vec()).unwrap();

        assert_eq!(export_bytes(&ds).unwrap().as_ref(), text.as_bytes());
    }

    #[test]
    fn test_json_export_is_reserialised_as_csv() {
        let text = r#"[{"Region": "A", "Category": "Summary Indicator", "Vaccine": "FIC", "Coverage_Rate": 72.5}]"#;
        let ds = parse_json(text.as_bytes().to_vec()).unwrap();

        let bytes = export_bytes(&ds).unwrap();
        let out = String::from_utf8(bytes.into_owned()).unwrap();
        assert_eq!(
            out,
            "Region,Category,Vaccine,Coverage_Rate\nA,Summary Indicator,FIC,72.5\n"
        );

        let back = parse_csv(out.into_bytes()).unwrap();
        assert_eq!(back.records, ds.records);
    }

    #[test]
    fn test_save_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_NAME);
        let text = "Region,Category,Vaccine,Coverage_Rate\nA,Basic Antigen,BCG,80\n";
        let ds = parse_csv(text.as_bytes().to_vec()).unwrap();

        save_export(&ds, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }
}

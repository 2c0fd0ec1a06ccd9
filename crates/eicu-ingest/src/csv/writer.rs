//! CSV output for the merged patient table.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvWriter, DataFrame, SerWriter};

use crate::error::{IngestError, Result};

/// Writes `df` to `path` as CSV with a header row.
///
/// Parent directories are created as needed. Booleans are written as
/// `true`/`false` and nulls as empty cells.
pub fn write_csv_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| IngestError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "wrote csv table"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::read_csv_table;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_preserves_shape_and_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("complete_patient_data.csv");
        let columns: Vec<Column> = vec![
            Series::new("patientunitstayid".into(), vec![141296i64, 141297])
                .into_column(),
            Series::new("expired".into(), vec![true, false]).into_column(),
            Series::new("heartrate_mean".into(), vec![Some(88.25f64), None])
                .into_column(),
        ];
        let mut df = DataFrame::new(columns).unwrap();

        write_csv_table(&mut df, &path).unwrap();
        let reread = read_csv_table(&path).unwrap();

        assert_eq!(reread.height(), 2);
        assert_eq!(reread.width(), 3);
        assert_eq!(
            reread.column("expired").unwrap().dtype(),
            &polars::prelude::DataType::Boolean
        );
    }
}

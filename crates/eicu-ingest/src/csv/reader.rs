//! CSV file reading into Polars DataFrames.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};

use crate::error::{IngestError, Result};

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Rejects empty files and UTF-16 BOM markers, then rewinds `file`.
fn validate_encoding(path: &Path, file: &mut File) -> Result<()> {
    let mut buffer = [0u8; 4];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    if bytes_read == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    file.seek(SeekFrom::Start(0))
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(())
}

/// Reads the header row of a CSV file.
///
/// A leading UTF-8 BOM is stripped and names are trimmed.
pub fn read_csv_headers(path: &Path) -> Result<Vec<String>> {
    let mut file = open_file(path)?;
    validate_encoding(path, &mut file)?;
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let record = reader.headers().map_err(|e| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let headers: Vec<String> = record
        .iter()
        .map(|value| value.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    Ok(headers)
}

/// Reads a CSV file into a Polars DataFrame.
///
/// The schema is inferred from the whole file; eICU exports carry values
/// like `"> 89"` deep inside otherwise numeric columns.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    let mut file = open_file(path)?;
    validate_encoding(path, &mut file)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    if df.width() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded csv table"
    );
    Ok(df)
}

/// Fails with [`IngestError::MissingColumn`] when `column` is absent from `df`.
pub fn require_column(df: &DataFrame, column: &str, path: &Path) -> Result<()> {
    if df.column(column).is_ok() {
        Ok(())
    } else {
        Err(IngestError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })
    }
}

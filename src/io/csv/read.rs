//! CSV reading operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{Column, CsvReadOptions}};

const BOM: char = '\u{feff}';

/// Reads a CSV file with a header row, keeping every column as a string.
pub(crate) fn read_csv_strings(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Look up a column by name, ignoring a UTF-8 byte order mark left on the first header.
pub(crate) fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    let actual = df.get_column_names().into_iter()
        .find(|c| c.trim_start_matches(BOM) == name)
        .with_context(|| format!("[io::csv::read] missing column {name:?}"))?;
    Ok(df.column(actual.as_str())?)
}

/// Values of a string column, with nulls and empty fields as `None`.
pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    Ok(column(df, name)?
        .str()
        .with_context(|| format!("[io::csv::read] column {name:?} is not a string column"))?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

//! CSV writing operations.

use std::{fs::OpenOptions, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};

use crate::common::{PendingWrite, file_is_empty};

/// Append the rows of `df` to the CSV at `path`, creating it if needed.
/// The header (preceded by a UTF-8 BOM) is only written when the file is empty.
/// The file is closed again before returning.
pub(crate) fn append_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let fresh = file_is_empty(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("[io::csv::write] Failed to open CSV file for append: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_bom(fresh)
        .include_header(fresh)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to append CSV rows to {:?}", path))?;
    file.sync_data()
        .with_context(|| format!("[io::csv::write] Failed to sync {}", path.display()))
}

/// Replace the CSV at `path` with `df` (BOM + header + rows) via write-then-rename.
pub(crate) fn write_csv_atomic(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut sink = PendingWrite::open(path, true)?;
    CsvWriter::new(&mut sink)
        .include_bom(true)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))?;
    sink.finalize()
}

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame};
use tracing::warn;

use crate::{
    common::file_is_empty,
    io::csv::{append_csv, read_csv_strings, string_values, write_csv_atomic},
    pipeline::{ResultRow, Status},
};

/// The per-city results CSV (`city,status,nodes,edges,area_km2`).
/// It doubles as the resume checkpoint.
#[derive(Clone, Debug)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl AsRef<Path>) -> Self { Self { path: path.as_ref().to_path_buf() } }

    #[inline] pub fn path(&self) -> &Path { &self.path }

    /// Append one row, writing the header first if the log is new or empty.
    pub fn append(&self, row: &ResultRow) -> Result<()> {
        append_csv(&mut rows_to_frame(std::slice::from_ref(row))?, &self.path)
            .with_context(|| format!("[pipeline::log] Failed to append row for {}", row.city))
    }

    /// All rows in file order. A missing or empty log has no rows.
    /// Rows with an unrecognized status are skipped with a warning.
    pub fn read_rows(&self) -> Result<Vec<ResultRow>> {
        if file_is_empty(&self.path)? { return Ok(Vec::new()) }

        let df = read_csv_strings(&self.path)?;
        let cities = string_values(&df, "city")?;
        let statuses = string_values(&df, "status")?;
        let nodes = string_values(&df, "nodes")?;
        let edges = string_values(&df, "edges")?;
        let areas = string_values(&df, "area_km2")?;

        /// Parse an optional numeric field, naming the row on failure.
        fn parse<T: std::str::FromStr>(value: &Option<String>, field: &str, line: usize) -> Result<Option<T>>
        where T::Err: std::error::Error + Send + Sync + 'static {
            value.as_deref()
                .map(|v| v.parse::<T>())
                .transpose()
                .with_context(|| format!("[pipeline::log] bad {field} value on data row {line}"))
        }

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let Some(city) = cities[i].clone() else { continue };
            let raw_status = statuses[i].as_deref().unwrap_or_default();
            let Ok(status) = raw_status.parse::<Status>() else {
                warn!(city = %city, status = raw_status, log = %self.path.display(), "ignoring log row with unrecognized status");
                continue
            };
            rows.push(ResultRow {
                city,
                status,
                nodes: parse(&nodes[i], "nodes", i + 1)?,
                edges: parse(&edges[i], "edges", i + 1)?,
                area_km2: parse(&areas[i], "area_km2", i + 1)?,
            });
        }
        Ok(rows)
    }

    /// Rewrite the log with one row per city: its latest success if it ever succeeded,
    /// otherwise its latest row. Cities keep their first-appearance order.
    /// Returns the number of rows dropped; the file is untouched when nothing is dropped.
    pub fn compact(&self) -> Result<usize> {
        let rows = self.read_rows()?;

        let mut order: Vec<ResultRow> = Vec::new();
        let mut slot: AHashMap<String, usize> = AHashMap::new();
        for row in &rows {
            match slot.get(&row.city) {
                Some(&i) if order[i].status.is_success() && !row.status.is_success() => {}
                Some(&i) => order[i] = row.clone(),
                None => {
                    slot.insert(row.city.clone(), order.len());
                    order.push(row.clone());
                }
            }
        }

        let dropped = rows.len() - order.len();
        if dropped > 0 {
            write_csv_atomic(&mut rows_to_frame(&order)?, &self.path)
                .with_context(|| format!("[pipeline::log] Failed to compact {}", self.path.display()))?;
        }
        Ok(dropped)
    }
}

/// Lay rows out as the five log columns.
fn rows_to_frame(rows: &[ResultRow]) -> Result<DataFrame> {
    let count = |v: Option<usize>| v.map(|n| n as i64);
    Ok(DataFrame::new(vec![
        Column::new("city".into(), rows.iter().map(|r| r.city.clone()).collect::<Vec<_>>()),
        Column::new("status".into(), rows.iter().map(|r| r.status.to_string()).collect::<Vec<_>>()),
        Column::new("nodes".into(), rows.iter().map(|r| count(r.nodes)).collect::<Vec<_>>()),
        Column::new("edges".into(), rows.iter().map(|r| count(r.edges)).collect::<Vec<_>>()),
        Column::new("area_km2".into(), rows.iter().map(|r| r.area_km2).collect::<Vec<_>>()),
    ])?)
}

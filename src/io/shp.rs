//! Shapefile reading operations.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail, ensure};
use dbase::{encoding::EncodingRs, Record};
use shapefile::{Shape, ShapeReader};

use crate::common::require_file_exists;

/// Reads all shapes + attribute records from a `.shp` file, decoding the `.dbf` table
/// with the encoding named by `encoding` (a WHATWG label such as "utf-8" or "gb18030").
pub(crate) fn read_shapefile(path: &Path, encoding: &str) -> Result<Vec<(Shape, Record)>> {
    require_file_exists(path)?;

    let encoding = encoding_rs::Encoding::for_label(encoding.trim().as_bytes())
        .with_context(|| format!("[io::shp] Unknown text encoding: {encoding}"))?;

    let shapes = ShapeReader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?
        .read()
        .with_context(|| format!("[io::shp] Error reading shapes from {}", path.display()))?;

    let dbf_path = path.with_extension("dbf");
    let records = dbase::Reader::from_path_with_encoding(&dbf_path, EncodingRs::from(encoding))
        .with_context(|| format!("[io::shp] Failed to open attribute table: {}", dbf_path.display()))?
        .read()
        .with_context(|| format!("[io::shp] Error reading records from {}", dbf_path.display()))?;

    ensure!(shapes.len() == records.len(),
        "[io::shp] {} has {} shapes but {} records", path.display(), shapes.len(), records.len());

    Ok(shapes.into_iter().zip(records).collect())
}

/// Fail if the `.prj` sidecar (when present) declares a projected CRS; coordinates must be lon/lat.
pub(crate) fn ensure_geographic_crs(path: &Path) -> Result<()> {
    let prj_path = path.with_extension("prj");
    if !prj_path.exists() { return Ok(()) }

    let wkt = fs::read_to_string(&prj_path)
        .with_context(|| format!("[io::shp] Failed to read {}", prj_path.display()))?;
    if wkt.trim_start().to_ascii_uppercase().starts_with("PROJCS") {
        bail!("[io::shp] {} uses a projected CRS; boundaries must be in geographic lon/lat", path.display());
    }
    Ok(())
}

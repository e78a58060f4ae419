//! IO module for format-specific reading and writing operations.
//!
//! Each format module handles reading and/or writing for a specific file format.
//!
//! # Format Modules
//!
//! - `csv` - CSV format for the per-city results log
//! - `graphml` - GraphML format for road network graphs
//! - `shp` - Shapefile format for city boundaries

pub(crate) mod csv;
pub(crate) mod graphml;
pub(crate) mod shp;

pub use graphml::write_graphml;

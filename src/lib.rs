#![doc = "cityroads public API"]

mod common;
mod geom;
mod graph;
mod io;
mod osm;
mod pipeline;

#[doc(inline)] pub use geom::{MetricProjection, city_polygon, largest_polygon, simplify_polygon};
#[doc(inline)] pub use graph::{AttrValue, Attrs, Edge, Node, RoadGraph};
#[doc(inline)] pub use io::write_graphml;
#[doc(inline)] pub use osm::{NetworkSource, NetworkType};
#[cfg(feature = "download")]
#[doc(inline)] pub use osm::{DEFAULT_MAX_QUERY_AREA_M2, DEFAULT_OVERPASS_URL, DEFAULT_TIMEOUT_SECS, OverpassSource};
#[doc(inline)] pub use pipeline::{
    City, DEFAULT_DELAY, DEFAULT_ENCODING, DEFAULT_LOG_NAME, DEFAULT_OUTPUT_DIR, DEFAULT_TOLERANCE,
    Pipeline, ResultLog, ResultRow, ResumeTracker, RunSummary, Settings, Status, load_cities,
};

use anyhow::Result;
use geo::Polygon;

use crate::graph::RoadGraph;

/// Something that can produce the street network inside a lon/lat polygon.
///
/// The returned graph is directed, restricted to the polygon, reduced to its largest
/// weakly connected component, topologically simplified and annotated with `street_count`.
pub trait NetworkSource {
    fn fetch(&self, polygon: &Polygon<f64>) -> Result<RoadGraph>;
}

impl<T: NetworkSource + ?Sized> NetworkSource for &T {
    fn fetch(&self, polygon: &Polygon<f64>) -> Result<RoadGraph> { (**self).fetch(polygon) }
}

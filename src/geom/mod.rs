mod convert;
mod proj;
mod reduce;
#[cfg_attr(not(feature = "download"), allow(dead_code))]
mod split;

pub(crate) use convert::shp_to_geo;
pub use proj::MetricProjection;
pub use reduce::{city_polygon, largest_polygon, simplify_polygon};
#[cfg_attr(not(feature = "download"), allow(unused_imports))]
pub(crate) use split::split_for_query;

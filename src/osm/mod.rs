#[cfg_attr(not(feature = "download"), allow(dead_code))]
mod build;
mod filter;
#[cfg(feature = "download")]
mod overpass;
mod source;

pub use filter::NetworkType;
#[cfg(feature = "download")]
pub use overpass::{DEFAULT_MAX_QUERY_AREA_M2, DEFAULT_OVERPASS_URL, DEFAULT_TIMEOUT_SECS, OverpassSource};
pub use source::NetworkSource;

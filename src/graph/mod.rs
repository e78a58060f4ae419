mod attr;
mod components;
mod graph;
mod simplify;

pub use attr::{AttrValue, Attrs};
pub use graph::{Edge, Node, RoadGraph};

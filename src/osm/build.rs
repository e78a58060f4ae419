use std::collections::BTreeMap;

use ahash::AHashSet;
use anyhow::{Result, ensure};
use geo::{Distance, Haversine, Intersects, Point, Polygon};
use serde::Deserialize;

use crate::{graph::{AttrValue, Attrs, RoadGraph}, osm::NetworkType};

/// Way tags copied onto edges.
const WAY_TAGS: &[&str] = &[
    "access", "area", "bridge", "est_width", "highway", "junction", "landuse",
    "lanes", "maxspeed", "name", "ref", "service", "tunnel", "width",
];

/// Node tags copied onto nodes.
const NODE_TAGS: &[&str] = &["highway", "junction", "railway", "ref"];

/// `oneway` values meaning traffic flows in one direction only.
const ONEWAY_VALUES: &[&str] = &["yes", "true", "1", "-1", "reverse"];

/// `oneway` values meaning traffic flows against the node order.
const REVERSED_VALUES: &[&str] = &["-1", "reverse"];

/// Body of an Overpass `[out:json]` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub(crate) elements: Vec<Element>,
    #[serde(default)]
    pub(crate) remark: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Whether a way carries traffic one way only, and whether against its node order.
fn one_way(tags: &BTreeMap<String, String>, network_type: NetworkType) -> (bool, bool) {
    if network_type.is_bidirectional() { return (false, false) }

    let value = tags.get("oneway").map(|v| v.trim().to_ascii_lowercase());
    let roundabout = tags.get("junction").is_some_and(|j| j == "roundabout");
    match value.as_deref() {
        Some(v) if ONEWAY_VALUES.contains(&v) => (true, REVERSED_VALUES.contains(&v)),
        _ => (roundabout, false),
    }
}

/// Build the raw directed street graph from one or more Overpass responses.
/// Elements repeated across responses are taken once.
pub(crate) fn build_graph(responses: &[OverpassResponse], network_type: NetworkType) -> Result<RoadGraph> {
    let mut graph = RoadGraph::directed();
    let mut seen_ways = AHashSet::new();

    for element in responses.iter().flat_map(|r| &r.elements) {
        if let Element::Node { id, lat, lon, tags } = element {
            let attrs = NODE_TAGS.iter()
                .filter_map(|&k| tags.get(k).map(|v| (k.to_string(), AttrValue::from(v.as_str()))))
                .collect::<Attrs>();
            graph.add_node(*id, *lon, *lat, attrs);
        }
    }

    for element in responses.iter().flat_map(|r| &r.elements) {
        let Element::Way { id, nodes, tags } = element else { continue };
        if !seen_ways.insert(*id) { continue }

        let mut refs = nodes.iter()
            .filter_map(|&osmid| graph.node_index(osmid))
            .collect::<Vec<_>>();
        refs.dedup();
        if refs.len() < 2 { continue }

        let (oneway, reversed) = one_way(tags, network_type);
        if reversed { refs.reverse() }

        let mut attrs = WAY_TAGS.iter()
            .filter_map(|&k| tags.get(k).map(|v| (k.to_string(), AttrValue::from(v.as_str()))))
            .collect::<Attrs>();
        attrs.insert("osmid".into(), AttrValue::Int(*id));
        attrs.insert("oneway".into(), AttrValue::Bool(oneway));

        for pair in refs.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            let length = segment_length(&graph, u, v);

            let mut forward = attrs.clone();
            forward.insert("reversed".into(), AttrValue::Bool(reversed));
            forward.insert("length".into(), AttrValue::Float(length));
            graph.add_edge(u, v, forward)?;

            if !oneway {
                let mut backward = attrs.clone();
                backward.insert("reversed".into(), AttrValue::Bool(true));
                backward.insert("length".into(), AttrValue::Float(length));
                graph.add_edge(v, u, backward)?;
            }
        }
    }

    Ok(graph)
}

/// Great-circle distance in meters between two nodes.
fn segment_length(graph: &RoadGraph, u: usize, v: usize) -> f64 {
    let (a, b) = (&graph.nodes()[u], &graph.nodes()[v]);
    Haversine.distance(Point::new(a.x, a.y), Point::new(b.x, b.y))
}

/// Turn raw responses into the finished street network for `polygon`: nodes outside the
/// polygon are dropped, the largest weakly connected component is kept, interstitial nodes
/// are simplified away, and every node is annotated with `street_count`.
pub(crate) fn graph_from_responses(
    responses: &[OverpassResponse],
    polygon: &Polygon<f64>,
    network_type: NetworkType,
) -> Result<RoadGraph> {
    let raw = build_graph(responses, network_type)?;

    let inside = raw.nodes().iter()
        .map(|n| polygon.intersects(&Point::new(n.x, n.y)))
        .collect::<Vec<_>>();
    let truncated = raw.induced_subgraph(&inside);
    ensure!(!truncated.is_empty(), "found no graph nodes within the requested polygon");

    let mut graph = truncated.largest_component()?.simplify()?;
    graph.count_streets();
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    const FIXTURE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "node", "id": 1, "lat": 0.0, "lon": 0.000},
            {"type": "node", "id": 2, "lat": 0.0, "lon": 0.001},
            {"type": "node", "id": 3, "lat": 0.0, "lon": 0.002},
            {"type": "node", "id": 4, "lat": 0.0, "lon": 0.003, "tags": {"highway": "traffic_signals"}},
            {"type": "node", "id": 5, "lat": 0.01, "lon": 0.010},
            {"type": "node", "id": 6, "lat": 0.01, "lon": 0.011},
            {"type": "node", "id": 7, "lat": 1.0, "lon": 1.0},
            {"type": "way", "id": 10, "nodes": [1, 2, 3, 4], "tags": {"highway": "residential", "name": "Main"}},
            {"type": "way", "id": 11, "nodes": [5, 6, 7], "tags": {"highway": "service"}},
            {"type": "relation", "id": 99, "members": []}
        ]
    }"#;

    fn boundary() -> Polygon<f64> {
        polygon![(x: -0.01, y: -0.01), (x: 0.02, y: -0.01), (x: 0.02, y: 0.02), (x: -0.01, y: 0.02)]
    }

    fn parse(json: &str) -> OverpassResponse { serde_json::from_str(json).unwrap() }

    #[test]
    fn two_way_street_collapses_to_one_undirected_edge() {
        let graph = graph_from_responses(&[parse(FIXTURE)], &boundary(), NetworkType::DriveService).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node_index(1).is_some() && graph.node_index(4).is_some());
        assert_eq!(graph.nodes()[graph.node_index(1).unwrap()].attrs["street_count"], AttrValue::Int(1));
        assert_eq!(graph.nodes()[graph.node_index(4).unwrap()].attrs["highway"], AttrValue::from("traffic_signals"));

        let undirected = graph.to_undirected();
        assert_eq!(undirected.edge_count(), 1);
        let edge = &undirected.edges()[0];
        let length = edge.attrs["length"].as_f64().unwrap();
        assert!((length - 333.6).abs() < 0.5, "length was {length}");
        assert_eq!(edge.attrs["osmid"], AttrValue::Int(10));
        assert!(matches!(&edge.attrs["geometry"], AttrValue::Str(s) if s.starts_with("LINESTRING")));
    }

    #[test]
    fn nodes_outside_polygon_are_dropped() {
        let raw = build_graph(&[parse(FIXTURE)], NetworkType::DriveService).unwrap();
        assert_eq!(raw.node_count(), 7);
        // Both ways are two-way: 3 + 2 segments, each in both directions.
        assert_eq!(raw.edge_count(), 10);

        let far = polygon![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0)];
        let err = graph_from_responses(&[parse(FIXTURE)], &far, NetworkType::DriveService).unwrap_err();
        assert!(err.to_string().contains("no graph nodes"));
    }

    #[test]
    fn oneway_tags_control_direction() {
        let json = r#"{"elements": [
            {"type": "node", "id": 1, "lat": 0.0, "lon": 0.0},
            {"type": "node", "id": 2, "lat": 0.0, "lon": 0.001},
            {"type": "way", "id": 20, "nodes": [1, 2], "tags": {"highway": "primary", "oneway": "-1"}}
        ]}"#;

        let graph = build_graph(&[parse(json)], NetworkType::Drive).unwrap();
        assert_eq!(graph.edge_count(), 1);
        let edge = &graph.edges()[0];
        assert_eq!((graph.nodes()[edge.u].osmid, graph.nodes()[edge.v].osmid), (2, 1));
        assert_eq!(edge.attrs["oneway"], AttrValue::Bool(true));
        assert_eq!(edge.attrs["reversed"], AttrValue::Bool(true));

        let walk = build_graph(&[parse(json)], NetworkType::Walk).unwrap();
        assert_eq!(walk.edge_count(), 2);
    }

    #[test]
    fn roundabouts_are_one_way() {
        let tags = BTreeMap::from([("junction".to_string(), "roundabout".to_string())]);
        assert_eq!(one_way(&tags, NetworkType::Drive), (true, false));
        let tags = BTreeMap::from([("oneway".to_string(), "no".to_string())]);
        assert_eq!(one_way(&tags, NetworkType::Drive), (false, false));
    }

    #[test]
    fn repeated_elements_across_responses_are_merged() {
        let graph = build_graph(&[parse(FIXTURE), parse(FIXTURE)], NetworkType::DriveService).unwrap();
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 10);
    }
}

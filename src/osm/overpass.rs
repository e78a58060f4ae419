use std::{io::Read, time::Duration};

use anyhow::{Context, Result, bail};
use geo::Polygon;
use reqwest::{blocking::Client, redirect::Policy};
use tracing::debug;

use crate::{
    geom::{MetricProjection, split_for_query},
    graph::RoadGraph,
    osm::{NetworkSource, NetworkType, build::{OverpassResponse, graph_from_responses}},
};

/// Public Overpass API endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server-side query timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Largest polygon area (m²) sent in a single query; bigger polygons are split.
pub const DEFAULT_MAX_QUERY_AREA_M2: f64 = 2.5e9;

/// Fetches street networks from an Overpass API server.
pub struct OverpassSource {
    client: Client,
    url: String,
    network_type: NetworkType,
    timeout_secs: u64,
    max_query_area_m2: f64,
    projection: MetricProjection,
}

impl OverpassSource {
    /// Create a source querying `url` with the given server-side and HTTP timeout.
    pub fn new(url: impl Into<String>, network_type: NetworkType, timeout_secs: u64, max_query_area_m2: f64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cityroads/", env!("CARGO_PKG_VERSION")))
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(timeout_secs.saturating_add(30)))
            .build()
            .context("[osm::overpass] Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            network_type,
            timeout_secs,
            max_query_area_m2,
            projection: MetricProjection::web_mercator()?,
        })
    }

    /// Overpass QL selecting the filtered ways inside `polygon` plus their nodes.
    fn query(&self, polygon: &Polygon<f64>) -> String {
        let poly = polygon.exterior().coords()
            .map(|c| format!("{:.6} {:.6}", c.y, c.x))
            .collect::<Vec<_>>()
            .join(" ");
        format!("[out:json][timeout:{}];(way{}(poly:\"{poly}\");>;);out;", self.timeout_secs, self.network_type.filter())
    }

    /// Send one query and parse the JSON response.
    fn request(&self, query: &str) -> Result<OverpassResponse> {
        let resp = self.client.post(&self.url)
            .form(&[("data", query)])
            .send()
            .with_context(|| format!("[osm::overpass] POST {}", self.url))?
            .error_for_status()
            .with_context(|| format!("[osm::overpass] POST {} returned error status", self.url))?;

        parse_response(resp)
    }
}

/// Parse an Overpass JSON body. A `runtime error` remark (timeout, out of memory)
/// means the elements are incomplete, so it is an error.
fn parse_response<R: Read>(reader: R) -> Result<OverpassResponse> {
    let response: OverpassResponse = serde_json::from_reader(reader)
        .context("[osm::overpass] Failed to parse Overpass response")?;
    if let Some(remark) = response.remark.as_deref() {
        if remark.contains("runtime error") {
            bail!("[osm::overpass] Overpass server reported: {remark}");
        }
    }
    Ok(response)
}

impl NetworkSource for OverpassSource {
    fn fetch(&self, polygon: &Polygon<f64>) -> Result<RoadGraph> {
        let parts = split_for_query(polygon, &self.projection, self.max_query_area_m2)?;
        debug!(parts = parts.len(), network_type = %self.network_type, "querying overpass");

        let responses = parts.iter()
            .map(|part| self.request(&self.query(part)))
            .collect::<Result<Vec<_>>>()?;
        debug!(elements = responses.iter().map(|r| r.elements.len()).sum::<usize>(), "overpass responded");

        graph_from_responses(&responses, polygon, self.network_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn query_lists_exterior_as_lat_lon() {
        let source = OverpassSource::new(DEFAULT_OVERPASS_URL, NetworkType::DriveService, DEFAULT_TIMEOUT_SECS, DEFAULT_MAX_QUERY_AREA_M2).unwrap();
        let square = polygon![(x: 116.0, y: 39.0), (x: 116.5, y: 39.0), (x: 116.5, y: 39.5)];

        let query = source.query(&square);
        assert!(query.starts_with("[out:json][timeout:180];(way[\"highway\"]"));
        assert!(query.contains("(poly:\"39.000000 116.000000 39.000000 116.500000 39.500000 116.500000 39.000000 116.000000\")"));
        assert!(query.ends_with(");>;);out;"));
    }

    #[test]
    fn runtime_error_remark_fails_the_request() {
        let body = r#"{
            "version": 0.6,
            "elements": [{"type": "node", "id": 1, "lat": 39.9, "lon": 116.4}],
            "remark": "runtime error: Query timed out in \"query\" at line 1 after 181 seconds."
        }"#;
        let err = parse_response(body.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Query timed out"));
    }

    #[test]
    fn other_remarks_are_accepted() {
        let body = r#"{"elements": [{"type": "node", "id": 1, "lat": 39.9, "lon": 116.4}], "remark": "note: partial bbox"}"#;
        let response = parse_response(body.as_bytes()).unwrap();
        assert_eq!(response.elements.len(), 1);
        assert_eq!(response.remark.as_deref(), Some("note: partial bbox"));
    }
}

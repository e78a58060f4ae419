use ahash::AHashMap;
use anyhow::{Result, ensure};

use crate::graph::{AttrValue, Attrs};

/// An intersection or dead end, identified by its OSM node id.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub osmid: i64,
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
    pub attrs: Attrs,
}

/// A road segment between two nodes (by index). `key` distinguishes parallel edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
    pub key: u32,
    pub attrs: Attrs,
}

/// A road network multigraph, directed or undirected, preserving node and edge insertion order.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    directed: bool,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: AHashMap<i64, usize>,
    edge_index: AHashMap<(usize, usize, u32), usize>,
    edge_keys: AHashMap<(usize, usize), Vec<u32>>,
}

impl RoadGraph {
    /// Construct an empty directed multigraph.
    pub fn directed() -> Self { Self { directed: true, ..Default::default() } }

    /// Construct an empty undirected multigraph.
    pub fn undirected() -> Self { Self { directed: false, ..Default::default() } }

    #[inline] pub fn is_directed(&self) -> bool { self.directed }

    #[inline] pub fn node_count(&self) -> usize { self.nodes.len() }

    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    #[inline] pub fn nodes(&self) -> &[Node] { &self.nodes }

    #[inline] pub fn edges(&self) -> &[Edge] { &self.edges }

    /// Index of the node with the given OSM id.
    #[inline] pub fn node_index(&self, osmid: i64) -> Option<usize> { self.node_index.get(&osmid).copied() }

    /// Add a node, or update position and merge attributes if the id is already present.
    pub fn add_node(&mut self, osmid: i64, x: f64, y: f64, attrs: Attrs) -> usize {
        if let Some(&idx) = self.node_index.get(&osmid) {
            let node = &mut self.nodes[idx];
            node.x = x;
            node.y = y;
            node.attrs.extend(attrs);
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node { osmid, x, y, attrs });
        self.node_index.insert(osmid, idx);
        idx
    }

    /// Set a single attribute on a node.
    pub(crate) fn set_node_attr(&mut self, node: usize, name: &str, value: AttrValue) {
        self.nodes[node].attrs.insert(name.to_string(), value);
    }

    /// Normalized lookup pair: undirected edges are stored with the smaller index first.
    #[inline]
    fn pair(&self, u: usize, v: usize) -> (usize, usize) {
        if self.directed || u <= v { (u, v) } else { (v, u) }
    }

    /// Add an edge with the next free key between `u` and `v`, returning that key.
    pub fn add_edge(&mut self, u: usize, v: usize, attrs: Attrs) -> Result<u32> {
        let pair = self.pair(u, v);
        let keys = self.edge_keys.get(&pair).map(Vec::as_slice).unwrap_or(&[]);
        let mut key = keys.len() as u32;
        while keys.contains(&key) { key += 1 }
        self.insert_edge(u, v, key, attrs)?;
        Ok(key)
    }

    /// Insert an edge with an explicit key. If that edge already exists, its attributes
    /// are updated with `attrs` (later values win).
    pub fn insert_edge(&mut self, u: usize, v: usize, key: u32, attrs: Attrs) -> Result<()> {
        ensure!(u < self.nodes.len() && v < self.nodes.len(),
            "edge ({u}, {v}) references a node outside the graph ({} nodes)", self.nodes.len());
        self.insert_edge_unchecked(u, v, key, attrs);
        Ok(())
    }

    fn insert_edge_unchecked(&mut self, u: usize, v: usize, key: u32, attrs: Attrs) {
        let (a, b) = self.pair(u, v);
        match self.edge_index.get(&(a, b, key)) {
            Some(&idx) => self.edges[idx].attrs.extend(attrs),
            None => {
                self.edge_index.insert((a, b, key), self.edges.len());
                self.edge_keys.entry((a, b)).or_default().push(key);
                self.edges.push(Edge { u, v, key, attrs });
            }
        }
    }

    /// The edge from `u` to `v` with the smallest key, if any.
    pub fn edge_between(&self, u: usize, v: usize) -> Option<&Edge> {
        let pair = self.pair(u, v);
        let key = self.edge_keys.get(&pair)?.iter().min()?;
        self.edge_index.get(&(pair.0, pair.1, *key)).map(|&idx| &self.edges[idx])
    }

    /// Outgoing neighbors per node, one entry per edge (both directions if undirected).
    pub(crate) fn successors(&self) -> Vec<Vec<usize>> {
        let mut succ = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            succ[edge.u].push(edge.v);
            if !self.directed { succ[edge.v].push(edge.u) }
        }
        succ
    }

    /// Incoming neighbors per node, one entry per edge (both directions if undirected).
    pub(crate) fn predecessors(&self) -> Vec<Vec<usize>> {
        let mut pred = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            pred[edge.v].push(edge.u);
            if !self.directed { pred[edge.u].push(edge.v) }
        }
        pred
    }

    /// Neighbors per node ignoring edge direction.
    pub(crate) fn neighbors(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            adj[edge.u].push(edge.v);
            adj[edge.v].push(edge.u);
        }
        adj
    }

    /// Copy of the subgraph induced by the nodes with `keep[i] == true`.
    /// Node order, edge order and edge keys are preserved.
    pub fn induced_subgraph(&self, keep: &[bool]) -> RoadGraph {
        assert_eq!(keep.len(), self.nodes.len(), "keep mask must cover every node");

        let mut sub = RoadGraph { directed: self.directed, ..Default::default() };
        let remap = self.nodes.iter().zip(keep)
            .map(|(node, &kept)| kept.then(|| sub.add_node(node.osmid, node.x, node.y, node.attrs.clone())))
            .collect::<Vec<_>>();

        for edge in &self.edges {
            if let (Some(u), Some(v)) = (remap[edge.u], remap[edge.v]) {
                sub.insert_edge_unchecked(u, v, edge.key, edge.attrs.clone());
            }
        }
        sub
    }

    /// Convert to an undirected multigraph. Reciprocal edges `(u, v, k)` and `(v, u, k)`
    /// collapse into one edge whose attributes are updated by the later edge.
    pub fn to_undirected(&self) -> RoadGraph {
        let mut out = RoadGraph::undirected();
        for node in &self.nodes {
            out.add_node(node.osmid, node.x, node.y, node.attrs.clone());
        }
        for edge in &self.edges {
            out.insert_edge_unchecked(edge.u, edge.v, edge.key, edge.attrs.clone());
        }
        out
    }

    /// Set `street_count` on every node: the number of distinct physical streets meeting there.
    /// Parallel and reciprocal edges count once; a self-loop counts twice.
    pub fn count_streets(&mut self) {
        let mut seen = ahash::AHashSet::new();
        let mut counts = vec![0i64; self.nodes.len()];
        for edge in &self.edges {
            let pair = (edge.u.min(edge.v), edge.u.max(edge.v));
            if !seen.insert(pair) { continue }
            if pair.0 == pair.1 {
                counts[pair.0] += 2;
            } else {
                counts[pair.0] += 1;
                counts[pair.1] += 1;
            }
        }
        for (node, count) in counts.into_iter().enumerate() {
            self.set_node_attr(node, "street_count", AttrValue::Int(count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, AttrValue)]) -> Attrs {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn line_graph(directed: bool) -> RoadGraph {
        let mut graph = if directed { RoadGraph::directed() } else { RoadGraph::undirected() };
        for (i, id) in [10, 20, 30].into_iter().enumerate() {
            graph.add_node(id, i as f64, 0.0, Attrs::new());
        }
        graph
    }

    #[test]
    fn add_edge_assigns_increasing_keys_for_parallel_edges() {
        let mut graph = line_graph(true);
        assert_eq!(graph.add_edge(0, 1, Attrs::new()).unwrap(), 0);
        assert_eq!(graph.add_edge(0, 1, Attrs::new()).unwrap(), 1);
        // Opposite direction is a different pair in a directed graph.
        assert_eq!(graph.add_edge(1, 0, Attrs::new()).unwrap(), 0);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn add_edge_rejects_unknown_nodes() {
        let mut graph = line_graph(true);
        assert!(graph.add_edge(0, 9, Attrs::new()).is_err());
    }

    #[test]
    fn add_node_merges_existing_id() {
        let mut graph = line_graph(true);
        let idx = graph.add_node(20, 5.0, 6.0, attrs(&[("highway", "traffic_signals".into())]));
        assert_eq!(idx, 1);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.nodes()[1].x, 5.0);
        assert!(graph.nodes()[1].attrs.contains_key("highway"));
    }

    #[test]
    fn to_undirected_collapses_reciprocal_edges() {
        let mut graph = line_graph(true);
        graph.add_edge(0, 1, attrs(&[("reversed", false.into())])).unwrap();
        graph.add_edge(1, 0, attrs(&[("reversed", true.into())])).unwrap();
        graph.add_edge(1, 2, Attrs::new()).unwrap();
        graph.add_edge(1, 2, Attrs::new()).unwrap();

        let undirected = graph.to_undirected();
        assert!(!undirected.is_directed());
        assert_eq!(undirected.node_count(), 3);
        // (0,1,0) and (1,0,0) merge; the two parallel (1,2) edges stay distinct.
        assert_eq!(undirected.edge_count(), 3);
        let merged = undirected.edge_between(1, 0).unwrap();
        assert_eq!(merged.attrs["reversed"], AttrValue::Bool(true));
    }

    #[test]
    fn induced_subgraph_is_an_independent_copy() {
        let mut graph = line_graph(false);
        graph.add_edge(0, 1, Attrs::new()).unwrap();
        graph.add_edge(1, 2, Attrs::new()).unwrap();

        let mut sub = graph.induced_subgraph(&[true, true, false]);
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
        assert_eq!(sub.node_index(30), None);

        sub.set_node_attr(0, "touched", true.into());
        assert!(graph.nodes()[0].attrs.is_empty());
    }

    #[test]
    fn count_streets_ignores_reciprocal_duplicates() {
        let mut graph = line_graph(true);
        graph.add_edge(0, 1, Attrs::new()).unwrap();
        graph.add_edge(1, 0, Attrs::new()).unwrap();
        graph.add_edge(1, 2, Attrs::new()).unwrap();
        graph.add_edge(2, 2, Attrs::new()).unwrap();
        graph.count_streets();

        let counts = graph.nodes().iter()
            .map(|n| n.attrs["street_count"].clone())
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![AttrValue::Int(1), AttrValue::Int(2), AttrValue::Int(3)]);
    }
}

use ahash::AHashSet;
use anyhow::{Context, Result, bail};

use crate::graph::{AttrValue, Attrs, RoadGraph};

impl RoadGraph {
    /// Topologically simplify the graph: every chain of interstitial nodes between two
    /// endpoints is replaced by a single edge. The new edge carries the summed `length`,
    /// the merged attributes of the chain, and a WKT `geometry` of the original path.
    pub fn simplify(&self) -> Result<RoadGraph> {
        let succ = self.successors();
        let pred = self.predecessors();
        let incident = self.incident_edges();

        let endpoints = (0..self.node_count())
            .map(|node| self.is_endpoint(node, &succ, &pred, &incident))
            .collect::<Vec<_>>();

        let mut paths = Vec::new();
        for node in (0..self.node_count()).filter(|&n| endpoints[n]) {
            for next in unique(&succ[node]) {
                if !endpoints[next] {
                    paths.push(self.build_path(node, next, &succ, &endpoints)?);
                }
            }
        }

        let mut keep = vec![true; self.node_count()];
        for path in &paths {
            path[1..path.len() - 1].iter().for_each(|&v| keep[v] = false);
        }

        let mut out = self.induced_subgraph(&keep);
        for path in &paths {
            let attrs = self.merge_path_attrs(path)?;
            let (first, last) = (path[0], path[path.len() - 1]);
            let u = out.node_index(self.nodes()[first].osmid)
                .with_context(|| format!("simplified path start {} was removed", self.nodes()[first].osmid))?;
            let v = out.node_index(self.nodes()[last].osmid)
                .with_context(|| format!("simplified path end {} was removed", self.nodes()[last].osmid))?;
            out.add_edge(u, v, attrs)?;
        }

        Ok(out)
    }

    /// Edge indices touching each node.
    fn incident_edges(&self) -> Vec<Vec<usize>> {
        let mut incident = vec![Vec::new(); self.node_count()];
        for (i, edge) in self.edges().iter().enumerate() {
            incident[edge.u].push(i);
            if edge.v != edge.u { incident[edge.v].push(i) }
        }
        incident
    }

    /// A node is an endpoint unless it only continues a single street: exactly two distinct
    /// neighbors, degree 2 (one-way) or 4 (two-way), no self-loop, and a single way id.
    fn is_endpoint(&self, node: usize, succ: &[Vec<usize>], pred: &[Vec<usize>], incident: &[Vec<usize>]) -> bool {
        let neighbors = succ[node].iter().chain(&pred[node]).copied().collect::<AHashSet<_>>();
        if neighbors.contains(&node) { return true }
        if succ[node].is_empty() || pred[node].is_empty() { return true }

        let degree = if self.is_directed() { succ[node].len() + pred[node].len() } else { succ[node].len() };
        if !(neighbors.len() == 2 && (degree == 2 || degree == 4)) { return true }

        let osmids = incident[node].iter()
            .filter_map(|&e| self.edges()[e].attrs.get("osmid"))
            .collect::<Vec<_>>();
        osmids.windows(2).any(|w| w[0] != w[1])
    }

    /// Follow successors from `endpoint` through `first` until the next endpoint.
    fn build_path(&self, endpoint: usize, first: usize, succ: &[Vec<usize>], endpoints: &[bool]) -> Result<Vec<usize>> {
        let mut path = vec![endpoint, first];
        let mut on_path = AHashSet::from_iter([endpoint, first]);

        for next in unique(&succ[first]) {
            if on_path.contains(&next) { continue }

            let mut current = next;
            path.push(current);
            on_path.insert(current);

            while !endpoints[current] {
                let candidates = unique(&succ[current]).into_iter()
                    .filter(|n| !on_path.contains(n))
                    .collect::<Vec<_>>();
                match candidates.as_slice() {
                    [only] => {
                        current = *only;
                        path.push(current);
                        on_path.insert(current);
                    }
                    // Dead end inside a loop: close it if it leads back to the start.
                    [] => {
                        if succ[current].contains(&endpoint) { path.push(endpoint) }
                        return Ok(path);
                    }
                    _ => bail!("unexpected simplification pattern at node {}", self.nodes()[current].osmid),
                }
            }
            return Ok(path);
        }

        Ok(path)
    }

    /// Merge the attributes of the edges along `path` into the attributes of one edge.
    fn merge_path_attrs(&self, path: &[usize]) -> Result<Attrs> {
        let segments = path.windows(2)
            .map(|w| self.edge_between(w[0], w[1])
                .with_context(|| format!("no edge between {} and {}",
                    self.nodes()[w[0]].osmid, self.nodes()[w[1]].osmid)))
            .collect::<Result<Vec<_>>>()?;

        let names = segments.iter()
            .flat_map(|e| e.attrs.keys())
            .collect::<std::collections::BTreeSet<_>>();

        let mut attrs = Attrs::new();
        for name in names {
            let values = segments.iter().filter_map(|e| e.attrs.get(name.as_str()).cloned());
            let merged = if name == "length" {
                Some(AttrValue::Float(values.filter_map(|v| v.as_f64()).sum()))
            } else {
                AttrValue::merge(values)
            };
            if let Some(value) = merged { attrs.insert(name.clone(), value); }
        }

        let coords = path.iter()
            .map(|&v| format!("{} {}", self.nodes()[v].x, self.nodes()[v].y))
            .collect::<Vec<_>>();
        attrs.insert("geometry".into(), AttrValue::Str(format!("LINESTRING ({})", coords.join(", "))));

        Ok(attrs)
    }
}

/// Distinct values in first-seen order.
fn unique(values: &[usize]) -> Vec<usize> {
    let mut seen = AHashSet::with_capacity(values.len());
    values.iter().copied().filter(|v| seen.insert(*v)).collect()
}

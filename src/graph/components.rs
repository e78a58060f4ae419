use std::collections::VecDeque;

use anyhow::{Result, ensure};

use crate::graph::RoadGraph;

impl RoadGraph {
    /// Connected components, ignoring edge direction (weak components for a directed graph).
    /// Components are ordered by their first node in insertion order; each lists nodes in BFS order.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let adj = self.neighbors();
        let mut visited = vec![false; self.node_count()];
        let mut components = Vec::new();

        for start in 0..self.node_count() {
            if visited[start] { continue }
            visited[start] = true;

            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                for &v in &adj[u] {
                    if !visited[v] {
                        visited[v] = true;
                        component.push(v);
                        queue.push_back(v);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    /// Copy of the subgraph induced by the component with the most nodes.
    /// On ties the first-encountered component wins.
    pub fn largest_component(&self) -> Result<RoadGraph> {
        let components = self.connected_components();
        ensure!(!components.is_empty(), "cannot take the largest component of an empty graph");

        let largest = components.iter()
            .reduce(|best, c| if c.len() > best.len() { c } else { best })
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut keep = vec![false; self.node_count()];
        largest.iter().for_each(|&v| keep[v] = true);

        Ok(self.induced_subgraph(&keep))
    }
}

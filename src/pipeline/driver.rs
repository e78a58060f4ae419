use std::thread;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    common::ensure_dir_exists,
    geom::city_polygon,
    io::write_graphml,
    osm::NetworkSource,
    pipeline::{City, ResultLog, ResultRow, ResumeTracker, Settings},
};

/// Counts for one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Sequential download-reduce-save loop over a list of cities.
pub struct Pipeline<S: NetworkSource> {
    source: S,
    settings: Settings,
    log: ResultLog,
}

impl<S: NetworkSource> Pipeline<S> {
    pub fn new(source: S, settings: Settings) -> Self {
        let log = ResultLog::new(settings.log_path());
        Self { source, settings, log }
    }

    #[inline] pub fn settings(&self) -> &Settings { &self.settings }

    #[inline] pub fn log(&self) -> &ResultLog { &self.log }

    /// Process every city not already finished, recording one log row per processed city.
    /// Per-city failures are recorded and the loop continues; only setup and log
    /// write errors abort the run.
    pub fn run(&self, cities: &[City]) -> Result<RunSummary> {
        ensure_dir_exists(&self.settings.output_dir)?;

        let dropped = self.log.compact()?;
        if dropped > 0 { info!(dropped, "compacted duplicate log rows") }

        let tracker = ResumeTracker::load(&self.log)
            .with_context(|| format!("[pipeline] Failed to read results log {}", self.log.path().display()))?;
        info!(cities = cities.len(), completed = tracker.len(), "starting run");

        let mut summary = RunSummary::default();
        for (i, city) in cities.iter().enumerate() {
            let graph_path = self.settings.graph_path(&city.name);
            if tracker.should_skip(&city.name, &graph_path) {
                info!(city = %city.name, "already processed, skipping");
                summary.skipped += 1;
                continue;
            }

            info!(city = %city.name, area_km2 = city.area_km2, "[{}/{}] downloading road network", i + 1, cities.len());
            let row = match self.process(city) {
                Ok((nodes, edges)) => {
                    info!(city = %city.name, nodes, edges, "saved {}", graph_path.display());
                    summary.succeeded += 1;
                    ResultRow::success(&city.name, nodes, edges, city.area_km2)
                }
                Err(err) => {
                    warn!(city = %city.name, "failed: {err:#}");
                    summary.failed += 1;
                    ResultRow::failed(&city.name, format!("{err:#}"), city.area_km2)
                }
            };
            self.log.append(&row)?;
            summary.processed += 1;

            if !self.settings.delay.is_zero() { thread::sleep(self.settings.delay) }
        }

        self.log.compact()?;
        info!(processed = summary.processed, succeeded = summary.succeeded,
            failed = summary.failed, skipped = summary.skipped, "run finished");
        Ok(summary)
    }

    /// Download, reduce and save one city, returning its node and edge counts.
    fn process(&self, city: &City) -> Result<(usize, usize)> {
        let polygon = city_polygon(&city.geometry, self.settings.tolerance)?;
        let graph = self.source.fetch(&polygon)
            .with_context(|| format!("download failed for {}", city.name))?;
        let graph = graph.to_undirected().largest_component()?;
        write_graphml(&graph, &self.settings.graph_path(&city.name))?;
        Ok((graph.node_count(), graph.edge_count()))
    }
}

use std::path::Path;

use ahash::AHashSet;
use anyhow::Result;

use crate::pipeline::ResultLog;

/// Cities a previous run already finished, read once when a run starts.
#[derive(Clone, Debug, Default)]
pub struct ResumeTracker {
    completed: AHashSet<String>,
}

impl ResumeTracker {
    /// Collect every city with a `success` row in `log`.
    pub fn load(log: &ResultLog) -> Result<Self> {
        let completed = log.read_rows()?.into_iter()
            .filter(|row| row.status.is_success())
            .map(|row| row.city)
            .collect();
        Ok(Self { completed })
    }

    #[inline] pub fn is_completed(&self, city: &str) -> bool { self.completed.contains(city) }

    #[inline] pub fn len(&self) -> usize { self.completed.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.completed.is_empty() }

    /// Skip a city that succeeded before or whose graph file is already on disk.
    pub fn should_skip(&self, city: &str, graph_path: &Path) -> bool {
        self.is_completed(city) || graph_path.exists()
    }
}

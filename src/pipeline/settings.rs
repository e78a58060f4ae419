use std::{path::{Path, PathBuf}, time::Duration};

/// Default directory for graph files and the results log.
pub const DEFAULT_OUTPUT_DIR: &str = "data/city_road_networks";

/// Default results log file name, relative to the output directory.
pub const DEFAULT_LOG_NAME: &str = "city_road_stats.csv";

/// Default text encoding label for shapefile attribute tables.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Default boundary simplification tolerance, in degrees.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Default pause after each processed city.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// Where and how a pipeline run writes its results.
#[derive(Clone, Debug)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub log_name: String,
    /// Douglas-Peucker tolerance for city boundaries; `0` disables simplification.
    pub tolerance: f64,
    /// Pause after every processed (not skipped) city.
    pub delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_name: DEFAULT_LOG_NAME.to_string(),
            tolerance: DEFAULT_TOLERANCE,
            delay: DEFAULT_DELAY,
        }
    }
}

impl Settings {
    /// Default settings writing into `output_dir`.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self { output_dir: output_dir.as_ref().to_path_buf(), ..Default::default() }
    }

    /// Path of the results log.
    #[inline] pub fn log_path(&self) -> PathBuf { self.output_dir.join(&self.log_name) }

    /// Path of the graph file for `city`. Path separators in the name are replaced.
    pub fn graph_path(&self, city: &str) -> PathBuf {
        let file_name = city.replace(['/', '\\'], "_");
        self.output_dir.join(format!("{file_name}.graphml"))
    }
}

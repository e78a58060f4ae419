mod city;
mod driver;
mod log;
mod record;
mod resume;
mod settings;

pub use city::{City, load_cities};
pub use driver::{Pipeline, RunSummary};
pub use log::ResultLog;
pub use record::{ResultRow, Status};
pub use resume::ResumeTracker;
pub use settings::{DEFAULT_DELAY, DEFAULT_ENCODING, DEFAULT_LOG_NAME, DEFAULT_OUTPUT_DIR, DEFAULT_TOLERANCE, Settings};

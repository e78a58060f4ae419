use std::{fmt, str::FromStr};

use anyhow::{Result, bail};

const SUCCESS: &str = "success";
const FAILED_PREFIX: &str = "failed: ";

/// Outcome of processing one city.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    /// Failure with its error message.
    Failed(String),
}

impl Status {
    #[inline] pub fn is_success(&self) -> bool { matches!(self, Status::Success) }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str(SUCCESS),
            Status::Failed(reason) => write!(f, "{FAILED_PREFIX}{reason}"),
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == SUCCESS { return Ok(Status::Success) }
        match s.strip_prefix("failed:") {
            Some(reason) => Ok(Status::Failed(reason.trim_start().to_string())),
            None => bail!("unrecognized status {s:?}"),
        }
    }
}

/// One line of the results log.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRow {
    pub city: String,
    pub status: Status,
    pub nodes: Option<usize>,
    pub edges: Option<usize>,
    pub area_km2: Option<f64>,
}

impl ResultRow {
    /// Row for a city whose graph was saved.
    pub fn success(city: impl Into<String>, nodes: usize, edges: usize, area_km2: f64) -> Self {
        Self { city: city.into(), status: Status::Success, nodes: Some(nodes), edges: Some(edges), area_km2: Some(area_km2) }
    }

    /// Row for a city that failed; counts stay empty.
    pub fn failed(city: impl Into<String>, reason: impl Into<String>, area_km2: f64) -> Self {
        Self { city: city.into(), status: Status::Failed(reason.into()), nodes: None, edges: None, area_km2: Some(area_km2) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        let failed = Status::Failed("timeout: no response".into());
        assert_eq!(failed.to_string(), "failed: timeout: no response");
        assert_eq!("failed: timeout: no response".parse::<Status>().unwrap(), failed);
        assert_eq!(" success ".parse::<Status>().unwrap(), Status::Success);
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn failed_rows_have_no_counts() {
        let row = ResultRow::failed("X", "boom", 1.5);
        assert!(!row.status.is_success());
        assert_eq!((row.nodes, row.edges), (None, None));
    }
}

use std::{fmt, str::FromStr};

use anyhow::{Result, bail};

/// Which kind of street network to request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NetworkType {
    /// Public drivable streets, excluding service roads.
    Drive,
    /// Drivable streets including service roads.
    #[default]
    DriveService,
    /// Everything pedestrians can use.
    Walk,
    /// Everything cyclists can use.
    Bike,
    /// All non-private ways.
    All,
}

impl NetworkType {
    /// Overpass QL tag filter selecting the ways of this network.
    pub fn filter(&self) -> &'static str {
        match self {
            NetworkType::Drive => concat!(
                r#"["highway"]["area"!~"yes"]["access"!~"private"]"#,
                r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|"#,
                r#"escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|service|steps|track"]"#,
                r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
                r#"["service"!~"alley|driveway|emergency_access|parking|parking_aisle|private"]"#,
            ),
            NetworkType::DriveService => concat!(
                r#"["highway"]["area"!~"yes"]["access"!~"private"]"#,
                r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|"#,
                r#"escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|steps|track"]"#,
                r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
                r#"["service"!~"emergency_access|parking|parking_aisle|private"]"#,
            ),
            NetworkType::Walk => concat!(
                r#"["highway"]["area"!~"yes"]["access"!~"private"]"#,
                r#"["highway"!~"abandoned|bus_guideway|construction|cycleway|motor|no|planned|platform|"#,
                r#"proposed|raceway|razed"]"#,
                r#"["foot"!~"no"]["service"!~"private"]"#,
            ),
            NetworkType::Bike => concat!(
                r#"["highway"]["area"!~"yes"]["access"!~"private"]"#,
                r#"["highway"!~"abandoned|bus_guideway|construction|corridor|elevator|escalator|footway|"#,
                r#"motor|no|planned|platform|proposed|raceway|razed|steps"]"#,
                r#"["bicycle"!~"no"]["service"!~"private"]"#,
            ),
            NetworkType::All => concat!(
                r#"["highway"]["area"!~"yes"]["access"!~"private"]"#,
                r#"["highway"!~"abandoned|construction|no|planned|platform|proposed|raceway|razed"]"#,
                r#"["service"!~"private"]"#,
            ),
        }
    }

    /// Pedestrians may walk either way down a one-way street.
    #[inline] pub fn is_bidirectional(&self) -> bool { matches!(self, NetworkType::Walk) }

    /// Canonical name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Drive => "drive",
            NetworkType::DriveService => "drive_service",
            NetworkType::Walk => "walk",
            NetworkType::Bike => "bike",
            NetworkType::All => "all",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for NetworkType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "drive" => NetworkType::Drive,
            "drive_service" => NetworkType::DriveService,
            "walk" => NetworkType::Walk,
            "bike" => NetworkType::Bike,
            "all" => NetworkType::All,
            other => bail!("unknown network type {other:?} (expected drive, drive_service, walk, bike or all)"),
        })
    }
}

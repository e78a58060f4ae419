use std::path::PathBuf;

/// City road network downloader
#[derive(clap::Parser, Debug)]
#[command(name = "cityroads", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Download, reduce and save the road network of every city in a boundary shapefile
    Fetch(FetchArgs),

    /// Collapse a results log to one row per city
    Compact(CompactArgs),
}

/// Street network kinds selectable on the command line.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum NetworkKind {
    Drive,
    DriveService,
    Walk,
    Bike,
    All,
}

impl From<NetworkKind> for cityroads::NetworkType {
    fn from(kind: NetworkKind) -> Self {
        match kind {
            NetworkKind::Drive => Self::Drive,
            NetworkKind::DriveService => Self::DriveService,
            NetworkKind::Walk => Self::Walk,
            NetworkKind::Bike => Self::Bike,
            NetworkKind::All => Self::All,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// City boundary shapefile (.shp) with a name/NAME column
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Directory for graph files and the results log
    #[arg(short, long, value_hint = clap::ValueHint::DirPath, default_value = cityroads::DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Results log file name inside the output directory
    #[arg(long, default_value = cityroads::DEFAULT_LOG_NAME)]
    pub log_name: String,

    /// Text encoding of the shapefile attribute table, e.g. utf-8, gb18030
    #[arg(long, default_value = cityroads::DEFAULT_ENCODING)]
    pub encoding: String,

    /// Which street network to download
    #[arg(long, value_enum, default_value_t = NetworkKind::DriveService)]
    pub network_type: NetworkKind,

    /// Boundary simplification tolerance in degrees (0 disables)
    #[arg(long, default_value_t = cityroads::DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// Seconds to wait after each processed city
    #[arg(long, default_value_t = cityroads::DEFAULT_DELAY.as_secs())]
    pub delay_secs: u64,

    /// Overpass API interpreter endpoint
    #[arg(long, default_value = cityroads::DEFAULT_OVERPASS_URL)]
    pub overpass_url: String,

    /// Overpass query and HTTP timeout in seconds
    #[arg(long, default_value_t = cityroads::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Largest polygon area (m²) sent in one query; larger boundaries are split
    #[arg(long, default_value_t = cityroads::DEFAULT_MAX_QUERY_AREA_M2)]
    pub max_query_area: f64,
}

#[derive(clap::Args, Debug)]
pub struct CompactArgs {
    /// Results log to compact in place
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub log: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn fetch_defaults_come_from_the_library() {
        let cli = Cli::try_parse_from(["cityroads", "fetch", "--input", "cities.shp"]).unwrap();
        let Commands::Fetch(args) = cli.command else { panic!("expected fetch") };

        assert_eq!(args.output, PathBuf::from(cityroads::DEFAULT_OUTPUT_DIR));
        assert_eq!(args.log_name, cityroads::DEFAULT_LOG_NAME);
        assert_eq!(args.encoding, cityroads::DEFAULT_ENCODING);
        assert_eq!(args.tolerance, cityroads::DEFAULT_TOLERANCE);
        assert_eq!(args.delay_secs, cityroads::DEFAULT_DELAY.as_secs());
        assert_eq!(args.timeout_secs, cityroads::DEFAULT_TIMEOUT_SECS);
        assert_eq!(args.overpass_url, cityroads::DEFAULT_OVERPASS_URL);
    }
}

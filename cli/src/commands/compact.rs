use anyhow::Result;
use cityroads::ResultLog;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CompactArgs) -> Result<()> {
    let dropped = ResultLog::new(&args.log).compact()?;
    eprintln!("[compact] {}: removed {dropped} duplicate rows", args.log.display());
    Ok(())
}

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::version::types::{Cutoff, RegistryType};

#[derive(Parser, Debug)]
#[command(name = "pkgtime")]
#[command(
    version,
    about = "Find the newest version of each package that existed on a given date",
    subcommand_precedence_over_arg = true,
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// The package manager to use
    #[arg(value_enum)]
    pub manager: Option<RegistryType>,

    /// The cutoff date (YYYY-MM-DD); releases from that day still count
    pub date: Option<Cutoff>,

    /// List of packages to check
    pub packages: Vec<String>,

    /// Show every candidate release and why it was accepted or skipped
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this JSON file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write JSON logs to the data directory
    #[arg(long, global = true)]
    pub log: bool,
}

impl Cli {
    /// `MANAGER` and `DATE`, which are required unless a subcommand is given
    pub fn manager_and_date(&self) -> Result<(RegistryType, Cutoff), clap::Error> {
        match (self.manager, self.date) {
            (Some(manager), Some(date)) => Ok((manager, date)),
            _ => Err(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "<MANAGER> and <DATE> are required unless a subcommand is used",
            )),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find versions that were "latest" during an anchor package-version window
    /// (from the anchor release time until the next release time).
    Overlap(OverlapArgs),
}

#[derive(Args, Debug)]
pub struct OverlapArgs {
    /// The package manager to use
    #[arg(value_enum)]
    pub manager: RegistryType,

    /// Anchor in the form <package>==<version>
    pub anchor: String,

    /// List of packages to check
    #[arg(required = true)]
    pub packages: Vec<String>,
}

use std::process::ExitCode;

use clap::Parser;

use pkgtime::cli::{self, Cli};
use pkgtime::config::log_path;
use pkgtime::logging;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_file = cli.log.then(log_path);
    let _guard = logging::init(cli.verbose, log_file.as_deref())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(cli::run(cli))
}

//! Command-line front end

pub mod args;
pub mod output;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::warn;

use crate::config::PkgtimeConfig;
use crate::version::batch::BatchRunner;
use crate::version::http::HttpClient;
use crate::version::error::ResolveError;
use crate::version::overlap::{
    WindowedVersion, anchor_window, parse_anchor, versions_overlapping_window,
};
use crate::version::registries::build_registries;
use crate::version::resolver::{Resolution, Resolver};
use crate::version::types::{Cutoff, PackageRef, RegistryType};

pub use args::{Cli, Command, OverlapArgs};
use output::ColorSupport;

/// Runs the parsed command line and returns the process exit status
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = PkgtimeConfig::load(cli.config.as_deref())?;
    let http = HttpClient::new(&config.http).context("Failed to build HTTP client")?;
    let resolver = Arc::new(Resolver::new(build_registries(&config.registries, &http)));
    let runner = BatchRunner::new(resolver, &config.batch);
    let colors = ColorSupport::detect();

    match &cli.command {
        Some(Command::Overlap(args)) => run_overlap(&runner, args, &colors).await,
        None => {
            let (manager, cutoff) = cli.manager_and_date().unwrap_or_else(|e| e.exit());
            run_resolve(&runner, manager, cutoff, &cli.packages, &colors).await
        }
    }
}

async fn run_resolve(
    runner: &BatchRunner,
    manager: RegistryType,
    cutoff: Cutoff,
    names: &[String],
    colors: &ColorSupport,
) -> anyhow::Result<ExitCode> {
    let resolutions = runner
        .run_names_until(manager, names, cutoff, interrupted())
        .await;
    println!(
        "{}",
        output::render_report(manager, cutoff, &resolutions, colors)
    );

    Ok(exit_status(&resolutions))
}

async fn run_overlap(
    runner: &BatchRunner,
    args: &OverlapArgs,
    colors: &ColorSupport,
) -> anyhow::Result<ExitCode> {
    let (anchor_name, anchor_version) = parse_anchor(&args.anchor)?;
    let anchor = PackageRef::new(args.manager, &anchor_name)?;
    let resolver = runner.resolver();

    let anchor_timeline = resolver
        .release_timeline(&anchor)
        .await
        .with_context(|| format!("Failed to fetch releases for anchor package '{anchor_name}'"))?;
    let (window_start, window_end) =
        anchor_window(&anchor_name, &anchor_version, &anchor_timeline, Utc::now())?;

    println!(
        "{}",
        output::overlap_header(
            &format!("{anchor_name}=={anchor_version}"),
            window_start,
            window_end,
            colors
        )
    );

    let outcomes = overlap_outcomes(
        resolver,
        args.manager,
        &args.packages,
        window_start,
        window_end,
    )
    .await;

    let mut errors = Vec::new();
    for (name, outcome) in args.packages.iter().map(|name| name.trim()).zip(&outcomes) {
        println!("{}", output::overlap_line(name, outcome, colors));
        if let Err(e) = outcome {
            errors.push(format!("{}: {}", name, e));
        }
    }
    for line in output::error_section(&errors, colors) {
        println!("{line}");
    }

    let any_ok = outcomes.iter().any(Result::is_ok);
    Ok(if outcomes.is_empty() || any_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Versions of each named package that were newest during the window, in input order
///
/// An invalid name fails only its own entry.
async fn overlap_outcomes(
    resolver: &Resolver,
    manager: RegistryType,
    names: &[String],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<Result<Vec<WindowedVersion>, ResolveError>> {
    join_all(names.iter().map(|name| async move {
        let package = PackageRef::new(manager, name)?;
        let timeline = resolver.release_timeline(&package).await?;
        Ok::<_, ResolveError>(versions_overlapping_window(
            &timeline,
            window_start,
            window_end,
        ))
    }))
    .await
}

/// Success when at least one package resolved, or there was nothing to resolve
pub fn exit_status(resolutions: &[Resolution]) -> ExitCode {
    if resolutions.is_empty() || resolutions.iter().any(Resolution::is_resolved) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Completes on Ctrl-C; never completes if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

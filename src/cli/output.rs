//! Terminal rendering of resolution results
//!
//! Everything here builds plain strings; printing happens in the caller.

use std::env;
use std::io::{self, IsTerminal};

use crate::version::error::ResolveError;
use crate::version::overlap::WindowedVersion;
use crate::version::resolver::Resolution;
use crate::version::types::{Cutoff, RegistryType};

const RULE_WIDTH: usize = 60;

/// Color support detection and formatting
#[derive(Debug, Clone, Copy)]
pub struct ColorSupport {
    enabled: bool,
}

impl ColorSupport {
    /// Detect color support from `NO_COLOR` and the attached terminal
    pub fn detect() -> Self {
        Self {
            enabled: should_use_colors_with(
                env::var_os("NO_COLOR").is_some(),
                io::stdout().is_terminal(),
            ),
        }
    }

    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    pub fn bright_green(&self, text: &str) -> String {
        self.paint("92", text)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    pub fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }
}

/// Colors are used only on a terminal, and never when `NO_COLOR` is set
pub fn should_use_colors_with(no_color: bool, is_terminal: bool) -> bool {
    !no_color && is_terminal
}

/// Pinned requirement for one package in the manager's own syntax
pub fn install_spec(manager: RegistryType, name: &str, version: &str) -> String {
    match manager {
        RegistryType::Pip => format!("{name}=={version}"),
        RegistryType::Npm => format!("{name}@{version}"),
        RegistryType::Cargo => format!("{name} = \"={version}\""),
        RegistryType::Gem => format!("gem '{name}', '{version}'"),
        RegistryType::Composer => format!("{name}:{version}"),
    }
}

/// Install command or manifest snippet for all pinned requirements
pub fn install_instructions(manager: RegistryType, specs: &[String]) -> Vec<String> {
    match manager {
        RegistryType::Pip => vec![format!("pip install {}", specs.join(" "))],
        RegistryType::Npm => vec![format!("npm install {}", specs.join(" "))],
        RegistryType::Composer => vec![format!("composer require {}", specs.join(" "))],
        RegistryType::Cargo => std::iter::once("# Cargo.toml dependencies:".to_string())
            .chain(specs.iter().cloned())
            .collect(),
        RegistryType::Gem => std::iter::once("# Gemfile:".to_string())
            .chain(specs.iter().cloned())
            .collect(),
    }
}

pub fn search_header(manager: RegistryType, cutoff: Cutoff, colors: &ColorSupport) -> String {
    format!(
        "--- Searching for {} packages up to {} ---",
        colors.yellow(manager.registry_name()),
        colors.yellow(&cutoff.date().to_string())
    )
}

pub fn resolution_line(resolution: &Resolution, colors: &ColorSupport) -> String {
    let name = resolution.requested.as_str();
    match &resolution.outcome {
        Ok(resolved) => format!(
            "✅ {}: {} (from {})",
            colors.green(name),
            colors.bold(&resolved.version),
            resolved.published_at.date_naive()
        ),
        Err(e) => format!("❌ {}: {}", colors.red(name), e),
    }
}

/// Full report for a batch: result lines, install instructions, then errors
pub fn render_report(
    manager: RegistryType,
    cutoff: Cutoff,
    resolutions: &[Resolution],
    colors: &ColorSupport,
) -> String {
    let mut lines = vec![search_header(manager, cutoff, colors)];
    lines.extend(resolutions.iter().map(|r| resolution_line(r, colors)));
    lines.push("-".repeat(RULE_WIDTH));

    let specs: Vec<String> = resolutions
        .iter()
        .filter_map(|r| {
            let resolved = r.outcome.as_ref().ok()?;
            Some(install_spec(manager, &r.requested, &resolved.version))
        })
        .collect();

    if !specs.is_empty() {
        lines.push("Copy and paste into your configuration:".to_string());
        lines.push(String::new());
        lines.extend(
            install_instructions(manager, &specs)
                .iter()
                .map(|line| colors.bright_green(line)),
        );
        lines.push(String::new());
    }

    let errors: Vec<String> = resolutions
        .iter()
        .filter_map(|r| {
            let e = r.outcome.as_ref().err()?;
            Some(format!("{}: {}", r.requested, e))
        })
        .collect();
    lines.extend(error_section(&errors, colors));

    lines.join("\n")
}

pub fn overlap_header(
    anchor: &str,
    window_start: chrono::DateTime<chrono::Utc>,
    window_end: chrono::DateTime<chrono::Utc>,
    colors: &ColorSupport,
) -> String {
    [
        format!("--- Overlap window for {} ---", colors.yellow(anchor)),
        format!(
            "Window: {} -> {}",
            colors.yellow(&window_start.to_rfc3339()),
            colors.yellow(&window_end.to_rfc3339())
        ),
        "-".repeat(RULE_WIDTH),
    ]
    .join("\n")
}

pub fn overlap_line(
    package: &str,
    outcome: &Result<Vec<WindowedVersion>, ResolveError>,
    colors: &ColorSupport,
) -> String {
    match outcome {
        Ok(versions) if versions.is_empty() => format!(
            "{}: {}",
            colors.yellow(package),
            colors.dim("no overlapping latest versions")
        ),
        Ok(versions) => {
            let parts: Vec<String> = versions
                .iter()
                .map(|v| {
                    format!(
                        "{} ({}..{})",
                        colors.bold(&v.version),
                        v.overlap_start.date_naive(),
                        v.overlap_end.date_naive()
                    )
                })
                .collect();
            format!("{}: {}", colors.green(package), parts.join(", "))
        }
        Err(e) => format!("❌ {}: {}", colors.red(package), e),
    }
}

/// "Attention to errors" block; empty when there is nothing to report
pub fn error_section(errors: &[String], colors: &ColorSupport) -> Vec<String> {
    if errors.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![String::new(), colors.yellow("Attention to errors:")];
    lines.extend(errors.iter().map(|e| format!(" - {e}")));
    lines
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sleeve CLI: place wall openings for every duct and pipe of a session.
//!
//! Usage:
//!   sleeve <session.json> [--output <file>] [--report <file>] [--dry-run]
//!
//! Placement settings come from `SLEEVE_*` environment variables; log
//! verbosity from `RUST_LOG`.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use sleeve_placement::{MepKind, PlacementConfig, PlacementReport, Placer};
use sleeve_scene::{SceneWriter, Session};

#[derive(Debug, Default, PartialEq)]
struct Args {
    session: PathBuf,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
    dry_run: bool,
}

/// Parses argv without the program name. `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Args>> {
    let Some(first) = args.first() else {
        return Ok(None);
    };
    if first == "--help" || first == "-h" {
        return Ok(None);
    }

    let mut parsed = Args {
        session: PathBuf::from(first),
        ..Args::default()
    };

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--output" | "-o" => {
                let value = rest.next().context("--output needs a file path")?;
                parsed.output = Some(PathBuf::from(value));
            }
            "--report" | "-r" => {
                let value = rest.next().context("--report needs a file path")?;
                parsed.report = Some(PathBuf::from(value));
            }
            "--dry-run" | "-n" => parsed.dry_run = true,
            "--help" | "-h" => return Ok(None),
            other => bail!("unknown option: {other}"),
        }
    }
    Ok(Some(parsed))
}

fn print_usage() {
    eprintln!("Usage: sleeve <session.json> [options]");
    eprintln!();
    eprintln!("Places a sized opening wherever a duct or pipe crosses a wall.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>   Write the updated session here (default: in place)");
    eprintln!("  -r, --report <file>   Write the placement report as JSON");
    eprintln!("  -n, --dry-run         Plan only; do not create openings");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SLEEVE_TEMPLATE_FAMILY      opening template family (Opening)");
    eprintln!("  SLEEVE_WIDTH_PARAMETER      width parameter name (Width)");
    eprintln!("  SLEEVE_HEIGHT_PARAMETER     height parameter name (Height)");
    eprintln!("  SLEEVE_SYSTEMS_PATTERN      systems document title substring (_Systems)");
    eprintln!("  SLEEVE_TRANSACTION_NAME     transaction name (Place openings)");
    eprintln!("  SLEEVE_COMMIT_POLICY        per_stream | single_run");
    eprintln!("  SLEEVE_EMPTY_STREAM_POLICY  skip | abort");
}

fn run(args: &Args) -> Result<PlacementReport> {
    let config = PlacementConfig::from_env();
    let mut session = Session::load(&args.session)
        .with_context(|| format!("loading {}", args.session.display()))?;

    let plan = {
        let host = session.host()?;
        let systems = session.systems(&config.systems_title_pattern)?;
        Placer::new(&config).plan(&host, systems)?
    };

    if args.dry_run {
        tracing::info!(openings = plan.openings().count(), "Dry run, nothing written");
        return Ok(plan.report());
    }

    let report = {
        let mut writer = SceneWriter::new(session.host_document_mut()?);
        plan.apply(&mut writer)?
    };

    let output = args.output.as_ref().unwrap_or(&args.session);
    session
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(path = %output.display(), "Saved session");

    Ok(report)
}

fn print_summary(report: &PlacementReport) {
    println!("=== Sleeve placement ===");
    for kind in MepKind::ALL {
        let stats = report.stats(kind);
        println!(
            "{:<6} elements {:>4}  skipped {:>3}  crossings {:>4}  openings {:>4}",
            kind.plural(),
            stats.elements,
            stats.skipped_elements,
            stats.crossings,
            stats.openings
        );
    }
    if !report.diagnostics.is_empty() {
        println!();
        println!("{} diagnostics:", report.diagnostics.len());
        for d in &report.diagnostics {
            println!("  [{}] {}", d.code, d.message);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,sleeve_placement=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = env::args().skip(1).collect();
    let Some(args) = parse_args(&argv)? else {
        print_usage();
        return Ok(());
    };

    let report = run(&args)?;
    print_summary(&report);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}

//! GridKit CLI - row-streaming raster map tools

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gridkit_core::history::History;
use gridkit_core::io::{RowSource, Workspace};
use gridkit_core::raster::RowBuf;
use gridkit_core::scan::{times_two, RowScanner};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "gridkit")]
#[command(author, version, about = "Row-streaming raster map tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace directory containing mapsets
    #[arg(short, long, global = true, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Multiply every cell of a raster map by two
    TimesTwo {
        /// Input raster map name
        #[arg(long)]
        input: String,
        /// Output raster map name
        #[arg(long)]
        output: String,
        /// Mapset to write into (defaults to the input's mapset)
        #[arg(long)]
        mapset: Option<String>,
    },
    /// Show information about a raster map
    Info {
        /// Raster map name
        name: String,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn row_progress(rows: u64) -> ProgressBar {
    let pb = ProgressBar::new(rows);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} rows")
            .unwrap(),
    );
    pb
}

fn done(name: &str, map: &str, mapset: &str, elapsed: std::time::Duration) {
    println!("{} saved to: {}@{}", name, map, mapset);
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let ws = Workspace::open(&cli.workspace).context("Failed to open workspace")?;

    match cli.command {
        Commands::TimesTwo {
            input,
            output,
            mapset,
        } => {
            let found = ws.locate(&input)?;
            let mut reader = ws.open_for_read(&input, &found)?;
            let geometry = reader.geometry();
            let kind = reader.kind()?;
            info!("Input: {} x {} ({})", geometry.cols, geometry.rows, kind);

            let target = mapset.unwrap_or_else(|| found.clone());
            let mut writer = ws.open_for_write(&output, &target, kind, geometry)?;

            let pb = row_progress(geometry.rows as u64);
            let start = Instant::now();
            let report = RowScanner::new()
                .on_progress(|row, _| pb.set_position(row as u64))
                .scan(&mut reader, &mut writer, times_two)
                .context("Scan failed")?;
            writer.finish()?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            // Provenance is advisory; the written map stays valid even
            // if recording fails.
            let command_line = std::env::args().collect::<Vec<_>>().join(" ");
            if let Err(e) = ws.write_history(&output, &target, &History::for_command(command_line))
            {
                warn!("Failed to record history for <{}>: {}", output, e);
            }

            info!(
                "Scanned {} rows x {} cols ({})",
                report.rows, report.cols, report.kind
            );
            done("Times-two", &output, &target, elapsed);
        }

        Commands::Info { name } => {
            let mapset = ws.locate(&name)?;
            let mut reader = ws.open_for_read(&name, &mapset)?;
            let geometry = reader.geometry();
            let kind = reader.kind()?;

            println!("Map: {}@{}", name, mapset);
            println!(
                "Dimensions: {} x {} ({} cells)",
                geometry.cols,
                geometry.rows,
                geometry.cells()
            );
            println!("Storage kind: {}", kind);

            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            let mut sum = 0.0;
            let mut buf = RowBuf::zeros(kind, geometry.cols);
            for row in 0..geometry.rows {
                reader.read_row(row, &mut buf)?;
                for cell in buf.cells() {
                    let v = cell.to_compute();
                    min = min.min(v);
                    max = max.max(v);
                    sum += v;
                }
            }
            if geometry.cells() > 0 {
                println!("\nStatistics:");
                println!("  Min: {:.4}", min);
                println!("  Max: {:.4}", max);
                println!("  Mean: {:.4}", sum / geometry.cells() as f64);
            }

            if let Some(history) = ws.read_history(&name, &mapset)? {
                println!("\nHistory:");
                println!("  Created: {}", history.created);
                println!("  Creator: {}", history.creator);
                println!("  Command: {}", history.command_line);
            }
        }
    }

    Ok(())
}

//! Read a fills CSV export, match buys and sells per instrument (LIFO) and print the lots
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lotmatch::logging::init_tracing;
use lotmatch::report::{reconcile_all, render_json, render_table};
use lotmatch::source::{group_by_instrument, read_fills_path};
use lotmatch::{MatchConfig, RemainderTotal};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "lotmatch", version, about)]
struct Cli {
    /// fills CSV export
    file: PathBuf,

    /// compute split remainder totals as size + price, matching old reports
    #[arg(long, env = "LOTMATCH_LEGACY_REMAINDER_TOTAL")]
    legacy_remainder_total: bool,

    #[arg(long, value_enum, default_value = "table", env = "LOTMATCH_FORMAT")]
    format: Format,

    /// print every fill, sorted by instrument and time, before the report
    #[arg(long)]
    show_trades: bool,

    /// JSON log lines on stderr
    #[arg(long, env = "LOTMATCH_JSON_LOG")]
    json_log: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_log).context("failed to install tracing subscriber")?;

    let config = MatchConfig {
        remainder_total: if cli.legacy_remainder_total {
            RemainderTotal::Legacy
        } else {
            RemainderTotal::Corrected
        },
    };

    let trades = read_fills_path(&cli.file)
        .with_context(|| format!("failed to read fills from {}", cli.file.display()))?;
    info!(file = %cli.file.display(), fills = trades.len(), "fills loaded");

    let groups = group_by_instrument(trades);
    let reports = reconcile_all(&groups, &config).context("reconciliation failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.show_trades {
        for trade in groups.values().flatten() {
            writeln!(out, "{}", trade)?;
        }
        writeln!(out)?;
    }
    match cli.format {
        Format::Table => render_table(&mut out, &reports)?,
        Format::Json => render_json(&mut out, &reports)?,
    }
    out.flush()?;
    Ok(())
}

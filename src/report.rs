use crate::config::MatchConfig;
use crate::error::ReconcileError;
use crate::lot::LotMatch;
use crate::reconciler::reconcile_with;
use crate::trade::TradeRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::info;

pub const TABLE_HEADER: &str =
    "Security\tOpenDate\tOpen Price\t\t\tQuantity\tFee\tClose Date\t\tClose Price\t\t\tCost Basis";

/// Lot matches of every instrument, keyed by instrument
pub type Reports = BTreeMap<String, Vec<LotMatch>>;

/// Run the reconciler once per instrument.  The first failing instrument aborts the run.
pub fn reconcile_all(
    groups: &BTreeMap<String, Vec<TradeRecord>>,
    config: &MatchConfig,
) -> Result<Reports, ReconcileError> {
    let mut reports = Reports::new();
    for (instrument, trades) in groups {
        let lots = reconcile_with(trades, config)?;
        info!(
            %instrument,
            trades = trades.len(),
            lots = lots.len(),
            open = lots.iter().filter(|l| l.is_open()).count(),
            "instrument reconciled"
        );
        reports.insert(instrument.clone(), lots);
    }
    Ok(reports)
}

/// Tab separated table, one block per instrument followed by a blank line
pub fn render_table<W: Write>(w: &mut W, reports: &Reports) -> io::Result<()> {
    for lots in reports.values() {
        writeln!(w, "{}", TABLE_HEADER)?;
        for lot in lots {
            writeln!(w, "{}", format_row(lot))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn render_json<W: Write>(w: &mut W, reports: &Reports) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, reports)?;
    writeln!(w)
}

/// Table row: security, open date, open price, quantity, fee and for closed lots
/// close date, close price, cost basis
pub fn format_row(lot: &LotMatch) -> String {
    let buy = lot.buy();
    let mut row = format!(
        "{}\t\t{}\t\t{}\t\t\t{}\t{}",
        buy.instrument(),
        format_date(buy.timestamp()),
        format_amount(buy.price()),
        format_amount(buy.size()),
        format_amount(buy.fee()),
    );
    if let (Some(sell), Some(basis)) = (lot.sell(), lot.cost_basis()) {
        row.push_str(&format!(
            "\t{}\t\t{}\t\t\t{}",
            format_date(sell.timestamp()),
            format_amount(sell.price()),
            format_amount(basis),
        ));
    }
    row
}

/// At most six decimals, no trailing zeros
pub fn format_amount(value: f64) -> String {
    let s = format!("{:.6}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_owned()
    } else {
        s.to_owned()
    }
}

/// month-day-year, UTC
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%m-%d-%Y").to_string()
}

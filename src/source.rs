//! Reads exchange "fills" CSV exports into [`TradeRecord`]s and groups them by instrument.
//!
//! Expected layout, one header line then one fill per line:
//!
//! ```text
//! portfolio,trade id,product,side,created at,size,size unit,price,fee,total,price/fee/total unit
//! default,7204216,ADA-USD,BUY,2021-05-07T16:17:11.940Z,589.19,ADA,1.7039,5.019604205,-1008.940445205,USD
//! ```

use crate::error::ReconcileError;
use crate::inventory::Side;
use crate::trade::{parse_number, parse_timestamp, TradeRecord};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Header the fills export must start with, compared after trimming
pub const FILLS_HEADER: [&str; 11] = [
    "portfolio",
    "trade id",
    "product",
    "side",
    "created at",
    "size",
    "size unit",
    "price",
    "fee",
    "total",
    "price/fee/total unit",
];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("unexpected CSV header: {found:?}")]
    Header { found: Vec<String> },
    #[error("line {line}: {source}")]
    Record {
        line: u64,
        #[source]
        source: ReconcileError,
    },
}

// unit columns and portfolio are not needed
#[derive(Debug, Deserialize)]
struct FillRow {
    #[serde(rename = "trade id")]
    trade_id: String,
    product: String,
    side: String,
    #[serde(rename = "created at")]
    created_at: String,
    size: String,
    price: String,
    fee: String,
    total: String,
}

impl FillRow {
    fn into_trade(self) -> Result<TradeRecord, ReconcileError> {
        let id = self.trade_id.as_str();
        TradeRecord::new(
            id,
            self.product.as_str(),
            Side::parse_lenient(&self.side),
            parse_timestamp(id, &self.created_at)?,
            parse_number(id, "size", &self.size)?,
            parse_number(id, "price", &self.price)?,
            parse_number(id, "fee", &self.fee)?,
            parse_number(id, "total", &self.total)?,
        )
    }
}

/// Read every fill from `reader`, in file order
pub fn read_fills<R: io::Read>(reader: R) -> Result<Vec<TradeRecord>, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if !headers.iter().eq(FILLS_HEADER.iter().copied()) {
        return Err(SourceError::Header {
            found: headers.iter().map(str::to_owned).collect(),
        });
    }

    let mut trades = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: FillRow = record.deserialize(Some(&headers))?;
        let trade = row
            .into_trade()
            .map_err(|source| SourceError::Record { line, source })?;
        trades.push(trade);
    }
    debug!(fills = trades.len(), "fills loaded");
    Ok(trades)
}

pub fn read_fills_path<P: AsRef<Path>>(path: P) -> Result<Vec<TradeRecord>, SourceError> {
    let f = File::open(path)?;
    read_fills(io::BufReader::new(f))
}

/// Group trades by instrument, each group sorted by timestamp.  Sorting is stable so fills
/// with the same timestamp keep file order.
pub fn group_by_instrument(trades: Vec<TradeRecord>) -> BTreeMap<String, Vec<TradeRecord>> {
    let mut grouped: BTreeMap<String, Vec<TradeRecord>> = BTreeMap::new();
    for trade in trades {
        grouped
            .entry(trade.instrument().to_owned())
            .or_default()
            .push(trade);
    }
    for trades in grouped.values_mut() {
        trades.sort_by_key(|t| t.timestamp());
    }
    grouped
}

#[cfg(test)]
mod tests {

    use super::*;

    const HEADER: &str =
        "portfolio,trade id,product,side,created at,size,size unit,price,fee,total,price/fee/total unit";

    #[test]
    fn read_coinbase_fills() {
        let data = format!(
            "{}\n{}\n{}\n",
            HEADER,
            "default, 7204216, ADA-USD, BUY, 2021-05-07T16:17:11.940Z, 589.19000000, ADA, 1.7039, 5.019604205, -1008.940445205, USD",
            "default,7204217,ADA-USD,sell,2021-05-08T09:00:00.000Z,100,ADA,1.9,0.95,189.05,USD",
        );
        let trades = read_fills(data.as_bytes()).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].trade_id(), "7204216");
        assert_eq!(trades[0].side(), Side::Buy);
        assert_eq!(trades[0].size(), 589.19);
        assert_eq!(trades[0].price(), 1.7039);
        assert_eq!(trades[0].fee(), 5.019604205);
        assert_eq!(trades[0].total(), -1008.940445205);
        assert_eq!(trades[1].side(), Side::Sell);
    }

    #[test]
    fn header_must_match() {
        let data = "portfolio,trade id,product\ndefault,1,ADA-USD\n";
        match read_fills(data.as_bytes()) {
            Err(SourceError::Header { found }) => {
                assert_eq!(found, vec!["portfolio", "trade id", "product"])
            }
            other => panic!("expected header error, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            read_fills("".as_bytes()),
            Err(SourceError::Header { .. })
        ));
    }

    #[test]
    fn bad_row_reports_line() {
        let data = format!(
            "{}\n{}\n{}\n",
            HEADER,
            "default,1,ADA-USD,BUY,2021-05-07T16:17:11.940Z,10,ADA,1.0,0.0,-10.0,USD",
            "default,2,ADA-USD,SELL,2021-05-07T16:17:11.940Z,0,ADA,1.0,0.0,0.0,USD",
        );
        match read_fills(data.as_bytes()) {
            Err(SourceError::Record { line, source }) => {
                assert_eq!(line, 3);
                assert_eq!(source.trade_id(), "2");
            }
            other => panic!("expected record error, got {:?}", other),
        }
    }

    #[test]
    fn bad_timestamp_is_invalid_record() {
        let data = format!(
            "{}\n{}\n",
            HEADER, "default,1,ADA-USD,BUY,05/07/2021,10,ADA,1.0,0.0,-10.0,USD",
        );
        assert!(matches!(
            read_fills(data.as_bytes()),
            Err(SourceError::Record {
                source: ReconcileError::InvalidRecord { .. },
                ..
            })
        ));
    }

    #[test]
    fn group_sorts_each_instrument_by_time() {
        let trades: Vec<TradeRecord> = [
            "e2,ETH-USD,BUY,2021-01-03T00:00:00Z,1,10,0,-10",
            "a1,ADA-USD,BUY,2021-01-02T00:00:00Z,1,10,0,-10",
            "e1,ETH-USD,BUY,2021-01-01T00:00:00Z,1,10,0,-10",
            "e3,ETH-USD,SELL,2021-01-03T00:00:00Z,1,10,0,10",
        ]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();

        let grouped = group_by_instrument(trades);
        let keys: Vec<&str> = grouped.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["ADA-USD", "ETH-USD"]);

        let ids: Vec<&str> = grouped["ETH-USD"].iter().map(|t| t.trade_id()).collect();
        assert_eq!(ids, vec!["e1", "e2", "e3"]);
    }
}

//! lotmatch reconciles the buy and sell fills of one instrument into matched lots for cost
//! basis reporting.  Sells close the most recently opened lot first (LIFO), splitting a buy
//! or a sell when their sizes differ.
//!
//! - `TradeRecord` - one fill: id, instrument, side, timestamp, size, price, fee, total
//! - `LotMatch` - a buy lot and the sell that closed it, or no sell while the lot is open
//! - `Reconciler` - keeps the lots of one instrument and applies trades to them
//! - `reconcile` - runs a whole slice of trades through a fresh `Reconciler`
//!
//! Reading fills exports (`source`) and printing reports (`report`) sit outside the
//! reconciler, it only ever sees the trades of a single instrument.
//!
//! Example
//! ```
//! use lotmatch::reconcile;
//! use lotmatch::trade::TradeRecord;
//!
//! let trades: Vec<TradeRecord> = [
//!     "1,ADA-USD,BUY,2021-05-01T00:00:00Z,10.0,2.0,1.0,-21.0",
//!     "2,ADA-USD,SELL,2021-05-02T00:00:00Z,4.0,3.0,0.4,11.6",
//! ]
//! .iter()
//! .map(|s| s.parse().unwrap())
//! .collect();
//!
//! let lots = reconcile(&trades).unwrap();
//!
//! // closed match carries the whole buy fee: 4 * 2 + 1
//! assert_eq!(lots[0].buy().total(), 9.0);
//! assert!(lots[0].is_closed());
//!
//! // remaining inventory left open without fee
//! assert_eq!(lots[1].buy().size(), 6.0);
//! assert_eq!(lots[1].buy().fee(), 0.0);
//! assert!(lots[1].is_open());
//! ```

/// sizes whose difference is within this fraction of the larger one are treated as equal
/// when matching, absorbing float rounding left over from earlier splits
pub const RELATIVE_MARGIN_ERROR_QUANTITY: f64 = 4.0 * f64::EPSILON;

/// true when two positive sizes are equal up to float rounding
pub fn sizes_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= RELATIVE_MARGIN_ERROR_QUANTITY * a.max(b)
}

/// `MatchConfig` and the remainder total formula
pub mod config;
/// `ReconcileError`
pub mod error;
/// `Side` and the `VolumeSplit` trait
pub mod inventory;
/// tracing subscriber setup
pub mod logging;
/// `LotMatch` and totals over lots
pub mod lot;
/// the LIFO `Reconciler`
pub mod reconciler;
/// per instrument reconciliation and table/JSON rendering
pub mod report;
/// fills CSV reading and grouping by instrument
pub mod source;
/// `TradeRecord`
pub mod trade;

pub use config::{MatchConfig, RemainderTotal};
pub use error::ReconcileError;
pub use lot::LotMatch;
pub use reconciler::{reconcile, reconcile_with, Reconciler};
pub use trade::TradeRecord;

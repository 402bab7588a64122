use crate::config::MatchConfig;
use crate::error::ReconcileError;
use crate::inventory::VolumeSplit;
use crate::lot::LotMatch;
use crate::trade::TradeRecord;
use crate::sizes_match;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, trace, warn};

/// Reconcile one instrument's time ordered trades into lot matches using LIFO.
///
/// Returns every lot, closed and open, in creation order.  No partial result is returned
/// on failure.
pub fn reconcile(records: &[TradeRecord]) -> Result<Vec<LotMatch>, ReconcileError> {
    reconcile_with(records, &MatchConfig::default())
}

/// Same as [`reconcile`] with an explicit configuration
pub fn reconcile_with(
    records: &[TradeRecord],
    config: &MatchConfig,
) -> Result<Vec<LotMatch>, ReconcileError> {
    let mut reconciler = Reconciler::new(*config);
    reconciler.extend_trades(records)?;
    debug!(records = records.len(), %reconciler, "reconciled");
    Ok(reconciler.into_matches())
}

/// A still open buy lot, `chain` indexes the lot chain it belongs to
#[derive(Debug, Clone)]
struct OpenLot {
    chain: usize,
    buy: TradeRecord,
}

/// Reconciler keeps the lots of a single instrument.
///
/// add_trade ->
///     1) BUY opens a new lot OR
///     2) SELL closes the most recent open lots until it is used up, splitting buy or sell
///        when the sizes differ
///
/// Every BUY starts a lot chain: the closed fragments cut from it in order.  The open
/// remainder of a chain, if any, sits on the `open_lots` stack, which is ordered by chain
/// index so its top is always the most recent open lot.  Flattening the chains with their
/// open tail gives the output order.
///
/// After an error the reconciler may hold a half applied sell and must be dropped.
#[derive(Debug, Default)]
pub struct Reconciler {
    chains: Vec<Vec<LotMatch>>,
    open_lots: Vec<OpenLot>,
    config: MatchConfig,
    instrument: Option<String>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Reconciler {
    pub fn new(config: MatchConfig) -> Self {
        Reconciler {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Trade is a fill of the reconciler's instrument, either opening or closing lots
    pub fn add_trade(&mut self, trade: &TradeRecord) -> Result<(), ReconcileError> {
        self.check_trade(trade)?;
        if trade.is_buy() {
            self.add_buy(trade);
            Ok(())
        } else {
            self.add_sell(trade)
        }
    }

    pub fn extend_trades(&mut self, trades: &[TradeRecord]) -> Result<(), ReconcileError> {
        for trade in trades {
            self.add_trade(trade)?;
        }
        Ok(())
    }

    fn check_trade(&mut self, trade: &TradeRecord) -> Result<(), ReconcileError> {
        match &self.instrument {
            None => self.instrument = Some(trade.instrument().to_owned()),
            Some(instrument) if instrument != trade.instrument() => {
                return Err(ReconcileError::invalid_sequence(
                    trade.trade_id(),
                    format!(
                        "instrument {} does not match {}, group trades by instrument first",
                        trade.instrument(),
                        instrument
                    ),
                ));
            }
            Some(_) => {}
        }
        if let Some(last) = self.last_timestamp {
            if trade.timestamp() < last {
                warn!(
                    trade_id = trade.trade_id(),
                    timestamp = %trade.timestamp(),
                    previous = %last,
                    "trade is older than the previous one, input is not time ordered"
                );
            }
        }
        self.last_timestamp = Some(trade.timestamp());
        Ok(())
    }

    fn add_buy(&mut self, buy: &TradeRecord) {
        trace!(trade_id = buy.trade_id(), size = buy.size(), "open lot");
        self.open_lots.push(OpenLot {
            chain: self.chains.len(),
            buy: buy.clone(),
        });
        self.chains.push(vec![]);
    }

    fn add_sell(&mut self, sell: &TradeRecord) -> Result<(), ReconcileError> {
        let mut remaining = sell.clone();
        loop {
            let Some(open) = self.open_lots.pop() else {
                return Err(ReconcileError::invalid_sequence(
                    sell.trade_id(),
                    format!(
                        "no open buy lot left to match sell size {}",
                        remaining.size()
                    ),
                ));
            };
            let OpenLot { chain, buy } = open;

            if sizes_match(buy.size(), remaining.size()) {
                trace!(buy = buy.trade_id(), sell = sell.trade_id(), size = buy.size(), "close lot");
                self.chains[chain].push(LotMatch::closed(buy, remaining));
                return Ok(());
            } else if buy.size() > remaining.size() {
                // split buy, remainder stays the most recent open lot
                let (matched, remainder) =
                    buy.split(remaining.size(), self.config.remainder_total);
                debug!(
                    buy = buy.trade_id(),
                    sell = sell.trade_id(),
                    matched = matched.size(),
                    remaining = remainder.size(),
                    "split buy lot"
                );
                self.chains[chain].push(LotMatch::closed(matched, remaining));
                self.open_lots.push(OpenLot {
                    chain,
                    buy: remainder,
                });
                return Ok(());
            } else {
                // split sell, close this lot and carry the rest to the next one
                let (matched, remainder) = remaining.split(buy.size(), self.config.remainder_total);
                debug!(
                    buy = buy.trade_id(),
                    sell = sell.trade_id(),
                    matched = matched.size(),
                    remaining = remainder.size(),
                    "split sell"
                );
                self.chains[chain].push(LotMatch::closed(buy, matched));
                remaining = remainder;
            }
        }
    }

    /// All lots in output order
    pub fn matches(&self) -> Vec<LotMatch> {
        let mut open = self.open_lots.iter().peekable();
        let mut lots = Vec::new();
        for (index, chain) in self.chains.iter().enumerate() {
            lots.extend(chain.iter().cloned());
            if let Some(o) = open.next_if(|o| o.chain == index) {
                lots.push(LotMatch::open(o.buy.clone()));
            }
        }
        lots
    }

    pub fn into_matches(self) -> Vec<LotMatch> {
        let mut open = self.open_lots.into_iter().peekable();
        let mut lots = Vec::new();
        for (index, chain) in self.chains.into_iter().enumerate() {
            lots.extend(chain);
            if let Some(o) = open.next_if(|o| o.chain == index) {
                lots.push(LotMatch::open(o.buy));
            }
        }
        lots
    }

    /// Open buy lots, oldest first
    pub fn open_lots(&self) -> Vec<&TradeRecord> {
        self.open_lots.iter().map(|o| &o.buy).collect()
    }

    /// return quantity, price per unit, total cost of the open lots
    pub fn position(&self) -> (f64, f64, f64) {
        let mut q = 0.0;
        let mut c = 0.0;
        let mut p = 0.0;

        for o in self.open_lots.iter() {
            q += o.buy.size();
            c += o.buy.size() * o.buy.price();
        }

        if q > 0.0 {
            p = (c / q * 10000.0).round() / 10000.0;
        }
        (q, p, c)
    }
}

impl fmt::Display for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (quantity, price, cost) = self.position();
        write!(
            f,
            "Position; instrument:{}, quantity:{:.4}, price:{:.4}, cost:{:.4}, open_lots:{}, chains:{}",
            self.instrument.as_deref().unwrap_or("-"),
            quantity,
            price,
            cost,
            self.open_lots.len(),
            self.chains.len()
        )
    }
}

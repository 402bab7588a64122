use crate::config::RemainderTotal;
use crate::error::ReconcileError;
use crate::inventory::{Side, VolumeSplit};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// TradeRecord
/// trade id, instrument, side, timestamp, size, price, fee, total
///
/// One fill as exported by the exchange.  Values are validated on construction and never
/// change afterwards, splits produce new records.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct TradeRecord {
    trade_id: String,
    instrument: String,
    side: Side,
    timestamp: DateTime<Utc>,
    size: f64,
    price: f64,
    fee: f64,
    total: f64,
}

impl TradeRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trade_id: impl Into<String>,
        instrument: impl Into<String>,
        side: Side,
        timestamp: DateTime<Utc>,
        size: f64,
        price: f64,
        fee: f64,
        total: f64,
    ) -> Result<Self, ReconcileError> {
        let trade_id = trade_id.into();
        if !size.is_finite() || size <= 0.0 {
            return Err(ReconcileError::invalid_record(
                &trade_id,
                format!("size must be positive, got {}", size),
            ));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ReconcileError::invalid_record(
                &trade_id,
                format!("price must be non-negative, got {}", price),
            ));
        }
        if !fee.is_finite() || fee < 0.0 {
            return Err(ReconcileError::invalid_record(
                &trade_id,
                format!("fee must be non-negative, got {}", fee),
            ));
        }
        if !total.is_finite() {
            return Err(ReconcileError::invalid_record(
                &trade_id,
                format!("total must be finite, got {}", total),
            ));
        }
        Ok(TradeRecord {
            trade_id,
            instrument: instrument.into(),
            side,
            timestamp,
            size,
            price,
            fee,
            total,
        })
    }

    /// same fill with size, fee and total replaced
    pub(crate) fn adjusted(&self, size: f64, fee: f64, total: f64) -> Self {
        TradeRecord {
            trade_id: self.trade_id.clone(),
            instrument: self.instrument.clone(),
            side: self.side,
            timestamp: self.timestamp,
            size,
            price: self.price,
            fee,
            total,
        }
    }

    // getters
    pub fn trade_id(&self) -> &str {
        &self.trade_id
    }
    pub fn instrument(&self) -> &str {
        &self.instrument
    }
    pub fn side(&self) -> Side {
        self.side
    }
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    pub fn size(&self) -> f64 {
        self.size
    }
    pub fn price(&self) -> f64 {
        self.price
    }
    pub fn fee(&self) -> f64 {
        self.fee
    }
    pub fn total(&self) -> f64 {
        self.total
    }
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }
}

impl VolumeSplit for TradeRecord {
    /// first return is the matched portion and 2nd return is the unmatched remainder
    fn split(&self, quantity: f64, remainder_total: RemainderTotal) -> (Self, Self) {
        let matched = self.adjusted(quantity, self.fee, quantity * self.price + self.fee);
        let remaining = self.size - quantity;
        let remainder = self.adjusted(
            remaining,
            0.0,
            remainder_total.total(remaining, self.price),
        );
        (matched, remainder)
    }
}

/// Compact fixture form: `id,instrument,side,timestamp,size,price,fee,total`
/// with an RFC 3339 timestamp.
impl std::str::FromStr for TradeRecord {
    type Err = ReconcileError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field: Vec<&str> = s.split(',').map(str::trim).collect();
        if field.len() != 8 {
            return Err(ReconcileError::invalid_record(
                field[0],
                format!("expected 8 fields, got {}", field.len()),
            ));
        }
        let trade_id = field[0];
        let timestamp = parse_timestamp(trade_id, field[3])?;
        TradeRecord::new(
            trade_id,
            field[1],
            Side::parse_lenient(field[2]),
            timestamp,
            parse_number(trade_id, "size", field[4])?,
            parse_number(trade_id, "price", field[5])?,
            parse_number(trade_id, "fee", field[6])?,
            parse_number(trade_id, "total", field[7])?,
        )
    }
}

pub(crate) fn parse_timestamp(trade_id: &str, s: &str) -> Result<DateTime<Utc>, ReconcileError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ReconcileError::invalid_record(trade_id, format!("timestamp '{}': {}", s, e)))
}

pub(crate) fn parse_number(
    trade_id: &str,
    name: &str,
    s: &str,
) -> Result<f64, ReconcileError> {
    s.parse::<f64>()
        .map_err(|e| ReconcileError::invalid_record(trade_id, format!("{} '{}': {}", name, s, e)))
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade: {} {} {}, created_at: {}, size: {}, price: {}, fee: {}, total: {}",
            self.trade_id,
            self.instrument,
            self.side,
            self.timestamp.to_rfc3339(),
            self.size,
            self.price,
            self.fee,
            self.total
        )
    }
}

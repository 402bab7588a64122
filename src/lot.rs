use crate::trade::TradeRecord;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Holds a buy lot and, once matched, the sell that closed it.
///
/// A lot without a sell is an open position.  Both sides are owned copies, any split
/// fragment lives only here.
#[derive(Debug, PartialEq, Clone)]
pub struct LotMatch {
    buy: TradeRecord,
    sell: Option<TradeRecord>,
}

impl LotMatch {
    pub fn open(buy: TradeRecord) -> Self {
        LotMatch { buy, sell: None }
    }

    pub fn closed(buy: TradeRecord, sell: TradeRecord) -> Self {
        LotMatch {
            buy,
            sell: Some(sell),
        }
    }

    pub fn buy(&self) -> &TradeRecord {
        &self.buy
    }

    pub fn sell(&self) -> Option<&TradeRecord> {
        self.sell.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.sell.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.sell.is_some()
    }

    /// buy total less sell total, open lots have none
    pub fn cost_basis(&self) -> Option<f64> {
        self.sell.as_ref().map(|s| self.buy.total() - s.total())
    }
}

/// Total cost basis is the sum over every closed match in the slice
pub fn total_cost_basis(lots: &[LotMatch]) -> f64 {
    lots.iter().filter_map(|l| l.cost_basis()).sum()
}

/// Quantity still held across the open lots in the slice
pub fn open_quantity(lots: &[LotMatch]) -> f64 {
    lots.iter()
        .filter(|l| l.is_open())
        .map(|l| l.buy.size())
        .sum()
}

impl Serialize for LotMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LotMatch", 3)?;
        state.serialize_field("buy", &self.buy)?;
        state.serialize_field("sell", &self.sell)?;
        state.serialize_field("cost_basis", &self.cost_basis())?;
        state.end()
    }
}

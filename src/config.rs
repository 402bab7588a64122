use serde::{Deserialize, Serialize};

/// How the total of a split remainder is computed.
///
/// The matched side of a split always carries `size * price + fee`. The remainder
/// carries no fee and its total is either
///
/// - `Corrected` => `size * price`
/// - `Legacy` => `size + price`, reproducing the reports of the original Coinbase
///     fills tool so old output can be compared line by line
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderTotal {
    #[default]
    Corrected,
    Legacy,
}

impl RemainderTotal {
    pub fn total(&self, size: f64, price: f64) -> f64 {
        match self {
            RemainderTotal::Corrected => size * price,
            RemainderTotal::Legacy => size + price,
        }
    }
}

/// Settings for a reconciliation run
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub remainder_total: RemainderTotal,
}

impl MatchConfig {
    pub fn legacy() -> Self {
        MatchConfig {
            remainder_total: RemainderTotal::Legacy,
        }
    }
}

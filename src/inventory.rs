use crate::config::RemainderTotal;
use serde::Serialize;
use std::fmt;

/// Direction of a fill
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Fills exports only mark buys, anything that isn't `BUY` (any case) is a sell
    pub fn parse_lenient(s: &str) -> Side {
        if s.trim().eq_ignore_ascii_case("buy") {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

impl std::str::FromStr for Side {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Side::parse_lenient(s))
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// VolumeSplit divides a fill into a matched part and a remainder.  Quantity is always
/// positive and strictly less than the size being split.
///
/// The matched part keeps the whole fee, the remainder gets none.
pub trait VolumeSplit: Sized {
    fn split(&self, quantity: f64, remainder_total: RemainderTotal) -> (Self, Self);
}

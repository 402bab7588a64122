use thiserror::Error;

/// Failures raised while reconciling one instrument's trades.
///
/// Both variants abort the whole run, lot state after either cannot be trusted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReconcileError {
    /// record is malformed: non-positive size, negative price/fee, unparsable field
    #[error("invalid record '{trade_id}': {reason}")]
    InvalidRecord { trade_id: String, reason: String },
    /// record cannot be applied to the current lots, e.g. a sell with no open buy
    #[error("invalid sequence at record '{trade_id}': {reason}")]
    InvalidSequence { trade_id: String, reason: String },
}

impl ReconcileError {
    pub(crate) fn invalid_record(trade_id: &str, reason: impl Into<String>) -> Self {
        ReconcileError::InvalidRecord {
            trade_id: trade_id.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_sequence(trade_id: &str, reason: impl Into<String>) -> Self {
        ReconcileError::InvalidSequence {
            trade_id: trade_id.to_owned(),
            reason: reason.into(),
        }
    }

    pub fn trade_id(&self) -> &str {
        match self {
            ReconcileError::InvalidRecord { trade_id, .. }
            | ReconcileError::InvalidSequence { trade_id, .. } => trade_id,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn error_message_names_trade() {
        let err = ReconcileError::invalid_sequence("7204216", "no open buy lot");
        assert_eq!(
            err.to_string(),
            "invalid sequence at record '7204216': no open buy lot"
        );
        assert_eq!(err.trade_id(), "7204216");
    }
}

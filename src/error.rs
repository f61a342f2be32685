use thiserror::Error;

/// An event referenced state that an earlier event should have created.
///
/// The upstream log is expected to be ordered, so these are never retried or
/// papered over: processing stops at the offending event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderingViolation {
    #[error("{event} references round {epoch} which was never started")]
    MissingRound { event: &'static str, epoch: u64 },

    #[error("{event} arrived before the market was initialized")]
    MissingMarket { event: &'static str },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("ordering violation: {0}")]
    OrderingViolation(#[from] OrderingViolation),

    #[error("overflow: {0}")]
    Overflow(String),

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    #[error("malformed event on line {line}: {reason}")]
    Decode { line: u64, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every error stops the stream. Expected absences (a claim for an unknown
/// bet, a pause for a round that never started) are not errors at all.
impl Error {
    pub fn is_ordering_violation(&self) -> bool {
        matches!(self, Error::OrderingViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

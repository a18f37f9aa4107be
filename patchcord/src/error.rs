//! Error types for the patchcord routing layer.

use crate::message::RequestId;
use thiserror::Error;

/// Errors raised by the router.
///
/// Every variant except `Closed` and `InvalidConfiguration` is fatal to the
/// whole channel: the router funnels it through the single teardown path,
/// and callers with outstanding requests observe it as `ConnectionLost`.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Header carries both the request and the response marker.
    #[error("malformed header: message both expects a response and is one")]
    MalformedHeader,

    /// A payload validator rejected the message.
    #[error("message failed validation: {0}")]
    Validation(#[from] ValidationError),

    /// A response arrived for an id that was never issued.
    #[error("unsolicited response for request {id}")]
    UnsolicitedResponse {
        /// The id the peer claimed to answer.
        id: RequestId,
    },

    /// A response arrived for an id that was already answered.
    #[error("duplicate response for request {id}")]
    DuplicateResponse {
        /// The id the peer answered a second time.
        id: RequestId,
    },

    /// An incoming request arrived with no receiver registered to answer it.
    #[error("no incoming receiver registered to answer request {id}")]
    NoReceiver {
        /// The id of the unanswerable request.
        id: RequestId,
    },

    /// The application refused to answer an incoming request.
    #[error("request {id} rejected by receiver: {reason}")]
    RequestRejected {
        /// The id of the rejected request.
        id: RequestId,
        /// The receiver's stated reason.
        reason: String,
    },

    /// An incoming request's responder was dropped without producing a
    /// reply; the peer is owed an answer that will never come.
    #[error("request {id} dropped without a reply")]
    AbandonedRequest {
        /// The id of the abandoned request.
        id: RequestId,
    },

    /// The underlying channel is gone. Delivered to every pending request
    /// when the router tears down, whatever the original cause.
    #[error("connection lost")]
    ConnectionLost,

    /// Operation on a router that has already been closed.
    #[error("router is closed")]
    Closed,

    /// Builder misuse.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Reason a payload validator rejected a message.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct ValidationError {
    /// Human-readable description of the structural problem.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors from the binary wire codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Not enough bytes for a complete frame.
    #[error("insufficient data: need {needed} bytes, have {available}")]
    InsufficientData {
        /// Bytes required to make progress.
        needed: usize,
        /// Bytes currently available.
        available: usize,
    },

    /// Declared payload length exceeds the supported maximum.
    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge {
        /// Declared payload size.
        size: usize,
        /// Maximum supported payload size.
        max: usize,
    },

    /// Input length does not match the length declared in the header.
    #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Total frame length the header declares.
        expected: usize,
        /// Length of the input actually provided.
        actual: usize,
    },
}

//! Completion slots for requests awaiting replies.
//!
//! Each outgoing request registers a `PendingReply` keyed by its request id.
//! The slot wraps the sending half of a oneshot channel; the caller holds
//! the receiving half and suspends on it. Completion consumes the slot, so
//! delivering an outcome twice is unrepresentable.
//!
//! ```text
//! Request Flow:
//!   1. Router assigns request id
//!   2. PendingReply stored in the pending table
//!   3. Message handed to the connector
//!   4. Caller awaits the ReplyReceiver
//!
//! Response Flow:
//!   5. Reply arrives, router looks up the id
//!   6. complete(Ok(reply)) fires the oneshot
//!   7. Caller resumes with the reply
//!
//! Teardown Flow:
//!   5. Channel dies or a protocol violation is detected
//!   6. Every remaining slot completes with Err(ConnectionLost)
//! ```

use crate::error::RouterError;
use crate::message::{Message, RequestId};
use std::cell::Cell;
use std::time::Instant;
use tokio::sync::oneshot;

/// Outcome delivered to a waiting caller: the reply, or the error that
/// killed the channel first.
pub type ReplyResult = Result<Message, RouterError>;

/// Receiving half handed to `send_request` callers. Awaiting it suspends
/// the logical request without blocking the thread.
pub type ReplyReceiver = oneshot::Receiver<ReplyResult>;

/// Completion slot for a single outstanding request.
///
/// Consumes itself on completion (`complete(self, ..)`): once fired, the
/// slot is gone and cannot fire again.
pub struct PendingReply {
    /// Fires the waiting caller's receiver.
    sender: oneshot::Sender<ReplyResult>,

    /// When the request was registered, for teardown diagnostics.
    registered_at: Instant,
}

impl PendingReply {
    /// Create a slot around the sending half of a reply channel.
    pub fn new(sender: oneshot::Sender<ReplyResult>) -> Self {
        Self {
            sender,
            registered_at: Instant::now(),
        }
    }

    /// Time since the request was registered.
    pub fn elapsed(&self) -> std::time::Duration {
        self.registered_at.elapsed()
    }

    /// Deliver the outcome to the waiting caller, consuming the slot.
    ///
    /// The send fails only when the caller dropped its receiver, which is
    /// how a caller opts out of the result; logged, not an error.
    pub fn complete(self, result: ReplyResult) {
        if self.sender.send(result).is_err() {
            tracing::warn!("reply receiver dropped before completion");
        }
    }
}

/// Factory for request ids, monotonically increasing from 1.
///
/// 0 is reserved as the "no correlation needed" sentinel and is never
/// issued; the generator skips it on wrap.
#[derive(Debug)]
pub struct RequestIdGenerator {
    next: Cell<u64>,
}

impl RequestIdGenerator {
    /// Create a generator starting at 1.
    pub fn new() -> Self {
        Self { next: Cell::new(1) }
    }

    /// Issue the next request id.
    pub fn next_id(&self) -> RequestId {
        let mut id = self.next.get();
        if id == 0 {
            // Wrapped past u64::MAX; 0 stays reserved.
            id = 1;
        }
        self.next.set(id.wrapping_add(1));
        RequestId::new(id)
    }

    /// The next id that would be issued. Every id below this value has
    /// already been handed out, which lets the router tell a response for
    /// a never-issued id apart from one answered twice.
    pub fn watermark(&self) -> u64 {
        self.next.get()
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_from_one() {
        let ids = RequestIdGenerator::new();

        assert_eq!(ids.next_id(), RequestId::new(1));
        assert_eq!(ids.next_id(), RequestId::new(2));
        assert_eq!(ids.next_id(), RequestId::new(3));
        assert_eq!(ids.watermark(), 4);
    }

    #[test]
    fn test_wrap_skips_sentinel() {
        let ids = RequestIdGenerator::new();
        ids.next.set(u64::MAX);

        assert_eq!(ids.next_id(), RequestId::new(u64::MAX));
        // The wrapped counter lands on 0, which must never be issued.
        assert_eq!(ids.next_id(), RequestId::new(1));
        assert_eq!(ids.next_id(), RequestId::new(2));
    }

    #[test]
    fn test_complete_delivers_reply() {
        let (tx, rx) = oneshot::channel();
        let slot = PendingReply::new(tx);

        slot.complete(Ok(Message::notification(b"pong".to_vec())));

        let result = rx.blocking_recv().expect("sender completed");
        assert_eq!(result.expect("reply delivered").payload, b"pong");
    }

    #[test]
    fn test_complete_delivers_error() {
        let (tx, rx) = oneshot::channel();
        let slot = PendingReply::new(tx);

        slot.complete(Err(RouterError::ConnectionLost));

        let result = rx.blocking_recv().expect("sender completed");
        assert!(matches!(result, Err(RouterError::ConnectionLost)));
    }

    #[test]
    fn test_complete_after_receiver_dropped() {
        let (tx, rx) = oneshot::channel();
        let slot = PendingReply::new(tx);
        drop(rx);

        // Must not panic; the caller simply opted out.
        slot.complete(Ok(Message::notification(vec![])));
    }

    #[test]
    fn test_elapsed_time() {
        let (tx, _rx) = oneshot::channel();
        let slot = PendingReply::new(tx);

        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(slot.elapsed() >= std::time::Duration::from_millis(10));
    }
}

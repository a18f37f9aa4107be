//! The correlation router at the heart of the crate.
//!
//! A `Router` sits on top of one [`Connector`] and owns everything needed
//! to run request/response traffic over it: the request id counter, the
//! table of outstanding requests, the validator pipeline, and the single
//! teardown path that fails everything deterministically when the channel
//! dies.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Router                               │
//! │                                      │
//! │  ┌────────────────────────────────┐  │
//! │  │ connector: Box<dyn Connector>  │  │──▶ raw channel
//! │  └────────────────────────────────┘  │
//! │  ┌────────────────────────────────┐  │
//! │  │ request_ids: RequestIdGenerator│  │
//! │  └────────────────────────────────┘  │
//! │  ┌────────────────────────────────┐  │
//! │  │ pending: RefCell<HashMap<..>>  │  │──▶ waiting callers
//! │  └────────────────────────────────┘  │
//! │  ┌────────────────────────────────┐  │
//! │  │ receiver: RefCell<Option<..>>  │  │──▶ application handler
//! │  └────────────────────────────────┘  │
//! └──────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let router = Router::new(connector);
//!
//! let reply = router.send_request(Message::request(b"ping".to_vec()));
//! // ... the I/O driver feeds inbound messages to router.on_message(..) ...
//! let pong = reply.await??;
//! ```

use crate::builder::RouterBuilder;
use crate::connector::Connector;
use crate::error::RouterError;
use crate::message::{Message, MessageFlags, MessageKind, RequestId};
use crate::pending::{PendingReply, ReplyReceiver, RequestIdGenerator};
use crate::receiver::IncomingReceiver;
use crate::responder::IncomingResponder;
use crate::validator::MessageValidator;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tokio::sync::oneshot;

/// Correlation router over one bidirectional channel.
///
/// # Single-Threaded Design
///
/// Uses `Cell` and `RefCell` for interior mutability (no Send/Sync
/// required); every method takes `&self`. All work happens synchronously
/// inside the caller's stack or inside the connector's delivery callback.
/// `RefCell` borrows are released before any call out into validators,
/// the receiver, or the connector, so reentrant sends from inside a
/// callback are safe.
///
/// # Lifecycle
///
/// A router is live from construction until its single transition to the
/// closed state: an explicit [`close`](Self::close), a protocol violation
/// on an inbound message, or the connector reporting the channel broken.
/// Teardown closes the connector and rejects every pending request with
/// [`RouterError::ConnectionLost`]; afterwards all operations are no-ops.
pub struct Router {
    /// Exclusive handle to the raw channel.
    connector: Box<dyn Connector>,

    /// Ordered validator pipeline, fixed at construction.
    validators: Vec<Box<dyn MessageValidator>>,

    /// Handler for inbound requests and notifications.
    receiver: RefCell<Option<Rc<dyn IncomingReceiver>>>,

    /// Outstanding requests awaiting replies, keyed by request id.
    pending: RefCell<HashMap<RequestId, PendingReply>>,

    /// Issues correlation ids for outgoing requests.
    request_ids: RequestIdGenerator,

    /// Set once, on the first fatal event or explicit close.
    closed: Cell<bool>,

    /// Handed to responders so they can route replies back without keeping
    /// the router alive.
    weak_self: Weak<Router>,
}

impl Router {
    /// Wrap a connector with no validators and no receiver registered.
    pub fn new(connector: impl Connector + 'static) -> Rc<Self> {
        Self::from_parts(Box::new(connector), Vec::new())
    }

    /// Start building a router with validators and a receiver.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub(crate) fn from_parts(
        connector: Box<dyn Connector>,
        validators: Vec<Box<dyn MessageValidator>>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak| Self {
            connector,
            validators,
            receiver: RefCell::new(None),
            pending: RefCell::new(HashMap::new()),
            request_ids: RequestIdGenerator::new(),
            closed: Cell::new(false),
            weak_self: weak.clone(),
        })
    }

    /// Register the application handler for inbound requests and
    /// notifications.
    ///
    /// Replaces any previously registered receiver; the old one is dropped
    /// without being notified.
    pub fn set_incoming_receiver(&self, receiver: Rc<dyn IncomingReceiver>) {
        self.receiver.borrow_mut().replace(receiver);
    }

    /// Whether the router has reached its terminal closed state.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Number of requests still waiting for replies.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Send a message that expects no reply.
    ///
    /// The message is forwarded to the connector unmodified: the router
    /// never touches the header here, including the request id (replies
    /// stamped by an [`IncomingResponder`] also pass through this path).
    /// On a closed router the message is dropped silently; callers that
    /// need delivery guarantees must check [`is_closed`](Self::is_closed)
    /// themselves. A connector that refuses the send kills the channel.
    pub fn send(&self, message: Message) {
        if self.closed.get() {
            tracing::trace!("send on closed router, message dropped");
            return;
        }
        if !self.connector.send(message) {
            self.fatal(RouterError::ConnectionLost);
        }
    }

    /// Send a request and obtain a receiver for its eventual reply.
    ///
    /// The router stamps the message with the next request id and the
    /// response-expected marker before handing it to the connector. Id
    /// assignment is synchronous: two back-to-back calls always observe
    /// two distinct ids, whatever the connector does.
    ///
    /// The returned receiver resolves with the correlated reply, or with
    /// an error when the channel dies first. Calling this on a closed
    /// router resolves the receiver immediately with
    /// [`RouterError::Closed`] rather than leaving the caller suspended
    /// forever.
    pub fn send_request(&self, mut message: Message) -> ReplyReceiver {
        let (tx, rx) = oneshot::channel();
        if self.closed.get() {
            PendingReply::new(tx).complete(Err(RouterError::Closed));
            return rx;
        }

        let id = self.request_ids.next_id();
        message.request_id = id;
        message.flags.insert(MessageFlags::EXPECTS_RESPONSE);
        message.flags.remove(MessageFlags::IS_RESPONSE);

        // Registered before the connector send so a reply looped back
        // synchronously still correlates.
        self.pending.borrow_mut().insert(id, PendingReply::new(tx));
        tracing::debug!(request_id = %id, "request registered");

        if !self.connector.send(message) {
            self.fatal(RouterError::ConnectionLost);
        }
        rx
    }

    /// Deliver one inbound message from the connector.
    ///
    /// This is the connector-facing "message arrived" callback. Messages
    /// are processed strictly in delivery order: header sanity check,
    /// validator pipeline, then dispatch by kind. Any violation is fatal
    /// for the whole channel.
    pub fn on_message(&self, message: Message) {
        if self.closed.get() {
            tracing::trace!("message received after close, ignored");
            return;
        }

        let kind = match message.kind() {
            Some(kind) => kind,
            None => {
                self.fatal(RouterError::MalformedHeader);
                return;
            }
        };

        for validator in &self.validators {
            if let Err(error) = validator.validate(&message) {
                self.fatal(RouterError::Validation(error));
                return;
            }
        }

        match kind {
            MessageKind::Response => self.dispatch_response(message),
            MessageKind::Request => self.dispatch_request(message),
            MessageKind::Notification => self.dispatch_notification(message),
        }
    }

    /// The connector reported the channel broken.
    ///
    /// This is the connector-facing "channel broken" callback. Tears down
    /// and rejects everything pending; a no-op if the router is already
    /// closed.
    pub fn on_channel_broken(&self) {
        self.fatal(RouterError::ConnectionLost);
    }

    /// Close the router and the channel underneath it.
    ///
    /// Idempotent. Every request still pending is rejected with
    /// [`RouterError::ConnectionLost`], whoever ends up holding its
    /// receiver — a future handed to unrelated code must never hang
    /// silently just because the close was local.
    pub fn close(&self) {
        if self.closed.get() {
            return;
        }
        tracing::debug!("router closed by application");
        self.teardown();
    }

    /// Single entry point for every fatal condition. Logs the cause, then
    /// tears down; the cause is not propagated per-message.
    pub(crate) fn fatal(&self, error: RouterError) {
        if self.closed.get() {
            return;
        }
        tracing::warn!(%error, "fatal channel error, tearing down");
        self.teardown();
    }

    /// Tear down at most once: close the connector, then reject every
    /// pending request.
    fn teardown(&self) {
        if self.closed.replace(true) {
            return;
        }
        self.connector.close();

        // Drain first so no borrow is held while completions run.
        let drained: Vec<(RequestId, PendingReply)> =
            self.pending.borrow_mut().drain().collect();
        for (id, reply) in drained {
            tracing::debug!(
                request_id = %id,
                elapsed = ?reply.elapsed(),
                "rejecting pending request"
            );
            reply.complete(Err(RouterError::ConnectionLost));
        }
    }

    fn dispatch_response(&self, message: Message) {
        let id = message.request_id;
        let entry = self.pending.borrow_mut().remove(&id);
        match entry {
            Some(reply) => {
                tracing::debug!(request_id = %id, "response correlated");
                reply.complete(Ok(message));
            }
            None => {
                // Ids are issued densely from 1, so the generator's
                // watermark separates "never asked" from "already
                // answered".
                let error = if id.is_none() || id.as_u64() >= self.request_ids.watermark() {
                    RouterError::UnsolicitedResponse { id }
                } else {
                    RouterError::DuplicateResponse { id }
                };
                self.fatal(error);
            }
        }
    }

    fn dispatch_request(&self, message: Message) {
        // Clone out of the RefCell so no borrow is held across the
        // application callback.
        let receiver = self.receiver.borrow().clone();
        match receiver {
            Some(receiver) => {
                let responder =
                    IncomingResponder::new(self.weak_self.clone(), message.request_id);
                tracing::debug!(request_id = %message.request_id, "request dispatched");
                receiver.accept_with_responder(message, responder);
            }
            None => {
                self.fatal(RouterError::NoReceiver {
                    id: message.request_id,
                });
            }
        }
    }

    fn dispatch_notification(&self, message: Message) {
        let receiver = self.receiver.borrow().clone();
        match receiver {
            Some(receiver) => receiver.accept(message),
            None => {
                tracing::trace!("notification with no receiver registered, dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Connector double that records traffic and counts closes.
    #[derive(Default)]
    struct ChannelState {
        sent: RefCell<Vec<Message>>,
        closes: Cell<usize>,
        refuse_sends: Cell<bool>,
    }

    #[derive(Clone, Default)]
    struct StubConnector(Rc<ChannelState>);

    impl Connector for StubConnector {
        fn send(&self, message: Message) -> bool {
            if self.0.refuse_sends.get() {
                return false;
            }
            self.0.sent.borrow_mut().push(message);
            true
        }

        fn close(&self) {
            self.0.closes.set(self.0.closes.get() + 1);
        }
    }

    #[test]
    fn test_router_creation() {
        let router = Router::new(StubConnector::default());
        assert!(!router.is_closed());
        assert_eq!(router.pending_count(), 0);
    }

    #[test]
    fn test_one_way_send_registers_nothing() {
        let connector = StubConnector::default();
        let state = connector.0.clone();
        let router = Router::new(connector);

        router.send(Message::notification(b"event".to_vec()));

        assert_eq!(state.sent.borrow().len(), 1);
        assert_eq!(router.pending_count(), 0);

        // No id was consumed by the one-way send.
        let _rx = router.send_request(Message::request(vec![]));
        assert_eq!(state.sent.borrow()[1].request_id, RequestId::new(1));
    }

    #[test]
    fn test_send_request_stamps_header() {
        let connector = StubConnector::default();
        let state = connector.0.clone();
        let router = Router::new(connector);

        let _rx = router.send_request(Message::request(b"ping".to_vec()));

        let sent = state.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].request_id, RequestId::new(1));
        assert!(sent[0].expects_response());
        assert!(!sent[0].is_response());
        assert_eq!(router.pending_count(), 1);
    }

    #[test]
    fn test_send_on_closed_router_is_noop() {
        let connector = StubConnector::default();
        let state = connector.0.clone();
        let router = Router::new(connector);

        router.close();
        router.send(Message::notification(vec![]));

        assert!(state.sent.borrow().is_empty());
    }

    #[test]
    fn test_send_request_on_closed_router_rejects() {
        let router = Router::new(StubConnector::default());
        router.close();

        let rx = router.send_request(Message::request(vec![]));
        let result = rx.blocking_recv().expect("completed immediately");
        assert!(matches!(result, Err(RouterError::Closed)));
    }

    #[test]
    fn test_connector_refusal_tears_down() {
        let connector = StubConnector::default();
        let state = connector.0.clone();
        state.refuse_sends.set(true);
        let router = Router::new(connector);

        let rx = router.send_request(Message::request(vec![]));

        assert!(router.is_closed());
        assert_eq!(state.closes.get(), 1);
        let result = rx.blocking_recv().expect("completed by teardown");
        assert!(matches!(result, Err(RouterError::ConnectionLost)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let connector = StubConnector::default();
        let state = connector.0.clone();
        let router = Router::new(connector);

        router.close();
        router.close();
        router.on_channel_broken();

        assert_eq!(state.closes.get(), 1);
    }
}

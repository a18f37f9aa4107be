//! Reply handles for requests that arrived over the channel.

use crate::error::RouterError;
use crate::message::{Message, MessageFlags, RequestId};
use crate::router::Router;
use std::rc::Weak;

/// One-shot handle for answering a single inbound request.
///
/// Created by the router when it dispatches a request to the incoming
/// receiver. [`accept`](Self::accept) stamps the reply with the
/// originating request id and the response marker, then forwards it
/// through the connector. Both `accept` and [`reject`](Self::reject)
/// consume the handle, so a request can never be answered twice.
///
/// Dropping the handle without answering tears the channel down: the peer
/// is owed a reply that will never come, and silently starving it would
/// leave the remote caller suspended forever.
///
/// Holds only a weak reference to the router; if the router is already
/// gone when the handle fires, the reply is dropped.
pub struct IncomingResponder {
    /// Taken on accept/reject, which disarms the drop guard.
    router: Option<Weak<Router>>,
    request_id: RequestId,
}

impl IncomingResponder {
    pub(crate) fn new(router: Weak<Router>, request_id: RequestId) -> Self {
        Self {
            router: Some(router),
            request_id,
        }
    }

    /// The id of the request this handle answers.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Send `reply` back to the peer, consuming the handle.
    ///
    /// The reply's request id and flags are overwritten: it carries the
    /// originating request's id and the response marker regardless of what
    /// the caller put there.
    pub fn accept(mut self, mut reply: Message) {
        let Some(router) = self.router.take() else {
            return;
        };
        reply.request_id = self.request_id;
        reply.flags.remove(MessageFlags::EXPECTS_RESPONSE);
        reply.flags.insert(MessageFlags::IS_RESPONSE);

        match router.upgrade() {
            Some(router) => {
                tracing::debug!(request_id = %self.request_id, "reply accepted");
                router.send(reply);
            }
            None => tracing::trace!(
                request_id = %self.request_id,
                "router gone before reply could be sent"
            ),
        }
    }

    /// Refuse to answer, consuming the handle and tearing the channel down.
    ///
    /// A receiver that cannot produce a reply has no per-request error
    /// channel to the peer; the only honest signal is channel failure.
    pub fn reject(mut self, reason: &str) {
        let Some(router) = self.router.take() else {
            return;
        };
        if let Some(router) = router.upgrade() {
            router.fatal(RouterError::RequestRejected {
                id: self.request_id,
                reason: reason.to_string(),
            });
        }
    }
}

impl Drop for IncomingResponder {
    fn drop(&mut self) {
        let Some(router) = self.router.take() else {
            return;
        };
        if let Some(router) = router.upgrade() {
            router.fatal(RouterError::AbandonedRequest {
                id: self.request_id,
            });
        }
    }
}

//! Application-side handling of inbound traffic.

use crate::message::Message;
use crate::responder::IncomingResponder;

/// Application handler for inbound messages that are not replies to
/// pending local requests.
///
/// At most one receiver is registered with a router at a time. Registering
/// a replacement drops the previous receiver without notifying it.
///
/// # Example
///
/// ```rust,ignore
/// struct EchoReceiver;
///
/// impl IncomingReceiver for EchoReceiver {
///     fn accept(&self, message: Message) {
///         // One-way traffic; nothing to answer.
///         tracing::debug!(len = message.payload.len(), "notification");
///     }
///
///     fn accept_with_responder(&self, message: Message, responder: IncomingResponder) {
///         responder.accept(Message::notification(message.payload));
///     }
/// }
/// ```
pub trait IncomingReceiver {
    /// Handle a one-way notification. No reply is possible.
    fn accept(&self, message: Message);

    /// Handle a request the peer expects an answer to.
    ///
    /// The responder must eventually be consumed with
    /// [`IncomingResponder::accept`] or [`IncomingResponder::reject`].
    /// Dropping it unanswered is a protocol failure and tears the channel
    /// down.
    fn accept_with_responder(&self, message: Message, responder: IncomingResponder);
}

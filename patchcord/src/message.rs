//! Message types and header flags for channel routing.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation identifier linking an outgoing request to its eventual
/// response.
///
/// Ids are assigned by the router, monotonically increasing from 1.
/// The value 0 is reserved as the "no correlation needed" sentinel and is
/// never assigned to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Reserved sentinel meaning "no correlation needed".
    pub const NONE: RequestId = RequestId(0);

    /// Create a new RequestId.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether this is the reserved sentinel.
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Header control flags describing a message's response semantics.
    ///
    /// A well-formed stream never carries both flags on one message; the
    /// router treats that combination as a protocol violation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MessageFlags: u16 {
        /// The sender expects a response correlated by request id.
        const EXPECTS_RESPONSE = 1 << 0;

        /// This message answers a previously sent request.
        const IS_RESPONSE = 1 << 1;
    }
}

// Manual Serialize/Deserialize for MessageFlags
impl Serialize for MessageFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MessageFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Ok(MessageFlags::from_bits_truncate(bits))
    }
}

/// Classification of a well-formed message header.
///
/// # State Transitions
///
/// ```text
/// Request → Response  (matching request_id)
/// Notification → (terminal, no response)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Expects a response; the peer must answer with the same request id.
    Request,

    /// Answers a previously sent request, correlated by request id.
    Response,

    /// One-way message; nobody waits for an answer.
    Notification,
}

/// Unit of communication over the channel: a small header plus an opaque
/// payload.
///
/// # Ownership
///
/// A message is consumed exactly once — handed to a responder, to the
/// incoming receiver, or to the connector. Whoever holds it is the only
/// party reading or mutating it; passing it on transfers ownership, which
/// the move semantics of `send`/`accept` enforce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// For matching responses to requests. `RequestId::NONE` until the
    /// router stamps it on send.
    pub request_id: RequestId,

    /// Response semantics for this message.
    pub flags: MessageFlags,

    /// Opaque application payload.
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a request message. The router assigns the request id when the
    /// message is sent; any value placed here by the caller is overwritten.
    pub fn request(payload: Vec<u8>) -> Self {
        Self {
            request_id: RequestId::NONE,
            flags: MessageFlags::EXPECTS_RESPONSE,
            payload,
        }
    }

    /// Create a one-way notification (fire-and-forget).
    pub fn notification(payload: Vec<u8>) -> Self {
        Self {
            request_id: RequestId::NONE,
            flags: MessageFlags::empty(),
            payload,
        }
    }

    /// Create a response to a request. Copies the request id and marks the
    /// message as a response.
    pub fn reply_to(request: &Message, payload: Vec<u8>) -> Self {
        Self {
            request_id: request.request_id,
            flags: MessageFlags::IS_RESPONSE,
            payload,
        }
    }

    /// Whether the sender expects a response.
    pub fn expects_response(&self) -> bool {
        self.flags.contains(MessageFlags::EXPECTS_RESPONSE)
    }

    /// Whether this message answers a previous request.
    pub fn is_response(&self) -> bool {
        self.flags.contains(MessageFlags::IS_RESPONSE)
    }

    /// Classify the header.
    ///
    /// Returns `None` when the header is structurally invalid (both flags
    /// set); the router treats that as fatal for the channel.
    pub fn kind(&self) -> Option<MessageKind> {
        match (self.expects_response(), self.is_response()) {
            (true, true) => None,
            (true, false) => Some(MessageKind::Request),
            (false, true) => Some(MessageKind::Response),
            (false, false) => Some(MessageKind::Notification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_sentinel() {
        assert!(RequestId::NONE.is_none());
        assert!(!RequestId::new(1).is_none());
        assert_eq!(RequestId::new(7).as_u64(), 7);
        assert_eq!(RequestId::new(7).to_string(), "7");
    }

    #[test]
    fn test_message_flags() {
        let flags = MessageFlags::EXPECTS_RESPONSE;
        assert!(flags.contains(MessageFlags::EXPECTS_RESPONSE));
        assert!(!flags.contains(MessageFlags::IS_RESPONSE));
    }

    #[test]
    fn test_request_creation() {
        let msg = Message::request(b"ping".to_vec());
        assert_eq!(msg.request_id, RequestId::NONE);
        assert!(msg.expects_response());
        assert!(!msg.is_response());
        assert_eq!(msg.kind(), Some(MessageKind::Request));
    }

    #[test]
    fn test_notification_creation() {
        let msg = Message::notification(b"event".to_vec());
        assert_eq!(msg.request_id, RequestId::NONE);
        assert_eq!(msg.kind(), Some(MessageKind::Notification));
    }

    #[test]
    fn test_reply_copies_request_id() {
        let mut request = Message::request(b"ping".to_vec());
        request.request_id = RequestId::new(3);

        let reply = Message::reply_to(&request, b"pong".to_vec());
        assert_eq!(reply.request_id, RequestId::new(3));
        assert!(reply.is_response());
        assert!(!reply.expects_response());
        assert_eq!(reply.kind(), Some(MessageKind::Response));
    }

    #[test]
    fn test_conflicting_flags_have_no_kind() {
        let msg = Message {
            request_id: RequestId::new(1),
            flags: MessageFlags::EXPECTS_RESPONSE | MessageFlags::IS_RESPONSE,
            payload: vec![],
        };
        assert_eq!(msg.kind(), None);
    }

    #[test]
    fn test_flags_bits_round_trip() {
        let flags = MessageFlags::IS_RESPONSE;
        assert_eq!(MessageFlags::from_bits_truncate(flags.bits()), flags);

        // Unknown bits from a newer peer are dropped, not an error.
        let with_unknown = MessageFlags::from_bits_truncate(0b1000_0011);
        assert_eq!(
            with_unknown,
            MessageFlags::EXPECTS_RESPONSE | MessageFlags::IS_RESPONSE
        );
    }
}

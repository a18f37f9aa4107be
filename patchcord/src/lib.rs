//! # patchcord
//!
//! Request/response correlation routing over raw bidirectional message
//! channels.
//!
//! A [`Router`] sits on top of one [`Connector`] (the owner of the raw
//! channel) and takes care of everything a request/response protocol
//! needs above the transport: it stamps outgoing requests with unique
//! correlation ids, matches inbound replies back to the callers waiting
//! for them, runs pluggable validators over every inbound message, and
//! deterministically fails all in-flight state the moment the channel
//! breaks or the peer violates the protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ application                                             │
//! │   send / send_request          IncomingReceiver         │
//! └───────────┬─────────────────────────────▲───────────────┘
//!             ▼                             │
//! ┌─────────────────────────────────────────┴───────────────┐
//! │ Router                                                  │
//! │   request ids · pending table · validators · teardown   │
//! └───────────┬─────────────────────────────▲───────────────┘
//!             ▼                             │
//! ┌─────────────────────────────────────────┴───────────────┐
//! │ Connector (raw channel)     on_message / on_channel_broken
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Outbound calls enter the router, which assigns request ids and
//! forwards to the connector; inbound messages arrive from the I/O driver
//! via [`Router::on_message`] and are validated, then dispatched either
//! to the pending request they answer or to the registered
//! [`IncomingReceiver`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use patchcord::prelude::*;
//!
//! let router = Router::builder()
//!     .connector(pipe)
//!     .validator(|message: &Message| schema.check(message))
//!     .build()?;
//!
//! let reply = router.send_request(Message::request(b"ping".to_vec()));
//! let pong = reply.await??;
//! ```
//!
//! ## Execution Model
//!
//! Single-threaded and event-driven: the router never spawns tasks or
//! blocks. Waiting for a reply is expressed as an awaitable
//! [`ReplyReceiver`](pending::ReplyReceiver); everything else happens
//! synchronously inside the caller's stack or the connector's delivery
//! callback.

#![deny(missing_docs)]

pub mod builder;
pub mod codec;
pub mod connector;
pub mod error;
pub mod message;
pub mod pending;
pub mod prelude;
pub mod receiver;
pub mod responder;
pub mod router;
pub mod validator;

pub use builder::RouterBuilder;
pub use codec::MessageCodec;
pub use connector::Connector;
pub use error::{CodecError, RouterError, ValidationError};
pub use message::{Message, MessageFlags, MessageKind, RequestId};
pub use pending::{PendingReply, ReplyReceiver, ReplyResult, RequestIdGenerator};
pub use receiver::IncomingReceiver;
pub use responder::IncomingResponder;
pub use router::Router;
pub use validator::{MessageValidator, ValidationResult};

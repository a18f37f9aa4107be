//! Common imports for the patchcord routing layer.
//!
//! This module provides a convenient prelude for importing commonly used
//! types and traits.

pub use crate::builder::RouterBuilder;
pub use crate::codec::MessageCodec;
pub use crate::connector::Connector;
pub use crate::error::{CodecError, RouterError, ValidationError};
pub use crate::message::{Message, MessageFlags, MessageKind, RequestId};
pub use crate::pending::{ReplyReceiver, ReplyResult};
pub use crate::receiver::IncomingReceiver;
pub use crate::responder::IncomingResponder;
pub use crate::router::Router;
pub use crate::validator::{MessageValidator, ValidationResult};

// Re-export commonly used external types
pub use std::rc::Rc;

/// Re-export Result type for convenience
pub type Result<T> = std::result::Result<T, RouterError>;

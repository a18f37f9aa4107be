//! Pluggable validation for inbound messages.

use crate::error::ValidationError;
use crate::message::Message;

/// Result of running one validator over a message.
pub type ValidationResult = Result<(), ValidationError>;

/// A pluggable predicate inspecting inbound messages before dispatch.
///
/// Validators are supplied by the application layer (schema conformance,
/// size limits, whatever the embedding protocol requires). The router runs
/// them in registration order and stops at the first failure. A failure is
/// always fatal for the whole channel, never a recoverable per-message
/// error.
pub trait MessageValidator {
    /// Inspect one inbound message.
    fn validate(&self, message: &Message) -> ValidationResult;
}

/// Plain functions and closures work as validators.
impl<F> MessageValidator for F
where
    F: Fn(&Message) -> ValidationResult,
{
    fn validate(&self, message: &Message) -> ValidationResult {
        self(message)
    }
}

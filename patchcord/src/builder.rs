//! Fluent construction for routers.

use crate::connector::Connector;
use crate::error::RouterError;
use crate::receiver::IncomingReceiver;
use crate::router::Router;
use crate::validator::MessageValidator;
use std::rc::Rc;

/// Builder for [`Router`] with a fluent API.
///
/// # Example
///
/// ```rust,ignore
/// let router = Router::builder()
///     .connector(pipe)
///     .validator(|message: &Message| schema.check(message))
///     .incoming_receiver(handler)
///     .build()?;
/// ```
pub struct RouterBuilder {
    /// Raw channel handle (required).
    connector: Option<Box<dyn Connector>>,

    /// Validators, run in the order they were added.
    validators: Vec<Box<dyn MessageValidator>>,

    /// Optional handler registered before any traffic flows.
    receiver: Option<Rc<dyn IncomingReceiver>>,
}

impl RouterBuilder {
    /// Create a new router builder.
    pub fn new() -> Self {
        Self {
            connector: None,
            validators: Vec::new(),
            receiver: None,
        }
    }

    /// Set the connector owning the raw channel. Required.
    pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Box::new(connector));
        self
    }

    /// Append a payload validator. Validators run over every inbound
    /// message in the order added, short-circuiting on the first failure.
    pub fn validator(mut self, validator: impl MessageValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Register the incoming receiver up front, before any traffic can
    /// arrive. Equivalent to calling
    /// [`Router::set_incoming_receiver`] on the built router.
    pub fn incoming_receiver(mut self, receiver: Rc<dyn IncomingReceiver>) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Build the router.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidConfiguration`] when no connector was
    /// supplied.
    pub fn build(self) -> Result<Rc<Router>, RouterError> {
        let connector = self.connector.ok_or_else(|| {
            RouterError::InvalidConfiguration("connector is required".to_string())
        })?;

        let router = Router::from_parts(connector, self.validators);
        if let Some(receiver) = self.receiver {
            router.set_incoming_receiver(receiver);
        }
        Ok(router)
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

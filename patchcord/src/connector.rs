//! The channel seam between the router and the raw transport.

use crate::message::Message;

/// Owner of the raw bidirectional channel.
///
/// The router is the connector's only client: no other component may call
/// `send` or `close`. Inbound traffic flows the other way — the I/O driver
/// that owns the channel holds an `Rc<Router>` and calls
/// [`Router::on_message`](crate::router::Router::on_message) for each
/// decoded message and
/// [`Router::on_channel_broken`](crate::router::Router::on_channel_broken)
/// when the transport dies.
///
/// Methods take `&self`; implementations use interior mutability, matching
/// the single-threaded execution model.
pub trait Connector {
    /// Hand one message to the transport for delivery.
    ///
    /// Returns `false` when the channel can no longer carry messages; the
    /// router folds that into its channel-broken handling.
    fn send(&self, message: Message) -> bool;

    /// Close the underlying channel. Must tolerate repeated calls.
    fn close(&self);
}

//! Option structs for channel operations.

use warren_types::FieldTable;

/// Options for [`crate::Channel::exchange_declare`].
#[derive(Debug, Clone, Default)]
pub struct ExchangeDeclareOptions {
    /// Only verify that the exchange exists with these parameters.
    pub passive: bool,
    /// Survive a broker restart.
    pub durable: bool,
    /// Delete when no longer used.
    pub auto_delete: bool,
    /// Not directly publishable, only a binding target.
    pub internal: bool,
    /// Do not wait for `declare-ok`.
    pub no_wait: bool,
    /// Implementation-specific arguments.
    pub arguments: FieldTable,
}

impl ExchangeDeclareOptions {
    /// `passive = true`, everything else default.
    pub fn passive() -> Self {
        Self {
            passive: true,
            ..Self::default()
        }
    }
}

/// Options for [`crate::Channel::queue_declare`].
#[derive(Debug, Clone, Default)]
pub struct QueueDeclareOptions {
    /// Only verify that the queue exists with these parameters.
    pub passive: bool,
    /// Survive a broker restart.
    pub durable: bool,
    /// Restrict the queue to this connection and delete it on disconnect.
    pub exclusive: bool,
    /// Delete when the last consumer cancels.
    pub auto_delete: bool,
    /// Do not wait for `declare-ok`.
    pub no_wait: bool,
    /// Implementation-specific arguments, for example `x-message-ttl`.
    pub arguments: FieldTable,
}

impl QueueDeclareOptions {
    /// `passive = true`, everything else default.
    pub fn passive() -> Self {
        Self {
            passive: true,
            ..Self::default()
        }
    }
}

/// Options for [`crate::Channel::queue_delete`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueDeleteOptions {
    /// Only delete if the queue has no consumers.
    pub if_unused: bool,
    /// Only delete if the queue is empty.
    pub if_empty: bool,
    /// Do not wait for `delete-ok`.
    pub no_wait: bool,
}

/// Options for [`crate::Channel::basic_consume`].
#[derive(Debug, Clone, Default)]
pub struct ConsumeOptions {
    /// Consumer tag; empty asks the server to generate one.
    pub consumer_tag: String,
    /// Do not deliver messages published on this connection.
    pub no_local: bool,
    /// Deliveries need no acknowledgement.
    pub no_ack: bool,
    /// Only this consumer may access the queue.
    pub exclusive: bool,
    /// Do not wait for `consume-ok`; requires an explicit tag.
    pub no_wait: bool,
    /// Implementation-specific arguments.
    pub arguments: FieldTable,
}

/// Options for the `basic_publish` family.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
    /// Hand the message back with `basic.return` if it cannot be routed.
    pub mandatory: bool,
    /// Hand the message back if it cannot be delivered to a consumer
    /// immediately.
    pub immediate: bool,
}

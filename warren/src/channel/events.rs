//! Consumer capabilities and typed channel event registries.

use std::fmt;
use std::sync::Arc;

use crate::message::{Delivery, ReturnedMessage};

/// Receives deliveries for one consumer tag.
///
/// Callbacks run on the connection's reader thread and must not block on
/// the same connection (for example by calling a synchronous channel
/// method); doing so deadlocks the connection.
pub trait Consumer: Send + Sync + 'static {
    /// Handle one delivery.
    fn deliver(&self, delivery: Delivery);

    /// The broker cancelled this consumer (RabbitMQ consumer cancel
    /// notification). Return `true` if handled; returning `false` closes
    /// the channel with [`crate::Error::ConsumerCancelled`].
    fn cancelled(&self, consumer_tag: &str) -> bool {
        let _ = consumer_tag;
        false
    }
}

impl<F> Consumer for F
where
    F: Fn(Delivery) + Send + Sync + 'static,
{
    fn deliver(&self, delivery: Delivery) {
        self(delivery)
    }
}

/// A consumer built from closures, with an optional cancel handler.
pub struct CallbackConsumer {
    deliver: Box<dyn Fn(Delivery) + Send + Sync>,
    on_cancel: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

impl CallbackConsumer {
    /// Wrap a delivery closure.
    pub fn new(deliver: impl Fn(Delivery) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Box::new(deliver),
            on_cancel: None,
        }
    }

    /// Attach a broker-cancel handler.
    pub fn on_cancel(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Box::new(handler));
        self
    }
}

impl Consumer for CallbackConsumer {
    fn deliver(&self, delivery: Delivery) {
        (self.deliver)(delivery)
    }

    fn cancelled(&self, consumer_tag: &str) -> bool {
        match &self.on_cancel {
            Some(handler) => {
                handler(consumer_tag);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for CallbackConsumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackConsumer")
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}

/// The resolution of one publish in confirm mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirm {
    /// The delivery tag assigned when the message was published.
    pub delivery_tag: u64,
    /// True for `basic.ack`, false for `basic.nack`.
    pub acked: bool,
}

pub(crate) type AckHandler = Arc<dyn Fn(u64, bool) + Send + Sync>;
pub(crate) type NackHandler = Arc<dyn Fn(u64, bool, bool) + Send + Sync>;
pub(crate) type ReturnHandler = Arc<dyn Fn(&ReturnedMessage) + Send + Sync>;
pub(crate) type FlowHandler = Arc<dyn Fn(bool) + Send + Sync>;
pub(crate) type ConfirmCallback = Arc<dyn Fn(Confirm) + Send + Sync>;

/// Ordered handler lists, one per channel event kind.
///
/// Handlers are snapshotted before invocation; registering a handler from
/// inside a handler does not affect the event being dispatched.
#[derive(Default)]
pub(crate) struct EventRegistry {
    ack: Vec<AckHandler>,
    nack: Vec<NackHandler>,
    returned: Vec<ReturnHandler>,
    flow: Vec<FlowHandler>,
}

impl EventRegistry {
    pub(crate) fn push_ack(&mut self, handler: AckHandler) {
        self.ack.push(handler);
    }

    pub(crate) fn push_nack(&mut self, handler: NackHandler) {
        self.nack.push(handler);
    }

    pub(crate) fn push_return(&mut self, handler: ReturnHandler) {
        self.returned.push(handler);
    }

    pub(crate) fn push_flow(&mut self, handler: FlowHandler) {
        self.flow.push(handler);
    }

    pub(crate) fn ack_handlers(&self) -> Vec<AckHandler> {
        self.ack.clone()
    }

    pub(crate) fn nack_handlers(&self) -> Vec<NackHandler> {
        self.nack.clone()
    }

    pub(crate) fn return_handlers(&self) -> Vec<ReturnHandler> {
        self.returned.clone()
    }

    pub(crate) fn flow_handlers(&self) -> Vec<FlowHandler> {
        self.flow.clone()
    }
}

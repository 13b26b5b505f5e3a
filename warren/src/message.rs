//! Messages, deliveries, and returned messages.

use std::fmt;
use std::sync::Weak;

use bytes::Bytes;
use warren_types::BasicProperties;

use crate::channel::ChannelInner;
use crate::Error;

/// A message body with its content properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    /// Content header properties.
    pub properties: BasicProperties,
    /// Message body bytes.
    pub body: Bytes,
}

impl Message {
    /// Creates a message with default (absent) properties.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            properties: BasicProperties::default(),
            body: body.into(),
        }
    }

    /// Creates a message with explicit properties.
    pub fn with_properties(body: impl Into<Bytes>, properties: BasicProperties) -> Self {
        Self {
            properties,
            body: body.into(),
        }
    }
}

impl From<&[u8]> for Message {
    fn from(body: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(body))
    }
}

impl From<Vec<u8>> for Message {
    fn from(body: Vec<u8>) -> Self {
        Self::new(body)
    }
}

impl From<&str> for Message {
    fn from(body: &str) -> Self {
        Self::from(body.as_bytes())
    }
}

/// A message delivered by the broker, with the information needed to
/// acknowledge it.
pub struct Delivery {
    /// The message.
    pub message: Message,
    /// Channel-scoped tag for [`ack`](Self::ack)/[`nack`](Self::nack).
    pub delivery_tag: u64,
    /// Whether the message was delivered before.
    pub redelivered: bool,
    /// Exchange the message was published to.
    pub exchange: String,
    /// Routing key the message was published with.
    pub routing_key: String,
    /// Consumer the message was delivered to; `None` for `basic_get`.
    pub consumer_tag: Option<String>,
    pub(crate) channel: Weak<ChannelInner>,
}

impl Delivery {
    /// The message body.
    pub fn body(&self) -> &Bytes {
        &self.message.body
    }

    /// Acknowledge this delivery.
    pub fn ack(&self) -> Result<(), Error> {
        self.channel()?.send_ack(self.delivery_tag, false)
    }

    /// Reject this delivery, optionally requeueing it (RabbitMQ
    /// `basic.nack`).
    pub fn nack(&self, requeue: bool) -> Result<(), Error> {
        self.channel()?.send_nack(self.delivery_tag, false, requeue)
    }

    /// Reject this delivery with `basic.reject`.
    pub fn reject(&self, requeue: bool) -> Result<(), Error> {
        self.channel()?.send_reject(self.delivery_tag, requeue)
    }

    fn channel(&self) -> Result<std::sync::Arc<ChannelInner>, Error> {
        self.channel.upgrade().ok_or(Error::ChannelNotOpen)
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("delivery_tag", &self.delivery_tag)
            .field("redelivered", &self.redelivered)
            .field("exchange", &self.exchange)
            .field("routing_key", &self.routing_key)
            .field("consumer_tag", &self.consumer_tag)
            .field("body_len", &self.message.body.len())
            .finish()
    }
}

/// A published message the broker could not route, handed back with
/// `basic.return`.
#[derive(Debug)]
pub struct ReturnedMessage {
    /// Why the message came back, for example 312 `NO_ROUTE`.
    pub reply_code: u16,
    /// Human-readable reason.
    pub reply_text: String,
    /// Exchange the message was published to.
    pub exchange: String,
    /// Routing key the message was published with.
    pub routing_key: String,
    /// The returned message.
    pub message: Message,
}

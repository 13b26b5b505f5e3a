//! Methods of the `basic` class (class id 60), including the RabbitMQ
//! `nack` extension.

use bytes::{Buf, BufMut, BytesMut};

use crate::primitives;
use crate::value::FieldTable;
use crate::Error;

/// Set prefetch limits for the channel or connection.
///
/// `<method name="qos" synchronous="1" index="10">`: `prefetch-size`
/// (long), `prefetch-count` (short), `global` (bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qos {
    /// Prefetch window in octets, 0 for no limit.
    pub prefetch_size: u32,
    /// Prefetch window in messages, 0 for no limit.
    pub prefetch_count: u16,
    /// Apply per-connection instead of per-channel.
    pub global: bool,
}

impl Qos {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u32(self.prefetch_size);
        buf.put_u16(self.prefetch_count);
        buf.put_u8(u8::from(self.global));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            prefetch_size: primitives::get_long(buf)?,
            prefetch_count: primitives::get_short(buf)?,
            global: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Start a consumer on a queue.
///
/// `<method name="consume" synchronous="1" index="20">`: `reserved-1`
/// (short), `queue` (shortstr), `consumer-tag` (shortstr), then the bits
/// `no-local`, `no-ack`, `exclusive`, `no-wait` packed in one octet, then
/// `arguments` (table).
#[derive(Debug, Clone, PartialEq)]
pub struct Consume {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Queue to consume from.
    pub queue: String,
    /// Consumer identity; empty asks the server to generate one.
    pub consumer_tag: String,
    /// Do not deliver messages published on this connection.
    pub no_local: bool,
    /// Deliveries need no acknowledgement.
    pub no_ack: bool,
    /// Only this consumer may access the queue.
    pub exclusive: bool,
    /// Do not send a consume-ok reply.
    pub no_wait: bool,
    /// Implementation-specific arguments.
    pub arguments: FieldTable,
}

impl Consume {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.queue)?;
        primitives::put_shortstr(buf, &self.consumer_tag)?;
        let mut bits = 0u8;
        if self.no_local {
            bits |= 1 << 0;
        }
        if self.no_ack {
            bits |= 1 << 1;
        }
        if self.exclusive {
            bits |= 1 << 2;
        }
        if self.no_wait {
            bits |= 1 << 3;
        }
        buf.put_u8(bits);
        self.arguments.encode(buf)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let reserved_1 = primitives::get_short(buf)?;
        let queue = primitives::get_shortstr(buf)?;
        let consumer_tag = primitives::get_shortstr(buf)?;
        let bits = primitives::get_octet(buf)?;
        Ok(Self {
            reserved_1,
            queue,
            consumer_tag,
            no_local: bits & 1 << 0 != 0,
            no_ack: bits & 1 << 1 != 0,
            exclusive: bits & 1 << 2 != 0,
            no_wait: bits & 1 << 3 != 0,
            arguments: FieldTable::decode(buf)?,
        })
    }
}

/// Confirm a consumer.
///
/// `<method name="consume-ok" synchronous="0" index="21">`:
/// `consumer-tag` (shortstr).
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumeOk {
    /// The consumer tag, possibly server-generated.
    pub consumer_tag: String,
}

impl ConsumeOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.consumer_tag)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            consumer_tag: primitives::get_shortstr(buf)?,
        })
    }
}

/// End a consumer.
///
/// `<method name="cancel" synchronous="1" index="30">`: `consumer-tag`
/// (shortstr), `no-wait` (bit). The server also sends this to the client
/// when a consumer dies with the queue (RabbitMQ consumer cancel
/// notification).
#[derive(Debug, Clone, PartialEq)]
pub struct Cancel {
    /// Consumer to cancel.
    pub consumer_tag: String,
    /// Do not send a cancel-ok reply.
    pub no_wait: bool,
}

impl Cancel {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.consumer_tag)?;
        buf.put_u8(u8::from(self.no_wait));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            consumer_tag: primitives::get_shortstr(buf)?,
            no_wait: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Confirm a cancelled consumer.
///
/// `<method name="cancel-ok" synchronous="0" index="31">`: `consumer-tag`
/// (shortstr).
#[derive(Debug, Clone, PartialEq)]
pub struct CancelOk {
    /// The cancelled consumer.
    pub consumer_tag: String,
}

impl CancelOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.consumer_tag)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            consumer_tag: primitives::get_shortstr(buf)?,
        })
    }
}

/// Publish a message. Content-bearing.
///
/// `<method name="publish" content="1" index="40">`: `reserved-1`
/// (short), `exchange` (shortstr), `routing-key` (shortstr), bits
/// `mandatory`, `immediate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Publish {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Exchange to publish to; empty is the default exchange.
    pub exchange: String,
    /// Routing key.
    pub routing_key: String,
    /// Return the message if it cannot be routed.
    pub mandatory: bool,
    /// Return the message if it cannot be delivered immediately.
    pub immediate: bool,
}

impl Publish {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.exchange)?;
        primitives::put_shortstr(buf, &self.routing_key)?;
        let mut bits = 0u8;
        if self.mandatory {
            bits |= 1 << 0;
        }
        if self.immediate {
            bits |= 1 << 1;
        }
        buf.put_u8(bits);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let reserved_1 = primitives::get_short(buf)?;
        let exchange = primitives::get_shortstr(buf)?;
        let routing_key = primitives::get_shortstr(buf)?;
        let bits = primitives::get_octet(buf)?;
        Ok(Self {
            reserved_1,
            exchange,
            routing_key,
            mandatory: bits & 1 << 0 != 0,
            immediate: bits & 1 << 1 != 0,
        })
    }
}

/// Return an undeliverable message. Content-bearing.
///
/// `<method name="return" content="1" index="50">`: `reply-code` (short),
/// `reply-text` (shortstr), `exchange` (shortstr), `routing-key`
/// (shortstr).
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    /// Why the message came back, for example 312 `NO_ROUTE`.
    pub reply_code: u16,
    /// Human-readable reason.
    pub reply_text: String,
    /// Exchange the message was published to.
    pub exchange: String,
    /// Routing key the message was published with.
    pub routing_key: String,
}

impl Return {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reply_code);
        primitives::put_shortstr(buf, &self.reply_text)?;
        primitives::put_shortstr(buf, &self.exchange)?;
        primitives::put_shortstr(buf, &self.routing_key)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reply_code: primitives::get_short(buf)?,
            reply_text: primitives::get_shortstr(buf)?,
            exchange: primitives::get_shortstr(buf)?,
            routing_key: primitives::get_shortstr(buf)?,
        })
    }
}

/// Deliver a message to a consumer. Content-bearing.
///
/// `<method name="deliver" content="1" index="60">`: `consumer-tag`
/// (shortstr), `delivery-tag` (longlong), `redelivered` (bit),
/// `exchange` (shortstr), `routing-key` (shortstr).
#[derive(Debug, Clone, PartialEq)]
pub struct Deliver {
    /// Consumer the message is for.
    pub consumer_tag: String,
    /// Channel-scoped delivery tag for acknowledgement.
    pub delivery_tag: u64,
    /// The message was delivered before.
    pub redelivered: bool,
    /// Exchange the message was published to.
    pub exchange: String,
    /// Routing key the message was published with.
    pub routing_key: String,
}

impl Deliver {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.consumer_tag)?;
        buf.put_u64(self.delivery_tag);
        buf.put_u8(u8::from(self.redelivered));
        primitives::put_shortstr(buf, &self.exchange)?;
        primitives::put_shortstr(buf, &self.routing_key)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            consumer_tag: primitives::get_shortstr(buf)?,
            delivery_tag: primitives::get_longlong(buf)?,
            redelivered: primitives::get_octet(buf)? & 0x01 != 0,
            exchange: primitives::get_shortstr(buf)?,
            routing_key: primitives::get_shortstr(buf)?,
        })
    }
}

/// Fetch a single message.
///
/// `<method name="get" synchronous="1" index="70">`: `reserved-1`
/// (short), `queue` (shortstr), `no-ack` (bit).
#[derive(Debug, Clone, PartialEq)]
pub struct Get {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Queue to fetch from.
    pub queue: String,
    /// The fetched message needs no acknowledgement.
    pub no_ack: bool,
}

impl Get {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.queue)?;
        buf.put_u8(u8::from(self.no_ack));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_short(buf)?,
            queue: primitives::get_shortstr(buf)?,
            no_ack: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Hand over a fetched message. Content-bearing.
///
/// `<method name="get-ok" synchronous="0" content="1" index="71">`:
/// `delivery-tag` (longlong), `redelivered` (bit), `exchange`
/// (shortstr), `routing-key` (shortstr), `message-count` (long).
#[derive(Debug, Clone, PartialEq)]
pub struct GetOk {
    /// Channel-scoped delivery tag for acknowledgement.
    pub delivery_tag: u64,
    /// The message was delivered before.
    pub redelivered: bool,
    /// Exchange the message was published to.
    pub exchange: String,
    /// Routing key the message was published with.
    pub routing_key: String,
    /// Messages remaining in the queue.
    pub message_count: u32,
}

impl GetOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u64(self.delivery_tag);
        buf.put_u8(u8::from(self.redelivered));
        primitives::put_shortstr(buf, &self.exchange)?;
        primitives::put_shortstr(buf, &self.routing_key)?;
        buf.put_u32(self.message_count);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            delivery_tag: primitives::get_longlong(buf)?,
            redelivered: primitives::get_octet(buf)? & 0x01 != 0,
            exchange: primitives::get_shortstr(buf)?,
            routing_key: primitives::get_shortstr(buf)?,
            message_count: primitives::get_long(buf)?,
        })
    }
}

/// Report an empty queue on `get`.
///
/// `<method name="get-empty" synchronous="0" index="72">`: `reserved-1`
/// (shortstr).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GetEmpty {
    /// Reserved, formerly `cluster-id`.
    pub reserved_1: String,
}

impl GetEmpty {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.reserved_1)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_shortstr(buf)?,
        })
    }
}

/// Acknowledge one or more deliveries.
///
/// `<method name="ack" index="80">`: `delivery-tag` (longlong),
/// `multiple` (bit). Sent client-to-server for deliveries and
/// server-to-client for publisher confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Delivery tag; 0 with `multiple` means everything so far.
    pub delivery_tag: u64,
    /// Also acknowledge all lower tags.
    pub multiple: bool,
}

impl Ack {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u64(self.delivery_tag);
        buf.put_u8(u8::from(self.multiple));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            delivery_tag: primitives::get_longlong(buf)?,
            multiple: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Reject a single delivery.
///
/// `<method name="reject" index="90">`: `delivery-tag` (longlong),
/// `requeue` (bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reject {
    /// Delivery to reject.
    pub delivery_tag: u64,
    /// Requeue instead of discarding.
    pub requeue: bool,
}

impl Reject {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u64(self.delivery_tag);
        buf.put_u8(u8::from(self.requeue));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            delivery_tag: primitives::get_longlong(buf)?,
            requeue: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Redeliver unacknowledged messages, without confirmation (deprecated).
///
/// `<method name="recover-async" index="100">`: `requeue` (bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverAsync {
    /// Requeue to any consumer instead of the original one.
    pub requeue: bool,
}

impl RecoverAsync {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u8(u8::from(self.requeue));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            requeue: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Redeliver unacknowledged messages.
///
/// `<method name="recover" synchronous="1" index="110">`: `requeue`
/// (bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recover {
    /// Requeue to any consumer instead of the original one.
    pub requeue: bool,
}

impl Recover {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u8(u8::from(self.requeue));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            requeue: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Reject one or more deliveries (RabbitMQ extension).
///
/// `<method name="nack" index="120">`: `delivery-tag` (longlong), bits
/// `multiple`, `requeue`. Also sent server-to-client as a negative
/// publisher confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nack {
    /// Delivery tag; 0 with `multiple` means everything so far.
    pub delivery_tag: u64,
    /// Also reject all lower tags.
    pub multiple: bool,
    /// Requeue instead of discarding.
    pub requeue: bool,
}

impl Nack {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u64(self.delivery_tag);
        let mut bits = 0u8;
        if self.multiple {
            bits |= 1 << 0;
        }
        if self.requeue {
            bits |= 1 << 1;
        }
        buf.put_u8(bits);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let delivery_tag = primitives::get_longlong(buf)?;
        let bits = primitives::get_octet(buf)?;
        Ok(Self {
            delivery_tag,
            multiple: bits & 1 << 0 != 0,
            requeue: bits & 1 << 1 != 0,
        })
    }
}

//! Methods of the `queue` class (class id 50).

use bytes::{Buf, BufMut, BytesMut};

use crate::primitives;
use crate::value::FieldTable;
use crate::Error;

/// Verify or create a queue.
///
/// `<method name="declare" synchronous="1" index="10">`: `reserved-1`
/// (short), `queue` (shortstr), then the bits `passive`, `durable`,
/// `exclusive`, `auto-delete`, `no-wait` packed in one octet, then
/// `arguments` (table).
#[derive(Debug, Clone, PartialEq)]
pub struct Declare {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Queue name; empty asks the server to generate one.
    pub queue: String,
    /// Only check for existence, do not create.
    pub passive: bool,
    /// Survive a broker restart.
    pub durable: bool,
    /// Only this connection may use the queue; deleted on disconnect.
    pub exclusive: bool,
    /// Delete when the last consumer cancels.
    pub auto_delete: bool,
    /// Do not send a declare-ok reply.
    pub no_wait: bool,
    /// Implementation-specific arguments, for example `x-message-ttl`.
    pub arguments: FieldTable,
}

impl Declare {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.queue)?;
        let mut bits = 0u8;
        if self.passive {
            bits |= 1 << 0;
        }
        if self.durable {
            bits |= 1 << 1;
        }
        if self.exclusive {
            bits |= 1 << 2;
        }
        if self.auto_delete {
            bits |= 1 << 3;
        }
        if self.no_wait {
            bits |= 1 << 4;
        }
        buf.put_u8(bits);
        self.arguments.encode(buf)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let reserved_1 = primitives::get_short(buf)?;
        let queue = primitives::get_shortstr(buf)?;
        let bits = primitives::get_octet(buf)?;
        Ok(Self {
            reserved_1,
            queue,
            passive: bits & 1 << 0 != 0,
            durable: bits & 1 << 1 != 0,
            exclusive: bits & 1 << 2 != 0,
            auto_delete: bits & 1 << 3 != 0,
            no_wait: bits & 1 << 4 != 0,
            arguments: FieldTable::decode(buf)?,
        })
    }
}

/// Report a declared queue.
///
/// `<method name="declare-ok" synchronous="0" index="11">`: `queue`
/// (shortstr), `message-count` (long), `consumer-count` (long).
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareOk {
    /// The queue name, possibly server-generated.
    pub queue: String,
    /// Messages ready for delivery.
    pub message_count: u32,
    /// Active consumers.
    pub consumer_count: u32,
}

impl DeclareOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.queue)?;
        buf.put_u32(self.message_count);
        buf.put_u32(self.consumer_count);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            queue: primitives::get_shortstr(buf)?,
            message_count: primitives::get_long(buf)?,
            consumer_count: primitives::get_long(buf)?,
        })
    }
}

/// Bind a queue to an exchange.
///
/// `<method name="bind" synchronous="1" index="20">`: `reserved-1`
/// (short), `queue` (shortstr), `exchange` (shortstr), `routing-key`
/// (shortstr), `no-wait` (bit), `arguments` (table).
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Queue to bind; empty means the last declared queue.
    pub queue: String,
    /// Exchange to bind to.
    pub exchange: String,
    /// Routing key for the binding.
    pub routing_key: String,
    /// Do not send a bind-ok reply.
    pub no_wait: bool,
    /// Implementation-specific arguments.
    pub arguments: FieldTable,
}

impl Bind {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.queue)?;
        primitives::put_shortstr(buf, &self.exchange)?;
        primitives::put_shortstr(buf, &self.routing_key)?;
        buf.put_u8(u8::from(self.no_wait));
        self.arguments.encode(buf)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_short(buf)?,
            queue: primitives::get_shortstr(buf)?,
            exchange: primitives::get_shortstr(buf)?,
            routing_key: primitives::get_shortstr(buf)?,
            no_wait: primitives::get_octet(buf)? & 0x01 != 0,
            arguments: FieldTable::decode(buf)?,
        })
    }
}

/// Remove messages from a queue.
///
/// `<method name="purge" synchronous="1" index="30">`: `reserved-1`
/// (short), `queue` (shortstr), `no-wait` (bit).
#[derive(Debug, Clone, PartialEq)]
pub struct Purge {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Queue to purge.
    pub queue: String,
    /// Do not send a purge-ok reply.
    pub no_wait: bool,
}

impl Purge {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.queue)?;
        buf.put_u8(u8::from(self.no_wait));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_short(buf)?,
            queue: primitives::get_shortstr(buf)?,
            no_wait: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Report purged messages.
///
/// `<method name="purge-ok" synchronous="0" index="31">`: `message-count`
/// (long).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeOk {
    /// Messages removed.
    pub message_count: u32,
}

impl PurgeOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u32(self.message_count);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            message_count: primitives::get_long(buf)?,
        })
    }
}

/// Delete a queue.
///
/// `<method name="delete" synchronous="1" index="40">`: `reserved-1`
/// (short), `queue` (shortstr), bits `if-unused`, `if-empty`, `no-wait`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Queue to delete.
    pub queue: String,
    /// Only delete if the queue has no consumers.
    pub if_unused: bool,
    /// Only delete if the queue is empty.
    pub if_empty: bool,
    /// Do not send a delete-ok reply.
    pub no_wait: bool,
}

impl Delete {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.queue)?;
        let mut bits = 0u8;
        if self.if_unused {
            bits |= 1 << 0;
        }
        if self.if_empty {
            bits |= 1 << 1;
        }
        if self.no_wait {
            bits |= 1 << 2;
        }
        buf.put_u8(bits);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let reserved_1 = primitives::get_short(buf)?;
        let queue = primitives::get_shortstr(buf)?;
        let bits = primitives::get_octet(buf)?;
        Ok(Self {
            reserved_1,
            queue,
            if_unused: bits & 1 << 0 != 0,
            if_empty: bits & 1 << 1 != 0,
            no_wait: bits & 1 << 2 != 0,
        })
    }
}

/// Report a deleted queue.
///
/// `<method name="delete-ok" synchronous="0" index="41">`: `message-count`
/// (long).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOk {
    /// Messages deleted along with the queue.
    pub message_count: u32,
}

impl DeleteOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u32(self.message_count);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            message_count: primitives::get_long(buf)?,
        })
    }
}

/// Unbind a queue from an exchange.
///
/// `<method name="unbind" synchronous="1" index="50">`: `reserved-1`
/// (short), `queue` (shortstr), `exchange` (shortstr), `routing-key`
/// (shortstr), `arguments` (table). Unlike `bind` there is no `no-wait`
/// bit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unbind {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Queue the binding is on.
    pub queue: String,
    /// Exchange the binding points at.
    pub exchange: String,
    /// Routing key of the binding.
    pub routing_key: String,
    /// Arguments the binding was created with.
    pub arguments: FieldTable,
}

impl Unbind {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.queue)?;
        primitives::put_shortstr(buf, &self.exchange)?;
        primitives::put_shortstr(buf, &self.routing_key)?;
        self.arguments.encode(buf)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_short(buf)?,
            queue: primitives::get_shortstr(buf)?,
            exchange: primitives::get_shortstr(buf)?,
            routing_key: primitives::get_shortstr(buf)?,
            arguments: FieldTable::decode(buf)?,
        })
    }
}

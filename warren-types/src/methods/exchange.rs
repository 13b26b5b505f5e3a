//! Methods of the `exchange` class (class id 40), including the RabbitMQ
//! exchange-to-exchange binding extension.

use bytes::{Buf, BufMut, BytesMut};

use crate::primitives;
use crate::value::FieldTable;
use crate::Error;

/// Verify or create an exchange.
///
/// `<method name="declare" synchronous="1" index="10">`: `reserved-1`
/// (short), `exchange` (shortstr), `type` (shortstr), then the bits
/// `passive`, `durable`, `auto-delete`, `internal`, `no-wait` packed in
/// one octet, then `arguments` (table).
#[derive(Debug, Clone, PartialEq)]
pub struct Declare {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Exchange name.
    pub exchange: String,
    /// Exchange type, for example `direct`, `fanout`, `topic`.
    pub exchange_type: String,
    /// Only check for existence, do not create.
    pub passive: bool,
    /// Survive a broker restart.
    pub durable: bool,
    /// Delete when no longer used.
    pub auto_delete: bool,
    /// Not directly publishable, only a binding target.
    pub internal: bool,
    /// Do not send a declare-ok reply.
    pub no_wait: bool,
    /// Implementation-specific arguments.
    pub arguments: FieldTable,
}

impl Declare {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.exchange)?;
        primitives::put_shortstr(buf, &self.exchange_type)?;
        let mut bits = 0u8;
        if self.passive {
            bits |= 1 << 0;
        }
        if self.durable {
            bits |= 1 << 1;
        }
        if self.auto_delete {
            bits |= 1 << 2;
        }
        if self.internal {
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
        let exchange = primitives::get_shortstr(buf)?;
        let exchange_type = primitives::get_shortstr(buf)?;
        let bits = primitives::get_octet(buf)?;
        Ok(Self {
            reserved_1,
            exchange,
            exchange_type,
            passive: bits & 1 << 0 != 0,
            durable: bits & 1 << 1 != 0,
            auto_delete: bits & 1 << 2 != 0,
            internal: bits & 1 << 3 != 0,
            no_wait: bits & 1 << 4 != 0,
            arguments: FieldTable::decode(buf)?,
        })
    }
}

/// Delete an exchange.
///
/// `<method name="delete" synchronous="1" index="20">`: `reserved-1`
/// (short), `exchange` (shortstr), bits `if-unused`, `no-wait`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Exchange name.
    pub exchange: String,
    /// Only delete if the exchange has no bindings.
    pub if_unused: bool,
    /// Do not send a delete-ok reply.
    pub no_wait: bool,
}

impl Delete {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.exchange)?;
        let mut bits = 0u8;
        if self.if_unused {
            bits |= 1 << 0;
        }
        if self.no_wait {
            bits |= 1 << 1;
        }
        buf.put_u8(bits);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let reserved_1 = primitives::get_short(buf)?;
        let exchange = primitives::get_shortstr(buf)?;
        let bits = primitives::get_octet(buf)?;
        Ok(Self {
            reserved_1,
            exchange,
            if_unused: bits & 1 << 0 != 0,
            no_wait: bits & 1 << 1 != 0,
        })
    }
}

/// Bind an exchange to an exchange (RabbitMQ extension).
///
/// `<method name="bind" synchronous="1" index="30">`: `reserved-1`
/// (short), `destination` (shortstr), `source` (shortstr), `routing-key`
/// (shortstr), `no-wait` (bit), `arguments` (table).
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Exchange that receives the routed messages.
    pub destination: String,
    /// Exchange the messages are routed from.
    pub source: String,
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
        primitives::put_shortstr(buf, &self.destination)?;
        primitives::put_shortstr(buf, &self.source)?;
        primitives::put_shortstr(buf, &self.routing_key)?;
        buf.put_u8(u8::from(self.no_wait));
        self.arguments.encode(buf)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_short(buf)?,
            destination: primitives::get_shortstr(buf)?,
            source: primitives::get_shortstr(buf)?,
            routing_key: primitives::get_shortstr(buf)?,
            no_wait: primitives::get_octet(buf)? & 0x01 != 0,
            arguments: FieldTable::decode(buf)?,
        })
    }
}

/// Unbind an exchange from an exchange (RabbitMQ extension).
///
/// `<method name="unbind" synchronous="1" index="40">`: same fields as
/// [`Bind`]. The reply `unbind-ok` is index 51.
#[derive(Debug, Clone, PartialEq)]
pub struct Unbind {
    /// Reserved, formerly `ticket`.
    pub reserved_1: u16,
    /// Exchange the binding points at.
    pub destination: String,
    /// Exchange the binding is on.
    pub source: String,
    /// Routing key of the binding.
    pub routing_key: String,
    /// Do not send an unbind-ok reply.
    pub no_wait: bool,
    /// Arguments the binding was created with.
    pub arguments: FieldTable,
}

impl Unbind {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reserved_1);
        primitives::put_shortstr(buf, &self.destination)?;
        primitives::put_shortstr(buf, &self.source)?;
        primitives::put_shortstr(buf, &self.routing_key)?;
        buf.put_u8(u8::from(self.no_wait));
        self.arguments.encode(buf)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_short(buf)?,
            destination: primitives::get_shortstr(buf)?,
            source: primitives::get_shortstr(buf)?,
            routing_key: primitives::get_shortstr(buf)?,
            no_wait: primitives::get_octet(buf)? & 0x01 != 0,
            arguments: FieldTable::decode(buf)?,
        })
    }
}

//! Methods of the `connection` class (class id 10).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::primitives;
use crate::value::FieldTable;
use crate::Error;

/// Begin connection negotiation.
///
/// `<method name="start" synchronous="1" index="10">`: `version-major`
/// (octet), `version-minor` (octet), `server-properties` (table),
/// `mechanisms` (longstr), `locales` (longstr).
#[derive(Debug, Clone, PartialEq)]
pub struct Start {
    /// Protocol major version, 0 for 0.9.1.
    pub version_major: u8,
    /// Protocol minor version, 9 for 0.9.1.
    pub version_minor: u8,
    /// Server capabilities and product information.
    pub server_properties: FieldTable,
    /// Space-separated SASL mechanism names.
    pub mechanisms: Bytes,
    /// Space-separated locales.
    pub locales: Bytes,
}

impl Start {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u8(self.version_major);
        buf.put_u8(self.version_minor);
        self.server_properties.encode(buf)?;
        primitives::put_longstr(buf, &self.mechanisms);
        primitives::put_longstr(buf, &self.locales);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            version_major: primitives::get_octet(buf)?,
            version_minor: primitives::get_octet(buf)?,
            server_properties: FieldTable::decode(buf)?,
            mechanisms: primitives::get_longstr(buf)?,
            locales: primitives::get_longstr(buf)?,
        })
    }
}

/// Select a security mechanism and locale.
///
/// `<method name="start-ok" synchronous="0" index="11">`:
/// `client-properties` (table), `mechanism` (shortstr), `response`
/// (longstr), `locale` (shortstr).
#[derive(Debug, Clone, PartialEq)]
pub struct StartOk {
    /// Client capabilities and product information.
    pub client_properties: FieldTable,
    /// Chosen SASL mechanism.
    pub mechanism: String,
    /// Opaque mechanism response, `\0user\0pass` for PLAIN.
    pub response: Bytes,
    /// Chosen locale.
    pub locale: String,
}

impl StartOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        self.client_properties.encode(buf)?;
        primitives::put_shortstr(buf, &self.mechanism)?;
        primitives::put_longstr(buf, &self.response);
        primitives::put_shortstr(buf, &self.locale)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            client_properties: FieldTable::decode(buf)?,
            mechanism: primitives::get_shortstr(buf)?,
            response: primitives::get_longstr(buf)?,
            locale: primitives::get_shortstr(buf)?,
        })
    }
}

/// Additional security mechanism challenge.
///
/// `<method name="secure" synchronous="1" index="20">`: `challenge`
/// (longstr).
#[derive(Debug, Clone, PartialEq)]
pub struct Secure {
    /// Mechanism-specific challenge data.
    pub challenge: Bytes,
}

impl Secure {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_longstr(buf, &self.challenge);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            challenge: primitives::get_longstr(buf)?,
        })
    }
}

/// Answer to a security challenge.
///
/// `<method name="secure-ok" synchronous="0" index="21">`: `response`
/// (longstr).
#[derive(Debug, Clone, PartialEq)]
pub struct SecureOk {
    /// Mechanism-specific response data.
    pub response: Bytes,
}

impl SecureOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_longstr(buf, &self.response);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            response: primitives::get_longstr(buf)?,
        })
    }
}

/// Propose connection tuning parameters.
///
/// `<method name="tune" synchronous="1" index="30">`: `channel-max`
/// (short), `frame-max` (long), `heartbeat` (short). Zero means "no
/// limit" for the first two and "no heartbeat" for the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tune {
    /// Highest channel id the server accepts, 0 for no limit.
    pub channel_max: u16,
    /// Largest frame the server accepts, 0 for no limit.
    pub frame_max: u32,
    /// Heartbeat delay in seconds the server wants, 0 to disable.
    pub heartbeat: u16,
}

impl Tune {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.channel_max);
        buf.put_u32(self.frame_max);
        buf.put_u16(self.heartbeat);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            channel_max: primitives::get_short(buf)?,
            frame_max: primitives::get_long(buf)?,
            heartbeat: primitives::get_short(buf)?,
        })
    }
}

/// Accept negotiated tuning parameters.
///
/// `<method name="tune-ok" synchronous="0" index="31">`: same fields as
/// [`Tune`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuneOk {
    /// Agreed channel-max.
    pub channel_max: u16,
    /// Agreed frame-max.
    pub frame_max: u32,
    /// Agreed heartbeat delay in seconds.
    pub heartbeat: u16,
}

impl TuneOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.channel_max);
        buf.put_u32(self.frame_max);
        buf.put_u16(self.heartbeat);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            channel_max: primitives::get_short(buf)?,
            frame_max: primitives::get_long(buf)?,
            heartbeat: primitives::get_short(buf)?,
        })
    }
}

/// Open a connection to a virtual host.
///
/// `<method name="open" synchronous="1" index="40">`: `virtual-host`
/// (shortstr), `reserved-1` (shortstr), `reserved-2` (bit).
#[derive(Debug, Clone, PartialEq)]
pub struct Open {
    /// Virtual host path, `/` by default.
    pub virtual_host: String,
    /// Reserved, formerly `capabilities`.
    pub reserved_1: String,
    /// Reserved, formerly `insist`.
    pub reserved_2: bool,
}

impl Open {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.virtual_host)?;
        primitives::put_shortstr(buf, &self.reserved_1)?;
        buf.put_u8(u8::from(self.reserved_2));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            virtual_host: primitives::get_shortstr(buf)?,
            reserved_1: primitives::get_shortstr(buf)?,
            reserved_2: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Signal that the connection is ready.
///
/// `<method name="open-ok" synchronous="0" index="41">`: `reserved-1`
/// (shortstr).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenOk {
    /// Reserved, formerly `known-hosts`.
    pub reserved_1: String,
}

impl OpenOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.reserved_1)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_shortstr(buf)?,
        })
    }
}

/// Request a connection close.
///
/// `<method name="close" synchronous="1" index="50">`: `reply-code`
/// (short), `reply-text` (shortstr), `class-id` (short), `method-id`
/// (short). The class and method ids name the method that caused an
/// exception close, or 0 for a clean close.
#[derive(Debug, Clone, PartialEq)]
pub struct Close {
    /// AMQP reply code, 200 for a clean close.
    pub reply_code: u16,
    /// Human-readable reason.
    pub reply_text: String,
    /// Class id of the offending method, or 0.
    pub class_id: u16,
    /// Method id of the offending method, or 0.
    pub method_id: u16,
}

impl Close {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.reply_code);
        primitives::put_shortstr(buf, &self.reply_text)?;
        buf.put_u16(self.class_id);
        buf.put_u16(self.method_id);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reply_code: primitives::get_short(buf)?,
            reply_text: primitives::get_shortstr(buf)?,
            class_id: primitives::get_short(buf)?,
            method_id: primitives::get_short(buf)?,
        })
    }
}

/// The server will stop accepting new work (RabbitMQ extension).
///
/// `<method name="blocked" index="60">`: `reason` (shortstr).
#[derive(Debug, Clone, PartialEq)]
pub struct Blocked {
    /// Why publishes are being blocked, for example a resource alarm.
    pub reason: String,
}

impl Blocked {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.reason)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reason: primitives::get_shortstr(buf)?,
        })
    }
}

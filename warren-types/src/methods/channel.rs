//! Methods of the `channel` class (class id 20).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::primitives;
use crate::Error;

/// Open a channel for use.
///
/// `<method name="open" synchronous="1" index="10">`: `reserved-1`
/// (shortstr).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Open {
    /// Reserved, formerly `out-of-band`.
    pub reserved_1: String,
}

impl Open {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_shortstr(buf, &self.reserved_1)
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_shortstr(buf)?,
        })
    }
}

/// Signal that the channel is ready.
///
/// `<method name="open-ok" synchronous="0" index="11">`: `reserved-1`
/// (longstr).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenOk {
    /// Reserved, formerly `channel-id`.
    pub reserved_1: Bytes,
}

impl OpenOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        primitives::put_longstr(buf, &self.reserved_1);
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            reserved_1: primitives::get_longstr(buf)?,
        })
    }
}

/// Enable or disable content flow from the peer.
///
/// `<method name="flow" synchronous="1" index="20">`: `active` (bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flow {
    /// True to restart content frames, false to pause them.
    pub active: bool,
}

impl Flow {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u8(u8::from(self.active));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            active: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Confirm a flow change.
///
/// `<method name="flow-ok" synchronous="0" index="21">`: `active` (bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowOk {
    /// The flow setting now in effect.
    pub active: bool,
}

impl FlowOk {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u8(u8::from(self.active));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            active: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

/// Request a channel close.
///
/// `<method name="close" synchronous="1" index="40">`: `reply-code`
/// (short), `reply-text` (shortstr), `class-id` (short), `method-id`
/// (short).
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

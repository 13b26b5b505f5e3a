//! Methods of the RabbitMQ `confirm` extension class (class id 85).

use bytes::{Buf, BufMut, BytesMut};

use crate::primitives;
use crate::Error;

/// Put the channel into publisher-confirm mode.
///
/// `<method name="select" synchronous="1" index="10">`: `nowait` (bit).
/// Once selected, the server acknowledges every published message with
/// `basic.ack` or `basic.nack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Select {
    /// Do not send a select-ok reply.
    pub no_wait: bool,
}

impl Select {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u8(u8::from(self.no_wait));
        Ok(())
    }

    pub(crate) fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        Ok(Self {
            no_wait: primitives::get_octet(buf)? & 0x01 != 0,
        })
    }
}

//! Content header properties for the `basic` class.
//!
//! A HEADER frame payload is `class_id(2) | weight(2) | body_size(8) |
//! property_flags(2) | property_list`. Each property has a presence bit in
//! the flags word, assigned from bit 15 downwards in declaration order;
//! bit 0 of a flags word signals a continuation word (unused by the
//! `basic` class but consumed for forward compatibility).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::primitives;
use crate::value::{FieldTable, Timestamp};
use crate::Error;

const FLAG_CONTENT_TYPE: u16 = 1 << 15;
const FLAG_CONTENT_ENCODING: u16 = 1 << 14;
const FLAG_HEADERS: u16 = 1 << 13;
const FLAG_DELIVERY_MODE: u16 = 1 << 12;
const FLAG_PRIORITY: u16 = 1 << 11;
const FLAG_CORRELATION_ID: u16 = 1 << 10;
const FLAG_REPLY_TO: u16 = 1 << 9;
const FLAG_EXPIRATION: u16 = 1 << 8;
const FLAG_MESSAGE_ID: u16 = 1 << 7;
const FLAG_TIMESTAMP: u16 = 1 << 6;
const FLAG_MESSAGE_TYPE: u16 = 1 << 5;
const FLAG_USER_ID: u16 = 1 << 4;
const FLAG_APP_ID: u16 = 1 << 3;
const FLAG_CLUSTER_ID: u16 = 1 << 2;
const FLAG_CONTINUATION: u16 = 1;

/// Message properties carried by a content header.
///
/// Absent properties are omitted from the wire entirely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicProperties {
    /// MIME content type.
    pub content_type: Option<String>,
    /// MIME content encoding.
    pub content_encoding: Option<String>,
    /// Application headers.
    pub headers: Option<FieldTable>,
    /// 1 = transient, 2 = persistent.
    pub delivery_mode: Option<u8>,
    /// Priority, 0 to 9.
    pub priority: Option<u8>,
    /// Application correlation identifier.
    pub correlation_id: Option<String>,
    /// Address to reply to.
    pub reply_to: Option<String>,
    /// Message expiration, milliseconds as a string.
    pub expiration: Option<String>,
    /// Application message identifier.
    pub message_id: Option<String>,
    /// Message timestamp.
    pub timestamp: Option<Timestamp>,
    /// Message type name.
    pub message_type: Option<String>,
    /// Creating user id, validated by the broker.
    pub user_id: Option<String>,
    /// Creating application id.
    pub app_id: Option<String>,
    /// Reserved, used by cluster implementations.
    pub cluster_id: Option<String>,
}

impl BasicProperties {
    fn flags(&self) -> u16 {
        let mut flags = 0;
        let mut set = |present: bool, flag: u16| {
            if present {
                flags |= flag;
            }
        };
        set(self.content_type.is_some(), FLAG_CONTENT_TYPE);
        set(self.content_encoding.is_some(), FLAG_CONTENT_ENCODING);
        set(self.headers.is_some(), FLAG_HEADERS);
        set(self.delivery_mode.is_some(), FLAG_DELIVERY_MODE);
        set(self.priority.is_some(), FLAG_PRIORITY);
        set(self.correlation_id.is_some(), FLAG_CORRELATION_ID);
        set(self.reply_to.is_some(), FLAG_REPLY_TO);
        set(self.expiration.is_some(), FLAG_EXPIRATION);
        set(self.message_id.is_some(), FLAG_MESSAGE_ID);
        set(self.timestamp.is_some(), FLAG_TIMESTAMP);
        set(self.message_type.is_some(), FLAG_MESSAGE_TYPE);
        set(self.user_id.is_some(), FLAG_USER_ID);
        set(self.app_id.is_some(), FLAG_APP_ID);
        set(self.cluster_id.is_some(), FLAG_CLUSTER_ID);
        flags
    }

    /// Encode the flags word and the present properties in declaration
    /// order.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.flags());
        if let Some(v) = &self.content_type {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = &self.content_encoding {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = &self.headers {
            v.encode(buf)?;
        }
        if let Some(v) = self.delivery_mode {
            buf.put_u8(v);
        }
        if let Some(v) = self.priority {
            buf.put_u8(v);
        }
        if let Some(v) = &self.correlation_id {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = &self.reply_to {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = &self.expiration {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = &self.message_id {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = self.timestamp {
            buf.put_u64(v.0);
        }
        if let Some(v) = &self.message_type {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = &self.user_id {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = &self.app_id {
            primitives::put_shortstr(buf, v)?;
        }
        if let Some(v) = &self.cluster_id {
            primitives::put_shortstr(buf, v)?;
        }
        Ok(())
    }

    /// Decode a flags word (plus any continuation words) and the properties
    /// it announces.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let flags = primitives::get_short(buf)?;
        let mut more = flags;
        while more & FLAG_CONTINUATION != 0 {
            more = primitives::get_short(buf)?;
        }
        let mut properties = BasicProperties::default();
        if flags & FLAG_CONTENT_TYPE != 0 {
            properties.content_type = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_CONTENT_ENCODING != 0 {
            properties.content_encoding = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_HEADERS != 0 {
            properties.headers = Some(FieldTable::decode(buf)?);
        }
        if flags & FLAG_DELIVERY_MODE != 0 {
            properties.delivery_mode = Some(primitives::get_octet(buf)?);
        }
        if flags & FLAG_PRIORITY != 0 {
            properties.priority = Some(primitives::get_octet(buf)?);
        }
        if flags & FLAG_CORRELATION_ID != 0 {
            properties.correlation_id = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_REPLY_TO != 0 {
            properties.reply_to = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_EXPIRATION != 0 {
            properties.expiration = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_MESSAGE_ID != 0 {
            properties.message_id = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_TIMESTAMP != 0 {
            properties.timestamp = Some(Timestamp(primitives::get_longlong(buf)?));
        }
        if flags & FLAG_MESSAGE_TYPE != 0 {
            properties.message_type = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_USER_ID != 0 {
            properties.user_id = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_APP_ID != 0 {
            properties.app_id = Some(primitives::get_shortstr(buf)?);
        }
        if flags & FLAG_CLUSTER_ID != 0 {
            properties.cluster_id = Some(primitives::get_shortstr(buf)?);
        }
        Ok(properties)
    }
}

/// The payload of a HEADER frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentHeader {
    /// Class of the content-bearing method, `basic` (60) in practice.
    pub class_id: u16,
    /// Total length of the content body across all BODY frames.
    pub body_size: u64,
    /// Message properties.
    pub properties: BasicProperties,
}

impl ContentHeader {
    /// Encode `class_id | weight=0 | body_size | properties`.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u16(self.class_id);
        buf.put_u16(0);
        buf.put_u64(self.body_size);
        self.properties.encode(buf)
    }

    /// Decode a complete HEADER frame payload.
    pub fn decode(mut payload: Bytes) -> Result<Self, Error> {
        let class_id = primitives::get_short(&mut payload)?;
        let weight = primitives::get_short(&mut payload)?;
        if weight != 0 {
            return Err(Error::MalformedHeader("non-zero weight"));
        }
        let body_size = primitives::get_longlong(&mut payload)?;
        let properties = BasicProperties::decode(&mut payload)?;
        if payload.has_remaining() {
            return Err(Error::MalformedHeader("trailing bytes after properties"));
        }
        Ok(Self {
            class_id,
            body_size,
            properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(header: &ContentHeader) -> ContentHeader {
        let mut buf = BytesMut::new();
        header.encode(&mut buf).unwrap();
        ContentHeader::decode(buf.freeze()).unwrap()
    }

    #[test]
    fn empty_properties_encode_as_zero_flags() {
        let mut buf = BytesMut::new();
        BasicProperties::default().encode(&mut buf).unwrap();
        assert_eq!(&buf[..], &[0, 0]);
    }

    #[test]
    fn header_round_trip() {
        let mut headers = FieldTable::new();
        headers.insert("x-retries", 3i32);
        let header = ContentHeader {
            class_id: 60,
            body_size: 10_000,
            properties: BasicProperties {
                content_type: Some("application/json".into()),
                delivery_mode: Some(2),
                priority: Some(5),
                headers: Some(headers),
                timestamp: Some(Timestamp(1_700_000_000)),
                message_type: Some("event".into()),
                ..BasicProperties::default()
            },
        };
        assert_eq!(round_trip(&header), header);
    }

    #[test]
    fn absent_properties_are_omitted() {
        let header = ContentHeader {
            class_id: 60,
            body_size: 5,
            properties: BasicProperties {
                app_id: Some("a".into()),
                ..BasicProperties::default()
            },
        };
        let mut buf = BytesMut::new();
        header.encode(&mut buf).unwrap();
        // class(2) + weight(2) + size(8) + flags(2) + shortstr "a"(2)
        assert_eq!(buf.len(), 16);
        assert_eq!(round_trip(&header), header);
    }

    #[test]
    fn nonzero_weight_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u16(60);
        buf.put_u16(1);
        buf.put_u64(0);
        buf.put_u16(0);
        assert_eq!(
            ContentHeader::decode(buf.freeze()),
            Err(Error::MalformedHeader("non-zero weight"))
        );
    }
}

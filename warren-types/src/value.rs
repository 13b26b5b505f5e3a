//! Field tables and the typed values they carry.
//!
//! A field table is a `(name, typed value)` sequence used for method
//! arguments (client properties, declare arguments) and message headers.
//! Entries keep their insertion order so that `decode(encode(t)) == t`
//! holds bit-identically.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::primitives::{self, ensure};
use crate::Error;

/// A decimal value: `value` scaled down by 10^`scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    /// Number of decimal digits after the point.
    pub scale: u8,
    /// Unscaled 32-bit value.
    pub value: u32,
}

/// Seconds since the Unix epoch, 64 bits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

/// A single typed value in a field table or field array.
///
/// The type tags are the RabbitMQ field-table dialect: `t` boolean, `b`/`B`
/// signed/unsigned 8, `U`/`u` signed/unsigned 16, `I`/`i` signed/unsigned
/// 32, `L`/`l` signed/unsigned 64, `f` float32, `d` float64, `D` decimal,
/// `s` short string, `S` long string, `A` array, `T` timestamp, `F` nested
/// table, `V` void, `x` byte array.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `t`
    Boolean(bool),
    /// `b`
    ShortShortInt(i8),
    /// `B`
    ShortShortUint(u8),
    /// `U`
    ShortInt(i16),
    /// `u`
    ShortUint(u16),
    /// `I`
    LongInt(i32),
    /// `i`
    LongUint(u32),
    /// `L`
    LongLongInt(i64),
    /// `l`
    LongLongUint(u64),
    /// `f`
    Float(f32),
    /// `d`
    Double(f64),
    /// `D`
    Decimal(Decimal),
    /// `s`
    ShortStr(String),
    /// `S`
    LongStr(Bytes),
    /// `A`
    Array(FieldArray),
    /// `T`
    Timestamp(Timestamp),
    /// `F`
    Table(FieldTable),
    /// `V`
    Void,
    /// `x`
    ByteArray(Bytes),
}

impl FieldValue {
    /// The wire tag for this value.
    pub fn tag(&self) -> u8 {
        match self {
            FieldValue::Boolean(_) => b't',
            FieldValue::ShortShortInt(_) => b'b',
            FieldValue::ShortShortUint(_) => b'B',
            FieldValue::ShortInt(_) => b'U',
            FieldValue::ShortUint(_) => b'u',
            FieldValue::LongInt(_) => b'I',
            FieldValue::LongUint(_) => b'i',
            FieldValue::LongLongInt(_) => b'L',
            FieldValue::LongLongUint(_) => b'l',
            FieldValue::Float(_) => b'f',
            FieldValue::Double(_) => b'd',
            FieldValue::Decimal(_) => b'D',
            FieldValue::ShortStr(_) => b's',
            FieldValue::LongStr(_) => b'S',
            FieldValue::Array(_) => b'A',
            FieldValue::Timestamp(_) => b'T',
            FieldValue::Table(_) => b'F',
            FieldValue::Void => b'V',
            FieldValue::ByteArray(_) => b'x',
        }
    }

    /// Encode the tag octet followed by the value.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        buf.put_u8(self.tag());
        match self {
            FieldValue::Boolean(v) => buf.put_u8(u8::from(*v)),
            FieldValue::ShortShortInt(v) => buf.put_i8(*v),
            FieldValue::ShortShortUint(v) => buf.put_u8(*v),
            FieldValue::ShortInt(v) => buf.put_i16(*v),
            FieldValue::ShortUint(v) => buf.put_u16(*v),
            FieldValue::LongInt(v) => buf.put_i32(*v),
            FieldValue::LongUint(v) => buf.put_u32(*v),
            FieldValue::LongLongInt(v) => buf.put_i64(*v),
            FieldValue::LongLongUint(v) => buf.put_u64(*v),
            FieldValue::Float(v) => buf.put_f32(*v),
            FieldValue::Double(v) => buf.put_f64(*v),
            FieldValue::Decimal(v) => {
                buf.put_u8(v.scale);
                buf.put_u32(v.value);
            }
            FieldValue::ShortStr(v) => primitives::put_shortstr(buf, v)?,
            FieldValue::LongStr(v) => primitives::put_longstr(buf, v),
            FieldValue::Array(v) => v.encode(buf)?,
            FieldValue::Timestamp(v) => buf.put_u64(v.0),
            FieldValue::Table(v) => v.encode(buf)?,
            FieldValue::Void => {}
            FieldValue::ByteArray(v) => primitives::put_longstr(buf, v),
        }
        Ok(())
    }

    /// Decode a tag octet and the value it announces.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let tag = primitives::get_octet(buf)?;
        let value = match tag {
            b't' => FieldValue::Boolean(primitives::get_octet(buf)? != 0),
            b'b' => FieldValue::ShortShortInt(primitives::get_octet_signed(buf)?),
            b'B' => FieldValue::ShortShortUint(primitives::get_octet(buf)?),
            b'U' => FieldValue::ShortInt(primitives::get_short_signed(buf)?),
            b'u' => FieldValue::ShortUint(primitives::get_short(buf)?),
            b'I' => FieldValue::LongInt(primitives::get_long_signed(buf)?),
            b'i' => FieldValue::LongUint(primitives::get_long(buf)?),
            b'L' => FieldValue::LongLongInt(primitives::get_longlong_signed(buf)?),
            b'l' => FieldValue::LongLongUint(primitives::get_longlong(buf)?),
            b'f' => FieldValue::Float(primitives::get_float(buf)?),
            b'd' => FieldValue::Double(primitives::get_double(buf)?),
            b'D' => FieldValue::Decimal(Decimal {
                scale: primitives::get_octet(buf)?,
                value: primitives::get_long(buf)?,
            }),
            b's' => FieldValue::ShortStr(primitives::get_shortstr(buf)?),
            b'S' => FieldValue::LongStr(primitives::get_longstr(buf)?),
            b'A' => FieldValue::Array(FieldArray::decode(buf)?),
            b'T' => FieldValue::Timestamp(Timestamp(primitives::get_longlong(buf)?)),
            b'F' => FieldValue::Table(FieldTable::decode(buf)?),
            b'V' => FieldValue::Void,
            b'x' => FieldValue::ByteArray(primitives::get_longstr(buf)?),
            tag => return Err(Error::UnknownFieldTag { tag }),
        };
        Ok(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::LongInt(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::LongUint(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::LongLongInt(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::LongStr(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::LongStr(Bytes::from(value.into_bytes()))
    }
}

impl From<FieldTable> for FieldValue {
    fn from(value: FieldTable) -> Self {
        FieldValue::Table(value)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(value: Timestamp) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// An ordered sequence of typed values (`A`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldArray(Vec<FieldValue>);

impl FieldArray {
    /// Creates an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value.
    pub fn push(&mut self, value: impl Into<FieldValue>) {
        self.0.push(value.into());
    }

    /// The values in order.
    pub fn values(&self) -> &[FieldValue] {
        &self.0
    }

    fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        let start = buf.len();
        buf.put_u32(0);
        for value in &self.0 {
            value.encode(buf)?;
        }
        let size = (buf.len() - start - 4) as u32;
        buf[start..start + 4].copy_from_slice(&size.to_be_bytes());
        Ok(())
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let size = primitives::get_long(buf)? as usize;
        ensure(buf, size)?;
        let mut section = buf.copy_to_bytes(size);
        let mut values = Vec::new();
        while section.has_remaining() {
            values.push(FieldValue::decode(&mut section)?);
        }
        Ok(Self(values))
    }
}

impl FromIterator<FieldValue> for FieldArray {
    fn from_iter<I: IntoIterator<Item = FieldValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An insertion-ordered `name -> value` map (`F`, and bare in method
/// arguments).
///
/// The top-level encoding is a `u32` byte-length prefix followed by
/// `shortstr name | tag | value` entries. Tables nest through
/// [`FieldValue::Table`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldTable(Vec<(String, FieldValue)>);

impl FieldTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `name`, replacing any existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Encode the table with its `u32` length prefix.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        let start = buf.len();
        buf.put_u32(0);
        for (name, value) in &self.0 {
            primitives::put_shortstr(buf, name)?;
            value.encode(buf)?;
        }
        let size = (buf.len() - start - 4) as u32;
        buf[start..start + 4].copy_from_slice(&size.to_be_bytes());
        Ok(())
    }

    /// Decode a length-prefixed table.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let size = primitives::get_long(buf)? as usize;
        ensure(buf, size)?;
        let mut section = buf.copy_to_bytes(size);
        let mut entries = Vec::new();
        while section.has_remaining() {
            let name = primitives::get_shortstr(&mut section)?;
            let value = FieldValue::decode(&mut section)?;
            entries.push((name, value));
        }
        Ok(Self(entries))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn round_trip_table(table: &FieldTable) -> FieldTable {
        let mut buf = BytesMut::new();
        table.encode(&mut buf).unwrap();
        let mut bytes = buf.freeze();
        let decoded = FieldTable::decode(&mut bytes).unwrap();
        assert!(!bytes.has_remaining());
        decoded
    }

    #[test]
    fn empty_table_is_four_zero_bytes() {
        let mut buf = BytesMut::new();
        FieldTable::new().encode(&mut buf).unwrap();
        assert_eq!(&buf[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn table_round_trip_preserves_order() {
        let mut table = FieldTable::new();
        table.insert("zebra", 1i32);
        table.insert("apple", "red");
        table.insert("nested", {
            let mut inner = FieldTable::new();
            inner.insert("flag", true);
            inner
        });
        let decoded = round_trip_table(&table);
        assert_eq!(decoded, table);
        let names: Vec<_> = decoded.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(names, ["zebra", "apple", "nested"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut table = FieldTable::new();
        table.insert("a", 1i32);
        table.insert("b", 2i32);
        table.insert("a", 3i32);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some(&FieldValue::LongInt(3)));
    }

    #[test]
    fn every_tag_round_trips() {
        let mut array = FieldArray::new();
        array.push(FieldValue::Void);
        array.push(FieldValue::ShortUint(7));
        let mut table = FieldTable::new();
        table.insert("t", FieldValue::Boolean(true));
        table.insert("b", FieldValue::ShortShortInt(-8));
        table.insert("B", FieldValue::ShortShortUint(8));
        table.insert("U", FieldValue::ShortInt(-16));
        table.insert("u", FieldValue::ShortUint(16));
        table.insert("I", FieldValue::LongInt(-32));
        table.insert("i", FieldValue::LongUint(32));
        table.insert("L", FieldValue::LongLongInt(-64));
        table.insert("l", FieldValue::LongLongUint(64));
        table.insert("f", FieldValue::Float(1.5));
        table.insert("d", FieldValue::Double(-2.25));
        table.insert(
            "D",
            FieldValue::Decimal(Decimal {
                scale: 2,
                value: 12345,
            }),
        );
        table.insert("s", FieldValue::ShortStr("short".into()));
        table.insert("S", FieldValue::LongStr(Bytes::from_static(b"\x00long\xff")));
        table.insert("A", FieldValue::Array(array));
        table.insert("T", FieldValue::Timestamp(Timestamp(1_234_567_890)));
        table.insert("F", FieldValue::Table(FieldTable::new()));
        table.insert("V", FieldValue::Void);
        table.insert("x", FieldValue::ByteArray(Bytes::from_static(&[0xCE, 0x00])));
        assert_eq!(round_trip_table(&table), table);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        // name "k" followed by tag '?'
        let mut bytes = Bytes::from_static(&[0, 0, 0, 3, 1, b'k', b'?']);
        assert_eq!(
            FieldTable::decode(&mut bytes),
            Err(Error::UnknownFieldTag { tag: b'?' })
        );
    }

    #[test]
    fn truncated_table_is_rejected() {
        // declared 10 bytes of entries, only 2 present
        let mut bytes = Bytes::from_static(&[0, 0, 0, 10, 1, b'k']);
        assert_eq!(FieldTable::decode(&mut bytes), Err(Error::Truncated));
    }

    fn leaf_value() -> impl Strategy<Value = FieldValue> {
        prop_oneof![
            any::<bool>().prop_map(FieldValue::Boolean),
            any::<i8>().prop_map(FieldValue::ShortShortInt),
            any::<u8>().prop_map(FieldValue::ShortShortUint),
            any::<i16>().prop_map(FieldValue::ShortInt),
            any::<u16>().prop_map(FieldValue::ShortUint),
            any::<i32>().prop_map(FieldValue::LongInt),
            any::<u32>().prop_map(FieldValue::LongUint),
            any::<i64>().prop_map(FieldValue::LongLongInt),
            any::<u64>().prop_map(FieldValue::LongLongUint),
            (any::<u8>(), any::<u32>())
                .prop_map(|(scale, value)| FieldValue::Decimal(Decimal { scale, value })),
            "[a-z]{0,16}".prop_map(FieldValue::ShortStr),
            proptest::collection::vec(any::<u8>(), 0..64)
                .prop_map(|v| FieldValue::LongStr(Bytes::from(v))),
            any::<u64>().prop_map(|v| FieldValue::Timestamp(Timestamp(v))),
            Just(FieldValue::Void),
            proptest::collection::vec(any::<u8>(), 0..32)
                .prop_map(|v| FieldValue::ByteArray(Bytes::from(v))),
        ]
    }

    fn any_value() -> impl Strategy<Value = FieldValue> {
        leaf_value().prop_recursive(3, 32, 8, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4)
                    .prop_map(|v| FieldValue::Array(v.into_iter().collect())),
                proptest::collection::vec(("[a-z]{1,8}", inner), 0..4).prop_map(|entries| {
                    FieldValue::Table(entries.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        // NaN floats are excluded above: they compare unequal to themselves
        // and the round-trip law is stated over PartialEq.
        #[test]
        fn arbitrary_tables_round_trip(entries in proptest::collection::vec(("[a-z]{1,12}", any_value()), 0..8)) {
            let mut table = FieldTable::new();
            for (name, value) in entries {
                table.insert(name, value);
            }
            prop_assert_eq!(round_trip_table(&table), table);
        }
    }
}

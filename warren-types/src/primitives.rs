//! Primitive wire encodings shared by frames, methods, and field tables.
//!
//! All integers are big-endian. A `shortstr` is length-prefixed by a `u8`
//! and limited to 255 bytes of UTF-8; a `longstr` is length-prefixed by a
//! `u32` and carries arbitrary bytes.
//!
//! The getters check `remaining()` before touching the buffer so a
//! truncated payload surfaces as [`Error::Truncated`] instead of a panic.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::Error;

pub(crate) fn ensure(buf: &impl Buf, needed: usize) -> Result<(), Error> {
    if buf.remaining() < needed {
        return Err(Error::Truncated);
    }
    Ok(())
}

/// Read one octet.
pub fn get_octet(buf: &mut impl Buf) -> Result<u8, Error> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

/// Read a 16-bit unsigned integer.
pub fn get_short(buf: &mut impl Buf) -> Result<u16, Error> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

/// Read a 32-bit unsigned integer.
pub fn get_long(buf: &mut impl Buf) -> Result<u32, Error> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

/// Read a 64-bit unsigned integer.
pub fn get_longlong(buf: &mut impl Buf) -> Result<u64, Error> {
    ensure(buf, 8)?;
    Ok(buf.get_u64())
}

/// Read a signed octet.
pub fn get_octet_signed(buf: &mut impl Buf) -> Result<i8, Error> {
    ensure(buf, 1)?;
    Ok(buf.get_i8())
}

/// Read a 16-bit signed integer.
pub fn get_short_signed(buf: &mut impl Buf) -> Result<i16, Error> {
    ensure(buf, 2)?;
    Ok(buf.get_i16())
}

/// Read a 32-bit signed integer.
pub fn get_long_signed(buf: &mut impl Buf) -> Result<i32, Error> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

/// Read a 64-bit signed integer.
pub fn get_longlong_signed(buf: &mut impl Buf) -> Result<i64, Error> {
    ensure(buf, 8)?;
    Ok(buf.get_i64())
}

/// Read a 32-bit IEEE float.
pub fn get_float(buf: &mut impl Buf) -> Result<f32, Error> {
    ensure(buf, 4)?;
    Ok(buf.get_f32())
}

/// Read a 64-bit IEEE float.
pub fn get_double(buf: &mut impl Buf) -> Result<f64, Error> {
    ensure(buf, 8)?;
    Ok(buf.get_f64())
}

/// Read a length-prefixed short string.
pub fn get_shortstr(buf: &mut impl Buf) -> Result<String, Error> {
    let len = get_octet(buf)? as usize;
    ensure(buf, len)?;
    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec()).map_err(|_| Error::ShortStrNotUtf8)
}

/// Read a length-prefixed long string as raw bytes.
pub fn get_longstr(buf: &mut impl Buf) -> Result<Bytes, Error> {
    let len = get_long(buf)? as usize;
    ensure(buf, len)?;
    Ok(buf.copy_to_bytes(len))
}

/// Write a short string, rejecting values over 255 bytes.
pub fn put_shortstr(buf: &mut BytesMut, value: &str) -> Result<(), Error> {
    if value.len() > u8::MAX as usize {
        return Err(Error::ShortStrTooLong(value.len()));
    }
    buf.put_u8(value.len() as u8);
    buf.put_slice(value.as_bytes());
    Ok(())
}

/// Write a long string.
pub fn put_longstr(buf: &mut BytesMut, value: &[u8]) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value);
}

#[cfg(test)]
mod tests {
    use bytes::{Bytes, BytesMut};

    use super::*;

    #[test]
    fn shortstr_round_trip() {
        let mut buf = BytesMut::new();
        put_shortstr(&mut buf, "amq.direct").unwrap();
        let mut bytes = buf.freeze();
        assert_eq!(get_shortstr(&mut bytes).unwrap(), "amq.direct");
        assert!(!bytes.has_remaining());
    }

    #[test]
    fn shortstr_over_255_is_rejected() {
        let long = "x".repeat(256);
        let mut buf = BytesMut::new();
        assert_eq!(
            put_shortstr(&mut buf, &long),
            Err(Error::ShortStrTooLong(256))
        );
    }

    #[test]
    fn longstr_carries_arbitrary_bytes() {
        let mut buf = BytesMut::new();
        put_longstr(&mut buf, &[0x00, 0xFF, 0xCE]);
        let mut bytes = buf.freeze();
        assert_eq!(
            get_longstr(&mut bytes).unwrap(),
            Bytes::from_static(&[0x00, 0xFF, 0xCE])
        );
    }

    #[test]
    fn truncated_integer_reads_error() {
        let mut bytes = Bytes::from_static(&[0x01]);
        assert_eq!(get_short(&mut bytes), Err(Error::Truncated));
    }
}

//! Implements errors raised while encoding or decoding wire data

/// Error raised by the frame, method, or field-table codecs.
///
/// Every variant is a framing or syntax violation; the engine maps them to
/// connection errors 501 (frame) or 502 (syntax) when they surface on a
/// live connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The octet after a frame payload was not `0xCE`.
    #[error("frame end marker {found:#04x} is not 0xce")]
    BadFrameEnd {
        /// The octet found in place of the end marker.
        found: u8,
    },

    /// The frame type octet was not method, header, body, or heartbeat.
    #[error("unknown frame type {0}")]
    UnknownFrameType(u8),

    /// A frame payload exceeded the negotiated frame-max.
    #[error("frame payload of {size} bytes exceeds frame-max {frame_max}")]
    Oversized {
        /// Payload size declared by the frame header.
        size: u32,
        /// The negotiated limit.
        frame_max: u32,
    },

    /// A payload ended before its declared contents did.
    #[error("truncated payload")]
    Truncated,

    /// A method frame named a `(class_id, method_id)` pair that is not in
    /// the registry.
    #[error("unknown method {class_id}.{method_id}")]
    UnknownMethod {
        /// Class id from the payload.
        class_id: u16,
        /// Method id from the payload.
        method_id: u16,
    },

    /// A field-table entry carried an unknown type tag.
    #[error("unknown field table tag {tag:#04x}")]
    UnknownFieldTag {
        /// The tag octet found.
        tag: u8,
    },

    /// A short string longer than 255 bytes cannot be encoded.
    #[error("short string of {0} bytes exceeds 255")]
    ShortStrTooLong(usize),

    /// Short strings carry names and identifiers and must be UTF-8.
    #[error("short string is not valid UTF-8")]
    ShortStrNotUtf8,

    /// A content header was structurally invalid.
    #[error("malformed content header: {0}")]
    MalformedHeader(&'static str),
}

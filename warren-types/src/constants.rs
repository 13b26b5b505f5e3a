//! Protocol constants from the AMQP 0.9.1 specification.

/// The 8-byte protocol header a client writes before any frame:
/// literal `"AMQP"` followed by `0, 0, 9, 1`.
pub const PROTOCOL_HEADER: [u8; 8] = *b"AMQP\x00\x00\x09\x01";

/// Frame type octet of a method frame.
pub const FRAME_METHOD: u8 = 1;

/// Frame type octet of a content header frame.
pub const FRAME_HEADER: u8 = 2;

/// Frame type octet of a content body frame.
pub const FRAME_BODY: u8 = 3;

/// Frame type octet of a heartbeat frame.
pub const FRAME_HEARTBEAT: u8 = 8;

/// Every frame ends with this octet.
pub const FRAME_END: u8 = 0xCE;

/// Bytes a frame adds around its payload: 7 bytes of header plus the end
/// marker.
pub const FRAME_OVERHEAD: usize = 8;

/// The smallest frame-max either peer may propose.
pub const FRAME_MIN_SIZE: u32 = 4096;

/// Default negotiated frame-max.
pub const DEFAULT_FRAME_MAX: u32 = 131_072;

/// Default negotiated channel-max.
pub const DEFAULT_CHANNEL_MAX: u16 = 65_535;

/// Default heartbeat interval in seconds.
pub const DEFAULT_HEARTBEAT: u16 = 60;

/// Default TCP port for plain AMQP.
pub const DEFAULT_PORT: u16 = 5672;

/// Default TCP port for AMQP over TLS.
pub const DEFAULT_TLS_PORT: u16 = 5671;

/// Reply codes carried by `connection.close` and `channel.close`.
pub mod reply_code {
    /// Normal shutdown.
    pub const REPLY_SUCCESS: u16 = 200;
    /// Content body exceeded a server limit.
    pub const CONTENT_TOO_LARGE: u16 = 311;
    /// An immediate-mode publish found no consumer.
    pub const NO_CONSUMERS: u16 = 313;
    /// An operator forced the connection closed.
    pub const CONNECTION_FORCED: u16 = 320;
    /// The virtual host path was malformed.
    pub const INVALID_PATH: u16 = 402;
    /// The client lacks permission for the resource.
    pub const ACCESS_REFUSED: u16 = 403;
    /// The named entity does not exist.
    pub const NOT_FOUND: u16 = 404;
    /// The resource is locked by another client.
    pub const RESOURCE_LOCKED: u16 = 405;
    /// A declared entity exists with different parameters.
    pub const PRECONDITION_FAILED: u16 = 406;
    /// A frame could not be parsed.
    pub const FRAME_ERROR: u16 = 501;
    /// A method payload could not be parsed.
    pub const SYNTAX_ERROR: u16 = 502;
    /// The method was invalid for the current state.
    pub const COMMAND_INVALID: u16 = 503;
    /// A channel-level protocol rule was broken.
    pub const CHANNEL_ERROR: u16 = 504;
    /// A frame arrived out of the expected content sequence.
    pub const UNEXPECTED_FRAME: u16 = 505;
    /// The server ran out of a resource (for example channels).
    pub const RESOURCE_ERROR: u16 = 506;
    /// The operation is not allowed for this client.
    pub const NOT_ALLOWED: u16 = 530;
    /// The server does not implement the method.
    pub const NOT_IMPLEMENTED: u16 = 540;
    /// The server failed internally.
    pub const INTERNAL_ERROR: u16 = 541;
}

//! Implements errors associated with the connection and its channels

use std::fmt;
use std::io;
use std::sync::Arc;

use warren_types::constants::reply_code;

/// A server-side exception carried by `connection.close` or
/// `channel.close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmqpException {
    /// AMQP reply code, for example 404.
    pub reply_code: u16,
    /// Human-readable reason from the server.
    pub reply_text: String,
    /// Class id of the method that caused the exception, or 0.
    pub class_id: u16,
    /// Method id of the method that caused the exception, or 0.
    pub method_id: u16,
}

impl fmt::Display for AmqpException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.reply_code, self.reply_text)?;
        if self.class_id != 0 || self.method_id != 0 {
            write!(f, " (method {}.{})", self.class_id, self.method_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for AmqpException {}

/// Error surfaced by connection and channel operations.
///
/// The error is `Clone` so that one connection-level cause can be handed
/// to every thread parked on the connection; I/O errors are shared behind
/// an [`Arc`] for the same reason.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A frame or payload could not be encoded or decoded.
    #[error("wire codec error: {0}")]
    Codec(#[from] warren_types::Error),

    /// The socket failed.
    #[error("I/O error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// TLS setup or handshake failed.
    #[cfg(feature = "native-tls")]
    #[error("TLS error: {0}")]
    Tls(#[source] Arc<libnative_tls::Error>),

    /// The URL passed to [`crate::Connection::open`] did not parse.
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// Only `amqp` and `amqps` URL schemes are supported.
    #[error(r#"invalid scheme {0:?}, expected "amqp" or "amqps""#)]
    InvalidScheme(String),

    /// The server closed the connection with an exception.
    #[error("connection closed by server: {0}")]
    ConnectionClosed(AmqpException),

    /// The server closed the channel with an exception.
    #[error("channel closed by server: {0}")]
    ChannelClosed(AmqpException),

    /// The connection is closed; no further operations are possible.
    #[error("connection is closed")]
    NotConnected,

    /// The channel is closed; the operation never reached the wire.
    #[error("channel is closed")]
    ChannelNotOpen,

    /// A blocking call exceeded its deadline. The connection survives: the
    /// waiter is woken from a condition variable, never mid-frame.
    #[error("operation timed out")]
    Timeout,

    /// Nothing was read from the server for twice the heartbeat interval.
    #[error("missed heartbeats from server")]
    MissedHeartbeat,

    /// A frame arrived that no channel state admits (AMQP error 505).
    #[error("unexpected frame: {0}")]
    UnexpectedFrame(&'static str),

    /// A method arrived that the connection or channel state does not
    /// admit (AMQP error 503).
    #[error("unexpected method {0}")]
    UnexpectedMethod(&'static str),

    /// A content body ran past the size declared by its header.
    #[error("content body exceeds declared body size")]
    BodyOverflow,

    /// The server addressed a channel this client never opened (AMQP
    /// error 506).
    #[error("server sent a frame for unknown channel {0}")]
    UnknownChannel(u16),

    /// Every channel id up to the negotiated channel-max is taken.
    #[error("no free channel id below channel-max")]
    ChannelMaxReached,

    /// The explicitly requested channel id is already open.
    #[error("channel id {0} is already in use")]
    ChannelIdInUse(u16),

    /// The requested channel id is outside `1..=channel_max`.
    #[error("channel id {id} is outside 1..={channel_max}")]
    ChannelIdOutOfRange {
        /// Requested id.
        id: u16,
        /// Negotiated maximum.
        channel_max: u16,
    },

    /// The server cancelled a consumer that has no cancel handler.
    #[error("server cancelled consumer {0:?}")]
    ConsumerCancelled(String),

    /// The server nacked a publish awaited by `basic_publish_confirm`.
    #[error("publish with delivery tag {delivery_tag} was nacked by the server")]
    Nacked {
        /// The rejected delivery tag.
        delivery_tag: u64,
    },

    /// None of the mechanisms offered by the server is supported.
    #[error("no supported auth mechanism; server offers {0:?}")]
    UnsupportedMechanism(String),

    /// The server does not speak AMQP 0.9.1.
    #[error("server speaks AMQP {major}.{minor}, expected 0.9")]
    VersionMismatch {
        /// Server major version.
        major: u8,
        /// Server minor version.
        minor: u8,
    },

    /// The server tuned `frame_max` below the protocol minimum of 4096.
    #[error("server proposed frame-max {0}, below the protocol minimum")]
    FrameMaxTooSmall(u32),

    /// The operation is invalid as requested, before touching the wire.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The channel is not in publisher-confirm mode.
    #[error("channel is not in confirm mode")]
    NotInConfirmMode,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

#[cfg(feature = "native-tls")]
impl From<libnative_tls::Error> for Error {
    fn from(err: libnative_tls::Error) -> Self {
        Error::Tls(Arc::new(err))
    }
}

impl Error {
    /// The reply code to put in an outbound `connection.close` when this
    /// error is a protocol violation detected by the client, if any.
    pub(crate) fn close_code(&self) -> Option<u16> {
        match self {
            Error::Codec(codec) => Some(match codec {
                warren_types::Error::BadFrameEnd { .. }
                | warren_types::Error::UnknownFrameType(_)
                | warren_types::Error::Oversized { .. } => reply_code::FRAME_ERROR,
                _ => reply_code::SYNTAX_ERROR,
            }),
            Error::BodyOverflow => Some(reply_code::SYNTAX_ERROR),
            Error::UnexpectedFrame(_) => Some(reply_code::UNEXPECTED_FRAME),
            Error::UnexpectedMethod(_) => Some(reply_code::COMMAND_INVALID),
            Error::UnknownChannel(_) => Some(reply_code::RESOURCE_ERROR),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_display_names_the_method() {
        let exc = AmqpException {
            reply_code: 404,
            reply_text: "NOT_FOUND - no queue 'x'".into(),
            class_id: 50,
            method_id: 10,
        };
        assert_eq!(exc.to_string(), "404 NOT_FOUND - no queue 'x' (method 50.10)");
    }

    #[test]
    fn codec_errors_map_to_frame_or_syntax_codes(){
        let framing: Error = warren_types::Error::BadFrameEnd { found: 0 }.into();
        assert_eq!(framing.close_code(), Some(reply_code::FRAME_ERROR));
        let syntax: Error = warren_types::Error::Truncated.into();
        assert_eq!(syntax.close_code(), Some(reply_code::SYNTAX_ERROR));
        assert_eq!(Error::Timeout.close_code(), None);
    }

    #[test]
    fn unknown_channel_closes_with_resource_error() {
        assert_eq!(
            Error::UnknownChannel(7).close_code(),
            Some(reply_code::RESOURCE_ERROR)
        );
    }
}

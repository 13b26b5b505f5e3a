//! SASL mechanisms for connection negotiation.

use bytes::{BufMut, Bytes, BytesMut};

pub(crate) const PLAIN: &str = "PLAIN";
pub(crate) const EXTERNAL: &str = "EXTERNAL";

/// The SASL mechanism used in `connection.start-ok`.
#[derive(Debug, Clone)]
pub enum SaslMechanism {
    /// `PLAIN`: username and password in the initial response.
    Plain {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },

    /// `EXTERNAL`: identity taken from the transport, typically a TLS
    /// client certificate.
    External,
}

impl<T1, T2> From<(T1, T2)> for SaslMechanism
where
    T1: Into<String>,
    T2: Into<String>,
{
    fn from((username, password): (T1, T2)) -> Self {
        Self::Plain {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl SaslMechanism {
    /// The mechanism name sent to the server.
    pub fn name(&self) -> &'static str {
        match self {
            SaslMechanism::Plain { .. } => PLAIN,
            SaslMechanism::External => EXTERNAL,
        }
    }

    /// The initial response for `connection.start-ok`, `\0user\0pass` for
    /// PLAIN. Also reused verbatim for `connection.secure-ok`, which PLAIN
    /// servers only request when the first response was unacceptable.
    pub(crate) fn response(&self) -> Bytes {
        match self {
            SaslMechanism::Plain { username, password } => {
                let mut buf = BytesMut::with_capacity(username.len() + password.len() + 2);
                buf.put_u8(0);
                buf.put_slice(username.as_bytes());
                buf.put_u8(0);
                buf.put_slice(password.as_bytes());
                buf.freeze()
            }
            SaslMechanism::External => Bytes::new(),
        }
    }

    /// Whether the server's space-separated mechanism list offers this
    /// mechanism.
    pub(crate) fn offered_in(&self, mechanisms: &[u8]) -> bool {
        let name = self.name().as_bytes();
        mechanisms.split(|b| *b == b' ').any(|m| m == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_response_is_nul_delimited() {
        let mechanism = SaslMechanism::from(("guest", "guest"));
        assert_eq!(mechanism.name(), "PLAIN");
        assert_eq!(&mechanism.response()[..], b"\x00guest\x00guest");
    }

    #[test]
    fn mechanism_offer_check_splits_on_spaces() {
        let mechanism = SaslMechanism::from(("guest", "guest"));
        assert!(mechanism.offered_in(b"PLAIN AMQPLAIN"));
        assert!(mechanism.offered_in(b"AMQPLAIN PLAIN"));
        assert!(!mechanism.offered_in(b"AMQPLAIN EXTERNAL"));
        assert!(SaslMechanism::External.offered_in(b"AMQPLAIN EXTERNAL"));
    }
}

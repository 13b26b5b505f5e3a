//! The frame dispatch loop, run on the connection's reader thread.
//!
//! Reads one frame at a time: heartbeats reset the inbound deadline and
//! nothing else, channel-0 methods are connection control, everything
//! else routes to the addressed channel. A protocol violation tears the
//! connection down with a `connection.close` naming the reply code.

use std::sync::Arc;

use tracing::{debug, error, trace};
use warren_types::properties::ContentHeader;
use warren_types::{Frame, FrameType, Method};

use super::ConnectionInner;
use crate::transport::FrameReader;
use crate::Error;

enum Flow {
    Continue,
    Stop,
}

pub(crate) fn run(inner: Arc<ConnectionInner>, mut reader: FrameReader) {
    debug!("reader thread started");
    loop {
        if inner.is_shutdown() {
            break;
        }
        match reader.read_frame() {
            // poll timeout; check for shutdown and keep reading
            Ok(None) => continue,
            Ok(Some(frame)) => {
                inner.touch_read();
                match dispatch(&inner, frame) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Stop) => break,
                    Err(err) => {
                        error!(%err, "protocol violation, closing connection");
                        inner.protocol_fail(err);
                        break;
                    }
                }
            }
            Err(err) => {
                if !inner.is_shutdown() {
                    inner.fail(err);
                }
                break;
            }
        }
    }
    debug!("reader thread stopped");
}

fn dispatch(inner: &Arc<ConnectionInner>, frame: Frame) -> Result<Flow, Error> {
    match frame.kind {
        FrameType::Heartbeat => {
            if frame.channel != 0 {
                return Err(Error::UnexpectedFrame("heartbeat on a non-zero channel"));
            }
            trace!("heartbeat received");
            Ok(Flow::Continue)
        }
        FrameType::Method if frame.channel == 0 => {
            let mut payload = frame.payload;
            on_connection_method(inner, Method::decode(&mut payload)?)
        }
        FrameType::Method => {
            let channel = inner
                .lookup_channel(frame.channel)
                .ok_or(Error::UnknownChannel(frame.channel))?;
            let mut payload = frame.payload;
            channel.handle_method(Method::decode(&mut payload)?)?;
            Ok(Flow::Continue)
        }
        FrameType::Header => {
            if frame.channel == 0 {
                return Err(Error::UnexpectedFrame("content header on channel 0"));
            }
            let channel = inner
                .lookup_channel(frame.channel)
                .ok_or(Error::UnknownChannel(frame.channel))?;
            channel.handle_header(ContentHeader::decode(frame.payload)?)?;
            Ok(Flow::Continue)
        }
        FrameType::Body => {
            if frame.channel == 0 {
                return Err(Error::UnexpectedFrame("content body on channel 0"));
            }
            let channel = inner
                .lookup_channel(frame.channel)
                .ok_or(Error::UnknownChannel(frame.channel))?;
            channel.handle_body(frame.payload)?;
            Ok(Flow::Continue)
        }
    }
}

fn on_connection_method(inner: &Arc<ConnectionInner>, method: Method) -> Result<Flow, Error> {
    match method {
        Method::ConnectionClose(close) => {
            inner.remote_close(crate::AmqpException {
                reply_code: close.reply_code,
                reply_text: close.reply_text,
                class_id: close.class_id,
                method_id: close.method_id,
            });
            Ok(Flow::Stop)
        }
        Method::ConnectionCloseOk => {
            inner.finish_close();
            Ok(Flow::Stop)
        }
        Method::ConnectionBlocked(blocked) => {
            debug!(reason = %blocked.reason, "connection blocked by server");
            let handlers = inner.blocked_handlers.lock().clone();
            for handler in handlers {
                handler(&blocked.reason);
            }
            Ok(Flow::Continue)
        }
        Method::ConnectionUnblocked => {
            debug!("connection unblocked by server");
            let handlers = inner.unblocked_handlers.lock().clone();
            for handler in handlers {
                handler();
            }
            Ok(Flow::Continue)
        }
        other => Err(Error::UnexpectedMethod(other.name())),
    }
}

//! The heartbeat clock, run on its own timer thread.
//!
//! With a negotiated interval of `H` seconds, an empty heartbeat frame
//! goes out after `H/2` seconds of write idleness, and the connection is
//! torn down (abruptly, no protocol close) when nothing has been read
//! for more than `2*H` seconds.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::ConnectionInner;
use crate::Error;

pub(crate) fn run(inner: Arc<ConnectionInner>, interval_secs: u16) {
    let interval = Duration::from_secs(u64::from(interval_secs));
    let send_after = interval / 2;
    let dead_after = interval * 2;
    // tick at a quarter interval so idle edges are seen promptly
    let tick = (interval / 4).max(Duration::from_millis(100));
    debug!(interval_secs, "heartbeat thread started");
    loop {
        {
            let mut status = inner.status.lock();
            if status.state == super::ConnState::Closed {
                break;
            }
            // woken early on state changes; timing out is the normal tick
            let _ = inner.status_cond.wait_for(&mut status, tick);
            if status.state == super::ConnState::Closed {
                break;
            }
        }
        if inner.read_idle() > dead_after {
            warn!("no traffic from server, closing connection");
            inner.fail(Error::MissedHeartbeat);
            break;
        }
        if inner.write_idle() >= send_after {
            trace!("sending heartbeat");
            if inner.send_heartbeat().is_err() {
                // the writer noticed the connection dying first
                break;
            }
        }
    }
    debug!("heartbeat thread stopped");
}

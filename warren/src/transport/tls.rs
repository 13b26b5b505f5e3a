//! TLS stream support over `native-tls`.
//!
//! A TLS session cannot be cloned, so both halves share it behind a
//! mutex. The reader releases the lock whenever the socket read times
//! out, which bounds how long a writer can be held up; the engine keeps
//! the read timeout short for exactly this reason.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use libnative_tls::TlsStream;
use parking_lot::Mutex;

use super::{IoStream, ReadHalf, StreamControl, TcpControl, WriteHalf};

#[derive(Clone)]
struct SharedTls(Arc<Mutex<TlsStream<TcpStream>>>);

impl Read for SharedTls {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.lock().read(buf)
    }
}

impl Write for SharedTls {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().flush()
    }
}

impl IoStream for TlsStream<TcpStream> {
    fn split(
        self,
    ) -> io::Result<(Box<dyn ReadHalf>, Box<dyn WriteHalf>, Arc<dyn StreamControl>)> {
        // timeouts and shutdown act on the raw socket under the session
        let control = self.get_ref().try_clone()?;
        let shared = SharedTls(Arc::new(Mutex::new(self)));
        Ok((
            Box::new(shared.clone()),
            Box::new(shared),
            Arc::new(TcpControl(control)),
        ))
    }
}

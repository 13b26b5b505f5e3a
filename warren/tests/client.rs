//! Engine tests against a scripted broker on an in-memory duplex pipe.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use warren::transport::{IoStream, ReadHalf, StreamControl, WriteHalf};
use warren::{
    Builder, Confirm, ConsumeOptions, Delivery, Error, ExchangeDeclareOptions, Message,
    PublishOptions, QueueDeclareOptions,
};
use warren_types::constants::PROTOCOL_HEADER;
use warren_types::methods::{basic, channel, connection, queue};
use warren_types::properties::ContentHeader;
use warren_types::{BasicProperties, FieldTable, Frame, FrameType, Method};

const STEP: Duration = Duration::from_secs(5);

/* ------------------------- in-memory duplex pipe ------------------------- */

struct PipeReader {
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    timeout: Arc<Mutex<Option<Duration>>>,
    closed: Arc<AtomicBool>,
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if !self.pending.is_empty() {
                let n = buf.len().min(self.pending.len());
                for slot in buf.iter_mut().take(n) {
                    *slot = self.pending.pop_front().unwrap_or_default();
                }
                return Ok(n);
            }
            if self.closed.load(Ordering::SeqCst) {
                return Ok(0);
            }
            let timeout = *self.timeout.lock().unwrap();
            let chunk = match timeout {
                Some(timeout) => match self.rx.recv_timeout(timeout) {
                    Ok(chunk) => chunk,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(io::Error::new(io::ErrorKind::TimedOut, "pipe read timeout"))
                    }
                    Err(RecvTimeoutError::Disconnected) => return Ok(0),
                },
                None => match self.rx.recv() {
                    Ok(chunk) => chunk,
                    Err(_) => return Ok(0),
                },
            };
            self.pending.extend(chunk);
        }
    }
}

struct PipeWriter {
    tx: Sender<Vec<u8>>,
    closed: Arc<AtomicBool>,
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        }
        self.tx
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct PipeControl {
    timeout: Arc<Mutex<Option<Duration>>>,
    closed: Arc<AtomicBool>,
    wake: Sender<Vec<u8>>,
}

impl StreamControl for PipeControl {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        *self.timeout.lock().unwrap() = timeout;
        Ok(())
    }

    fn set_write_timeout(&self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> io::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.wake.send(Vec::new());
        Ok(())
    }
}

struct ClientStream {
    reader: PipeReader,
    writer: PipeWriter,
    control: PipeControl,
}

impl IoStream for ClientStream {
    fn split(
        self,
    ) -> io::Result<(Box<dyn ReadHalf>, Box<dyn WriteHalf>, Arc<dyn StreamControl>)> {
        Ok((
            Box::new(self.reader),
            Box::new(self.writer),
            Arc::new(self.control),
        ))
    }
}

/* --------------------------- scripted broker ----------------------------- */

struct Broker {
    rx: Receiver<Vec<u8>>,
    tx: Sender<Vec<u8>>,
    buf: BytesMut,
}

impl Broker {
    fn recv_bytes(&mut self) {
        match self.rx.recv_timeout(STEP) {
            Ok(chunk) => self.buf.extend_from_slice(&chunk),
            Err(err) => panic!("broker starved waiting for client bytes: {err}"),
        }
    }

    fn expect_protocol_header(&mut self) {
        while self.buf.len() < PROTOCOL_HEADER.len() {
            self.recv_bytes();
        }
        let header = self.buf.split_to(PROTOCOL_HEADER.len());
        assert_eq!(&header[..], PROTOCOL_HEADER, "bad protocol header");
    }

    fn read_frame(&mut self) -> Frame {
        loop {
            if let Some(frame) = Frame::decode(&mut self.buf, 0).expect("client sent a bad frame") {
                return frame;
            }
            self.recv_bytes();
        }
    }

    /// Read a method frame, skipping heartbeats.
    fn read_method(&mut self) -> (u16, Method) {
        loop {
            let frame = self.read_frame();
            match frame.kind {
                FrameType::Heartbeat => continue,
                FrameType::Method => {
                    let mut payload = frame.payload;
                    return (frame.channel, Method::decode(&mut payload).unwrap());
                }
                other => panic!("expected a method frame, got {other:?}"),
            }
        }
    }

    fn send_frame(&self, frame: &Frame) {
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        self.tx.send(buf.to_vec()).expect("client hung up");
    }

    fn send_method(&self, channel: u16, method: &Method) {
        self.send_frame(&Frame::method(channel, method.to_payload().unwrap()));
    }

    fn send_content(&self, channel: u16, method: &Method, body: &[u8]) {
        self.send_method(channel, method);
        let header = ContentHeader {
            class_id: 60,
            body_size: body.len() as u64,
            properties: BasicProperties::default(),
        };
        let mut payload = BytesMut::new();
        header.encode(&mut payload).unwrap();
        self.send_frame(&Frame::header(channel, payload.freeze()));
        if !body.is_empty() {
            self.send_frame(&Frame::body(channel, Bytes::copy_from_slice(body)));
        }
    }

    /// Serve the standard opening handshake and return the client's
    /// tune-ok values.
    fn serve_handshake(&mut self, tune: connection::Tune) -> connection::TuneOk {
        self.expect_protocol_header();
        self.send_method(
            0,
            &Method::ConnectionStart(connection::Start {
                version_major: 0,
                version_minor: 9,
                server_properties: FieldTable::new(),
                mechanisms: Bytes::from_static(b"PLAIN AMQPLAIN"),
                locales: Bytes::from_static(b"en_US"),
            }),
        );
        let (ch, method) = self.read_method();
        assert_eq!(ch, 0);
        let start_ok = match method {
            Method::ConnectionStartOk(start_ok) => start_ok,
            other => panic!("expected start-ok, got {}", other.name()),
        };
        assert_eq!(start_ok.mechanism, "PLAIN");
        assert_eq!(&start_ok.response[..], b"\x00guest\x00guest");
        assert_eq!(start_ok.locale, "en_US");

        self.send_method(0, &Method::ConnectionTune(tune));
        let (_, method) = self.read_method();
        let tune_ok = match method {
            Method::ConnectionTuneOk(tune_ok) => tune_ok,
            other => panic!("expected tune-ok, got {}", other.name()),
        };

        let (ch, method) = self.read_method();
        assert_eq!(ch, 0);
        match method {
            Method::ConnectionOpen(open) => assert_eq!(open.virtual_host, "/"),
            other => panic!("expected connection.open, got {}", other.name()),
        }
        self.send_method(0, &Method::ConnectionOpenOk(connection::OpenOk::default()));
        tune_ok
    }

    /// Answer `channel.open` on the given channel id.
    fn serve_channel_open(&mut self, expected_id: u16) {
        let (ch, method) = self.read_method();
        assert_eq!(ch, expected_id);
        assert!(matches!(method, Method::ChannelOpen(_)));
        self.send_method(
            expected_id,
            &Method::ChannelOpenOk(channel::OpenOk::default()),
        );
    }

    /// Reply to whatever close handshakes the client still sends, until it
    /// hangs up.
    fn finish(&mut self) {
        loop {
            let frame = match self.rx.recv_timeout(STEP) {
                Ok(chunk) => {
                    self.buf.extend_from_slice(&chunk);
                    match Frame::decode(&mut self.buf, 0) {
                        Ok(Some(frame)) => frame,
                        Ok(None) => continue,
                        Err(_) => return,
                    }
                }
                Err(_) => return,
            };
            match frame.kind {
                FrameType::Method => {
                    let mut payload = frame.payload;
                    match Method::decode(&mut payload) {
                        Ok(Method::ChannelClose(_)) => {
                            self.send_method(frame.channel, &Method::ChannelCloseOk);
                        }
                        Ok(Method::ConnectionClose(_)) => {
                            self.send_method(0, &Method::ConnectionCloseOk);
                            return;
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }
}

/// A connected (client stream, broker) pair.
fn pipe() -> (ClientStream, Broker) {
    let (client_tx, broker_rx) = mpsc::channel();
    let (broker_tx, client_rx) = mpsc::channel();
    let timeout = Arc::new(Mutex::new(None));
    let closed = Arc::new(AtomicBool::new(false));
    let stream = ClientStream {
        reader: PipeReader {
            rx: client_rx,
            pending: VecDeque::new(),
            timeout: timeout.clone(),
            closed: closed.clone(),
        },
        writer: PipeWriter {
            tx: client_tx,
            closed: closed.clone(),
        },
        control: PipeControl {
            timeout,
            closed,
            wake: broker_tx.clone(),
        },
    };
    let broker = Broker {
        rx: broker_rx,
        tx: broker_tx,
        buf: BytesMut::new(),
    };
    (stream, broker)
}

fn test_builder() -> Builder {
    Builder::new()
        .connect_timeout(Some(Duration::from_secs(2)))
        .rpc_timeout(Some(Duration::from_secs(2)))
}

fn spawn_broker(
    mut broker: Broker,
    script: impl FnOnce(&mut Broker) + Send + 'static,
) -> JoinHandle<()> {
    thread::spawn(move || {
        script(&mut broker);
        broker.finish();
    })
}

/* ------------------------------- scenarios ------------------------------- */

#[test]
fn handshake_negotiates_and_opens() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        let tune_ok = broker.serve_handshake(connection::Tune {
            channel_max: 0,
            frame_max: 131_072,
            heartbeat: 60,
        });
        assert_eq!(tune_ok.channel_max, 2047);
        assert_eq!(tune_ok.frame_max, 131_072);
        assert_eq!(tune_ok.heartbeat, 60);
    });

    let connection = test_builder()
        .channel_max(2047)
        .open_stream(stream)
        .unwrap();
    assert!(connection.is_open());
    assert_eq!(connection.channel_max(), 2047);
    assert_eq!(connection.frame_max(), 131_072);
    assert_eq!(connection.heartbeat(), 60);
    connection.close().unwrap();
    handle.join().unwrap();
}

#[test]
fn handshake_surfaces_access_refused() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.expect_protocol_header();
        broker.send_method(
            0,
            &Method::ConnectionStart(connection::Start {
                version_major: 0,
                version_minor: 9,
                server_properties: FieldTable::new(),
                mechanisms: Bytes::from_static(b"PLAIN"),
                locales: Bytes::from_static(b"en_US"),
            }),
        );
        let (_, method) = broker.read_method();
        assert!(matches!(method, Method::ConnectionStartOk(_)));
        broker.send_method(
            0,
            &Method::ConnectionClose(connection::Close {
                reply_code: 403,
                reply_text: "ACCESS_REFUSED".into(),
                class_id: 0,
                method_id: 0,
            }),
        );
        let (_, method) = broker.read_method();
        assert!(matches!(method, Method::ConnectionCloseOk));
    });

    let err = test_builder().open_stream(stream).unwrap_err();
    match err {
        Error::ConnectionClosed(exception) => assert_eq!(exception.reply_code, 403),
        other => panic!("unexpected error {other:?}"),
    }
    handle.join().unwrap();
}

#[test]
fn sub_minimum_frame_max_tune_is_rejected() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.expect_protocol_header();
        broker.send_method(
            0,
            &Method::ConnectionStart(connection::Start {
                version_major: 0,
                version_minor: 9,
                server_properties: FieldTable::new(),
                mechanisms: Bytes::from_static(b"PLAIN"),
                locales: Bytes::from_static(b"en_US"),
            }),
        );
        let (_, method) = broker.read_method();
        assert!(matches!(method, Method::ConnectionStartOk(_)));
        // the protocol minimum is 4096; no client can chunk inside this
        broker.send_method(
            0,
            &Method::ConnectionTune(connection::Tune {
                channel_max: 0,
                frame_max: 100,
                heartbeat: 0,
            }),
        );
    });

    let err = test_builder().open_stream(stream).unwrap_err();
    match err {
        Error::FrameMaxTooSmall(frame_max) => assert_eq!(frame_max, 100),
        other => panic!("unexpected error {other:?}"),
    }
    handle.join().unwrap();
}

#[test]
fn publish_then_get_round_trips_the_body() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.serve_handshake(connection::Tune {
            channel_max: 0,
            frame_max: 131_072,
            heartbeat: 0,
        });
        broker.serve_channel_open(1);

        let (_, method) = broker.read_method();
        match method {
            Method::ExchangeDeclare(declare) => {
                assert_eq!(declare.exchange, "t.e");
                assert_eq!(declare.exchange_type, "direct");
            }
            other => panic!("expected exchange.declare, got {}", other.name()),
        }
        broker.send_method(1, &Method::ExchangeDeclareOk);

        let (_, method) = broker.read_method();
        assert!(matches!(method, Method::QueueDeclare(_)));
        broker.send_method(
            1,
            &Method::QueueDeclareOk(queue::DeclareOk {
                queue: "t.q".into(),
                message_count: 0,
                consumer_count: 0,
            }),
        );

        let (_, method) = broker.read_method();
        assert!(matches!(method, Method::QueueBind(_)));
        broker.send_method(1, &Method::QueueBindOk);

        // publish: method + header + one body frame, all on channel 1
        let frame = broker.read_frame();
        assert_eq!((frame.kind, frame.channel), (FrameType::Method, 1));
        let frame = broker.read_frame();
        assert_eq!(frame.kind, FrameType::Header);
        let header = ContentHeader::decode(frame.payload).unwrap();
        assert_eq!(header.body_size, 5);
        let frame = broker.read_frame();
        assert_eq!(frame.kind, FrameType::Body);
        assert_eq!(&frame.payload[..], b"hello");

        let (_, method) = broker.read_method();
        match method {
            Method::BasicGet(get) => assert!(!get.no_ack),
            other => panic!("expected basic.get, got {}", other.name()),
        }
        broker.send_content(
            1,
            &Method::BasicGetOk(basic::GetOk {
                delivery_tag: 1,
                redelivered: false,
                exchange: "t.e".into(),
                routing_key: "t.q".into(),
                message_count: 0,
            }),
            b"hello",
        );

        let (_, method) = broker.read_method();
        match method {
            Method::BasicAck(ack) => {
                assert_eq!(ack.delivery_tag, 1);
                assert!(!ack.multiple);
            }
            other => panic!("expected basic.ack, got {}", other.name()),
        }

        let (_, method) = broker.read_method();
        match method {
            Method::QueueDeclare(declare) => assert!(declare.passive),
            other => panic!("expected passive declare, got {}", other.name()),
        }
        broker.send_method(
            1,
            &Method::QueueDeclareOk(queue::DeclareOk {
                queue: "t.q".into(),
                message_count: 0,
                consumer_count: 0,
            }),
        );
    });

    let connection = test_builder().open_stream(stream).unwrap();
    let channel = connection.channel(None).unwrap();
    channel
        .exchange_declare("t.e", "direct", ExchangeDeclareOptions::default())
        .unwrap();
    channel
        .queue_declare("t.q", QueueDeclareOptions::default())
        .unwrap();
    channel
        .queue_bind("t.q", "t.e", "t.q", FieldTable::new())
        .unwrap();

    assert_eq!(
        channel
            .basic_publish(
                &Message::from("hello"),
                "t.e",
                "t.q",
                PublishOptions::default()
            )
            .unwrap(),
        None
    );

    let delivery = channel.basic_get("t.q", false).unwrap().expect("a message");
    assert_eq!(&delivery.body()[..], b"hello");
    assert_eq!(delivery.exchange, "t.e");
    assert_eq!(delivery.routing_key, "t.q");
    assert_eq!(delivery.delivery_tag, 1);
    assert!(!delivery.redelivered);
    delivery.ack().unwrap();

    let ok = channel
        .queue_declare("t.q", QueueDeclareOptions::passive())
        .unwrap();
    assert_eq!(ok.message_count, 0);

    drop(channel);
    drop(connection);
    handle.join().unwrap();
}

#[test]
fn large_publish_is_chunked_to_the_negotiated_frame_max() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.serve_handshake(connection::Tune {
            channel_max: 0,
            frame_max: 4096,
            heartbeat: 0,
        });
        broker.serve_channel_open(1);

        let frame = broker.read_frame();
        assert_eq!(frame.kind, FrameType::Method);
        let frame = broker.read_frame();
        assert_eq!(frame.kind, FrameType::Header);
        let header = ContentHeader::decode(frame.payload).unwrap();
        assert_eq!(header.body_size, 10_000);
        let mut sizes = Vec::new();
        let mut remaining = 10_000usize;
        while remaining > 0 {
            let frame = broker.read_frame();
            assert_eq!((frame.kind, frame.channel), (FrameType::Body, 1));
            sizes.push(frame.payload.len());
            remaining -= frame.payload.len();
        }
        assert_eq!(sizes, [4088, 4088, 1824]);
    });

    let connection = test_builder().open_stream(stream).unwrap();
    assert_eq!(connection.frame_max(), 4096);
    let channel = connection.channel(None).unwrap();
    channel
        .basic_publish(
            &Message::from(vec![0x42u8; 10_000]),
            "",
            "t.q",
            PublishOptions::default(),
        )
        .unwrap();
    drop(channel);
    drop(connection);
    handle.join().unwrap();
}

#[test]
fn heartbeats_are_sent_and_missed_heartbeats_close_the_connection() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.serve_handshake(connection::Tune {
            channel_max: 0,
            frame_max: 131_072,
            heartbeat: 2,
        });
        // the client must heartbeat within 1.5s of silence
        let started = Instant::now();
        let frame = broker.read_frame();
        assert_eq!(frame.kind, FrameType::Heartbeat);
        assert_eq!(frame.channel, 0);
        assert!(
            started.elapsed() < Duration::from_millis(1500),
            "heartbeat came too late: {:?}",
            started.elapsed()
        );
        // then the broker goes silent; the client should give up after
        // 2 * heartbeat and hang up (writes may keep arriving meanwhile)
    });

    let connection = test_builder().heartbeat(2).open_stream(stream).unwrap();
    assert_eq!(connection.heartbeat(), 2);

    let deadline = Instant::now() + Duration::from_secs(6);
    while connection.is_open() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(100));
    }
    assert!(!connection.is_open(), "missed heartbeats went unnoticed");
    match connection.drain_events(Some(Duration::from_millis(10))) {
        Err(Error::MissedHeartbeat) => {}
        other => panic!("expected the missed-heartbeat cause, got {other:?}"),
    }
    drop(connection);
    handle.join().unwrap();
}

#[test]
fn channel_exception_closes_only_that_channel() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.serve_handshake(connection::Tune {
            channel_max: 0,
            frame_max: 131_072,
            heartbeat: 0,
        });
        broker.serve_channel_open(1);

        let (ch, method) = broker.read_method();
        assert_eq!(ch, 1);
        assert!(matches!(method, Method::QueueDeclare(_)));
        broker.send_method(
            1,
            &Method::ChannelClose(channel::Close {
                reply_code: 404,
                reply_text: "NOT_FOUND - no queue 'x'".into(),
                class_id: 50,
                method_id: 10,
            }),
        );
        let (ch, method) = broker.read_method();
        assert_eq!(ch, 1);
        assert!(matches!(method, Method::ChannelCloseOk));

        // a fresh channel still works
        broker.serve_channel_open(2);
        let (ch, method) = broker.read_method();
        assert_eq!(ch, 2);
        assert!(matches!(method, Method::QueueDeclare(_)));
        broker.send_method(
            2,
            &Method::QueueDeclareOk(queue::DeclareOk {
                queue: "t.q".into(),
                message_count: 0,
                consumer_count: 0,
            }),
        );
    });

    let connection = test_builder().open_stream(stream).unwrap();
    let doomed = connection.channel(None).unwrap();
    let err = doomed
        .queue_declare("x", QueueDeclareOptions::passive())
        .unwrap_err();
    match err {
        Error::ChannelClosed(exception) => {
            assert_eq!(exception.reply_code, 404);
            assert_eq!(exception.class_id, 50);
        }
        other => panic!("unexpected error {other:?}"),
    }
    // the channel is dead for further use
    assert!(matches!(
        doomed.basic_qos(0, 1, false),
        Err(Error::ChannelNotOpen)
    ));

    // but the connection and other channels are fine
    let healthy = connection.channel(None).unwrap();
    healthy
        .queue_declare("t.q", QueueDeclareOptions::default())
        .unwrap();

    drop(doomed);
    drop(healthy);
    drop(connection);
    handle.join().unwrap();
}

#[test]
fn publisher_confirms_resolve_in_publish_order() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.serve_handshake(connection::Tune {
            channel_max: 0,
            frame_max: 131_072,
            heartbeat: 0,
        });
        broker.serve_channel_open(1);

        let (_, method) = broker.read_method();
        assert!(matches!(method, Method::ConfirmSelect(_)));
        broker.send_method(1, &Method::ConfirmSelectOk);

        for _ in 0..3 {
            let frame = broker.read_frame();
            assert_eq!(frame.kind, FrameType::Method);
            let frame = broker.read_frame();
            assert_eq!(frame.kind, FrameType::Header);
            let frame = broker.read_frame();
            assert_eq!(frame.kind, FrameType::Body);
        }
        broker.send_method(
            1,
            &Method::BasicAck(basic::Ack {
                delivery_tag: 3,
                multiple: true,
            }),
        );

        // the fourth publish is awaited by the client
        let frame = broker.read_frame();
        assert_eq!(frame.kind, FrameType::Method);
        let frame = broker.read_frame();
        assert_eq!(frame.kind, FrameType::Header);
        let frame = broker.read_frame();
        assert_eq!(frame.kind, FrameType::Body);
        broker.send_method(
            1,
            &Method::BasicAck(basic::Ack {
                delivery_tag: 4,
                multiple: false,
            }),
        );
    });

    let connection = test_builder().open_stream(stream).unwrap();
    let channel = connection.channel(None).unwrap();
    channel.confirm_select().unwrap();

    let confirmed: Arc<Mutex<Vec<(u64, bool)>>> = Arc::new(Mutex::new(Vec::new()));
    let mut tags = Vec::new();
    for _ in 0..3 {
        let confirmed = confirmed.clone();
        let tag = channel
            .basic_publish_with_confirm(
                &Message::from("payload"),
                "",
                "t.q",
                PublishOptions::default(),
                move |confirm: Confirm| {
                    confirmed
                        .lock()
                        .unwrap()
                        .push((confirm.delivery_tag, confirm.acked));
                },
            )
            .unwrap();
        tags.push(tag);
    }
    // delivery tags are assigned 1, 2, 3 in publish order
    assert_eq!(tags, [1, 2, 3]);

    channel
        .wait_for_confirms(Some(Duration::from_secs(2)))
        .unwrap();
    assert_eq!(
        confirmed.lock().unwrap().clone(),
        [(1, true), (2, true), (3, true)]
    );

    // the blocking variant returns only once tag 4 is acked
    channel
        .basic_publish_confirm(
            &Message::from("payload"),
            "",
            "t.q",
            PublishOptions::default(),
            Some(Duration::from_secs(2)),
        )
        .unwrap();

    drop(channel);
    drop(connection);
    handle.join().unwrap();
}

#[test]
fn consumer_deliveries_unblock_drain_events() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.serve_handshake(connection::Tune {
            channel_max: 0,
            frame_max: 131_072,
            heartbeat: 0,
        });
        broker.serve_channel_open(1);

        let (_, method) = broker.read_method();
        let consume = match method {
            Method::BasicConsume(consume) => consume,
            other => panic!("expected basic.consume, got {}", other.name()),
        };
        assert_eq!(consume.consumer_tag, "tests.consumer");
        broker.send_method(
            1,
            &Method::BasicConsumeOk(basic::ConsumeOk {
                consumer_tag: consume.consumer_tag.clone(),
            }),
        );
        broker.send_content(
            1,
            &Method::BasicDeliver(basic::Deliver {
                consumer_tag: consume.consumer_tag,
                delivery_tag: 1,
                redelivered: false,
                exchange: "t.e".into(),
                routing_key: "t.q".into(),
            }),
            b"ping",
        );
    });

    let connection = test_builder().open_stream(stream).unwrap();
    let channel = connection.channel(None).unwrap();

    let received: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    channel
        .basic_consume(
            "t.q",
            ConsumeOptions {
                consumer_tag: "tests.consumer".into(),
                ..ConsumeOptions::default()
            },
            move |delivery: Delivery| {
                sink.lock().unwrap().push(delivery.body().to_vec());
            },
        )
        .unwrap();

    connection.drain_events(Some(Duration::from_secs(2))).unwrap();
    assert_eq!(received.lock().unwrap().clone(), [b"ping".to_vec()]);

    // nothing further arrives: drain now times out
    assert!(matches!(
        connection.drain_events(Some(Duration::from_millis(100))),
        Err(Error::Timeout)
    ));

    drop(channel);
    drop(connection);
    handle.join().unwrap();
}

#[test]
fn stray_body_frame_is_a_connection_error() {
    let (stream, broker) = pipe();
    let handle = spawn_broker(broker, |broker| {
        broker.serve_handshake(connection::Tune {
            channel_max: 0,
            frame_max: 131_072,
            heartbeat: 0,
        });
        broker.serve_channel_open(1);

        // a body frame with no content method in flight
        broker.send_frame(&Frame::body(1, Bytes::from_static(b"stray")));

        // the client must close the connection with UNEXPECTED_FRAME
        let (ch, method) = broker.read_method();
        assert_eq!(ch, 0);
        match method {
            Method::ConnectionClose(close) => assert_eq!(close.reply_code, 505),
            other => panic!("expected connection.close, got {}", other.name()),
        }
    });

    let connection = test_builder().open_stream(stream).unwrap();
    let channel = connection.channel(None).unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    while connection.is_open() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(!connection.is_open());
    assert!(matches!(
        channel.basic_qos(0, 1, false),
        Err(Error::ChannelNotOpen)
    ));

    drop(channel);
    drop(connection);
    handle.join().unwrap();
}

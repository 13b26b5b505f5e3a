//! Implementation of an AMQP 0.9.1 channel.
//!
//! A channel is a lightweight logical session multiplexed over one
//! connection. All synchronous methods park the calling thread on the
//! channel's single RPC slot until the reader thread delivers the reply;
//! at most one synchronous call is in flight per channel, and concurrent
//! callers serialise on the slot.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use parking_lot::{Condvar, Mutex, MutexGuard};
use warren_types::methods::{basic, channel, confirm, exchange, queue};
use warren_types::properties::ContentHeader;
use warren_types::{BasicProperties, FieldTable, Method};

mod dispatch;
mod events;
mod options;

pub use events::{CallbackConsumer, Confirm, Consumer};
pub use options::{
    ConsumeOptions, ExchangeDeclareOptions, PublishOptions, QueueDeclareOptions,
    QueueDeleteOptions,
};
pub use warren_types::methods::queue::DeclareOk as QueueDeclareOk;

use events::{ConfirmCallback, EventRegistry};

use crate::connection::ConnectionInner;
use crate::message::{Delivery, Message, ReturnedMessage};
use crate::Error;

const CLOSE_REPLIES: &[(u16, u16)] = &[(warren_types::methods::CLASS_CHANNEL, 41)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Closing,
    Closed,
}

/// A reply delivered to the channel's RPC slot: the method, plus the
/// reassembled content for `basic.get-ok`.
pub(crate) struct Reply {
    pub(crate) method: Method,
    pub(crate) content: Option<(BasicProperties, Bytes)>,
}

struct RpcWaiter {
    expected: &'static [(u16, u16)],
    reply: Option<Result<Reply, Error>>,
}

/// Content reassembly in progress: the substate is `AWAIT_HEADER` while
/// `header` is `None` and `AWAIT_BODY` afterwards.
struct Assembly {
    method: Method,
    header: Option<ContentHeader>,
    body: BytesMut,
}

struct PendingPublish {
    callback: Option<ConfirmCallback>,
    awaited: bool,
}

/// Publisher-confirm bookkeeping; present once `confirm.select` is sent.
struct ConfirmLedger {
    next_tag: u64,
    pending: BTreeMap<u64, PendingPublish>,
    outcomes: HashMap<u64, bool>,
}

impl ConfirmLedger {
    fn new() -> Self {
        Self {
            next_tag: 1,
            pending: BTreeMap::new(),
            outcomes: HashMap::new(),
        }
    }
}

struct ChannelState {
    phase: Phase,
    error: Option<Error>,
    rpc: Option<RpcWaiter>,
    /// Reply sets abandoned by timed-out RPCs; a late reply matching one
    /// of these is dropped instead of closing the connection.
    orphans: Vec<&'static [(u16, u16)]>,
    assembly: Option<Assembly>,
    confirm: Option<ConfirmLedger>,
    /// Content flow, toggled by `channel.flow`.
    active: bool,
}

impl ChannelState {
    /// Reject operations on a channel that is no longer open. This is a
    /// usage error: the original close cause went to whoever was waiting
    /// when the channel died.
    fn check_usable(&self) -> Result<(), Error> {
        match self.phase {
            Phase::Open => Ok(()),
            Phase::Closing | Phase::Closed => Err(Error::ChannelNotOpen),
        }
    }
}

pub(crate) struct ChannelInner {
    pub(crate) id: u16,
    connection: Weak<ConnectionInner>,
    state: Mutex<ChannelState>,
    cond: Condvar,
    /// Orders tag assignment with the write of the publish itself so
    /// confirm-mode delivery tags increase in wire order.
    publish_gate: Mutex<()>,
    consumers: Mutex<HashMap<String, Arc<dyn Consumer>>>,
    events: Mutex<EventRegistry>,
}

impl ChannelInner {
    pub(crate) fn new(id: u16, connection: Weak<ConnectionInner>) -> Self {
        Self {
            id,
            connection,
            state: Mutex::new(ChannelState {
                phase: Phase::Open,
                error: None,
                rpc: None,
                orphans: Vec::new(),
                assembly: None,
                confirm: None,
                active: true,
            }),
            cond: Condvar::new(),
            publish_gate: Mutex::new(()),
            consumers: Mutex::new(HashMap::new()),
            events: Mutex::new(EventRegistry::default()),
        }
    }

    fn connection(&self) -> Result<Arc<ConnectionInner>, Error> {
        self.connection.upgrade().ok_or(Error::NotConnected)
    }

    fn wait_step(
        &self,
        st: &mut MutexGuard<'_, ChannelState>,
        deadline: Option<Instant>,
    ) -> Result<(), Error> {
        match deadline {
            Some(deadline) => {
                if self.cond.wait_until(st, deadline).timed_out() {
                    return Err(Error::Timeout);
                }
            }
            None => self.cond.wait(st),
        }
        Ok(())
    }

    /// Send a synchronous method and park until one of its expected
    /// replies arrives.
    pub(crate) fn rpc(&self, method: &Method) -> Result<Reply, Error> {
        let conn = self.connection()?;
        let deadline = conn.rpc_deadline();
        let expected = method.expected_replies();
        debug_assert!(!expected.is_empty(), "rpc on an asynchronous method");
        {
            let mut st = self.state.lock();
            st.check_usable()?;
            while st.rpc.is_some() {
                self.wait_step(&mut st, deadline)?;
                st.check_usable()?;
            }
            st.rpc = Some(RpcWaiter {
                expected,
                reply: None,
            });
        }
        if let Err(err) = conn.send_method(self.id, method) {
            self.state.lock().rpc = None;
            self.cond.notify_all();
            return Err(err);
        }
        let mut st = self.state.lock();
        loop {
            match st.rpc.as_mut() {
                Some(waiter) => {
                    if let Some(reply) = waiter.reply.take() {
                        st.rpc = None;
                        drop(st);
                        self.cond.notify_all();
                        return reply;
                    }
                }
                None => {
                    let err = st.error.clone().unwrap_or(Error::ChannelNotOpen);
                    return Err(err);
                }
            }
            if let Err(err) = self.wait_step(&mut st, deadline) {
                // a reply that raced the deadline still wins
                if let Some(reply) = st.rpc.as_mut().and_then(|waiter| waiter.reply.take()) {
                    st.rpc = None;
                    drop(st);
                    self.cond.notify_all();
                    return reply;
                }
                if st.rpc.take().is_some() {
                    // the reply may still arrive; remember to drop it
                    st.orphans.push(expected);
                }
                drop(st);
                self.cond.notify_all();
                return Err(err);
            }
        }
    }

    /// Close handshake; used by [`Channel::close`] and `Drop`. Idempotent.
    pub(crate) fn close_inner(&self) -> Result<(), Error> {
        let conn = match self.connection() {
            Ok(conn) => conn,
            Err(_) => return Ok(()),
        };
        let deadline = conn.rpc_deadline();
        {
            let mut st = self.state.lock();
            loop {
                match st.phase {
                    Phase::Closed => return Ok(()),
                    Phase::Closing => {
                        self.wait_step(&mut st, deadline)?;
                    }
                    Phase::Open => {
                        if st.rpc.is_none() {
                            break;
                        }
                        self.wait_step(&mut st, deadline)?;
                    }
                }
            }
            st.phase = Phase::Closing;
            st.rpc = Some(RpcWaiter {
                expected: CLOSE_REPLIES,
                reply: None,
            });
        }
        let close = Method::ChannelClose(channel::Close {
            reply_code: warren_types::constants::reply_code::REPLY_SUCCESS,
            reply_text: String::new(),
            class_id: 0,
            method_id: 0,
        });
        if let Err(err) = conn.send_method(self.id, &close) {
            self.fail(err.clone());
            conn.remove_channel(self.id);
            return Err(err);
        }
        let mut st = self.state.lock();
        let result = loop {
            match st.rpc.as_mut() {
                Some(waiter) => {
                    if let Some(reply) = waiter.reply.take() {
                        st.rpc = None;
                        break reply.map(|_| ());
                    }
                }
                None => break Ok(()),
            }
            if st.phase == Phase::Closed {
                st.rpc = None;
                break Ok(());
            }
            if let Err(err) = self.wait_step(&mut st, deadline) {
                if st.rpc.take().is_some() {
                    st.orphans.push(CLOSE_REPLIES);
                }
                break Err(err);
            }
        };
        st.phase = Phase::Closed;
        drop(st);
        self.cond.notify_all();
        conn.remove_channel(self.id);
        result
    }

    /// Tear the channel down locally: mark it closed, fail the pending
    /// RPC and confirm waiters with `err`, and wake everyone. No I/O.
    pub(crate) fn fail(&self, err: Error) {
        let mut st = self.state.lock();
        if st.phase == Phase::Closed {
            return;
        }
        st.phase = Phase::Closed;
        st.error = Some(err.clone());
        st.assembly = None;
        if let Some(waiter) = st.rpc.as_mut() {
            if waiter.reply.is_none() {
                waiter.reply = Some(Err(err));
            }
        }
        drop(st);
        self.cond.notify_all();
    }

    pub(crate) fn send_ack(&self, delivery_tag: u64, multiple: bool) -> Result<(), Error> {
        let conn = self.connection()?;
        self.state.lock().check_usable()?;
        conn.send_method(
            self.id,
            &Method::BasicAck(basic::Ack {
                delivery_tag,
                multiple,
            }),
        )
    }

    pub(crate) fn send_nack(
        &self,
        delivery_tag: u64,
        multiple: bool,
        requeue: bool,
    ) -> Result<(), Error> {
        let conn = self.connection()?;
        self.state.lock().check_usable()?;
        conn.send_method(
            self.id,
            &Method::BasicNack(basic::Nack {
                delivery_tag,
                multiple,
                requeue,
            }),
        )
    }

    pub(crate) fn send_reject(&self, delivery_tag: u64, requeue: bool) -> Result<(), Error> {
        let conn = self.connection()?;
        self.state.lock().check_usable()?;
        conn.send_method(
            self.id,
            &Method::BasicReject(basic::Reject {
                delivery_tag,
                requeue,
            }),
        )
    }
}

/// A channel handle.
///
/// The channel closes itself (best effort) when the handle is dropped;
/// use [`close`](Self::close) to observe the close handshake's outcome.
pub struct Channel {
    pub(crate) inner: Arc<ChannelInner>,
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").field("id", &self.inner.id).finish()
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        let _ = self.inner.close_inner();
    }
}

impl Channel {
    /// The channel id on the wire.
    pub fn id(&self) -> u16 {
        self.inner.id
    }

    /// Close the channel with `channel.close` and await `close-ok`.
    pub fn close(self) -> Result<(), Error> {
        self.inner.close_inner()
    }

    /// Declare (or with `passive` merely verify) an exchange.
    pub fn exchange_declare(
        &self,
        exchange: &str,
        exchange_type: &str,
        options: ExchangeDeclareOptions,
    ) -> Result<(), Error> {
        let method = Method::ExchangeDeclare(exchange::Declare {
            reserved_1: 0,
            exchange: exchange.into(),
            exchange_type: exchange_type.into(),
            passive: options.passive,
            durable: options.durable,
            auto_delete: options.auto_delete,
            internal: options.internal,
            no_wait: options.no_wait,
            arguments: options.arguments,
        });
        if method_no_wait(&method) {
            return self.send_async(&method);
        }
        self.inner.rpc(&method).map(|_| ())
    }

    /// Delete an exchange.
    pub fn exchange_delete(&self, exchange: &str, if_unused: bool) -> Result<(), Error> {
        let method = Method::ExchangeDelete(exchange::Delete {
            reserved_1: 0,
            exchange: exchange.into(),
            if_unused,
            no_wait: false,
        });
        self.inner.rpc(&method).map(|_| ())
    }

    /// Bind `destination` to `source` (RabbitMQ exchange-to-exchange
    /// binding).
    pub fn exchange_bind(
        &self,
        destination: &str,
        source: &str,
        routing_key: &str,
        arguments: FieldTable,
    ) -> Result<(), Error> {
        let method = Method::ExchangeBind(exchange::Bind {
            reserved_1: 0,
            destination: destination.into(),
            source: source.into(),
            routing_key: routing_key.into(),
            no_wait: false,
            arguments,
        });
        self.inner.rpc(&method).map(|_| ())
    }

    /// Remove an exchange-to-exchange binding.
    pub fn exchange_unbind(
        &self,
        destination: &str,
        source: &str,
        routing_key: &str,
        arguments: FieldTable,
    ) -> Result<(), Error> {
        let method = Method::ExchangeUnbind(exchange::Unbind {
            reserved_1: 0,
            destination: destination.into(),
            source: source.into(),
            routing_key: routing_key.into(),
            no_wait: false,
            arguments,
        });
        self.inner.rpc(&method).map(|_| ())
    }

    /// Declare a queue; an empty name asks the server to generate one.
    pub fn queue_declare(
        &self,
        queue: &str,
        options: QueueDeclareOptions,
    ) -> Result<QueueDeclareOk, Error> {
        let method = Method::QueueDeclare(queue::Declare {
            reserved_1: 0,
            queue: queue.into(),
            passive: options.passive,
            durable: options.durable,
            exclusive: options.exclusive,
            auto_delete: options.auto_delete,
            no_wait: options.no_wait,
            arguments: options.arguments,
        });
        if method_no_wait(&method) {
            self.send_async(&method)?;
            return Ok(QueueDeclareOk {
                queue: queue.into(),
                message_count: 0,
                consumer_count: 0,
            });
        }
        match self.inner.rpc(&method)?.method {
            Method::QueueDeclareOk(ok) => Ok(ok),
            other => Err(Error::UnexpectedMethod(other.name())),
        }
    }

    /// Bind a queue to an exchange.
    pub fn queue_bind(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
        arguments: FieldTable,
    ) -> Result<(), Error> {
        let method = Method::QueueBind(queue::Bind {
            reserved_1: 0,
            queue: queue.into(),
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            no_wait: false,
            arguments,
        });
        self.inner.rpc(&method).map(|_| ())
    }

    /// Remove a queue binding.
    pub fn queue_unbind(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
        arguments: FieldTable,
    ) -> Result<(), Error> {
        let method = Method::QueueUnbind(queue::Unbind {
            reserved_1: 0,
            queue: queue.into(),
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            arguments,
        });
        self.inner.rpc(&method).map(|_| ())
    }

    /// Drop all messages from a queue, returning how many were removed.
    pub fn queue_purge(&self, queue: &str) -> Result<u32, Error> {
        let method = Method::QueuePurge(queue::Purge {
            reserved_1: 0,
            queue: queue.into(),
            no_wait: false,
        });
        match self.inner.rpc(&method)?.method {
            Method::QueuePurgeOk(ok) => Ok(ok.message_count),
            other => Err(Error::UnexpectedMethod(other.name())),
        }
    }

    /// Delete a queue, returning how many messages were deleted with it.
    pub fn queue_delete(&self, queue: &str, options: QueueDeleteOptions) -> Result<u32, Error> {
        let method = Method::QueueDelete(queue::Delete {
            reserved_1: 0,
            queue: queue.into(),
            if_unused: options.if_unused,
            if_empty: options.if_empty,
            no_wait: options.no_wait,
        });
        if method_no_wait(&method) {
            self.send_async(&method)?;
            return Ok(0);
        }
        match self.inner.rpc(&method)?.method {
            Method::QueueDeleteOk(ok) => Ok(ok.message_count),
            other => Err(Error::UnexpectedMethod(other.name())),
        }
    }

    /// Set the prefetch window for deliveries on this channel.
    pub fn basic_qos(
        &self,
        prefetch_size: u32,
        prefetch_count: u16,
        global: bool,
    ) -> Result<(), Error> {
        let method = Method::BasicQos(basic::Qos {
            prefetch_size,
            prefetch_count,
            global,
        });
        self.inner.rpc(&method).map(|_| ())
    }

    /// Publish a message.
    ///
    /// In confirm mode, returns the delivery tag assigned to this publish;
    /// otherwise returns `None`.
    pub fn basic_publish(
        &self,
        message: &Message,
        exchange: &str,
        routing_key: &str,
        options: PublishOptions,
    ) -> Result<Option<u64>, Error> {
        self.publish_inner(message, exchange, routing_key, options, None, false)
    }

    /// Publish in confirm mode with a callback invoked when the broker
    /// acks or nacks this specific message.
    pub fn basic_publish_with_confirm(
        &self,
        message: &Message,
        exchange: &str,
        routing_key: &str,
        options: PublishOptions,
        on_confirm: impl Fn(Confirm) + Send + Sync + 'static,
    ) -> Result<u64, Error> {
        self.publish_inner(
            message,
            exchange,
            routing_key,
            options,
            Some(Arc::new(on_confirm)),
            false,
        )?
        .ok_or(Error::NotInConfirmMode)
    }

    /// Publish in confirm mode and block until the broker confirms this
    /// message, the channel closes, or `timeout` elapses.
    pub fn basic_publish_confirm(
        &self,
        message: &Message,
        exchange: &str,
        routing_key: &str,
        options: PublishOptions,
        timeout: Option<std::time::Duration>,
    ) -> Result<(), Error> {
        let tag = self
            .publish_inner(message, exchange, routing_key, options, None, true)?
            .ok_or(Error::NotInConfirmMode)?;
        let deadline = timeout.map(|t| Instant::now() + t);
        let inner = &self.inner;
        let mut st = inner.state.lock();
        loop {
            if let Some(ledger) = st.confirm.as_mut() {
                if let Some(acked) = ledger.outcomes.remove(&tag) {
                    return if acked {
                        Ok(())
                    } else {
                        Err(Error::Nacked { delivery_tag: tag })
                    };
                }
            }
            if st.phase != Phase::Open {
                // the channel died before the broker confirmed the tag
                return Err(st.error.clone().unwrap_or(Error::ChannelNotOpen));
            }
            inner.wait_step(&mut st, deadline)?;
        }
    }

    fn publish_inner(
        &self,
        message: &Message,
        exchange: &str,
        routing_key: &str,
        options: PublishOptions,
        callback: Option<ConfirmCallback>,
        awaited: bool,
    ) -> Result<Option<u64>, Error> {
        let conn = self.inner.connection()?;
        let method = Method::BasicPublish(basic::Publish {
            reserved_1: 0,
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            mandatory: options.mandatory,
            immediate: options.immediate,
        });
        let _gate = self.inner.publish_gate.lock();
        let tag = {
            let mut st = self.inner.state.lock();
            st.check_usable()?;
            match st.confirm.as_mut() {
                Some(ledger) => {
                    let tag = ledger.next_tag;
                    ledger.next_tag += 1;
                    ledger
                        .pending
                        .insert(tag, PendingPublish { callback, awaited });
                    Some(tag)
                }
                None => None,
            }
        };
        conn.send_content(self.inner.id, &method, &message.properties, &message.body)?;
        Ok(tag)
    }

    /// Block until every publish issued so far in confirm mode has been
    /// acked or nacked.
    pub fn wait_for_confirms(&self, timeout: Option<std::time::Duration>) -> Result<(), Error> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let inner = &self.inner;
        let mut st = inner.state.lock();
        loop {
            match st.confirm.as_ref() {
                Some(ledger) if ledger.pending.is_empty() => return Ok(()),
                Some(_) => {}
                None => return Err(Error::NotInConfirmMode),
            }
            if st.phase != Phase::Open {
                return Err(st.error.clone().unwrap_or(Error::ChannelNotOpen));
            }
            inner.wait_step(&mut st, deadline)?;
        }
    }

    /// Start a consumer; returns the consumer tag.
    ///
    /// The consumer's callbacks run on the connection's reader thread and
    /// must not issue synchronous calls on this connection.
    pub fn basic_consume(
        &self,
        queue: &str,
        options: ConsumeOptions,
        consumer: impl Consumer,
    ) -> Result<String, Error> {
        if options.no_wait && options.consumer_tag.is_empty() {
            return Err(Error::InvalidArgument(
                "no_wait consume requires an explicit consumer tag",
            ));
        }
        let consumer: Arc<dyn Consumer> = Arc::new(consumer);
        let method = Method::BasicConsume(basic::Consume {
            reserved_1: 0,
            queue: queue.into(),
            consumer_tag: options.consumer_tag.clone(),
            no_local: options.no_local,
            no_ack: options.no_ack,
            exclusive: options.exclusive,
            no_wait: options.no_wait,
            arguments: options.arguments,
        });
        if !options.consumer_tag.is_empty() {
            self.inner
                .consumers
                .lock()
                .insert(options.consumer_tag.clone(), consumer.clone());
        }
        if options.no_wait {
            self.send_async(&method)?;
            return Ok(options.consumer_tag);
        }
        let reply = match self.inner.rpc(&method) {
            Ok(reply) => reply,
            Err(err) => {
                if !options.consumer_tag.is_empty() {
                    self.inner.consumers.lock().remove(&options.consumer_tag);
                }
                return Err(err);
            }
        };
        match reply.method {
            Method::BasicConsumeOk(ok) => {
                self.inner
                    .consumers
                    .lock()
                    .insert(ok.consumer_tag.clone(), consumer);
                Ok(ok.consumer_tag)
            }
            other => Err(Error::UnexpectedMethod(other.name())),
        }
    }

    /// Cancel a consumer started with [`basic_consume`](Self::basic_consume).
    pub fn basic_cancel(&self, consumer_tag: &str) -> Result<(), Error> {
        let method = Method::BasicCancel(basic::Cancel {
            consumer_tag: consumer_tag.into(),
            no_wait: false,
        });
        let result = self.inner.rpc(&method).map(|_| ());
        self.inner.consumers.lock().remove(consumer_tag);
        result
    }

    /// Fetch a single message from a queue, or `None` if it is empty.
    pub fn basic_get(&self, queue: &str, no_ack: bool) -> Result<Option<Delivery>, Error> {
        let method = Method::BasicGet(basic::Get {
            reserved_1: 0,
            queue: queue.into(),
            no_ack,
        });
        let reply = self.inner.rpc(&method)?;
        match reply.method {
            Method::BasicGetOk(ok) => {
                let (properties, body) = reply.content.unwrap_or_default();
                Ok(Some(Delivery {
                    message: Message { properties, body },
                    delivery_tag: ok.delivery_tag,
                    redelivered: ok.redelivered,
                    exchange: ok.exchange,
                    routing_key: ok.routing_key,
                    consumer_tag: None,
                    channel: Arc::downgrade(&self.inner),
                }))
            }
            Method::BasicGetEmpty(_) => Ok(None),
            other => Err(Error::UnexpectedMethod(other.name())),
        }
    }

    /// Acknowledge a delivery by tag.
    pub fn basic_ack(&self, delivery_tag: u64, multiple: bool) -> Result<(), Error> {
        self.inner.send_ack(delivery_tag, multiple)
    }

    /// Reject one or more deliveries (RabbitMQ `basic.nack`).
    pub fn basic_nack(&self, delivery_tag: u64, multiple: bool, requeue: bool) -> Result<(), Error> {
        self.inner.send_nack(delivery_tag, multiple, requeue)
    }

    /// Reject a single delivery.
    pub fn basic_reject(&self, delivery_tag: u64, requeue: bool) -> Result<(), Error> {
        self.inner.send_reject(delivery_tag, requeue)
    }

    /// Ask the broker to redeliver all unacknowledged messages on this
    /// channel.
    pub fn basic_recover(&self, requeue: bool) -> Result<(), Error> {
        let method = Method::BasicRecover(basic::Recover { requeue });
        self.inner.rpc(&method).map(|_| ())
    }

    /// Deprecated fire-and-forget variant of
    /// [`basic_recover`](Self::basic_recover); the broker sends no
    /// confirmation.
    pub fn basic_recover_async(&self, requeue: bool) -> Result<(), Error> {
        self.send_async(&Method::BasicRecoverAsync(basic::RecoverAsync { requeue }))
    }

    /// Pause or restart deliveries from the broker; returns the setting
    /// now in effect.
    pub fn flow(&self, active: bool) -> Result<bool, Error> {
        let method = Method::ChannelFlow(channel::Flow { active });
        match self.inner.rpc(&method)?.method {
            Method::ChannelFlowOk(ok) => Ok(ok.active),
            other => Err(Error::UnexpectedMethod(other.name())),
        }
    }

    /// Put the channel in transaction mode.
    pub fn tx_select(&self) -> Result<(), Error> {
        self.inner.rpc(&Method::TxSelect).map(|_| ())
    }

    /// Commit the current transaction.
    pub fn tx_commit(&self) -> Result<(), Error> {
        self.inner.rpc(&Method::TxCommit).map(|_| ())
    }

    /// Roll back the current transaction.
    pub fn tx_rollback(&self) -> Result<(), Error> {
        self.inner.rpc(&Method::TxRollback).map(|_| ())
    }

    /// Put the channel in publisher-confirm mode (RabbitMQ extension).
    ///
    /// Delivery tags are assigned to publishes from the moment the select
    /// is sent, starting at 1.
    pub fn confirm_select(&self) -> Result<(), Error> {
        {
            let mut st = self.inner.state.lock();
            st.check_usable()?;
            if st.confirm.is_none() {
                st.confirm = Some(ConfirmLedger::new());
            }
        }
        let method = Method::ConfirmSelect(confirm::Select { no_wait: false });
        self.inner.rpc(&method).map(|_| ())
    }

    /// Register a handler for inbound `basic.ack` events
    /// `(delivery_tag, multiple)`.
    pub fn on_ack(&self, handler: impl Fn(u64, bool) + Send + Sync + 'static) {
        self.inner.events.lock().push_ack(Arc::new(handler));
    }

    /// Register a handler for inbound `basic.nack` events
    /// `(delivery_tag, multiple, requeue)`.
    pub fn on_nack(&self, handler: impl Fn(u64, bool, bool) + Send + Sync + 'static) {
        self.inner.events.lock().push_nack(Arc::new(handler));
    }

    /// Register a handler for returned (unroutable mandatory) messages.
    pub fn on_return(&self, handler: impl Fn(&ReturnedMessage) + Send + Sync + 'static) {
        self.inner.events.lock().push_return(Arc::new(handler));
    }

    /// Register a handler for `channel.flow` changes.
    pub fn on_flow(&self, handler: impl Fn(bool) + Send + Sync + 'static) {
        self.inner.events.lock().push_flow(Arc::new(handler));
    }

    fn send_async(&self, method: &Method) -> Result<(), Error> {
        let conn = self.inner.connection()?;
        self.inner.state.lock().check_usable()?;
        conn.send_method(self.inner.id, method)
    }
}

fn method_no_wait(method: &Method) -> bool {
    match method {
        Method::ExchangeDeclare(m) => m.no_wait,
        Method::QueueDeclare(m) => m.no_wait,
        Method::QueueDelete(m) => m.no_wait,
        _ => false,
    }
}

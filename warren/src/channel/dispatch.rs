//! Inbound frame handling for one channel, run on the connection's
//! reader thread.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};
use warren_types::methods::basic;
use warren_types::properties::ContentHeader;
use warren_types::Method;

use crate::error::AmqpException;
use crate::message::{Delivery, Message, ReturnedMessage};
use crate::Error;

use super::{Assembly, ChannelInner, Phase, Reply};

impl ChannelInner {
    /// Handle a METHOD frame addressed to this channel.
    ///
    /// Errors returned here are connection-fatal protocol violations; the
    /// engine closes the connection with the matching reply code.
    pub(crate) fn handle_method(self: &Arc<Self>, method: Method) -> Result<(), Error> {
        {
            let mut st = self.state.lock();
            if st.assembly.is_some() {
                return Err(Error::UnexpectedFrame(
                    "method frame while content frames were expected",
                ));
            }
            if method.has_content() {
                st.assembly = Some(Assembly {
                    method,
                    header: None,
                    body: BytesMut::new(),
                });
                return Ok(());
            }
        }
        match method {
            Method::ChannelClose(close) => self.on_remote_close(close),
            Method::ChannelFlow(flow) => self.on_flow(flow.active),
            Method::BasicAck(ack) => {
                self.resolve_confirms(ack.delivery_tag, ack.multiple, true);
                let handlers = self.events.lock().ack_handlers();
                for handler in handlers {
                    handler(ack.delivery_tag, ack.multiple);
                }
                Ok(())
            }
            Method::BasicNack(nack) => {
                self.resolve_confirms(nack.delivery_tag, nack.multiple, false);
                let handlers = self.events.lock().nack_handlers();
                for handler in handlers {
                    handler(nack.delivery_tag, nack.multiple, nack.requeue);
                }
                Ok(())
            }
            Method::BasicCancel(cancel) => self.on_remote_cancel(cancel),
            Method::ChannelCloseOk => {
                let mut st = self.state.lock();
                st.phase = Phase::Closed;
                if let Some(waiter) = st.rpc.as_mut() {
                    if waiter.reply.is_none() {
                        waiter.reply = Some(Ok(Reply {
                            method: Method::ChannelCloseOk,
                            content: None,
                        }));
                    }
                }
                drop(st);
                self.cond.notify_all();
                Ok(())
            }
            other => self.fulfil_rpc(other),
        }
    }

    /// Handle a HEADER frame.
    pub(crate) fn handle_header(self: &Arc<Self>, header: ContentHeader) -> Result<(), Error> {
        let complete = {
            let mut st = self.state.lock();
            match st.assembly.as_mut() {
                Some(assembly) if assembly.header.is_none() => {
                    if header.body_size == 0 {
                        st.assembly.take().map(|assembly| (assembly.method, header))
                    } else {
                        assembly.header = Some(header);
                        None
                    }
                }
                _ => {
                    return Err(Error::UnexpectedFrame(
                        "content header without a content method",
                    ))
                }
            }
        };
        match complete {
            Some((method, header)) => self.complete_content(method, header, Bytes::new()),
            None => Ok(()),
        }
    }

    /// Handle a BODY frame.
    pub(crate) fn handle_body(self: &Arc<Self>, payload: Bytes) -> Result<(), Error> {
        let complete = {
            let mut st = self.state.lock();
            match st.assembly.as_mut() {
                Some(assembly) if assembly.header.is_some() => {
                    assembly.body.extend_from_slice(&payload);
                    let body_size = assembly
                        .header
                        .as_ref()
                        .map(|h| h.body_size)
                        .unwrap_or_default();
                    if (assembly.body.len() as u64) > body_size {
                        return Err(Error::BodyOverflow);
                    }
                    if assembly.body.len() as u64 == body_size {
                        st.assembly.take().and_then(|assembly| {
                            let body = assembly.body.freeze();
                            assembly.header.map(|header| (assembly.method, header, body))
                        })
                    } else {
                        None
                    }
                }
                _ => {
                    return Err(Error::UnexpectedFrame(
                        "content body without a content header",
                    ))
                }
            }
        };
        match complete {
            Some((method, header, body)) => self.complete_content(method, header, body),
            None => Ok(()),
        }
    }

    /// Route a completed content method with its reassembled body.
    fn complete_content(
        self: &Arc<Self>,
        method: Method,
        header: ContentHeader,
        body: Bytes,
    ) -> Result<(), Error> {
        match method {
            Method::BasicDeliver(deliver) => {
                let consumer = self.consumers.lock().get(&deliver.consumer_tag).cloned();
                match consumer {
                    Some(consumer) => {
                        let delivery = Delivery {
                            message: Message {
                                properties: header.properties,
                                body,
                            },
                            delivery_tag: deliver.delivery_tag,
                            redelivered: deliver.redelivered,
                            exchange: deliver.exchange,
                            routing_key: deliver.routing_key,
                            consumer_tag: Some(deliver.consumer_tag),
                            channel: Arc::downgrade(self),
                        };
                        consumer.deliver(delivery);
                        if let Some(conn) = self.connection.upgrade() {
                            conn.note_delivery();
                        }
                    }
                    // AMQP 1.8.3.9: deliveries for unknown consumers are
                    // dropped
                    None => warn!(
                        channel = self.id,
                        consumer_tag = %deliver.consumer_tag,
                        "discarding delivery for unknown consumer"
                    ),
                }
                Ok(())
            }
            Method::BasicGetOk(_) => {
                let id = method.id();
                let mut st = self.state.lock();
                match st.rpc.as_mut() {
                    Some(waiter) if waiter.reply.is_none() && waiter.expected.contains(&id) => {
                        waiter.reply = Some(Ok(Reply {
                            method,
                            content: Some((header.properties, body)),
                        }));
                        drop(st);
                        self.cond.notify_all();
                        Ok(())
                    }
                    _ => {
                        if let Some(index) =
                            st.orphans.iter().position(|set| set.contains(&id))
                        {
                            st.orphans.swap_remove(index);
                            debug!(channel = self.id, "dropping late basic.get-ok");
                            return Ok(());
                        }
                        Err(Error::UnexpectedMethod("basic.get-ok"))
                    }
                }
            }
            Method::BasicReturn(ret) => {
                let returned = ReturnedMessage {
                    reply_code: ret.reply_code,
                    reply_text: ret.reply_text,
                    exchange: ret.exchange,
                    routing_key: ret.routing_key,
                    message: Message {
                        properties: header.properties,
                        body,
                    },
                };
                debug!(
                    channel = self.id,
                    reply_code = returned.reply_code,
                    "message returned by broker"
                );
                let handlers = self.events.lock().return_handlers();
                for handler in handlers {
                    handler(&returned);
                }
                Ok(())
            }
            other => Err(Error::UnexpectedMethod(other.name())),
        }
    }

    /// Fulfil the pending RPC with a non-content reply.
    fn fulfil_rpc(&self, method: Method) -> Result<(), Error> {
        let name = method.name();
        let id = method.id();
        let mut st = self.state.lock();
        if let Some(waiter) = st.rpc.as_mut() {
            if waiter.reply.is_none() && waiter.expected.contains(&id) {
                waiter.reply = Some(Ok(Reply {
                    method,
                    content: None,
                }));
                drop(st);
                self.cond.notify_all();
                return Ok(());
            }
        }
        if let Some(index) = st.orphans.iter().position(|set| set.contains(&id)) {
            // the reply to an RPC whose caller gave up waiting
            st.orphans.swap_remove(index);
            debug!(channel = self.id, method = name, "dropping late reply");
            return Ok(());
        }
        Err(Error::UnexpectedMethod(name))
    }

    /// The server closed this channel: acknowledge, record the exception,
    /// and fail whoever is waiting.
    fn on_remote_close(self: &Arc<Self>, close: warren_types::methods::channel::Close) -> Result<(), Error> {
        let exception = AmqpException {
            reply_code: close.reply_code,
            reply_text: close.reply_text,
            class_id: close.class_id,
            method_id: close.method_id,
        };
        debug!(channel = self.id, %exception, "channel closed by server");
        self.fail(Error::ChannelClosed(exception));
        if let Ok(conn) = self.connection() {
            if let Err(err) = conn.send_method(self.id, &Method::ChannelCloseOk) {
                warn!(channel = self.id, %err, "failed to acknowledge channel.close");
            }
            conn.remove_channel(self.id);
        }
        Ok(())
    }

    /// The server paused or resumed content flow.
    fn on_flow(self: &Arc<Self>, active: bool) -> Result<(), Error> {
        self.state.lock().active = active;
        if let Ok(conn) = self.connection() {
            conn.send_method(
                self.id,
                &Method::ChannelFlowOk(warren_types::methods::channel::FlowOk { active }),
            )?;
        }
        let handlers = self.events.lock().flow_handlers();
        for handler in handlers {
            handler(active);
        }
        Ok(())
    }

    /// RabbitMQ consumer cancel notification.
    fn on_remote_cancel(self: &Arc<Self>, cancel: basic::Cancel) -> Result<(), Error> {
        let consumer = self.consumers.lock().remove(&cancel.consumer_tag);
        if !cancel.no_wait {
            if let Ok(conn) = self.connection() {
                let reply = Method::BasicCancelOk(basic::CancelOk {
                    consumer_tag: cancel.consumer_tag.clone(),
                });
                if let Err(err) = conn.send_method(self.id, &reply) {
                    warn!(channel = self.id, %err, "failed to acknowledge basic.cancel");
                }
            }
        }
        let handled = match consumer {
            Some(consumer) => consumer.cancelled(&cancel.consumer_tag),
            // nothing was consuming under that tag; nothing to tear down
            None => true,
        };
        if !handled {
            warn!(
                channel = self.id,
                consumer_tag = %cancel.consumer_tag,
                "consumer cancelled by server with no cancel handler"
            );
            self.fail(Error::ConsumerCancelled(cancel.consumer_tag));
        }
        Ok(())
    }

    /// Resolve confirm-mode publishes up to (or exactly at) `tag`.
    fn resolve_confirms(&self, tag: u64, multiple: bool, acked: bool) {
        let resolved = {
            let mut st = self.state.lock();
            let Some(ledger) = st.confirm.as_mut() else {
                return;
            };
            let tags: Vec<u64> = if multiple {
                ledger.pending.range(..=tag).map(|(t, _)| *t).collect()
            } else if ledger.pending.contains_key(&tag) {
                vec![tag]
            } else {
                Vec::new()
            };
            let mut resolved = Vec::with_capacity(tags.len());
            for t in tags {
                if let Some(pending) = ledger.pending.remove(&t) {
                    if pending.awaited {
                        ledger.outcomes.insert(t, acked);
                    }
                    resolved.push((t, pending.callback));
                }
            }
            resolved
        };
        self.cond.notify_all();
        for (delivery_tag, callback) in resolved {
            if let Some(callback) = callback {
                callback(super::Confirm {
                    delivery_tag,
                    acked,
                });
            }
        }
    }
}

//! The method registry: a closed enum over every AMQP 0.9.1 method.
//!
//! One variant per `(class_id, method_id)` pair in the classes
//! `connection` (10), `channel` (20), `exchange` (40), `queue` (50),
//! `basic` (60), `confirm` (85), and `tx` (90). The enum carries the
//! decoded arguments and answers the registry questions that drive
//! encoding and dispatch: ids, name, whether the method carries content,
//! whether it is synchronous, and which replies it accepts.
//!
//! Methods whose argument list is empty (`tx.*`, the various `*-ok`
//! acknowledgements) are unit variants.

pub mod basic;
pub mod channel;
pub mod confirm;
pub mod connection;
pub mod exchange;
pub mod queue;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::primitives;
use crate::Error;

/// Class id of the `connection` class.
pub const CLASS_CONNECTION: u16 = 10;
/// Class id of the `channel` class.
pub const CLASS_CHANNEL: u16 = 20;
/// Class id of the `exchange` class.
pub const CLASS_EXCHANGE: u16 = 40;
/// Class id of the `queue` class.
pub const CLASS_QUEUE: u16 = 50;
/// Class id of the `basic` class.
pub const CLASS_BASIC: u16 = 60;
/// Class id of the RabbitMQ `confirm` extension class.
pub const CLASS_CONFIRM: u16 = 85;
/// Class id of the `tx` class.
pub const CLASS_TX: u16 = 90;

/// A decoded method frame payload.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)] // the variants mirror the per-class structs
pub enum Method {
    ConnectionStart(connection::Start),
    ConnectionStartOk(connection::StartOk),
    ConnectionSecure(connection::Secure),
    ConnectionSecureOk(connection::SecureOk),
    ConnectionTune(connection::Tune),
    ConnectionTuneOk(connection::TuneOk),
    ConnectionOpen(connection::Open),
    ConnectionOpenOk(connection::OpenOk),
    ConnectionClose(connection::Close),
    ConnectionCloseOk,
    ConnectionBlocked(connection::Blocked),
    ConnectionUnblocked,
    ChannelOpen(channel::Open),
    ChannelOpenOk(channel::OpenOk),
    ChannelFlow(channel::Flow),
    ChannelFlowOk(channel::FlowOk),
    ChannelClose(channel::Close),
    ChannelCloseOk,
    ExchangeDeclare(exchange::Declare),
    ExchangeDeclareOk,
    ExchangeDelete(exchange::Delete),
    ExchangeDeleteOk,
    ExchangeBind(exchange::Bind),
    ExchangeBindOk,
    ExchangeUnbind(exchange::Unbind),
    ExchangeUnbindOk,
    QueueDeclare(queue::Declare),
    QueueDeclareOk(queue::DeclareOk),
    QueueBind(queue::Bind),
    QueueBindOk,
    QueuePurge(queue::Purge),
    QueuePurgeOk(queue::PurgeOk),
    QueueDelete(queue::Delete),
    QueueDeleteOk(queue::DeleteOk),
    QueueUnbind(queue::Unbind),
    QueueUnbindOk,
    BasicQos(basic::Qos),
    BasicQosOk,
    BasicConsume(basic::Consume),
    BasicConsumeOk(basic::ConsumeOk),
    BasicCancel(basic::Cancel),
    BasicCancelOk(basic::CancelOk),
    BasicPublish(basic::Publish),
    BasicReturn(basic::Return),
    BasicDeliver(basic::Deliver),
    BasicGet(basic::Get),
    BasicGetOk(basic::GetOk),
    BasicGetEmpty(basic::GetEmpty),
    BasicAck(basic::Ack),
    BasicReject(basic::Reject),
    BasicRecoverAsync(basic::RecoverAsync),
    BasicRecover(basic::Recover),
    BasicRecoverOk,
    BasicNack(basic::Nack),
    ConfirmSelect(confirm::Select),
    ConfirmSelectOk,
    TxSelect,
    TxSelectOk,
    TxCommit,
    TxCommitOk,
    TxRollback,
    TxRollbackOk,
}

impl Method {
    /// The `(class_id, method_id)` pair identifying this method on the
    /// wire.
    pub fn id(&self) -> (u16, u16) {
        match self {
            Method::ConnectionStart(_) => (CLASS_CONNECTION, 10),
            Method::ConnectionStartOk(_) => (CLASS_CONNECTION, 11),
            Method::ConnectionSecure(_) => (CLASS_CONNECTION, 20),
            Method::ConnectionSecureOk(_) => (CLASS_CONNECTION, 21),
            Method::ConnectionTune(_) => (CLASS_CONNECTION, 30),
            Method::ConnectionTuneOk(_) => (CLASS_CONNECTION, 31),
            Method::ConnectionOpen(_) => (CLASS_CONNECTION, 40),
            Method::ConnectionOpenOk(_) => (CLASS_CONNECTION, 41),
            Method::ConnectionClose(_) => (CLASS_CONNECTION, 50),
            Method::ConnectionCloseOk => (CLASS_CONNECTION, 51),
            Method::ConnectionBlocked(_) => (CLASS_CONNECTION, 60),
            Method::ConnectionUnblocked => (CLASS_CONNECTION, 61),
            Method::ChannelOpen(_) => (CLASS_CHANNEL, 10),
            Method::ChannelOpenOk(_) => (CLASS_CHANNEL, 11),
            Method::ChannelFlow(_) => (CLASS_CHANNEL, 20),
            Method::ChannelFlowOk(_) => (CLASS_CHANNEL, 21),
            Method::ChannelClose(_) => (CLASS_CHANNEL, 40),
            Method::ChannelCloseOk => (CLASS_CHANNEL, 41),
            Method::ExchangeDeclare(_) => (CLASS_EXCHANGE, 10),
            Method::ExchangeDeclareOk => (CLASS_EXCHANGE, 11),
            Method::ExchangeDelete(_) => (CLASS_EXCHANGE, 20),
            Method::ExchangeDeleteOk => (CLASS_EXCHANGE, 21),
            Method::ExchangeBind(_) => (CLASS_EXCHANGE, 30),
            Method::ExchangeBindOk => (CLASS_EXCHANGE, 31),
            Method::ExchangeUnbind(_) => (CLASS_EXCHANGE, 40),
            Method::ExchangeUnbindOk => (CLASS_EXCHANGE, 51),
            Method::QueueDeclare(_) => (CLASS_QUEUE, 10),
            Method::QueueDeclareOk(_) => (CLASS_QUEUE, 11),
            Method::QueueBind(_) => (CLASS_QUEUE, 20),
            Method::QueueBindOk => (CLASS_QUEUE, 21),
            Method::QueuePurge(_) => (CLASS_QUEUE, 30),
            Method::QueuePurgeOk(_) => (CLASS_QUEUE, 31),
            Method::QueueDelete(_) => (CLASS_QUEUE, 40),
            Method::QueueDeleteOk(_) => (CLASS_QUEUE, 41),
            Method::QueueUnbind(_) => (CLASS_QUEUE, 50),
            Method::QueueUnbindOk => (CLASS_QUEUE, 51),
            Method::BasicQos(_) => (CLASS_BASIC, 10),
            Method::BasicQosOk => (CLASS_BASIC, 11),
            Method::BasicConsume(_) => (CLASS_BASIC, 20),
            Method::BasicConsumeOk(_) => (CLASS_BASIC, 21),
            Method::BasicCancel(_) => (CLASS_BASIC, 30),
            Method::BasicCancelOk(_) => (CLASS_BASIC, 31),
            Method::BasicPublish(_) => (CLASS_BASIC, 40),
            Method::BasicReturn(_) => (CLASS_BASIC, 50),
            Method::BasicDeliver(_) => (CLASS_BASIC, 60),
            Method::BasicGet(_) => (CLASS_BASIC, 70),
            Method::BasicGetOk(_) => (CLASS_BASIC, 71),
            Method::BasicGetEmpty(_) => (CLASS_BASIC, 72),
            Method::BasicAck(_) => (CLASS_BASIC, 80),
            Method::BasicReject(_) => (CLASS_BASIC, 90),
            Method::BasicRecoverAsync(_) => (CLASS_BASIC, 100),
            Method::BasicRecover(_) => (CLASS_BASIC, 110),
            Method::BasicRecoverOk => (CLASS_BASIC, 111),
            Method::BasicNack(_) => (CLASS_BASIC, 120),
            Method::ConfirmSelect(_) => (CLASS_CONFIRM, 10),
            Method::ConfirmSelectOk => (CLASS_CONFIRM, 11),
            Method::TxSelect => (CLASS_TX, 10),
            Method::TxSelectOk => (CLASS_TX, 11),
            Method::TxCommit => (CLASS_TX, 20),
            Method::TxCommitOk => (CLASS_TX, 21),
            Method::TxRollback => (CLASS_TX, 30),
            Method::TxRollbackOk => (CLASS_TX, 31),
        }
    }

    /// Class id of this method.
    pub fn class_id(&self) -> u16 {
        self.id().0
    }

    /// Method id within the class.
    pub fn method_id(&self) -> u16 {
        self.id().1
    }

    /// The `class.method` name from the protocol XML.
    pub fn name(&self) -> &'static str {
        match self {
            Method::ConnectionStart(_) => "connection.start",
            Method::ConnectionStartOk(_) => "connection.start-ok",
            Method::ConnectionSecure(_) => "connection.secure",
            Method::ConnectionSecureOk(_) => "connection.secure-ok",
            Method::ConnectionTune(_) => "connection.tune",
            Method::ConnectionTuneOk(_) => "connection.tune-ok",
            Method::ConnectionOpen(_) => "connection.open",
            Method::ConnectionOpenOk(_) => "connection.open-ok",
            Method::ConnectionClose(_) => "connection.close",
            Method::ConnectionCloseOk => "connection.close-ok",
            Method::ConnectionBlocked(_) => "connection.blocked",
            Method::ConnectionUnblocked => "connection.unblocked",
            Method::ChannelOpen(_) => "channel.open",
            Method::ChannelOpenOk(_) => "channel.open-ok",
            Method::ChannelFlow(_) => "channel.flow",
            Method::ChannelFlowOk(_) => "channel.flow-ok",
            Method::ChannelClose(_) => "channel.close",
            Method::ChannelCloseOk => "channel.close-ok",
            Method::ExchangeDeclare(_) => "exchange.declare",
            Method::ExchangeDeclareOk => "exchange.declare-ok",
            Method::ExchangeDelete(_) => "exchange.delete",
            Method::ExchangeDeleteOk => "exchange.delete-ok",
            Method::ExchangeBind(_) => "exchange.bind",
            Method::ExchangeBindOk => "exchange.bind-ok",
            Method::ExchangeUnbind(_) => "exchange.unbind",
            Method::ExchangeUnbindOk => "exchange.unbind-ok",
            Method::QueueDeclare(_) => "queue.declare",
            Method::QueueDeclareOk(_) => "queue.declare-ok",
            Method::QueueBind(_) => "queue.bind",
            Method::QueueBindOk => "queue.bind-ok",
            Method::QueuePurge(_) => "queue.purge",
            Method::QueuePurgeOk(_) => "queue.purge-ok",
            Method::QueueDelete(_) => "queue.delete",
            Method::QueueDeleteOk(_) => "queue.delete-ok",
            Method::QueueUnbind(_) => "queue.unbind",
            Method::QueueUnbindOk => "queue.unbind-ok",
            Method::BasicQos(_) => "basic.qos",
            Method::BasicQosOk => "basic.qos-ok",
            Method::BasicConsume(_) => "basic.consume",
            Method::BasicConsumeOk(_) => "basic.consume-ok",
            Method::BasicCancel(_) => "basic.cancel",
            Method::BasicCancelOk(_) => "basic.cancel-ok",
            Method::BasicPublish(_) => "basic.publish",
            Method::BasicReturn(_) => "basic.return",
            Method::BasicDeliver(_) => "basic.deliver",
            Method::BasicGet(_) => "basic.get",
            Method::BasicGetOk(_) => "basic.get-ok",
            Method::BasicGetEmpty(_) => "basic.get-empty",
            Method::BasicAck(_) => "basic.ack",
            Method::BasicReject(_) => "basic.reject",
            Method::BasicRecoverAsync(_) => "basic.recover-async",
            Method::BasicRecover(_) => "basic.recover",
            Method::BasicRecoverOk => "basic.recover-ok",
            Method::BasicNack(_) => "basic.nack",
            Method::ConfirmSelect(_) => "confirm.select",
            Method::ConfirmSelectOk => "confirm.select-ok",
            Method::TxSelect => "tx.select",
            Method::TxSelectOk => "tx.select-ok",
            Method::TxCommit => "tx.commit",
            Method::TxCommitOk => "tx.commit-ok",
            Method::TxRollback => "tx.rollback",
            Method::TxRollbackOk => "tx.rollback-ok",
        }
    }

    /// Whether this method is followed by a content header and body.
    pub fn has_content(&self) -> bool {
        matches!(
            self,
            Method::BasicPublish(_)
                | Method::BasicReturn(_)
                | Method::BasicDeliver(_)
                | Method::BasicGetOk(_)
        )
    }

    /// Whether the sender of this method waits for a reply.
    pub fn is_synchronous(&self) -> bool {
        !self.expected_replies().is_empty()
    }

    /// The `(class_id, method_id)` pairs that fulfil this method when it
    /// is sent as a synchronous request. Empty for asynchronous methods
    /// and for replies themselves.
    pub fn expected_replies(&self) -> &'static [(u16, u16)] {
        match self {
            Method::ConnectionStart(_) => &[(CLASS_CONNECTION, 11)],
            Method::ConnectionSecure(_) => &[(CLASS_CONNECTION, 21)],
            Method::ConnectionTune(_) => &[(CLASS_CONNECTION, 31)],
            Method::ConnectionOpen(_) => &[(CLASS_CONNECTION, 41)],
            Method::ConnectionClose(_) => &[(CLASS_CONNECTION, 51)],
            Method::ChannelOpen(_) => &[(CLASS_CHANNEL, 11)],
            Method::ChannelFlow(_) => &[(CLASS_CHANNEL, 21)],
            Method::ChannelClose(_) => &[(CLASS_CHANNEL, 41)],
            Method::ExchangeDeclare(_) => &[(CLASS_EXCHANGE, 11)],
            Method::ExchangeDelete(_) => &[(CLASS_EXCHANGE, 21)],
            Method::ExchangeBind(_) => &[(CLASS_EXCHANGE, 31)],
            Method::ExchangeUnbind(_) => &[(CLASS_EXCHANGE, 51)],
            Method::QueueDeclare(_) => &[(CLASS_QUEUE, 11)],
            Method::QueueBind(_) => &[(CLASS_QUEUE, 21)],
            Method::QueuePurge(_) => &[(CLASS_QUEUE, 31)],
            Method::QueueDelete(_) => &[(CLASS_QUEUE, 41)],
            Method::QueueUnbind(_) => &[(CLASS_QUEUE, 51)],
            Method::BasicQos(_) => &[(CLASS_BASIC, 11)],
            Method::BasicConsume(_) => &[(CLASS_BASIC, 21)],
            Method::BasicCancel(_) => &[(CLASS_BASIC, 31)],
            Method::BasicGet(_) => &[(CLASS_BASIC, 71), (CLASS_BASIC, 72)],
            Method::BasicRecover(_) => &[(CLASS_BASIC, 111)],
            Method::ConfirmSelect(_) => &[(CLASS_CONFIRM, 11)],
            Method::TxSelect => &[(CLASS_TX, 11)],
            Method::TxCommit => &[(CLASS_TX, 21)],
            Method::TxRollback => &[(CLASS_TX, 31)],
            _ => &[],
        }
    }

    /// Encode `class_id | method_id | arguments` into `buf`.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), Error> {
        let (class_id, method_id) = self.id();
        buf.put_u16(class_id);
        buf.put_u16(method_id);
        match self {
            Method::ConnectionStart(m) => m.encode(buf),
            Method::ConnectionStartOk(m) => m.encode(buf),
            Method::ConnectionSecure(m) => m.encode(buf),
            Method::ConnectionSecureOk(m) => m.encode(buf),
            Method::ConnectionTune(m) => m.encode(buf),
            Method::ConnectionTuneOk(m) => m.encode(buf),
            Method::ConnectionOpen(m) => m.encode(buf),
            Method::ConnectionOpenOk(m) => m.encode(buf),
            Method::ConnectionClose(m) => m.encode(buf),
            Method::ConnectionBlocked(m) => m.encode(buf),
            Method::ChannelOpen(m) => m.encode(buf),
            Method::ChannelOpenOk(m) => m.encode(buf),
            Method::ChannelFlow(m) => m.encode(buf),
            Method::ChannelFlowOk(m) => m.encode(buf),
            Method::ChannelClose(m) => m.encode(buf),
            Method::ExchangeDeclare(m) => m.encode(buf),
            Method::ExchangeDelete(m) => m.encode(buf),
            Method::ExchangeBind(m) => m.encode(buf),
            Method::ExchangeUnbind(m) => m.encode(buf),
            Method::QueueDeclare(m) => m.encode(buf),
            Method::QueueDeclareOk(m) => m.encode(buf),
            Method::QueueBind(m) => m.encode(buf),
            Method::QueuePurge(m) => m.encode(buf),
            Method::QueuePurgeOk(m) => m.encode(buf),
            Method::QueueDelete(m) => m.encode(buf),
            Method::QueueDeleteOk(m) => m.encode(buf),
            Method::QueueUnbind(m) => m.encode(buf),
            Method::BasicQos(m) => m.encode(buf),
            Method::BasicConsume(m) => m.encode(buf),
            Method::BasicConsumeOk(m) => m.encode(buf),
            Method::BasicCancel(m) => m.encode(buf),
            Method::BasicCancelOk(m) => m.encode(buf),
            Method::BasicPublish(m) => m.encode(buf),
            Method::BasicReturn(m) => m.encode(buf),
            Method::BasicDeliver(m) => m.encode(buf),
            Method::BasicGet(m) => m.encode(buf),
            Method::BasicGetOk(m) => m.encode(buf),
            Method::BasicGetEmpty(m) => m.encode(buf),
            Method::BasicAck(m) => m.encode(buf),
            Method::BasicReject(m) => m.encode(buf),
            Method::BasicRecoverAsync(m) => m.encode(buf),
            Method::BasicRecover(m) => m.encode(buf),
            Method::BasicNack(m) => m.encode(buf),
            Method::ConfirmSelect(m) => m.encode(buf),
            Method::ConnectionCloseOk
            | Method::ConnectionUnblocked
            | Method::ChannelCloseOk
            | Method::ExchangeDeclareOk
            | Method::ExchangeDeleteOk
            | Method::ExchangeBindOk
            | Method::ExchangeUnbindOk
            | Method::QueueBindOk
            | Method::QueueUnbindOk
            | Method::BasicQosOk
            | Method::BasicRecoverOk
            | Method::ConfirmSelectOk
            | Method::TxSelect
            | Method::TxSelectOk
            | Method::TxCommit
            | Method::TxCommitOk
            | Method::TxRollback
            | Method::TxRollbackOk => Ok(()),
        }
    }

    /// Encode into a fresh payload buffer, ready to wrap in a METHOD
    /// frame.
    pub fn to_payload(&self) -> Result<Bytes, Error> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode `class_id | method_id | arguments` from `buf`.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let class_id = primitives::get_short(buf)?;
        let method_id = primitives::get_short(buf)?;
        let method = match (class_id, method_id) {
            (CLASS_CONNECTION, 10) => Method::ConnectionStart(connection::Start::decode(buf)?),
            (CLASS_CONNECTION, 11) => Method::ConnectionStartOk(connection::StartOk::decode(buf)?),
            (CLASS_CONNECTION, 20) => Method::ConnectionSecure(connection::Secure::decode(buf)?),
            (CLASS_CONNECTION, 21) => {
                Method::ConnectionSecureOk(connection::SecureOk::decode(buf)?)
            }
            (CLASS_CONNECTION, 30) => Method::ConnectionTune(connection::Tune::decode(buf)?),
            (CLASS_CONNECTION, 31) => Method::ConnectionTuneOk(connection::TuneOk::decode(buf)?),
            (CLASS_CONNECTION, 40) => Method::ConnectionOpen(connection::Open::decode(buf)?),
            (CLASS_CONNECTION, 41) => Method::ConnectionOpenOk(connection::OpenOk::decode(buf)?),
            (CLASS_CONNECTION, 50) => Method::ConnectionClose(connection::Close::decode(buf)?),
            (CLASS_CONNECTION, 51) => Method::ConnectionCloseOk,
            (CLASS_CONNECTION, 60) => Method::ConnectionBlocked(connection::Blocked::decode(buf)?),
            (CLASS_CONNECTION, 61) => Method::ConnectionUnblocked,
            (CLASS_CHANNEL, 10) => Method::ChannelOpen(channel::Open::decode(buf)?),
            (CLASS_CHANNEL, 11) => Method::ChannelOpenOk(channel::OpenOk::decode(buf)?),
            (CLASS_CHANNEL, 20) => Method::ChannelFlow(channel::Flow::decode(buf)?),
            (CLASS_CHANNEL, 21) => Method::ChannelFlowOk(channel::FlowOk::decode(buf)?),
            (CLASS_CHANNEL, 40) => Method::ChannelClose(channel::Close::decode(buf)?),
            (CLASS_CHANNEL, 41) => Method::ChannelCloseOk,
            (CLASS_EXCHANGE, 10) => Method::ExchangeDeclare(exchange::Declare::decode(buf)?),
            (CLASS_EXCHANGE, 11) => Method::ExchangeDeclareOk,
            (CLASS_EXCHANGE, 20) => Method::ExchangeDelete(exchange::Delete::decode(buf)?),
            (CLASS_EXCHANGE, 21) => Method::ExchangeDeleteOk,
            (CLASS_EXCHANGE, 30) => Method::ExchangeBind(exchange::Bind::decode(buf)?),
            (CLASS_EXCHANGE, 31) => Method::ExchangeBindOk,
            (CLASS_EXCHANGE, 40) => Method::ExchangeUnbind(exchange::Unbind::decode(buf)?),
            (CLASS_EXCHANGE, 51) => Method::ExchangeUnbindOk,
            (CLASS_QUEUE, 10) => Method::QueueDeclare(queue::Declare::decode(buf)?),
            (CLASS_QUEUE, 11) => Method::QueueDeclareOk(queue::DeclareOk::decode(buf)?),
            (CLASS_QUEUE, 20) => Method::QueueBind(queue::Bind::decode(buf)?),
            (CLASS_QUEUE, 21) => Method::QueueBindOk,
            (CLASS_QUEUE, 30) => Method::QueuePurge(queue::Purge::decode(buf)?),
            (CLASS_QUEUE, 31) => Method::QueuePurgeOk(queue::PurgeOk::decode(buf)?),
            (CLASS_QUEUE, 40) => Method::QueueDelete(queue::Delete::decode(buf)?),
            (CLASS_QUEUE, 41) => Method::QueueDeleteOk(queue::DeleteOk::decode(buf)?),
            (CLASS_QUEUE, 50) => Method::QueueUnbind(queue::Unbind::decode(buf)?),
            (CLASS_QUEUE, 51) => Method::QueueUnbindOk,
            (CLASS_BASIC, 10) => Method::BasicQos(basic::Qos::decode(buf)?),
            (CLASS_BASIC, 11) => Method::BasicQosOk,
            (CLASS_BASIC, 20) => Method::BasicConsume(basic::Consume::decode(buf)?),
            (CLASS_BASIC, 21) => Method::BasicConsumeOk(basic::ConsumeOk::decode(buf)?),
            (CLASS_BASIC, 30) => Method::BasicCancel(basic::Cancel::decode(buf)?),
            (CLASS_BASIC, 31) => Method::BasicCancelOk(basic::CancelOk::decode(buf)?),
            (CLASS_BASIC, 40) => Method::BasicPublish(basic::Publish::decode(buf)?),
            (CLASS_BASIC, 50) => Method::BasicReturn(basic::Return::decode(buf)?),
            (CLASS_BASIC, 60) => Method::BasicDeliver(basic::Deliver::decode(buf)?),
            (CLASS_BASIC, 70) => Method::BasicGet(basic::Get::decode(buf)?),
            (CLASS_BASIC, 71) => Method::BasicGetOk(basic::GetOk::decode(buf)?),
            (CLASS_BASIC, 72) => Method::BasicGetEmpty(basic::GetEmpty::decode(buf)?),
            (CLASS_BASIC, 80) => Method::BasicAck(basic::Ack::decode(buf)?),
            (CLASS_BASIC, 90) => Method::BasicReject(basic::Reject::decode(buf)?),
            (CLASS_BASIC, 100) => Method::BasicRecoverAsync(basic::RecoverAsync::decode(buf)?),
            (CLASS_BASIC, 110) => Method::BasicRecover(basic::Recover::decode(buf)?),
            (CLASS_BASIC, 111) => Method::BasicRecoverOk,
            (CLASS_BASIC, 120) => Method::BasicNack(basic::Nack::decode(buf)?),
            (CLASS_CONFIRM, 10) => Method::ConfirmSelect(confirm::Select::decode(buf)?),
            (CLASS_CONFIRM, 11) => Method::ConfirmSelectOk,
            (CLASS_TX, 10) => Method::TxSelect,
            (CLASS_TX, 11) => Method::TxSelectOk,
            (CLASS_TX, 20) => Method::TxCommit,
            (CLASS_TX, 21) => Method::TxCommitOk,
            (CLASS_TX, 30) => Method::TxRollback,
            (CLASS_TX, 31) => Method::TxRollbackOk,
            (class_id, method_id) => {
                return Err(Error::UnknownMethod {
                    class_id,
                    method_id,
                })
            }
        };
        Ok(method)
    }
}

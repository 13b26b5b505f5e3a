#![deny(missing_docs, missing_debug_implementations)]

//! Wire-level types for the AMQP 0.9.1 protocol.
//!
//! This crate implements the pure, side-effect-free half of an AMQP 0.9.1
//! client: primitive encodings, typed field tables, the frame codec, content
//! header properties, and a closed [`Method`] enum covering every method in
//! the protocol classes `connection`, `channel`, `exchange`, `queue`,
//! `basic`, `confirm`, and `tx` (the last two being RabbitMQ-relevant
//! extensions and the transaction class respectively).
//!
//! Everything here operates on [`bytes::Buf`]/[`bytes::BufMut`] and never
//! touches a socket; the I/O half lives in the `warren` crate.
//!
//! Method indices and argument layouts are as declared in the AMQP 0.9.1
//! protocol XML; the relevant XML fragments are quoted on each method
//! struct.

pub mod constants;
mod error;
pub mod frame;
pub mod methods;
pub mod primitives;
pub mod properties;
pub mod value;

pub use error::Error;
pub use frame::{Frame, FrameType};
pub use methods::Method;
pub use properties::{BasicProperties, ContentHeader};
pub use value::{Decimal, FieldArray, FieldTable, FieldValue, Timestamp};

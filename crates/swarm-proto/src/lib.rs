//! `swarm-proto` — the message envelope spoken between leaders and followers.
//!
//! Messages are self-describing JSON records discriminated by a `type` field.
//! The envelope is decoded once at the receiving agent and dispatched into
//! typed handlers; payloads that fail to decode (including unknown `type`
//! values) are dropped by the receiver with a debug log, never bubbled as
//! errors across agent boundaries.

pub mod error;
pub mod message;

#[cfg(test)]
mod tests;

pub use error::{ProtoError, ProtoResult};
pub use message::{AssignedPoi, DeliverEntry, Message};

//! Typed wire messages.
//!
//! Field names follow the established wire format, not Rust conventions:
//! the free-slot count travels as `huecos`, delivered entries as `pids`, the
//! detection timestamp as `ts`.  Changing them would break log tooling that
//! greps raw payloads.

use serde::{Deserialize, Serialize};
use swarm_core::{AgentId, PoiId, Urgency};

use crate::ProtoResult;

/// One point of interest inside an ASSIGN payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignedPoi {
    pub label: String,
    /// Ground coordinate (x, y); the follower raises it to its own altitude.
    pub coord: [f64; 2],
    pub urgency: Urgency,
    /// Leader-side first-detection timestamp, seconds.
    pub ts: f64,
}

/// One collected point inside a DELIVER payload.
///
/// All fields are optional on the wire: a malformed entry (missing id or
/// label) is skipped by the leader, not rejected with the whole message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliverEntry {
    #[serde(default)]
    pub id: Option<PoiId>,
    #[serde(default)]
    pub label: Option<String>,
    /// When the follower first arrived at the point, seconds.
    #[serde(default)]
    pub t_arrive: Option<f64>,
}

/// The message envelope.  `type` is the discriminator on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Follower → leader, periodic. `huecos` is the free buffer slot count.
    #[serde(rename = "HELLO")]
    Hello {
        v_id: AgentId,
        #[serde(rename = "huecos")]
        free_slots: usize,
        position: [f64; 3],
    },

    /// Leader → follower, response to HELLO.
    #[serde(rename = "HELLO_ACK")]
    HelloAck {
        v_id: AgentId,
        eqc_id: AgentId,
        eqc_pos: [f64; 3],
        eqc_time: f64,
    },

    /// Leader → follower: take ownership of these points.
    #[serde(rename = "ASSIGN")]
    Assign {
        v_id: AgentId,
        pois: Vec<AssignedPoi>,
    },

    /// Follower → leader: points collected since the last acknowledgement.
    #[serde(rename = "DELIVER")]
    Deliver {
        v_id: AgentId,
        pids: Vec<DeliverEntry>,
    },

    /// Leader → follower: these ids have been reconciled.
    #[serde(rename = "DELIVER_ACK")]
    DeliverAck {
        v_id: AgentId,
        pids: Vec<PoiId>,
    },
}

impl Message {
    /// Serialize for transmission.
    pub fn encode(&self) -> ProtoResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a received payload.  Unknown `type` discriminators and shape
    /// mismatches surface as a single decode error.
    pub fn decode(raw: &[u8]) -> ProtoResult<Message> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// The wire discriminator, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Hello { .. }      => "HELLO",
            Message::HelloAck { .. }   => "HELLO_ACK",
            Message::Assign { .. }     => "ASSIGN",
            Message::Deliver { .. }    => "DELIVER",
            Message::DeliverAck { .. } => "DELIVER_ACK",
        }
    }

    /// The follower the message is about (every message carries one).
    pub fn v_id(&self) -> AgentId {
        match self {
            Message::Hello { v_id, .. }
            | Message::HelloAck { v_id, .. }
            | Message::Assign { v_id, .. }
            | Message::Deliver { v_id, .. }
            | Message::DeliverAck { v_id, .. } => *v_id,
        }
    }
}

//! Unit tests for swarm-proto.

use swarm_core::{AgentId, PoiId, Urgency};

use crate::{AssignedPoi, DeliverEntry, Message};

#[test]
fn hello_uses_wire_field_names() {
    let msg = Message::Hello {
        v_id:       AgentId(3),
        free_slots: 4,
        position:   [1.0, 2.0, 4.0],
    };
    let raw = msg.encode().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(json["type"], "HELLO");
    assert_eq!(json["huecos"], 4);
    assert_eq!(json["v_id"], 3);
    assert_eq!(Message::decode(&raw).unwrap(), msg);
}

#[test]
fn assign_round_trips_with_exact_coords() {
    // Coordinates must survive the wire bit-exact: the follower resolves
    // them back to registry entries by value.
    let coord = [100.30000000000001, 977.123456789];
    let msg = Message::Assign {
        v_id: AgentId(1),
        pois: vec![AssignedPoi {
            label:   "poi-0042".into(),
            coord,
            urgency: Urgency::High,
            ts:      12.3,
        }],
    };
    let decoded = Message::decode(&msg.encode().unwrap()).unwrap();
    let Message::Assign { pois, .. } = decoded else { panic!("wrong variant") };
    assert_eq!(pois[0].coord[0].to_bits(), coord[0].to_bits());
    assert_eq!(pois[0].coord[1].to_bits(), coord[1].to_bits());
    assert_eq!(pois[0].urgency, Urgency::High);
}

#[test]
fn urgency_travels_as_integer_level() {
    let msg = Message::Assign {
        v_id: AgentId(0),
        pois: vec![AssignedPoi {
            label:   "p".into(),
            coord:   [0.0, 0.0],
            urgency: Urgency::Medium,
            ts:      0.0,
        }],
    };
    let json: serde_json::Value = serde_json::from_slice(&msg.encode().unwrap()).unwrap();
    assert_eq!(json["pois"][0]["urgency"], 2);
}

#[test]
fn deliver_tolerates_partial_entries() {
    // An entry without id/label must decode (the leader skips it later).
    let raw = br#"{"type":"DELIVER","v_id":5,"pids":[{"id":9,"label":"poi-0009","t_arrive":3.5},{"t_arrive":1.0}]}"#;
    let msg = Message::decode(raw).unwrap();
    let Message::Deliver { v_id, pids } = msg else { panic!("wrong variant") };
    assert_eq!(v_id, AgentId(5));
    assert_eq!(pids.len(), 2);
    assert_eq!(pids[0].id, Some(PoiId(9)));
    assert_eq!(pids[1].id, None);
    assert_eq!(pids[1].label, None);
}

#[test]
fn unknown_type_is_a_decode_error() {
    let raw = br#"{"type":"PING","v_id":0}"#;
    assert!(Message::decode(raw).is_err());
}

#[test]
fn deliver_ack_lists_plain_ids() {
    let msg = Message::DeliverAck { v_id: AgentId(2), pids: vec![PoiId(1), PoiId(7)] };
    let json: serde_json::Value = serde_json::from_slice(&msg.encode().unwrap()).unwrap();
    assert_eq!(json["pids"][0], 1);
    assert_eq!(json["pids"][1], 7);
    assert_eq!(msg.kind(), "DELIVER_ACK");
    assert_eq!(msg.v_id(), AgentId(2));
}

#[test]
fn deliver_entry_default_fields() {
    let entry: DeliverEntry = serde_json::from_str("{}").unwrap();
    assert_eq!(entry, DeliverEntry { id: None, label: None, t_arrive: None });
}

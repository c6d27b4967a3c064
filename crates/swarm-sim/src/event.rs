//! `EventQueue` — sparse per-tick event queue.
//!
//! Most ticks carry only a handful of events (periodic timers, the odd
//! packet), so the queue maps occupied ticks to their event lists instead of
//! allocating per tick.  `BTreeMap` keeps ticks ordered and `Vec` preserves
//! FIFO order within a tick, which fixes the delivery order the engine
//! promises: nondecreasing time per agent, insertion order within a tick.

use std::collections::BTreeMap;

use swarm_core::{AgentId, Tick};

/// A deliverable occurrence: a named timer or a serialized packet.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// `handle_timer(name)` on `agent`.
    Timer { agent: AgentId, name: &'static str },
    /// `handle_packet(bytes)` on `to`.
    Packet { to: AgentId, bytes: Vec<u8> },
}

impl Event {
    /// The agent this event is delivered to.
    pub fn recipient(&self) -> AgentId {
        match self {
            Event::Timer { agent, .. } => *agent,
            Event::Packet { to, .. } => *to,
        }
    }
}

/// Tick-indexed FIFO event queue.
#[derive(Default)]
pub struct EventQueue {
    inner: BTreeMap<Tick, Vec<Event>>,
    /// Cached total event count for O(1) `len()`.
    total: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `event` for delivery at `tick`.
    pub fn push(&mut self, tick: Tick, event: Event) {
        self.inner.entry(tick).or_default().push(event);
        self.total += 1;
    }

    /// Remove and return all events scheduled for exactly `tick`.
    ///
    /// Returns `None` if the tick is empty (the common case — avoids
    /// allocation).
    pub fn drain_tick(&mut self, tick: Tick) -> Option<Vec<Event>> {
        let events = self.inner.remove(&tick)?;
        self.total -= events.len();
        Some(events)
    }

    /// The earliest tick with at least one queued event, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// Total queued events across all future ticks.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

//! Tick events delivered by the engine.
//!
//! Every simulation step is split into a leading and a trailing phase.
//! Systems that must run exactly once per step act on one phase only.

/// Phase of a simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickPhase {
    Start,
    End,
}

/// One phase of one simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub tick: u64,
    pub phase: TickPhase,
}

impl TickEvent {
    pub fn start(tick: u64) -> Self {
        Self {
            tick,
            phase: TickPhase::Start,
        }
    }

    pub fn end(tick: u64) -> Self {
        Self {
            tick,
            phase: TickPhase::End,
        }
    }

    pub fn is_end(&self) -> bool {
        self.phase == TickPhase::End
    }
}

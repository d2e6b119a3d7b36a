use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::model::DrumKind;

/// An abstract "drum triggered" event from the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrumTrigger {
    pub drum: DrumKind,
    /// Host clock reading when the drum was struck.
    pub timestamp_ms: f64,
}

impl DrumTrigger {
    pub fn new(drum: DrumKind, timestamp_ms: f64) -> Self {
        Self { drum, timestamp_ms }
    }
}

/// Inputs received between two frames, kept in arrival order.
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<DrumTrigger>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, trigger: DrumTrigger) {
        self.pending.push_back(trigger);
    }

    /// Take every queued input, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = DrumTrigger> + '_ {
        self.pending.drain(..)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

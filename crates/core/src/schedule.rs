//! Deferred actions driven by the fixed-timestep clock.
//!
//! A pending action is a plain value stored in the game state. Nothing fires
//! unless the owner advances it, and cancelling is just dropping the slot, so a
//! reset state can never be hit by a stale callback.

/// Identifies one scheduled action within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u32);

/// A one-shot countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    handle: TaskHandle,
    remaining_ms: u32,
}

impl Deferred {
    pub fn new(handle: TaskHandle, delay_ms: u32) -> Self {
        Self {
            handle,
            remaining_ms: delay_ms,
        }
    }

    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    /// Count down; returns true once the delay has fully elapsed.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        self.remaining_ms == 0
    }
}

/// Slot holding at most one pending action of a given kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSlot {
    pending: Option<Deferred>,
}

impl TaskSlot {
    pub fn schedule(&mut self, handle: TaskHandle, delay_ms: u32) {
        self.pending = Some(Deferred::new(handle, delay_ms));
    }

    /// Drop the pending action, returning its handle if there was one.
    pub fn cancel(&mut self) -> Option<TaskHandle> {
        self.pending.take().map(|d| d.handle())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn remaining_ms(&self) -> Option<u32> {
        self.pending.map(|d| d.remaining_ms())
    }

    /// Advance the countdown. Returns the handle when the action fires;
    /// the slot is empty afterwards.
    pub fn advance(&mut self, elapsed_ms: u32) -> Option<TaskHandle> {
        let fired = self.pending.as_mut()?.advance(elapsed_ms);
        if fired {
            self.cancel()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let mut slot = TaskSlot::default();
        slot.schedule(TaskHandle(1), 300);

        assert_eq!(slot.advance(160), None);
        assert_eq!(slot.remaining_ms(), Some(140));
        assert_eq!(slot.advance(160), Some(TaskHandle(1)));
        assert!(!slot.is_pending());
        assert_eq!(slot.advance(1000), None);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut slot = TaskSlot::default();
        slot.schedule(TaskHandle(7), 500);
        assert_eq!(slot.cancel(), Some(TaskHandle(7)));
        assert_eq!(slot.advance(500), None);
        assert_eq!(slot.cancel(), None);
    }

    #[test]
    fn reschedule_replaces_pending() {
        let mut slot = TaskSlot::default();
        slot.schedule(TaskHandle(1), 100);
        slot.schedule(TaskHandle(2), 500);
        assert_eq!(slot.advance(100), None);
        assert_eq!(slot.advance(400), Some(TaskHandle(2)));
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut slot = TaskSlot::default();
        slot.schedule(TaskHandle(3), 0);
        assert_eq!(slot.advance(0), Some(TaskHandle(3)));
    }
}

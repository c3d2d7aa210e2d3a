use serde::{Deserialize, Serialize};

/// Handle to a scheduled event; cancelling a fired or unknown handle is a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Pending<E> {
    handle: TimerHandle,
    due_ms: u64,
    event: E,
}

/// Deferred events owned by one component.
///
/// Nothing fires on its own: the owner calls [`ScheduledTimers::fire_due`]
/// with the current time, and dropping or clearing the set guarantees no
/// event is ever delivered afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTimers<E> {
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for ScheduledTimers<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
        }
    }
}

impl<E> ScheduledTimers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due_ms: now_ms.saturating_add(delay_ms),
            event,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Drop every pending event
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest due time, for the shell's next wake-up
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    /// Remove and return every event due at `now_ms`, in due order
    pub fn fire_due(&mut self, now_ms: u64) -> Vec<E> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by_key(|p| (p.due_ms, p.handle));
        due.into_iter().map(|p| p.event).collect()
    }
}

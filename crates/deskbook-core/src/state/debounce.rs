use serde::{Deserialize, Serialize};

/// Holds the latest value until it has been stable for `window_ms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debouncer<T> {
    window_ms: u64,
    pending: Option<(T, u64)>,
    settled: Option<T>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
            settled: None,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Record a new input; each push restarts the quiet period
    pub fn push(&mut self, value: T, now_ms: u64) {
        if self.pending.is_none() && self.settled.as_ref() == Some(&value) {
            return;
        }
        self.pending = Some((value, now_ms));
    }

    /// Release the pending value once the quiet period has elapsed.
    ///
    /// Returns `None` when nothing is due or when the value equals the last
    /// one released.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        let (_, since) = self.pending.as_ref()?;
        if now_ms.saturating_sub(*since) < self.window_ms {
            return None;
        }
        let (value, _) = self.pending.take()?;
        if self.settled.as_ref() == Some(&value) {
            return None;
        }
        self.settled = Some(value.clone());
        Some(value)
    }

    /// Release immediately, bypassing the quiet period
    pub fn flush(&mut self) -> Option<T> {
        let (value, _) = self.pending.take()?;
        self.settled = Some(value.clone());
        Some(value)
    }

    /// Time at which the pending value settles
    pub fn deadline(&self) -> Option<u64> {
        self.pending
            .as_ref()
            .map(|(_, since)| since.saturating_add(self.window_ms))
    }

    pub fn settled(&self) -> Option<&T> {
        self.settled.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Ticket identifying one issued query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic sequence so only the most recently issued query is applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    /// True only for the newest ticket; responses to older ones are stale
    pub fn accept(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    pub fn latest(&self) -> Option<RequestTicket> {
        (self.latest > 0).then_some(RequestTicket(self.latest))
    }
}

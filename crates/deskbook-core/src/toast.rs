use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Identifier of a toast, unique per manager
pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
}

/// Outcome of pushing a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastPush {
    pub id: ToastId,
    /// Toast dismissed to stay within the limit
    pub evicted: Option<ToastId>,
}

/// Bounded queue of visible notifications; the oldest goes first when full
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastManager {
    limit: usize,
    next_id: ToastId,
    active: VecDeque<Toast>,
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new(2)
    }
}

impl ToastManager {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            next_id: 1,
            active: VecDeque::new(),
        }
    }

    pub fn success(&mut self, message: impl Into<String>) -> ToastPush {
        self.push(ToastKind::Success, message.into())
    }

    pub fn error(&mut self, message: impl Into<String>) -> ToastPush {
        self.push(ToastKind::Error, message.into())
    }

    fn push(&mut self, kind: ToastKind, message: String) -> ToastPush {
        let id = self.next_id;
        self.next_id += 1;

        let evicted = if self.active.len() >= self.limit {
            self.active.pop_front().map(|t| t.id)
        } else {
            None
        };
        self.active.push_back(Toast { id, kind, message });
        ToastPush { id, evicted }
    }

    /// Remove a toast; returns false if it was already gone
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.active.len();
        self.active.retain(|t| t.id != id);
        self.active.len() != before
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn active(&self) -> impl Iterator<Item = &Toast> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.active.back()
    }
}

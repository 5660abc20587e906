//! Change notifications emitted by the tracking session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Initialize,
    Finish,
    Get,
    Set,
    Commit,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Empty for lifecycle events.
    pub element: String,
    pub value: String,
    pub kind: ChangeKind,
    pub recorded_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, element: &str, value: &str) -> Self {
        Self {
            element: element.to_string(),
            value: value.to_string(),
            kind,
            recorded_at: Utc::now(),
        }
    }

    pub fn lifecycle(kind: ChangeKind) -> Self {
        Self::new(kind, "", "")
    }
}

pub trait ChangeObserver: Send {
    fn on_change(&mut self, event: &ChangeEvent) -> anyhow::Result<()>;
}

impl<F> ChangeObserver for F
where
    F: FnMut(&ChangeEvent) -> anyhow::Result<()> + Send,
{
    fn on_change(&mut self, event: &ChangeEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Forwards every event to an `mpsc` receiver, e.g. a debugger log panel
/// running on another thread.
pub struct ChannelObserver {
    sender: mpsc::Sender<ChangeEvent>,
}

impl ChannelObserver {
    pub fn channel() -> (Self, mpsc::Receiver<ChangeEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl ChangeObserver for ChannelObserver {
    fn on_change(&mut self, event: &ChangeEvent) -> anyhow::Result<()> {
        self.sender
            .send(event.clone())
            .map_err(|_| anyhow::anyhow!("change event receiver was dropped"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(u64);

#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn ChangeObserver>)>,
}

impl ObserverRegistry {
    pub fn subscribe(&mut self, observer: Box<dyn ChangeObserver>) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observers.push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `event` to every observer in subscription order. Failures and
    /// panics are logged and do not stop delivery. Returns how many
    /// observers accepted the event.
    pub fn notify(&mut self, event: &ChangeEvent) -> usize {
        let mut delivered = 0;
        for (id, observer) in self.observers.iter_mut() {
            match panic::catch_unwind(AssertUnwindSafe(|| observer.on_change(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    log::warn!("Observer {:?} failed on {:?} event: {:#}", id, event.kind, e)
                }
                Err(_) => log::error!("Observer {:?} panicked on {:?} event", id, event.kind),
            }
        }
        delivered
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;

//! Change journal service.
//!
//! [`ChangeJournal`] subscribes to the [`ChangeBus`](crate::bus::ChangeBus)
//! and appends every received [`ChangeEvent`] to a shared in-memory log. It
//! runs as a long-lived background task and shuts down when the bus is
//! dropped.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::bus::{ChangeEvent, ChangePhase};

/// Shared handle to the journal's entries.
pub type JournalEntries = Arc<RwLock<Vec<ChangeEvent>>>;

/// Background service that records list changes.
pub struct ChangeJournal;

impl ChangeJournal {
    /// Run the journal loop until the bus is closed.
    pub async fn run(entries: JournalEntries, mut receiver: broadcast::Receiver<ChangeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::trace(&event);
                    entries.write().await.push(event);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Change journal lagged, some changes were not recorded");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Change bus closed, journal shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime and return the
    /// entries handle.
    pub fn spawn(receiver: broadcast::Receiver<ChangeEvent>) -> (JournalEntries, tokio::task::JoinHandle<()>) {
        let entries: JournalEntries = Arc::default();
        let handle = tokio::spawn(Self::run(Arc::clone(&entries), receiver));
        (entries, handle)
    }

    fn trace(event: &ChangeEvent) {
        match event.phase {
            ChangePhase::RolledBack => tracing::warn!(
                kind = ?event.kind,
                record_id = ?event.record_id,
                "Change rolled back"
            ),
            phase => tracing::debug!(
                kind = ?event.kind,
                ?phase,
                record_id = ?event.record_id,
                "Change recorded"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{ChangeBus, ChangeKind};

    #[tokio::test]
    async fn journal_records_until_bus_dropped() {
        let bus = ChangeBus::default();
        let (entries, handle) = ChangeJournal::spawn(bus.subscribe());

        bus.publish(ChangeEvent::optimistic(ChangeKind::PhotoInserted));
        bus.publish(ChangeEvent::new(ChangeKind::PhotoInserted));
        drop(bus);

        handle.await.expect("journal task should exit cleanly");
        let entries = entries.read().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].phase, ChangePhase::Optimistic);
        assert_eq!(entries[1].phase, ChangePhase::Confirmed);
    }
}

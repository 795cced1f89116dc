use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::AbortHandle;
use uuid::Uuid;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Default,
    Success,
    Error,
    Warning,
}

/// A toast shown to the user until it expires or is dismissed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

struct Entry {
    notification: Notification,
    expiry: AbortHandle,
}

type Entries = Mutex<Vec<Entry>>;

/// Insertion-ordered toast queue. Each entry owns a removal task that fires
/// after the queue's TTL; dismissing an entry aborts that task.
///
/// Must be used from within a tokio runtime. Dropping the queue aborts every
/// pending removal.
pub struct NotificationQueue {
    entries: Arc<Entries>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn push(
        &self,
        title: impl Into<String>,
        description: Option<String>,
        severity: Severity,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            severity,
            created_at: Utc::now(),
        };
        let id = notification.id;
        tracing::debug!(%id, ?severity, title = %notification.title, "Pushing notification");

        // Holding the lock across spawn keeps the timer from racing the insert.
        let mut entries = lock(&self.entries);
        let expiry = spawn_expiry(Arc::downgrade(&self.entries), id, self.ttl);
        entries.push(Entry {
            notification,
            expiry,
        });
        id
    }

    /// Removes `id` now and cancels its timer. Unknown ids are ignored.
    pub fn dismiss(&self, id: Uuid) {
        let removed = remove(&self.entries, id);
        if let Some(entry) = removed {
            entry.expiry.abort();
            tracing::debug!(%id, "Dismissed notification");
        }
    }

    pub fn list(&self) -> Vec<Notification> {
        lock(&self.entries)
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        for entry in lock(&self.entries).drain(..) {
            entry.expiry.abort();
        }
    }
}

fn spawn_expiry(entries: Weak<Entries>, id: Uuid, ttl: Duration) -> AbortHandle {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if let Some(entries) = entries.upgrade() {
            if remove(&entries, id).is_some() {
                tracing::debug!(%id, "Notification expired");
            }
        }
    })
    .abort_handle()
}

fn remove(entries: &Entries, id: Uuid) -> Option<Entry> {
    let mut entries = lock(entries);
    let index = entries.iter().position(|e| e.notification.id == id)?;
    Some(entries.remove(index))
}

fn lock(entries: &Entries) -> MutexGuard<'_, Vec<Entry>> {
    entries.lock().unwrap_or_else(|e| e.into_inner())
}

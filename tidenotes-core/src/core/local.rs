//! In-process reference implementation of [`NotesBackend`].
//!
//! [`LocalBackend`] persists notes to SQLite via [`Storage`] and fans each
//! committed mutation out to the matching subscribers over per-subscriber
//! channels. Events are published only after the database write succeeds, so
//! a failed request never reaches any session's collection. Several sessions
//! may share one backend through an `Arc`, which is how change propagation
//! across sessions works.

use crate::{
    EventKind, Note, NoteEvent, NotesBackend, Result, Storage, Subscription, TidenotesError,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

struct Subscriber {
    owner: String,
    kind: EventKind,
    sender: Sender<NoteEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: HashMap<u64, Subscriber>,
}

impl Registry {
    /// Sends `event` to every subscriber registered for `owner` and the
    /// event's kind, pruning subscribers whose receiving side is gone.
    fn publish(&mut self, owner: &str, event: &NoteEvent) {
        let kind = event.kind();
        let mut dead = Vec::new();
        for (id, subscriber) in &self.entries {
            if subscriber.kind != kind || subscriber.owner != owner {
                continue;
            }
            if subscriber.sender.send(event.clone()).is_err() {
                dead.push(*id);
            }
        }
        for id in dead {
            log::debug!("pruning dead {kind:?} subscriber {id}");
            self.entries.remove(&id);
        }
    }
}

/// A [`NotesBackend`] backed by a local SQLite note store.
pub struct LocalBackend {
    storage: Mutex<Storage>,
    registry: Arc<Mutex<Registry>>,
}

impl LocalBackend {
    /// Opens the note store at `path`, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TidenotesError::InvalidStore`] if the file exists but is not
    /// a Tidenotes database, or [`TidenotesError::Database`] for any SQLite
    /// failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::with_storage(Storage::open_or_create(path)?))
    }

    /// Creates a backend over a transient in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`TidenotesError::Database`] for any SQLite failure.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_storage(Storage::in_memory()?))
    }

    fn with_storage(storage: Storage) -> Self {
        Self {
            storage: Mutex::new(storage),
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| TidenotesError::Backend("note store lock poisoned".to_string()))
    }

    fn publish(&self, owner: &str, event: NoteEvent) {
        match self.registry.lock() {
            Ok(mut registry) => registry.publish(owner, &event),
            Err(_) => log::error!("subscriber registry poisoned; dropping {event:?}"),
        }
    }
}

impl NotesBackend for LocalBackend {
    fn list_notes(&self, owner: &str) -> Result<Vec<Note>> {
        self.storage()?.list_notes(owner)
    }

    fn create_note(&self, owner: &str, content: &str) -> Result<Note> {
        let now = chrono::Utc::now().timestamp();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.storage()?.insert_note(&note)?;
        log::info!("created note {} for owner {owner}", note.id);

        self.publish(owner, NoteEvent::Created(note.clone()));
        Ok(note)
    }

    fn update_note(&self, id: &str, content: &str) -> Result<Note> {
        let updated = {
            let storage = self.storage()?;
            let existing = storage
                .get_note(id)?
                .ok_or_else(|| TidenotesError::NoteNotFound(id.to_string()))?;
            let updated = existing.with_content(content, chrono::Utc::now().timestamp());
            storage.update_note(&updated)?;
            updated
        };
        log::info!("updated note {id}");

        let owner = updated.owner.clone();
        self.publish(&owner, NoteEvent::Updated(updated.clone()));
        Ok(updated)
    }

    fn delete_note(&self, id: &str) -> Result<()> {
        let owner = {
            let storage = self.storage()?;
            let existing = storage
                .get_note(id)?
                .ok_or_else(|| TidenotesError::NoteNotFound(id.to_string()))?;
            storage.delete_note(id)?;
            existing.owner
        };
        log::info!("deleted note {id}");

        self.publish(
            &owner,
            NoteEvent::Deleted { id: id.to_string() },
        );
        Ok(())
    }

    fn subscribe(&self, owner: &str, kind: EventKind) -> Result<Subscription> {
        let (sender, receiver) = channel();

        let id = {
            let mut registry = self.registry.lock().map_err(|_| {
                TidenotesError::SubscriptionFailed("subscriber registry poisoned".to_string())
            })?;
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.insert(
                id,
                Subscriber {
                    owner: owner.to_string(),
                    kind,
                    sender,
                },
            );
            id
        };

        let registry = Arc::clone(&self.registry);
        let canceller = Box::new(move || {
            if let Ok(mut registry) = registry.lock() {
                registry.entries.remove(&id);
            }
        });

        Ok(Subscription::new(kind, receiver, canceller))
    }
}

//! The note list reconciler.
//!
//! [`NoteCollection`] keeps a local, id-keyed list of notes consistent with a
//! sequence of asynchronous change notifications, without re-fetching. The
//! three subscription channels are established independently and give no
//! ordering or exactly-once guarantees, so every mutator here is idempotent
//! and tolerates duplicate, stale, and unknown-id events.

use crate::{Note, NoteEvent};

/// An ordered, id-keyed collection of notes.
///
/// Iteration order is insertion order: stable enough for rendering, but not
/// semantically meaningful. No two entries ever share an ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteCollection {
    notes: Vec<Note>,
}

impl NoteCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire collection with the result of a bulk fetch.
    ///
    /// Entries are de-duplicated by ID; when the fetch contains duplicates,
    /// the last entry wins.
    pub fn load_all(&mut self, notes: Vec<Note>) {
        self.notes.clear();
        for note in notes {
            self.apply_created(note);
        }
    }

    /// Applies a created event: removes any existing entry with the same ID,
    /// then appends the incoming note.
    ///
    /// The removal guards against duplicate delivery and out-of-order
    /// create/update interleavings; afterwards the collection holds exactly
    /// one entry for the incoming ID.
    pub fn apply_created(&mut self, incoming: Note) {
        self.notes.retain(|note| note.id != incoming.id);
        self.notes.push(incoming);
    }

    /// Applies an updated event: replaces the matching entry in place.
    ///
    /// An update for an unknown ID is a no-op. The backend is the source of
    /// truth for existence, so an update must never materialize an entry.
    pub fn apply_updated(&mut self, incoming: Note) {
        match self.notes.iter_mut().find(|note| note.id == incoming.id) {
            Some(slot) => *slot = incoming,
            None => log::debug!("ignoring update for unknown note {}", incoming.id),
        }
    }

    /// Applies a deleted event: removes the entry with that ID.
    ///
    /// Idempotent; deleting an absent ID is a no-op.
    pub fn apply_deleted(&mut self, id: &str) {
        self.notes.retain(|note| note.id != id);
    }

    /// Dispatches one stream event to the matching mutator.
    pub fn apply(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::Created(note) => self.apply_created(note),
            NoteEvent::Updated(note) => self.apply_updated(note),
            NoteEvent::Deleted { id } => self.apply_deleted(&id),
        }
    }

    /// Returns the note with the given ID, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Returns `true` if a note with the given ID is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates over the notes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    /// Returns the number of notes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns `true` if the collection holds no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl<'a> IntoIterator for &'a NoteCollection {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

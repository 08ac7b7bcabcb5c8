//! The backend contract a session runs against.

use crate::{EventKind, Note, Result, Subscription};

/// The external note service a [`Session`](crate::Session) delegates to.
///
/// All business logic — persistence, id assignment, conflict resolution —
/// lives behind this trait. The client side never mutates its collection
/// directly: it issues requests here and folds the confirming stream events
/// back in. Implementations must mint note IDs themselves and must publish a
/// mutation to subscribers only after it has durably succeeded, so a failed
/// request never reaches any collection.
///
/// The crate ships [`LocalBackend`](crate::LocalBackend) as the in-process
/// reference implementation; remote implementations adapt their wire
/// payloads with [`NoteEvent::from_json`](crate::NoteEvent::from_json).
pub trait NotesBackend: Send + Sync {
    /// Returns every note owned by `owner`; called once at session start.
    ///
    /// # Errors
    ///
    /// Returns a backend or transport error; the caller's collection is left
    /// untouched.
    fn list_notes(&self, owner: &str) -> Result<Vec<Note>>;

    /// Creates a note with the given content and returns it with its minted ID.
    ///
    /// # Errors
    ///
    /// Returns a backend or transport error; no event is published.
    fn create_note(&self, owner: &str, content: &str) -> Result<Note>;

    /// Replaces the content of the note with the given ID and returns the
    /// updated record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TidenotesError::NoteNotFound`] if no such note
    /// exists, or a backend/transport error; no event is published.
    fn update_note(&self, id: &str, content: &str) -> Result<Note>;

    /// Removes the note with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TidenotesError::NoteNotFound`] if no such note
    /// exists, or a backend/transport error; no event is published.
    fn delete_note(&self, id: &str) -> Result<()>;

    /// Opens a long-lived channel delivering every `kind` mutation affecting
    /// notes owned by `owner`, until the returned handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TidenotesError::SubscriptionFailed`] if the channel
    /// cannot be established.
    fn subscribe(&self, owner: &str, kind: EventKind) -> Result<Subscription>;
}

//! Session-scoped note state and the selection/edit workflow.
//!
//! A [`Session`] owns everything one signed-in user sees: the reconciled
//! [`NoteCollection`], the current [`Selection`], the draft text, and the
//! three change-stream subscriptions. Nothing is shared across sessions
//! except the backend itself; dropping the session releases all three
//! subscriptions together.
//!
//! The collection mutates only through confirmed stream events (via
//! [`Session::pump_events`]), never optimistically from a request, so a
//! failed request leaves every piece of local state intact.

use crate::{NoteCollection, NotesBackend, Result, SubscriptionSet, TidenotesError};
use std::sync::Arc;

/// What the user is currently editing, if anything.
///
/// The draft text lives on the [`Session`] in both states; the create path
/// composes a draft while `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No note selected; submitting creates a new note.
    #[default]
    Idle,
    /// An existing note is being edited; submitting updates it.
    Editing {
        /// ID of the selected note.
        id: String,
    },
}

/// The outcome of a successful [`Session::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A create request was issued (no usable selection).
    Created,
    /// An update request was issued for the selected note.
    Updated,
}

/// One user's live view of their notes.
pub struct Session {
    backend: Arc<dyn NotesBackend>,
    owner: String,
    collection: NoteCollection,
    selection: Selection,
    draft: String,
    subscriptions: SubscriptionSet,
}

impl Session {
    /// Opens a session for `owner`: bulk-fetches the current notes, then
    /// acquires the three change-stream subscriptions.
    ///
    /// Subscriptions depend only on the owner identity and are established
    /// exactly once for the session's lifetime.
    ///
    /// # Errors
    ///
    /// Propagates the backend error from the bulk fetch or from subscription
    /// acquisition; on failure nothing is left subscribed.
    pub fn open(backend: Arc<dyn NotesBackend>, owner: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let notes = backend.list_notes(&owner)?;
        let subscriptions = SubscriptionSet::acquire(backend.as_ref(), &owner)?;

        let mut collection = NoteCollection::new();
        collection.load_all(notes);
        log::info!(
            "opened session for {owner} with {} notes",
            collection.len()
        );

        Ok(Self {
            backend,
            owner,
            collection,
            selection: Selection::Idle,
            draft: String::new(),
            subscriptions,
        })
    }

    /// Returns the owner identity this session is scoped to.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the reconciled note collection.
    #[must_use]
    pub fn notes(&self) -> &NoteCollection {
        &self.collection
    }

    /// Returns the current selection state.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns the current draft text.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Selects an existing note for editing; the draft becomes a working
    /// copy of its current content.
    ///
    /// # Errors
    ///
    /// Returns [`TidenotesError::NoteNotFound`] if the ID is not in the
    /// collection; the previous selection is kept.
    pub fn select(&mut self, id: &str) -> Result<()> {
        let note = self
            .collection
            .get(id)
            .ok_or_else(|| TidenotesError::NoteNotFound(id.to_string()))?;
        self.draft = note.content.clone();
        self.selection = Selection::Editing { id: id.to_string() };
        Ok(())
    }

    /// Drops the selection and draft without issuing any request.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::Idle;
        self.draft.clear();
    }

    /// Submits the draft: an update for the selected note if it still
    /// exists, otherwise a create.
    ///
    /// The existence check runs against the live collection, so a selection
    /// whose note was deleted concurrently falls back to creating a new
    /// note. On success the selection and draft are cleared immediately;
    /// the confirming stream event reconciles idempotently whenever it
    /// arrives.
    ///
    /// # Errors
    ///
    /// Propagates the backend error from the request; selection, draft, and
    /// collection are all left untouched.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        let outcome = match &self.selection {
            Selection::Editing { id } if self.collection.contains(id) => {
                self.backend.update_note(id, &self.draft)?;
                SubmitOutcome::Updated
            }
            _ => {
                self.backend.create_note(&self.owner, &self.draft)?;
                SubmitOutcome::Created
            }
        };
        self.clear_selection();
        Ok(outcome)
    }

    /// Issues a delete request for the given note.
    ///
    /// The collection is not touched here; removal happens when the delete
    /// event arrives on the stream. If the deleted note was selected, the
    /// selection falls back to create-on-submit via the existence check.
    ///
    /// # Errors
    ///
    /// Propagates the backend error; local state is left untouched.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.backend.delete_note(id)
    }

    /// Drains every pending stream event and applies each to the
    /// collection, returning the number applied.
    ///
    /// Events are applied one at a time, never interleaved; duplicates and
    /// stale deliveries are absorbed by the collection's idempotent
    /// mutators.
    pub fn pump_events(&mut self) -> usize {
        let events = self.subscriptions.poll();
        let applied = events.len();
        for event in events {
            log::debug!("applying {:?} for note {}", event.kind(), event.note_id());
            self.collection.apply(event);
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventKind, LocalBackend, Note, NoteEvent, Subscription};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::channel;
    use std::sync::Mutex;

    fn local_session(owner: &str) -> (Arc<LocalBackend>, Session) {
        let backend = Arc::new(LocalBackend::in_memory().unwrap());
        let session = Session::open(Arc::clone(&backend) as Arc<dyn NotesBackend>, owner).unwrap();
        (backend, session)
    }

    #[test]
    fn test_create_via_submit_arrives_through_the_stream() {
        let (_backend, mut session) = local_session("alice");
        assert!(session.notes().is_empty());

        session.set_draft("buy milk");
        let outcome = session.submit().unwrap();
        assert_eq!(outcome, SubmitOutcome::Created);
        assert_eq!(session.draft(), "");

        // Not yet in the collection: mutation only lands via the stream.
        assert!(session.notes().is_empty());
        assert_eq!(session.pump_events(), 1);
        assert_eq!(session.notes().len(), 1);
        assert_eq!(session.notes().iter().next().unwrap().content, "buy milk");
    }

    #[test]
    fn test_selection_workflow_update_scenario() {
        let (_backend, mut session) = local_session("alice");
        session.set_draft("a");
        session.submit().unwrap();
        session.set_draft("b");
        session.submit().unwrap();
        session.pump_events();

        let id = session
            .notes()
            .iter()
            .find(|n| n.content == "b")
            .unwrap()
            .id
            .clone();

        session.select(&id).unwrap();
        assert_eq!(session.draft(), "b");
        assert_eq!(
            session.selection(),
            &Selection::Editing { id: id.clone() }
        );

        session.set_draft("b-edited");
        let outcome = session.submit().unwrap();
        assert_eq!(outcome, SubmitOutcome::Updated);
        assert_eq!(session.selection(), &Selection::Idle);

        session.pump_events();
        assert_eq!(session.notes().len(), 2);
        assert_eq!(session.notes().get(&id).unwrap().content, "b-edited");
    }

    #[test]
    fn test_select_unknown_id_fails_and_keeps_state() {
        let (_backend, mut session) = local_session("alice");
        session.set_draft("half-typed");

        let result = session.select("ghost");
        assert!(matches!(result, Err(TidenotesError::NoteNotFound(_))));
        assert_eq!(session.selection(), &Selection::Idle);
        assert_eq!(session.draft(), "half-typed");
    }

    #[test]
    fn test_submit_falls_back_to_create_when_selection_was_deleted() {
        let (backend, mut session) = local_session("alice");
        session.set_draft("doomed");
        session.submit().unwrap();
        session.pump_events();
        let id = session.notes().iter().next().unwrap().id.clone();

        session.select(&id).unwrap();

        // Another actor deletes the note; the event reaches us before submit.
        backend.delete_note(&id).unwrap();
        session.pump_events();
        assert!(!session.notes().contains(&id));

        session.set_draft("reborn");
        let outcome = session.submit().unwrap();
        assert_eq!(outcome, SubmitOutcome::Created);

        session.pump_events();
        assert_eq!(session.notes().len(), 1);
        assert_eq!(session.notes().iter().next().unwrap().content, "reborn");
    }

    #[test]
    fn test_changes_propagate_across_sessions_sharing_a_backend() {
        let backend = Arc::new(LocalBackend::in_memory().unwrap());
        let mut writer =
            Session::open(Arc::clone(&backend) as Arc<dyn NotesBackend>, "alice").unwrap();
        let mut reader =
            Session::open(Arc::clone(&backend) as Arc<dyn NotesBackend>, "alice").unwrap();

        writer.set_draft("shared note");
        writer.submit().unwrap();

        assert_eq!(reader.pump_events(), 1);
        assert_eq!(reader.notes().len(), 1);
        assert_eq!(
            reader.notes().iter().next().unwrap().content,
            "shared note"
        );

        let id = reader.notes().iter().next().unwrap().id.clone();
        reader.delete(&id).unwrap();

        writer.pump_events();
        assert!(writer.notes().is_empty());
        reader.pump_events();
        assert!(reader.notes().is_empty());
    }

    #[test]
    fn test_session_open_bulk_loads_existing_notes() {
        let backend = Arc::new(LocalBackend::in_memory().unwrap());
        backend.create_note("alice", "pre-existing").unwrap();
        backend.create_note("bob", "not mine").unwrap();

        let session =
            Session::open(Arc::clone(&backend) as Arc<dyn NotesBackend>, "alice").unwrap();
        assert_eq!(session.notes().len(), 1);
        assert_eq!(
            session.notes().iter().next().unwrap().content,
            "pre-existing"
        );
    }

    /// Backend that fails every mutation; used to check error paths leave
    /// session state untouched.
    struct FailingBackend {
        listed: Mutex<Vec<Note>>,
    }

    impl NotesBackend for FailingBackend {
        fn list_notes(&self, _owner: &str) -> Result<Vec<Note>> {
            Ok(self.listed.lock().unwrap().clone())
        }

        fn create_note(&self, _owner: &str, _content: &str) -> Result<Note> {
            Err(TidenotesError::Backend("create rejected".to_string()))
        }

        fn update_note(&self, _id: &str, _content: &str) -> Result<Note> {
            Err(TidenotesError::Backend("update rejected".to_string()))
        }

        fn delete_note(&self, _id: &str) -> Result<()> {
            Err(TidenotesError::Backend("delete rejected".to_string()))
        }

        fn subscribe(&self, _owner: &str, kind: EventKind) -> Result<Subscription> {
            let (_tx, rx) = channel();
            Ok(Subscription::new(kind, rx, Box::new(|| {})))
        }
    }

    #[test]
    fn test_failed_submit_keeps_selection_and_draft() {
        let note = Note {
            id: "1".to_string(),
            content: "original".to_string(),
            owner: "alice".to_string(),
            created_at: 0,
            updated_at: 0,
        };
        let backend = Arc::new(FailingBackend {
            listed: Mutex::new(vec![note]),
        });
        let mut session =
            Session::open(backend as Arc<dyn NotesBackend>, "alice").unwrap();

        session.select("1").unwrap();
        session.set_draft("edited");

        let result = session.submit();
        assert!(matches!(result, Err(TidenotesError::Backend(_))));
        assert_eq!(session.selection(), &Selection::Editing { id: "1".to_string() });
        assert_eq!(session.draft(), "edited");
        assert_eq!(session.notes().get("1").unwrap().content, "original");
    }

    /// Backend whose subscribe flips a flag on release; used to check that
    /// dropping a session releases every channel.
    struct ReleaseTracking {
        released: Arc<[AtomicBool; 3]>,
    }

    impl NotesBackend for ReleaseTracking {
        fn list_notes(&self, _owner: &str) -> Result<Vec<Note>> {
            Ok(vec![])
        }

        fn create_note(&self, _owner: &str, _content: &str) -> Result<Note> {
            Err(TidenotesError::Backend("unused".to_string()))
        }

        fn update_note(&self, _id: &str, _content: &str) -> Result<Note> {
            Err(TidenotesError::Backend("unused".to_string()))
        }

        fn delete_note(&self, _id: &str) -> Result<()> {
            Err(TidenotesError::Backend("unused".to_string()))
        }

        fn subscribe(&self, _owner: &str, kind: EventKind) -> Result<Subscription> {
            let slot = match kind {
                EventKind::Created => 0,
                EventKind::Updated => 1,
                EventKind::Deleted => 2,
            };
            let released = Arc::clone(&self.released);
            let (_tx, rx) = channel();
            Ok(Subscription::new(
                kind,
                rx,
                Box::new(move || released[slot].store(true, Ordering::SeqCst)),
            ))
        }
    }

    /// Backend whose bulk fetch always fails; subscriptions must never be
    /// requested when the fetch has already failed.
    struct BrokenListBackend;

    impl NotesBackend for BrokenListBackend {
        fn list_notes(&self, _owner: &str) -> Result<Vec<Note>> {
            Err(TidenotesError::Backend("fetch failed".to_string()))
        }

        fn create_note(&self, _owner: &str, _content: &str) -> Result<Note> {
            unreachable!("no mutation before a session exists")
        }

        fn update_note(&self, _id: &str, _content: &str) -> Result<Note> {
            unreachable!("no mutation before a session exists")
        }

        fn delete_note(&self, _id: &str) -> Result<()> {
            unreachable!("no mutation before a session exists")
        }

        fn subscribe(&self, _owner: &str, _kind: EventKind) -> Result<Subscription> {
            panic!("must not subscribe after the bulk fetch failed");
        }
    }

    #[test]
    fn test_open_propagates_bulk_fetch_failure() {
        let backend = Arc::new(BrokenListBackend);
        let result = Session::open(backend as Arc<dyn NotesBackend>, "alice");
        assert!(matches!(result, Err(TidenotesError::Backend(_))));
    }

    /// Backend where the third subscription fails; the first two must be
    /// released before `open` returns the error.
    struct FlakySubscribe {
        released: Arc<Mutex<Vec<EventKind>>>,
    }

    impl NotesBackend for FlakySubscribe {
        fn list_notes(&self, _owner: &str) -> Result<Vec<Note>> {
            Ok(vec![])
        }

        fn create_note(&self, _owner: &str, _content: &str) -> Result<Note> {
            Err(TidenotesError::Backend("unused".to_string()))
        }

        fn update_note(&self, _id: &str, _content: &str) -> Result<Note> {
            Err(TidenotesError::Backend("unused".to_string()))
        }

        fn delete_note(&self, _id: &str) -> Result<()> {
            Err(TidenotesError::Backend("unused".to_string()))
        }

        fn subscribe(&self, _owner: &str, kind: EventKind) -> Result<Subscription> {
            if kind == EventKind::Deleted {
                return Err(TidenotesError::SubscriptionFailed(
                    "deleted channel unavailable".to_string(),
                ));
            }
            let released = Arc::clone(&self.released);
            let (_tx, rx) = channel();
            Ok(Subscription::new(
                kind,
                rx,
                Box::new(move || released.lock().unwrap().push(kind)),
            ))
        }
    }

    #[test]
    fn test_open_releases_acquired_subscriptions_when_one_fails() {
        let released = Arc::new(Mutex::new(Vec::new()));
        let backend = Arc::new(FlakySubscribe {
            released: Arc::clone(&released),
        });

        let result = Session::open(backend as Arc<dyn NotesBackend>, "alice");
        assert!(matches!(result, Err(TidenotesError::SubscriptionFailed(_))));

        let mut released = released.lock().unwrap().clone();
        released.sort_by_key(|kind| format!("{kind:?}"));
        assert_eq!(released, vec![EventKind::Created, EventKind::Updated]);
    }

    #[test]
    fn test_dropping_session_releases_all_three_subscriptions() {
        let released = Arc::new([
            AtomicBool::new(false),
            AtomicBool::new(false),
            AtomicBool::new(false),
        ]);
        let backend = Arc::new(ReleaseTracking {
            released: Arc::clone(&released),
        });

        let session = Session::open(backend as Arc<dyn NotesBackend>, "alice").unwrap();
        drop(session);

        for flag in released.iter() {
            assert!(flag.load(Ordering::SeqCst));
        }
    }

    #[test]
    fn test_duplicate_event_delivery_is_absorbed() {
        let (_backend, mut session) = local_session("alice");
        session.set_draft("once");
        session.submit().unwrap();
        session.pump_events();
        let note = session.notes().iter().next().unwrap().clone();

        // Simulate the stream replaying the same create and delete twice.
        session.collection.apply(NoteEvent::Created(note.clone()));
        assert_eq!(session.notes().len(), 1);
        session.collection.apply(NoteEvent::Deleted {
            id: note.id.clone(),
        });
        session.collection.apply(NoteEvent::Deleted { id: note.id });
        assert!(session.notes().is_empty());
    }
}

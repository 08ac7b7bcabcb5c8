//! Core library for Tidenotes — a session-scoped note-taking client that
//! stays consistent with a live change stream.
//!
//! The primary entry point is [`Session`], which bulk-loads a user's notes
//! from a [`NotesBackend`], holds the three change-stream subscriptions for
//! the session's lifetime, and reconciles incoming created/updated/deleted
//! events into its [`NoteCollection`]. The reconciler treats every event as
//! idempotent and commutative, so no ordering or exactly-once delivery is
//! assumed anywhere.
//!
//! [`LocalBackend`] is the in-process reference backend, backed by SQLite.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    backend::NotesBackend,
    collection::NoteCollection,
    error::{Result, TidenotesError},
    event::{EventKind, NoteEvent},
    identity::{default_owner, OWNER_ENV},
    local::LocalBackend,
    note::Note,
    session::{Selection, Session, SubmitOutcome},
    storage::Storage,
    subscription::{Canceller, Subscription, SubscriptionSet},
};

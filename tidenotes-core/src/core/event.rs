//! Change-stream event types for note propagation.

use crate::{Note, Result};
use serde::{Deserialize, Serialize};

/// One of the three independent subscription channels a session holds.
///
/// The backend delivers each mutation kind over its own channel; nothing may
/// be assumed about ordering across channels or between a self-issued
/// mutation and its confirming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    /// All three channel kinds, in the order a session acquires them.
    pub const ALL: [EventKind; 3] = [EventKind::Created, EventKind::Updated, EventKind::Deleted];
}

/// A single note mutation delivered over a subscription channel.
///
/// Events may arrive duplicated, stale, or out of order; the collection
/// applies every variant idempotently, so a consumer never needs to know
/// whether an event is the first or only occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NoteEvent {
    /// A note was inserted at the backend.
    Created(Note),
    /// An existing note's content changed at the backend.
    Updated(Note),
    /// A note was removed at the backend.
    Deleted {
        /// ID of the removed note.
        id: String,
    },
}

impl NoteEvent {
    /// Returns the channel this event belongs to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Created(_) => EventKind::Created,
            Self::Updated(_) => EventKind::Updated,
            Self::Deleted { .. } => EventKind::Deleted,
        }
    }

    /// Returns the ID of the note this event concerns.
    #[must_use]
    pub fn note_id(&self) -> &str {
        match self {
            Self::Created(note) | Self::Updated(note) => &note.id,
            Self::Deleted { id } => id,
        }
    }

    /// Returns the owner identity for subscription scoping, when the event
    /// carries one. Delete events carry only an ID.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::Created(note) | Self::Updated(note) => Some(&note.owner),
            Self::Deleted { .. } => None,
        }
    }

    /// Decodes a wire payload into an event.
    ///
    /// Remote backend implementations use this at the stream boundary; a
    /// payload that fails to decode should be logged and skipped, never
    /// allowed to tear down the session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TidenotesError::Json`] if `payload` is not a valid
    /// event document.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

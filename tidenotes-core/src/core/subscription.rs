//! Subscription handles for the note change stream.
//!
//! A [`Subscription`] is one live channel of [`NoteEvent`]s; it releases its
//! backend registration when dropped. A [`SubscriptionSet`] bundles the three
//! channels a session needs (created/updated/deleted) so they are acquired
//! together and released together on every exit path.

use crate::{EventKind, NoteEvent, NotesBackend, Result};
use std::sync::mpsc::{Receiver, TryRecvError};

/// Called when a subscription handle is dropped; removes the registration
/// from the backend so no further events are delivered.
pub type Canceller = Box<dyn FnOnce() + Send>;

/// A live channel delivering an unbounded sequence of [`NoteEvent`]s for one
/// mutation kind, scoped to one owner, until dropped.
pub struct Subscription {
    kind: EventKind,
    receiver: Option<Receiver<NoteEvent>>,
    canceller: Option<Canceller>,
}

impl Subscription {
    /// Builds a subscription over a channel receiver and a cancel hook.
    ///
    /// Backend implementations construct one of these per `subscribe` call;
    /// `canceller` must remove the sending side from the backend's registry.
    pub fn new(kind: EventKind, receiver: Receiver<NoteEvent>, canceller: Canceller) -> Self {
        Self {
            kind,
            receiver: Some(receiver),
            canceller: Some(canceller),
        }
    }

    /// Returns the mutation kind this channel carries.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns the next pending event without blocking, or `None` when the
    /// channel is currently empty or the backend side has gone away.
    ///
    /// A disconnect is latched: it is logged once and the channel is treated
    /// as permanently empty afterwards.
    pub fn try_next(&mut self) -> Option<NoteEvent> {
        match self.receiver.as_ref()?.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("{:?} subscription channel closed by backend", self.kind);
                self.receiver = None;
                None
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.canceller.take() {
            log::debug!("releasing {:?} subscription", self.kind);
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The three change-stream channels of one session, held as a unit.
#[derive(Debug)]
pub struct SubscriptionSet {
    channels: [Subscription; 3],
}

impl SubscriptionSet {
    /// Acquires all three subscriptions for `owner` from `backend`.
    ///
    /// Acquisition is all-or-nothing: if any channel fails, the ones already
    /// acquired are released by drop before the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`crate::TidenotesError`] from the failing
    /// `subscribe` call.
    pub fn acquire(backend: &dyn NotesBackend, owner: &str) -> Result<Self> {
        let [created, updated, deleted] = EventKind::ALL;
        let channels = [
            backend.subscribe(owner, created)?,
            backend.subscribe(owner, updated)?,
            backend.subscribe(owner, deleted)?,
        ];
        log::debug!("acquired change-stream subscriptions for owner {owner}");
        Ok(Self { channels })
    }

    /// Drains every pending event across the three channels.
    ///
    /// Events are returned in per-channel delivery order; no ordering holds
    /// across channels, which is safe because the collection applies every
    /// event idempotently.
    pub fn poll(&mut self) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        for channel in &mut self.channels {
            while let Some(event) = channel.try_next() {
                events.push(event);
            }
        }
        events
    }
}

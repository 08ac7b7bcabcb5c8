//! Internal domain modules for the Tidenotes core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod backend;
pub mod collection;
pub mod error;
pub mod event;
pub mod identity;
pub mod local;
pub mod note;
pub mod session;
pub mod storage;
pub mod subscription;

#[doc(inline)]
pub use backend::NotesBackend;
#[doc(inline)]
pub use collection::NoteCollection;
#[doc(inline)]
pub use error::{Result, TidenotesError};
#[doc(inline)]
pub use event::{EventKind, NoteEvent};
#[doc(inline)]
pub use identity::default_owner;
#[doc(inline)]
pub use local::LocalBackend;
#[doc(inline)]
pub use note::Note;
#[doc(inline)]
pub use session::{Selection, Session, SubmitOutcome};
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use subscription::{Canceller, Subscription, SubscriptionSet};

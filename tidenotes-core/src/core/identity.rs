//! Owner identity used to scope subscriptions.

use crate::{Result, TidenotesError};

/// Environment variable that overrides the default owner identity.
pub const OWNER_ENV: &str = "TIDENOTES_OWNER";

/// Returns the owner identity for this machine.
///
/// Reads `TIDENOTES_OWNER` from the environment if set and non-empty,
/// otherwise falls back to the hostname. The same machine yields the same
/// identity across process restarts, so sessions re-attach to the same
/// subscription scope.
///
/// # Errors
///
/// Returns [`TidenotesError::Io`] if the hostname cannot be read, or
/// [`TidenotesError::InvalidStore`] if it is not valid UTF-8.
pub fn default_owner() -> Result<String> {
    if let Ok(owner) = std::env::var(OWNER_ENV) {
        if !owner.trim().is_empty() {
            return Ok(owner);
        }
    }

    let host = hostname::get()?;
    host.into_string()
        .map_err(|_| TidenotesError::InvalidStore("Hostname is not valid UTF-8".to_string()))
}

//! The signed-in session and its shared handle.

use parking_lot::RwLock;
use serde::Deserialize;
use std::sync::Arc;

/// Tokens of one signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Default)]
struct Slot {
    session: Option<Session>,
    /// Bumped on every replace or clear.
    generation: u64,
}

/// Shared, cloneable view of the current session.
///
/// The generation identifies which session a request was sent with, so a
/// caller holding a stale token can tell that someone already replaced it.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    slot: Arc<RwLock<Slot>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current session and its generation.
    pub fn current(&self) -> Option<(Session, u64)> {
        let slot = self.slot.read();
        slot.session.clone().map(|s| (s, slot.generation))
    }

    pub fn generation(&self) -> u64 {
        self.slot.read().generation
    }

    pub fn is_signed_in(&self) -> bool {
        self.slot.read().session.is_some()
    }

    /// Stores a new session and returns its generation.
    pub fn replace(&self, session: Session) -> u64 {
        let mut slot = self.slot.write();
        slot.generation += 1;
        slot.session = Some(session);
        slot.generation
    }

    pub fn clear(&self) {
        let mut slot = self.slot.write();
        slot.generation += 1;
        slot.session = None;
    }

    /// Clears the session only if it is still the one stored under
    /// `generation`. Returns whether it was cleared.
    pub fn clear_if(&self, generation: u64) -> bool {
        let mut slot = self.slot.write();
        if slot.generation != generation || slot.session.is_none() {
            return false;
        }
        slot.generation += 1;
        slot.session = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(n: u32) -> Session {
        Session {
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
            expires_in: 900,
        }
    }

    #[test]
    fn test_replace_bumps_generation() {
        let handle = SessionHandle::new();
        assert!(handle.current().is_none());

        let first = handle.replace(session(1));
        let second = handle.replace(session(2));
        assert!(second > first);

        let (current, generation) = handle.current().unwrap();
        assert_eq!(current, session(2));
        assert_eq!(generation, second);
    }

    #[test]
    fn test_clear_is_visible_through_clones() {
        let handle = SessionHandle::new();
        let other = handle.clone();
        handle.replace(session(1));
        assert!(other.is_signed_in());

        other.clear();
        assert!(!handle.is_signed_in());
    }

    #[test]
    fn test_clear_if_spares_a_newer_session() {
        let handle = SessionHandle::new();
        let stale = handle.replace(session(1));
        let newer = handle.replace(session(2));

        assert!(!handle.clear_if(stale));
        assert_eq!(handle.current().unwrap().0, session(2));

        assert!(handle.clear_if(newer));
        assert!(!handle.is_signed_in());
        assert!(!handle.clear_if(newer + 1));
    }
}

//! Cached copy of the user directory.

use crate::board::domain::{DirectoryUser, UserId};
use std::collections::BTreeMap;

/// Users known to the board, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: BTreeMap<UserId, DirectoryUser>,
    loaded: bool,
}

impl UserDirectory {
    /// Creates an empty, not-yet-loaded directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a listing has been stored.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replaces the cached listing.
    pub fn replace(&mut self, users: impl IntoIterator<Item = DirectoryUser>) {
        self.users = users.into_iter().map(|user| (user.id, user)).collect();
        self.loaded = true;
    }

    /// Returns `true` when the user is in the directory.
    #[must_use]
    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    /// Looks up a user.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<&DirectoryUser> {
        self.users.get(&id)
    }

    /// Returns the first id in `ids` that is not in the directory.
    #[must_use]
    pub fn first_unknown<'a>(&self, ids: impl IntoIterator<Item = &'a UserId>) -> Option<UserId> {
        ids.into_iter().copied().find(|id| !self.contains(*id))
    }
}

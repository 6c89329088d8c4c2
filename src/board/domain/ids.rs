//! Identifier newtypes for the board domain.
//!
//! Server-assigned entities use integer identifiers. Client-generated
//! correlation values use UUIDs so they never collide with server ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! server_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a server-assigned identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying numeric value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

server_id!(
    /// Identifier of a task record.
    TaskId
);
server_id!(
    /// Identifier of a discussion thread.
    DiscussionId
);
server_id!(
    /// Identifier of a user from the user directory.
    UserId
);
server_id!(
    /// Identifier of a chat message.
    MessageId
);
server_id!(
    /// Identifier of the client a discussion belongs to.
    ClientId
);
server_id!(
    /// Identifier of the project a discussion belongs to.
    ProjectId
);

/// Client-generated key that lets the server deduplicate a retried
/// task-with-message creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientRequestId(Uuid);

impl ClientRequestId {
    /// Creates a new random request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ClientRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Integer identifiers assigned by the backend.
//!
//! Each entity gets its own newtype so a `UserId` can never be passed where
//! an `AssignmentId` is expected. All of them serialize as bare JSON numbers.

use serde::{Deserialize, Serialize};

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw numeric value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

backend_id!(
    /// Identifier of a task.
    TaskId
);
backend_id!(
    /// Identifier of a task-to-user assignment.
    AssignmentId
);
backend_id!(
    /// Identifier of a user (assignee).
    UserId
);
backend_id!(
    /// Identifier of a task type (catalog entry).
    TaskTypeId
);
backend_id!(
    /// Identifier of a company (catalog entry).
    CompanyId
);

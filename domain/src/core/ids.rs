//! Typed identifiers
//!
//! Identifiers are assigned by the persistence collaborator; the domain only
//! compares and orders them.

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

numeric_id!(
    /// Identifier of an experiment
    ExperimentId
);
numeric_id!(
    /// Identifier of a submitted answer
    AnswerId
);
numeric_id!(
    /// Identifier of a rating of an answer
    RatingId
);
numeric_id!(
    /// Identifier of a crowd worker
    WorkerId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_and_order() {
        assert_eq!(AnswerId::new(7).to_string(), "7");
        assert!(AnswerId::new(1) < AnswerId::new(2));
        assert_eq!(WorkerId::from(3).get(), 3);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&ExperimentId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}

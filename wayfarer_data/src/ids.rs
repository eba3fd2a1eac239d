//! Opaque, string-backed identifiers.
//!
//! Every stable id in the world (items, locations, verbs, fuses, daemons,
//! globals, properties) is an immutable, non-empty, case-insensitive string.
//! Equality, ordering, and hashing all compare the lower-cased form so that
//! `ItemId::new("Lamp")` and `ItemId::new("lamp")` refer to the same entity.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Declares a string-backed, case-insensitive id newtype.
///
/// Each generated type stores the original-case string (for display) but
/// compares, hashes, and orders on its lower-cased form, per spec.md §3.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Construct a new id from any string-like value.
            ///
            /// # Panics
            /// Panics if `raw` is empty after trimming, since spec.md §3
            /// requires every id to be non-empty.
            pub fn new(raw: impl Into<String>) -> Self {
                let raw = raw.into();
                assert!(!raw.trim().is_empty(), concat!(stringify!($name), " must not be empty"));
                Self(raw)
            }

            /// The original-case string this id was constructed from.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The lower-cased key used for comparison, hashing, and ordering.
            pub fn key(&self) -> String {
                self.0.to_lowercase()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.key() == other.key()
            }
        }
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.key().cmp(&other.key())
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.key().hash(state);
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }
        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::new(raw)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

id_type!(
    /// Identifies an [`Item`](crate) by its author-assigned symbol.
    ItemId
);
id_type!(
    /// Identifies a `Location` by its author-assigned symbol.
    LocationId
);
id_type!(
    /// Identifies a verb (including its synonyms) by its canonical name.
    VerbId
);
id_type!(
    /// Identifies a one-shot countdown registered with the time system.
    FuseId
);
id_type!(
    /// Identifies a periodic background task registered with the time system.
    DaemonId
);
id_type!(
    /// Identifies a global, game-wide boolean flag.
    GlobalId
);
id_type!(
    /// Identifies a property key in an entity's property bag.
    PropertyId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_case_insensitively() {
        assert_eq!(ItemId::new("Lamp"), ItemId::new("lamp"));
        assert_eq!(ItemId::new("LAMP").key(), "lamp");
    }

    #[test]
    fn ids_preserve_display_case() {
        let id = ItemId::new("Brass_Key");
        assert_eq!(id.as_str(), "Brass_Key");
        assert_eq!(format!("{id}"), "Brass_Key");
    }

    #[test]
    #[should_panic]
    fn empty_id_panics() {
        ItemId::new("   ");
    }

    #[test]
    fn ids_hash_consistently_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(ItemId::new("Lamp"));
        assert!(set.contains(&ItemId::new("lamp")));
    }

    #[test]
    fn ids_order_lexicographically_on_key() {
        let mut ids = vec![ItemId::new("Zed"), ItemId::new("apple"), ItemId::new("Mango")];
        ids.sort();
        assert_eq!(
            ids.iter().map(ItemId::as_str).collect::<Vec<_>>(),
            vec!["apple", "Mango", "Zed"]
        );
    }
}

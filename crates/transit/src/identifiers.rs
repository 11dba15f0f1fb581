//! Identifiers of bus lines.
//!
//! Both are `Arc<str>` newtypes: cloning one into every stop match or
//! favorite entry only bumps a count. Surrounding whitespace is dropped on
//! construction, so `" 330"` typed on the command line finds line `330`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

macro_rules! line_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().trim().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        // Clones share the allocation; compare pointers before bytes
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        // Plain JSON strings, matching stored favorites and map-page links
        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::new(s))
            }
        }
    };
}

line_identifier!(
    /// Catalog key of a line (e.g. `"1224"`).
    ///
    /// Unique within a catalog; favorites are keyed by it. Defaults to the
    /// line number when a record carries no id.
    LineIdentifier
);

line_identifier!(
    /// Number painted on the bus (e.g. `"330"`).
    ///
    /// Shown to riders and used in recent-search keys. Several catalog
    /// entries (directions, variants) may share one number.
    LineNumber
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = LineIdentifier::new("330");
        let id2 = LineIdentifier::new("330");
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0)); // Clone shares Arc
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(LineIdentifier::new("1224"), 42);

        assert_eq!(map.get(&LineIdentifier::new("1224")), Some(&42));
    }

    #[test]
    fn test_identifier_display() {
        let number = LineNumber::new("330");
        assert_eq!(format!("{}", number), "330");
        assert_eq!(format!("[{:>5}]", number), "[  330]");
    }

    #[test]
    fn test_identifier_trims_whitespace() {
        assert_eq!(LineIdentifier::new(" 1224\n"), LineIdentifier::new("1224"));
        assert_eq!(LineNumber::new("  ").as_str(), "");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_identifier_serializes_as_string() {
        let id = LineIdentifier::new("330");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"330\"");

        let back: LineIdentifier = serde_json::from_str("\"330\"").unwrap();
        assert_eq!(back, id);
    }
}

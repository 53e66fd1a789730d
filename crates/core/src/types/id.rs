//! Newtype IDs for type-safe document references.
//!
//! Document identifiers are server-assigned strings. Use the `define_id!`
//! macro to create wrappers that prevent accidentally mixing IDs from
//! different collections.

/// Macro to define a type-safe document ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`, `Default`
/// - Conversion methods: `new()`, `as_str()`, `is_empty()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use lookoot_core::define_id;
/// define_id!(UserId);
/// define_id!(StoreId);
///
/// let user_id = UserId::new("abc");
/// let store_id = StoreId::new("abc");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = store_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a document identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// An empty ID means "not yet assigned by the server".
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(StoreId);
define_id!(ItemId);
define_id!(ReviewId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_conversion() {
        let id = StoreId::new("s-1");
        assert_eq!(id.to_string(), "s-1");
        assert_eq!(id.as_str(), "s-1");
        let raw: String = id.into();
        assert_eq!(raw, "s-1");
    }

    #[test]
    fn test_default_id_is_empty() {
        assert!(ItemId::default().is_empty());
        assert!(!ItemId::from("i-1").is_empty());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = UserId::new("u-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u-42\"");
        let back: UserId = serde_json::from_str("\"u-42\"").unwrap();
        assert_eq!(back, id);
    }
}

//! Newtype IDs for type-safe entity references.
//!
//! Document identities are assigned by the backing store and are opaque
//! strings, so the wrappers here are string newtypes rather than integers.
//! Use the `define_string_id!` macro to add new ones.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use sweetslot_core::define_string_id;
/// define_string_id!(SessionId);
///
/// let id = SessionId::new("abc123");
/// assert_eq!(id.as_str(), "abc123");
/// ```
#[macro_export]
macro_rules! define_string_id {
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
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Identity-provider principal id.
define_string_id!(Uid);

// Store-assigned booking document id.
define_string_id!(BookingId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_as_str() {
        let uid = Uid::new("u_42");
        assert_eq!(uid.as_str(), "u_42");
        assert_eq!(format!("{uid}"), "u_42");
    }

    #[test]
    fn test_ids_are_distinct_types() {
        let booking = BookingId::new("b1");
        assert_eq!(booking, BookingId::from("b1"));
    }

    #[test]
    fn test_serde_transparent() {
        let id = BookingId::new("doc-9");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"doc-9\"");
    }
}

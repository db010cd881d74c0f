//! Newtype IDs for type-safe entity references.
//!
//! Every table the storefront touches has a `SERIAL` primary key, so all IDs
//! wrap an `i32`. Distinct types keep a product ID from being passed where a
//! wishlist entry ID is expected.

/// Define an `i32`-backed ID newtype.
///
/// The generated type is `Copy`, hashable, serializes as a bare integer and,
/// with the `postgres` feature, encodes as a Postgres `INT4`.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Catalog product ID.
    ProductId
);
define_id!(
    /// Store-assigned ID of a wishlist entry.
    WishlistEntryId
);
define_id!(
    /// Administrator account ID.
    AdminId
);
define_id!(
    /// Customer account ID.
    CustomerId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let id = ProductId::from(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(id, ProductId::new(42));
    }

    #[test]
    fn test_display() {
        assert_eq!(WishlistEntryId::new(7).to_string(), "7");
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&ProductId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}

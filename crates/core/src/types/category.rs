//! Shop category type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A shop category (a shop name an admin is allowed to manage).
///
/// Always stored in normalized form: trimmed and lowercased, never empty.
/// Comparison against raw shop names goes through the same normalization,
/// so `ShopCategory::parse("Bandra ") == ShopCategory::parse("bandra")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopCategory(String);

impl ShopCategory {
    /// Parse a raw category string, returning `None` when it is blank.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Returns the normalized category name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a raw shop name refers to this category.
    #[must_use]
    pub fn matches(&self, shop: &str) -> bool {
        shop.trim().to_lowercase() == self.0
    }
}

impl fmt::Display for ShopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ShopCategory {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        let cat = ShopCategory::parse("  Bandra West ").expect("non-empty");
        assert_eq!(cat.as_str(), "bandra west");
    }

    #[test]
    fn test_parse_blank_is_none() {
        assert!(ShopCategory::parse("").is_none());
        assert!(ShopCategory::parse("   ").is_none());
    }

    #[test]
    fn test_matches_ignores_case_and_padding() {
        let cat = ShopCategory::parse("andheri").expect("non-empty");
        assert!(cat.matches(" Andheri "));
        assert!(!cat.matches("Bandra"));
    }
}

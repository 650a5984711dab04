//! Phone number type with Indian-market normalization.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A phone number, normalized to E.164-ish form on construction.
///
/// Normalization rules (matching what the booking backend stores):
///
/// - Whitespace and `( ) . -` separators are stripped.
/// - A leading `+` is kept as-is.
/// - Numbers longer than 10 digits starting with `91` gain a `+`.
/// - Bare 10-digit numbers are assumed domestic and gain `+91`.
/// - Anything else passes through unchanged.
///
/// ## Examples
///
/// ```
/// use sweetslot_core::Phone;
///
/// assert_eq!(Phone::normalize("98765 43210").as_str(), "+919876543210");
/// assert_eq!(Phone::normalize("919876543210").as_str(), "+919876543210");
/// assert_eq!(Phone::normalize("+14155550100").as_str(), "+14155550100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Normalize a raw phone string into a `Phone`.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let stripped: String = raw
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '.' | '-'))
            .collect();

        if stripped.starts_with('+') {
            return Self(stripped);
        }
        if stripped.len() > 10 && stripped.starts_with("91") {
            return Self(format!("+{stripped}"));
        }
        if stripped.len() == 10 && stripped.chars().all(|c| c.is_ascii_digit()) {
            return Self(format!("+91{stripped}"));
        }
        Self(stripped)
    }

    /// Returns the normalized number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `n` digits of the number, used for guest display names.
    #[must_use]
    pub fn last_digits(&self, n: usize) -> &str {
        let len = self.0.len();
        self.0.get(len.saturating_sub(n)..).unwrap_or("")
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

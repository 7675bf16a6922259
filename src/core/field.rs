//! Editable numeric cells.
//!
//! FTE, rate, and discount inputs all share one editing policy: an empty
//! string puts the cell into a blank mid-edit state, a non-negative number is
//! accepted, and anything else is ignored while the previous value is kept.
//! Committing a blank cell turns it into zero.

use serde::{Deserialize, Serialize};

/// Result of feeding a raw input string into a [`NumericField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// A valid non-negative number was stored
    Applied,
    /// The input was empty; the cell is blank until committed
    Pending,
    /// The input was malformed or negative; the cell kept its previous value
    Rejected,
}

impl EditOutcome {
    /// Whether a new numeric value was stored.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A numeric cell that may be blank while the user is typing.
///
/// Serializes as a plain number; a blank cell serializes as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum NumericField {
    /// Mid-edit empty input, distinct from zero
    Blank,
    /// A committed non-negative value
    Value(f64),
}

impl NumericField {
    /// The committed zero value.
    pub const ZERO: Self = Self::Value(0.0);

    /// Numeric value of the cell, counting a blank cell as zero.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Blank => 0.0,
            Self::Value(v) => v,
        }
    }

    /// Whether the cell is in the blank mid-edit state.
    #[must_use]
    pub const fn is_blank(self) -> bool {
        matches!(self, Self::Blank)
    }

    /// Applies raw text from an input box.
    pub fn apply_input(&mut self, raw: &str) -> EditOutcome {
        if raw.is_empty() {
            *self = Self::Blank;
            return EditOutcome::Pending;
        }

        match parse_non_negative(raw) {
            Some(v) => {
                *self = Self::Value(v);
                EditOutcome::Applied
            }
            None => EditOutcome::Rejected,
        }
    }

    /// Leaves edit mode. Returns `true` when a blank cell was coerced to zero.
    pub fn commit(&mut self) -> bool {
        if self.is_blank() {
            *self = Self::ZERO;
            true
        } else {
            false
        }
    }

    /// Two-decimal display form used in invoice tables.
    #[must_use]
    pub fn display(self) -> String {
        format!("{:.2}", self.value())
    }
}

impl Default for NumericField {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Caller-supplied numbers that are negative or not finite are stored as zero.
impl From<f64> for NumericField {
    fn from(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            Self::Value(value.abs())
        } else {
            Self::ZERO
        }
    }
}

impl From<NumericField> for f64 {
    fn from(field: NumericField) -> Self {
        field.value()
    }
}

/// Parses a finite, non-negative float. `-0` is normalized to `0`.
#[must_use]
pub fn parse_non_negative(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.abs())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_apply_input_accepts_non_negative() {
        let mut field = NumericField::ZERO;
        assert_eq!(field.apply_input("0.25"), EditOutcome::Applied);
        assert_eq!(field, NumericField::Value(0.25));

        assert_eq!(field.apply_input(" 3 "), EditOutcome::Applied);
        assert_eq!(field.value(), 3.0);
    }

    #[test]
    fn test_apply_input_rejects_invalid_and_keeps_value() {
        let mut field = NumericField::Value(0.5);
        assert_eq!(field.apply_input("-5"), EditOutcome::Rejected);
        assert_eq!(field.apply_input("abc"), EditOutcome::Rejected);
        assert_eq!(field.apply_input("NaN"), EditOutcome::Rejected);
        assert_eq!(field.apply_input("inf"), EditOutcome::Rejected);
        assert_eq!(field.apply_input("   "), EditOutcome::Rejected);
        assert_eq!(field, NumericField::Value(0.5));
    }

    #[test]
    fn test_empty_input_is_blank_not_zero() {
        let mut field = NumericField::Value(2.0);
        assert_eq!(field.apply_input(""), EditOutcome::Pending);
        assert!(field.is_blank());
        assert_ne!(field, NumericField::ZERO);
        assert_eq!(field.value(), 0.0);
    }

    #[test]
    fn test_commit_coerces_blank_once() {
        let mut field = NumericField::Blank;
        assert!(field.commit());
        assert_eq!(field, NumericField::ZERO);
        assert!(!field.commit());
        assert_eq!(field, NumericField::ZERO);
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        assert_eq!(parse_non_negative("-0").map(f64::is_sign_negative), Some(false));
    }

    #[test]
    fn test_from_f64_sanitizes() {
        assert_eq!(NumericField::from(1.5), NumericField::Value(1.5));
        assert_eq!(NumericField::from(-1.0), NumericField::ZERO);
        assert_eq!(NumericField::from(f64::NAN), NumericField::ZERO);
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(NumericField::Value(12.5).display(), "12.50");
        assert_eq!(NumericField::Blank.display(), "0.00");
    }
}

//! # Money Module
//!
//! Provides the `Money` type and the tolerant parser that turns operator
//! text into money.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Split of a $100.00 sale entered as floats:                             │
//! │    60.10 + 39.90 = 100.00000000000001  ❌                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    6010 + 3990 = 10000 cents  ✅                                        │
//! │    The one-cent balance tolerance is an integer comparison.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operator Text
//! Amounts arrive as text typed by an operator, in either `1234.56` or
//! `1.234,56` style. [`Money::parse_lenient`] never fails: anything it
//! cannot read is zero.
//!
//! ```rust
//! use caja_core::money::Money;
//!
//! assert_eq!(Money::parse_lenient("1.234,56").cents(), 123456);
//! assert_eq!(Money::parse_lenient("12,5").cents(), 1250);
//! assert_eq!(Money::parse_lenient("abc").cents(), 0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::BALANCE_TOLERANCE_CENTS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: split legs are not constrained to be non-negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// let amount = Money::from_cents(3999); // 39.99
    /// assert_eq!(amount.cents(), 3999);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts `other` from `self`. `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds up every amount. `None` as soon as the running sum overflows.
    ///
    /// Operator text may hold any amount that fits in i64 cents, so a sum of
    /// several legs can leave the range.
    pub fn checked_sum<'a, I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(*m))
    }

    /// Returns true when `self` and `other` differ by at most one cent.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale total:        100.00
    /// Entered legs:      60.00 + 39.99 = 99.99
    ///      │
    ///      ▼
    /// within_tolerance ← THIS FUNCTION (|0.01| ≤ 0.01)
    ///      │
    ///      ▼
    /// Confirm button enabled
    /// ```
    ///
    /// A gap too wide to represent is never within tolerance.
    #[inline]
    pub fn within_tolerance(&self, other: Money) -> bool {
        self.0
            .checked_sub(other.0)
            .and_then(i64::checked_abs)
            .is_some_and(|gap| gap <= BALANCE_TOLERANCE_CENTS)
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    /// Parses operator-entered text into money, never failing.
    ///
    /// ## Rules
    /// - Surrounding whitespace is ignored; empty text is zero
    /// - `1.234,56`: when both separators appear and the comma comes last,
    ///   dots group thousands and the comma is the decimal separator
    /// - Otherwise the first comma is read as a decimal point (`12,5`)
    /// - Only the leading numeric part counts (`12abc` → 12.00)
    /// - Digits past the second decimal round half away from zero
    /// - No leading number, or a number too large for i64 cents, is zero
    ///
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// assert_eq!(Money::parse_lenient(" 60 ").cents(), 6000);
    /// assert_eq!(Money::parse_lenient("10.005").cents(), 1001);
    /// assert_eq!(Money::parse_lenient("-5,5").cents(), -550);
    /// assert_eq!(Money::parse_lenient("").cents(), 0);
    /// ```
    pub fn parse_lenient(raw: &str) -> Money {
        let normalized = normalize_separators(raw.trim());
        parse_numeric_prefix(&normalized).unwrap_or_default()
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    /// Formats as a plain decimal with two fraction digits: `1234.56`.
    pub fn format_plain(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }

    /// Formats a difference with an explicit sign for positive values:
    /// `+0.01`, `-1.00`, `0.00`.
    pub fn format_signed(&self) -> String {
        if self.0 > 0 {
            format!("+{}", self.format_plain())
        } else {
            self.format_plain()
        }
    }

    /// Formats for the es-AR locale used on the collection screen:
    /// `$1.234,56` (dot groups thousands, comma before the cents).
    ///
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(123456).format_es_ar(), "$1.234,56");
    /// assert_eq!(Money::from_cents(-550).format_es_ar(), "-$5,50");
    /// ```
    pub fn format_es_ar(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.units().abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        format!("{}${},{:02}", sign, grouped, self.cents_part())
    }
}

/// Rewrites `1.234,56` as `1234.56` and `12,5` as `12.5`.
fn normalize_separators(s: &str) -> String {
    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replacen(',', ".", 1),
        _ => s.replacen(',', ".", 1),
    }
}

/// Reads `[+-]?digits[.digits]` from the start of `s` into cents.
fn parse_numeric_prefix(s: &str) -> Option<Money> {
    let mut chars = s.chars().peekable();

    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut units: i64 = 0;
    let mut saw_digit = false;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        units = units.checked_mul(10)?.checked_add(d as i64)?;
        saw_digit = true;
        chars.next();
    }

    let mut fraction = [0u32; 3];
    if chars.peek() == Some(&'.') {
        chars.next();
        let mut idx = 0;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            if idx < fraction.len() {
                fraction[idx] = d;
            }
            idx += 1;
            saw_digit = true;
            chars.next();
        }
    }

    if !saw_digit {
        return None;
    }

    let mut cents = units
        .checked_mul(100)?
        .checked_add((fraction[0] * 10 + fraction[1]) as i64)?;
    if fraction[2] >= 5 {
        cents = cents.checked_add(1)?;
    }

    Some(Money(if negative { -cents } else { cents }))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the plain two-decimal form. Use [`Money::format_es_ar`] for screens.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_plain())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Decimal Wire Format
// =============================================================================

/// Serde adapter writing money as a two-decimal JSON number (`39.99`) and
/// reading either a number or operator-style text.
///
/// ```rust,ignore
/// #[serde(with = "caja_core::money::as_decimal")]
/// pub amount: Money,
/// ```
pub mod as_decimal {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(money.cents() as f64 / 100.0)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Number(n) => Money::parse_lenient(&n.to_string()),
            serde_json::Value::String(s) => Money::parse_lenient(&s),
            _ => Money::zero(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

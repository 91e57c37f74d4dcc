//! # Split Collection Dialog
//!
//! At checkout, when the operator picks a composite method, the sale total
//! is distributed across the composite's members. The allocation is only
//! released once the amounts add up to the total.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌────────┐  open()   ┌────────────┐ begin_confirm() ┌────────────┐    │
//! │   │ Closed │──────────►│ Collecting │────────────────►│ Submitting │    │
//! │   └────────┘           └────────────┘   (balanced)    └─────┬──────┘    │
//! │       ▲                  ▲      │                           │           │
//! │       │     cancel()     │      │                           │           │
//! │       ├──────────────────┼──────┘                           │           │
//! │       │                  └──── finish_confirm(false) ───────┤           │
//! │       └─────────────────────── finish_confirm(true) ────────┘           │
//! │                                                                         │
//! │  Amounts reset to zero on open() and replace_components() only.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Balance
//! `difference = total - Σ amounts`, in cents. The split is balanced when
//! `|difference| ≤ 1 cent`. Negative legs are accepted as entered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::MethodId;

// =============================================================================
// Types
// =============================================================================

/// Dialog phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SplitPhase {
    #[default]
    Closed,
    Collecting,
    Submitting,
}

/// One member of the composite being collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitComponent {
    pub id: MethodId,
    pub name: String,
    pub description: Option<String>,
}

impl SplitComponent {
    pub fn new(id: MethodId, name: impl Into<String>) -> Self {
        SplitComponent {
            id,
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One leg of a confirmed split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitLine {
    #[serde(rename = "medio_pago_id")]
    pub member_id: MethodId,

    /// 0-based position among the composite's members.
    #[serde(rename = "orden")]
    pub order: usize,

    #[serde(rename = "monto", with = "crate::money::as_decimal")]
    #[ts(type = "number")]
    pub amount: Money,
}

/// Ordered legs handed to the sale flow once the split balances.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct SplitAllocation(Vec<SplitLine>);

impl SplitAllocation {
    pub fn lines(&self) -> &[SplitLine] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every leg. `None` if it overflows.
    pub fn total(&self) -> Option<Money> {
        self.0
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.amount))
    }
}

impl IntoIterator for SplitAllocation {
    type Item = SplitLine;
    type IntoIter = std::vec::IntoIter<SplitLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Readout placeholder when the entered amounts overflow.
pub const OUT_OF_RANGE_LABEL: &str = "fuera de rango";

/// Live readout shown under the amount inputs.
///
/// `sum` and `difference` are `None` when the entered amounts overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitSummary {
    #[ts(type = "number")]
    pub total: Money,
    /// Header form of the total: `$1.234,56`
    pub total_label: String,
    #[ts(type = "number | null")]
    pub sum: Option<Money>,
    #[ts(type = "number | null")]
    pub difference: Option<Money>,
    pub balanced: bool,
    /// `Suma: $1234.55 · Dif: +0.01`
    pub label: String,
}

// =============================================================================
// Split State
// =============================================================================

/// State of the split collection dialog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitState {
    phase: SplitPhase,
    total_raw: String,
    composite_name: String,
    components: Vec<SplitComponent>,
    /// Parallel to `components`.
    amounts: Vec<Money>,
    opened_at: Option<DateTime<Utc>>,
}

impl SplitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the dialog for a sale total and composite, zeroing all amounts.
    ///
    /// Ignored while a confirmation is in flight.
    pub fn open(
        &mut self,
        total_raw: impl Into<String>,
        composite_name: impl Into<String>,
        components: Vec<SplitComponent>,
    ) {
        if self.phase == SplitPhase::Submitting {
            return;
        }

        self.total_raw = total_raw.into();
        self.composite_name = composite_name.into();
        self.replace_components(components);
        self.phase = SplitPhase::Collecting;
        self.opened_at = Some(Utc::now());
    }

    /// Swaps the component list, zeroing all amounts.
    pub fn replace_components(&mut self, components: Vec<SplitComponent>) {
        self.amounts = vec![Money::zero(); components.len()];
        self.components = components;
    }

    pub fn phase(&self) -> SplitPhase {
        self.phase
    }

    pub fn composite_name(&self) -> &str {
        &self.composite_name
    }

    pub fn components(&self) -> &[SplitComponent] {
        &self.components
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    /// Records the operator's text for one member. No clamping.
    pub fn set_amount(&mut self, member_id: MethodId, raw: &str) -> CoreResult<()> {
        match self.phase {
            SplitPhase::Closed => return Err(CoreError::SplitClosed),
            SplitPhase::Submitting => return Err(CoreError::SplitInFlight),
            SplitPhase::Collecting => {}
        }

        let idx = self
            .position(member_id)
            .ok_or(CoreError::UnknownMember(member_id))?;
        self.amounts[idx] = Money::parse_lenient(raw);
        Ok(())
    }

    pub fn amount_of(&self, member_id: MethodId) -> Option<Money> {
        self.position(member_id).map(|idx| self.amounts[idx])
    }

    /// The sale total as parsed from the text it was opened with.
    pub fn parsed_total(&self) -> Money {
        Money::parse_lenient(&self.total_raw)
    }

    /// `Σ amounts`, or `None` when it overflows.
    pub fn sum_entered(&self) -> Option<Money> {
        Money::checked_sum(&self.amounts)
    }

    /// `total - Σ amounts`, or `None` when either step overflows.
    pub fn difference(&self) -> Option<Money> {
        self.parsed_total().checked_sub(self.sum_entered()?)
    }

    /// Overflowing amounts are never balanced.
    pub fn is_balanced(&self) -> bool {
        self.sum_entered()
            .is_some_and(|sum| self.parsed_total().within_tolerance(sum))
    }

    pub fn can_confirm(&self) -> bool {
        self.phase == SplitPhase::Collecting && self.is_balanced()
    }

    /// Sets the last member's amount to whatever the others leave over.
    ///
    /// Leaves the amounts untouched when the remainder overflows.
    pub fn autofill_last(&mut self) {
        if self.phase != SplitPhase::Collecting {
            return;
        }

        let total = self.parsed_total();
        let Some((last, others)) = self.amounts.split_last_mut() else {
            return;
        };
        let rest = Money::checked_sum(others.iter()).and_then(|sum| total.checked_sub(sum));
        if let Some(rest) = rest {
            *last = rest;
        }
    }

    /// Builds the allocation and enters Submitting.
    ///
    /// Amounts are kept, so a failed submission returns the operator to the
    /// same figures.
    pub fn begin_confirm(&mut self) -> CoreResult<SplitAllocation> {
        match self.phase {
            SplitPhase::Closed => return Err(CoreError::SplitClosed),
            SplitPhase::Submitting => return Err(CoreError::SplitInFlight),
            SplitPhase::Collecting => {}
        }

        let Some(difference) = self.difference() else {
            return Err(ValidationError::AmountOutOfRange.into());
        };
        if !self.is_balanced() {
            return Err(ValidationError::Unbalanced { difference }.into());
        }

        self.phase = SplitPhase::Submitting;
        Ok(self.allocation())
    }

    /// Ends a submission: Closed on success, back to Collecting otherwise.
    pub fn finish_confirm(&mut self, success: bool) {
        if self.phase != SplitPhase::Submitting {
            return;
        }
        self.phase = if success {
            SplitPhase::Closed
        } else {
            SplitPhase::Collecting
        };
    }

    pub fn cancel(&mut self) {
        self.phase = SplitPhase::Closed;
    }

    pub fn summary(&self) -> SplitSummary {
        let total = self.parsed_total();
        let sum = self.sum_entered();
        let difference = self.difference();

        let label = match (sum, difference) {
            (Some(sum), Some(difference)) => format!(
                "Suma: ${} · Dif: {}",
                sum.format_plain(),
                difference.format_signed()
            ),
            (Some(sum), None) => {
                format!("Suma: ${} · Dif: {}", sum.format_plain(), OUT_OF_RANGE_LABEL)
            }
            _ => format!("Suma: {0} · Dif: {0}", OUT_OF_RANGE_LABEL),
        };

        SplitSummary {
            total,
            total_label: total.format_es_ar(),
            sum,
            difference,
            balanced: self.is_balanced(),
            label,
        }
    }

    fn allocation(&self) -> SplitAllocation {
        SplitAllocation(
            self.components
                .iter()
                .zip(&self.amounts)
                .enumerate()
                .map(|(order, (component, amount))| SplitLine {
                    member_id: component.id,
                    order,
                    amount: *amount,
                })
                .collect(),
        )
    }

    fn position(&self, member_id: MethodId) -> Option<usize> {
        self.components.iter().position(|c| c.id == member_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn components(ids: &[MethodId]) -> Vec<SplitComponent> {
        ids.iter()
            .map(|id| SplitComponent::new(*id, format!("Medio {}", id)))
            .collect()
    }

    fn open(total: &str, ids: &[MethodId]) -> SplitState {
        let mut split = SplitState::new();
        split.open(total, "Mixto", components(ids));
        split
    }

    #[test]
    fn test_open_zeroes_amounts() {
        let mut split = open("100", &[1, 2]);
        split.set_amount(1, "40").unwrap();
        split.cancel();

        split.open("100", "Mixto", components(&[1, 2]));
        assert_eq!(split.phase(), SplitPhase::Collecting);
        assert_eq!(split.amount_of(1), Some(Money::zero()));
        assert!(split.opened_at().is_some());
    }

    #[test]
    fn test_balance_within_one_cent() {
        let mut split = open("100.00", &[1, 2]);
        split.set_amount(1, "60.00").unwrap();
        split.set_amount(2, "39.99").unwrap();

        assert_eq!(split.difference(), Some(Money::from_cents(1)));
        assert!(split.is_balanced());

        let allocation = split.begin_confirm().unwrap();
        assert_eq!(split.phase(), SplitPhase::Submitting);
        assert_eq!(allocation.total(), Some(Money::from_cents(9999)));
    }

    #[test]
    fn test_unbalanced_is_rejected() {
        let mut split = open("100.00", &[1, 2]);
        split.set_amount(1, "60.00").unwrap();
        split.set_amount(2, "39.00").unwrap();

        assert!(!split.can_confirm());
        match split.begin_confirm() {
            Err(CoreError::Validation(ValidationError::Unbalanced { difference })) => {
                assert_eq!(difference, Money::from_cents(100));
            }
            other => panic!("expected unbalanced, got {:?}", other),
        }
        assert_eq!(split.phase(), SplitPhase::Collecting);
    }

    #[test]
    fn test_autofill_last() {
        let mut split = open("250.00", &[1, 2, 3]);
        split.set_amount(1, "100").unwrap();
        split.set_amount(2, "100").unwrap();
        split.set_amount(3, "999").unwrap();

        split.autofill_last();
        assert_eq!(split.amount_of(3), Some(Money::from_cents(5000)));
        assert!(split.is_balanced());
    }

    #[test]
    fn test_autofill_can_go_negative() {
        let mut split = open("100", &[1, 2]);
        split.set_amount(1, "120").unwrap();
        split.autofill_last();
        assert_eq!(split.amount_of(2), Some(Money::from_cents(-2000)));
    }

    #[test]
    fn test_autofill_without_components_is_no_op() {
        let mut split = open("100", &[]);
        split.autofill_last();
        assert_eq!(split.sum_entered(), Some(Money::zero()));
    }

    #[test]
    fn test_allocation_follows_component_order() {
        let mut split = open("30", &[7, 3, 5]);
        split.set_amount(7, "10").unwrap();
        split.set_amount(3, "10").unwrap();
        split.set_amount(5, "10").unwrap();

        let allocation = split.begin_confirm().unwrap();
        let legs: Vec<(MethodId, usize)> = allocation
            .lines()
            .iter()
            .map(|l| (l.member_id, l.order))
            .collect();
        assert_eq!(legs, vec![(7, 0), (3, 1), (5, 2)]);
    }

    #[test]
    fn test_allocation_order_ignores_entry_order() {
        let mut split = open("30", &[7, 3, 5]);
        split.set_amount(5, "10").unwrap();
        split.autofill_last();
        split.set_amount(7, "12").unwrap();
        split.set_amount(3, "8").unwrap();
        split.autofill_last();

        let allocation = split.begin_confirm().unwrap();
        let legs: Vec<(MethodId, usize, i64)> = allocation
            .lines()
            .iter()
            .map(|l| (l.member_id, l.order, l.amount.cents()))
            .collect();
        assert_eq!(legs, vec![(7, 0, 1200), (3, 1, 800), (5, 2, 1000)]);
    }

    #[test]
    fn test_overflowing_amounts_are_never_balanced() {
        let mut split = open("-0,01", &[1, 2]);
        split.set_amount(1, "92233720368547758.07").unwrap();
        split.set_amount(2, "92233720368547758.07").unwrap();

        assert_eq!(split.sum_entered(), None);
        assert_eq!(split.difference(), None);
        assert!(!split.is_balanced());
        assert!(!split.can_confirm());
        assert!(matches!(
            split.begin_confirm(),
            Err(CoreError::Validation(ValidationError::AmountOutOfRange))
        ));
        assert_eq!(split.phase(), SplitPhase::Collecting);

        let summary = split.summary();
        assert!(!summary.balanced);
        assert_eq!(summary.label, "Suma: fuera de rango · Dif: fuera de rango");
    }

    #[test]
    fn test_overflowing_difference_is_not_balanced() {
        let mut split = open("-90000000000000000", &[1]);
        split.set_amount(1, "90000000000000000").unwrap();

        assert_eq!(split.difference(), None);
        assert!(!split.is_balanced());
        assert!(split.summary().label.ends_with("Dif: fuera de rango"));
    }

    #[test]
    fn test_autofill_overflow_leaves_amounts() {
        let mut split = open("-90000000000000000", &[1, 2]);
        split.set_amount(1, "90000000000000000").unwrap();
        split.set_amount(2, "5").unwrap();

        split.autofill_last();
        assert_eq!(split.amount_of(2), Some(Money::from_cents(500)));
    }

    #[test]
    fn test_allocation_wire_shape() {
        let mut split = open("10", &[4]);
        split.set_amount(4, "10").unwrap();
        let allocation = split.begin_confirm().unwrap();

        let json = serde_json::to_value(&allocation).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"medio_pago_id": 4, "orden": 0, "monto": 10.0}])
        );
    }

    #[test]
    fn test_unknown_member() {
        let mut split = open("10", &[1]);
        assert!(matches!(
            split.set_amount(9, "5"),
            Err(CoreError::UnknownMember(9))
        ));
    }

    #[test]
    fn test_confirm_in_flight_and_closed() {
        let mut split = open("10", &[1]);
        split.set_amount(1, "10").unwrap();
        split.begin_confirm().unwrap();

        assert!(matches!(split.begin_confirm(), Err(CoreError::SplitInFlight)));
        assert!(matches!(split.set_amount(1, "1"), Err(CoreError::SplitInFlight)));

        split.finish_confirm(true);
        assert_eq!(split.phase(), SplitPhase::Closed);
        assert!(matches!(split.begin_confirm(), Err(CoreError::SplitClosed)));
    }

    #[test]
    fn test_failed_confirm_keeps_amounts() {
        let mut split = open("10", &[1, 2]);
        split.set_amount(1, "4").unwrap();
        split.set_amount(2, "6").unwrap();
        split.begin_confirm().unwrap();

        split.finish_confirm(false);
        assert_eq!(split.phase(), SplitPhase::Collecting);
        assert_eq!(split.amount_of(2), Some(Money::from_cents(600)));
    }

    #[test]
    fn test_replace_components_zeroes_amounts() {
        let mut split = open("10", &[1, 2]);
        split.set_amount(1, "4").unwrap();
        split.replace_components(components(&[1, 3]));
        assert_eq!(split.amount_of(1), Some(Money::zero()));
        assert_eq!(split.amount_of(2), None);
    }

    #[test]
    fn test_unparseable_total_is_zero() {
        let split = open("abc", &[1]);
        assert_eq!(split.parsed_total(), Money::zero());
        assert!(split.is_balanced());
    }

    #[test]
    fn test_summary_label() {
        let mut split = open("1.234,56", &[1, 2]);
        split.set_amount(1, "1000").unwrap();
        split.set_amount(2, "234,55").unwrap();

        let summary = split.summary();
        assert!(summary.balanced);
        assert_eq!(summary.total_label, "$1.234,56");
        assert_eq!(summary.label, "Suma: $1234.55 · Dif: +0.01");
    }
}

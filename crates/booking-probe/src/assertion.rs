//! Assertions for scenario validation.
//!
//! Checks build an [`AssertionResult`]; [`AssertionResult::check`] turns a
//! failure into [`ProbeError::AssertionFailed`] so scenario bodies can use
//! `?` and stop at the first mismatch.

use crate::result::{ProbeError, ProbeResult};
use std::collections::BTreeMap;
use std::fmt::{self, Debug};

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Prefix the failure message with what was being checked
    #[must_use]
    pub fn context(mut self, what: &str) -> Self {
        if !self.passed {
            self.message = format!("{what}: {}", self.message);
        }
        self
    }

    /// `Ok` when passed, otherwise [`ProbeError::AssertionFailed`]
    pub fn check(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::assertion(self.message))
        }
    }
}

/// Assertion helpers for scenarios
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert a collection has expected length
    #[must_use]
    pub fn has_length<T>(collection: &[T], expected: usize) -> AssertionResult {
        if collection.len() == expected {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected length {expected}, got {}",
                collection.len()
            ))
        }
    }

    /// Assert two alert lists hold the same messages, ignoring order
    #[must_use]
    pub fn same_alerts(expected: &AlertSet, actual: &AlertSet) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected alerts {expected}, got {actual} (missing {}, unexpected {})",
                expected.without_all(actual),
                actual.without_all(expected)
            ))
        }
    }

    /// Assert `actual` shows at least every message of `expected`
    #[must_use]
    pub fn includes_alerts(expected: &AlertSet, actual: &AlertSet) -> AssertionResult {
        if actual.contains_all(expected) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected alerts to include {expected}, got {actual} (missing {})",
                expected.without_all(actual)
            ))
        }
    }

    /// Assert no message of `cleared` occurs in `actual` more often than
    /// `expected` still allows
    #[must_use]
    pub fn alerts_cleared(expected: &AlertSet, actual: &AlertSet, cleared: &[&str]) -> AssertionResult {
        let lingering: AlertSet = cleared
            .iter()
            .copied()
            .filter(|message| actual.count(message) > expected.count(message))
            .collect();
        if lingering.is_empty() {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("alerts {lingering} still shown in {actual}"))
        }
    }
}

/// Order-insensitive multiset of validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertSet {
    counts: BTreeMap<String, usize>,
}

impl AlertSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `message`
    pub fn insert(&mut self, message: impl Into<String>) {
        *self.counts.entry(message.into()).or_default() += 1;
    }

    /// Occurrences of `message`
    #[must_use]
    pub fn count(&self, message: &str) -> usize {
        self.counts.get(message).copied().unwrap_or(0)
    }

    /// Total number of messages, duplicates included
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    /// Whether there are no messages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Copy with one occurrence of each of `messages` removed
    #[must_use]
    pub fn without(&self, messages: &[&str]) -> Self {
        let mut out = self.clone();
        for message in messages {
            out.remove_one(message);
        }
        out
    }

    /// Copy with every occurrence in `other` removed
    #[must_use]
    pub fn without_all(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (message, &n) in &other.counts {
            for _ in 0..n {
                out.remove_one(message);
            }
        }
        out
    }

    /// Whether every message of `other` occurs here at least as often
    #[must_use]
    pub fn contains_all(&self, other: &Self) -> bool {
        other
            .counts
            .iter()
            .all(|(message, &n)| self.count(message) >= n)
    }

    fn remove_one(&mut self, message: &str) {
        if let Some(n) = self.counts.get_mut(message) {
            *n -= 1;
            if *n == 0 {
                let _ = self.counts.remove(message);
            }
        }
    }
}

impl<S: Into<String>> FromIterator<S> for AlertSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for message in iter {
            set.insert(message);
        }
        set
    }
}

impl fmt::Display for AlertSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .counts
            .iter()
            .map(|(message, &n)| {
                if n == 1 {
                    format!("'{message}'")
                } else {
                    format!("'{message}' x{n}")
                }
            })
            .collect();
        write!(f, "[{}]", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        ALERT_EMAIL_BLANK, ALERT_EMAIL_FORMAT, ALERT_FIRSTNAME_BLANK, ALERT_FIRSTNAME_SIZE,
        ALERT_PHONE_SIZE, EMPTY_FORM_ALERTS,
    };

    mod assertion_tests {
        use super::*;

        #[test]
        fn test_equals_and_check() {
            assert!(Assertion::equals(&1, &1).passed);
            let err = Assertion::equals("Double Room", "Suite Room")
                .context("room title")
                .check()
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Assertion failed: room title: expected \"Double Room\", got \"Suite Room\""
            );
        }

        #[test]
        fn test_contains() {
            assert!(Assertion::contains("£640", "640").passed);
            assert!(!Assertion::contains("£600", "640").passed);
        }

        #[test]
        fn test_length_and_truth() {
            assert!(Assertion::has_length(&[1, 2, 3], 3).passed);
            assert!(!Assertion::has_length(&[1], 3).passed);
            assert!(Assertion::is_true(true, "x").check().is_ok());
            assert_eq!(Assertion::is_true(false, "x").message, "x");
        }
    }

    mod alert_set_tests {
        use super::*;

        #[test]
        fn test_order_insensitive_with_duplicates() {
            let a: AlertSet = EMPTY_FORM_ALERTS.into_iter().collect();
            let b: AlertSet = EMPTY_FORM_ALERTS.into_iter().rev().collect();
            assert_eq!(a, b);
            assert_eq!(a.len(), 7);
            assert_eq!(a.count(ALERT_EMAIL_BLANK), 2);
        }

        #[test]
        fn test_without_removes_one_occurrence() {
            let all: AlertSet = EMPTY_FORM_ALERTS.into_iter().collect();
            let rest = all.without(&[ALERT_FIRSTNAME_BLANK, ALERT_FIRSTNAME_SIZE, ALERT_EMAIL_BLANK]);
            assert_eq!(rest.len(), 4);
            assert_eq!(rest.count(ALERT_EMAIL_BLANK), 1);
            assert!(all.contains_all(&rest));
            assert!(!rest.contains_all(&all));
        }

        #[test]
        fn test_same_alerts_reports_difference() {
            let expected: AlertSet = [ALERT_PHONE_SIZE].into_iter().collect();
            let actual: AlertSet = [ALERT_PHONE_SIZE, ALERT_EMAIL_BLANK].into_iter().collect();
            let result = Assertion::same_alerts(&expected, &actual);
            assert!(!result.passed);
            assert!(result.message.contains("unexpected ['must not be empty']"), "{}", result.message);
            assert!(Assertion::same_alerts(&expected, &expected.clone()).passed);
        }

        #[test]
        fn test_includes_alerts_tolerates_extra_messages() {
            let expected: AlertSet = EMPTY_FORM_ALERTS.into_iter().collect();
            let mut shown = expected.clone();
            shown.insert(ALERT_EMAIL_FORMAT);
            assert!(!Assertion::same_alerts(&expected, &shown).passed);
            assert!(Assertion::includes_alerts(&expected, &shown).passed);

            let short = expected.without(&[ALERT_PHONE_SIZE]);
            let result = Assertion::includes_alerts(&expected, &short);
            assert!(!result.passed);
            assert!(result.message.contains("missing ['size must be between 11 and 21']"), "{}", result.message);
        }

        #[test]
        fn test_alerts_cleared_counts_shared_messages() {
            let all: AlertSet = EMPTY_FORM_ALERTS.into_iter().collect();
            let expected = all.without(&[ALERT_EMAIL_BLANK]);
            // one "must not be empty" (phone) may remain
            let shown = expected.clone();
            assert!(Assertion::alerts_cleared(&expected, &shown, &[ALERT_EMAIL_BLANK]).passed);

            let result = Assertion::alerts_cleared(&expected, &all, &[ALERT_EMAIL_BLANK]);
            assert!(!result.passed);
            assert!(result.message.starts_with("alerts ['must not be empty']"), "{}", result.message);
        }

        #[test]
        fn test_display() {
            let set: AlertSet = ["b", "a", "b"].into_iter().collect();
            assert_eq!(set.to_string(), "['a', 'b' x2]");
            assert!(AlertSet::new().is_empty());
        }
    }
}

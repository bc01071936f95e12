//! Time order: the sorted table of named time points that anchors
//! alignable annotations.
//!
//! Time slots are referenced by identifier (`ts1`, `ts2`, ...) from
//! alignable annotations. Slots carry an optional millisecond value; EAF
//! permits unvalued slots, which never satisfy interval containment.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Extract the numeric suffix of an identifier like `a12` or `ts4`.
///
/// Non-digit characters are stripped; an identifier with no digits maps
/// to 0. Shared between time-slot and annotation identifiers.
pub(crate) fn numeric_suffix(id: &str) -> u64 {
    let digits: String = id.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// A named time point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Slot identifier, unique within the document.
    pub id: String,
    /// Time value in milliseconds, if the slot is valued.
    pub value: Option<u64>,
}

impl TimeSlot {
    /// Create a time slot.
    #[must_use]
    pub fn new(id: impl Into<String>, value: Option<u64>) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// Insertion-ordered table of time slots with id lookup.
///
/// Owns the last-used time-slot counter; new slots are minted as `ts{n}`
/// with `n` strictly greater than any suffix seen so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeOrder {
    slots: Vec<TimeSlot>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    last_slot_id: u64,
}

impl TimeOrder {
    /// Create an empty time order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the table holds no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in insertion (document) order.
    #[must_use]
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Insert a slot parsed from a document, keeping the id counter in sync.
    pub fn push_slot(&mut self, slot: TimeSlot) {
        let suffix = numeric_suffix(&slot.id);
        if suffix > self.last_slot_id {
            self.last_slot_id = suffix;
        }
        self.index.insert(slot.id.clone(), self.slots.len());
        self.slots.push(slot);
    }

    /// Mint a new slot with the given value and return its identifier.
    pub fn add_slot(&mut self, value: Option<u64>) -> String {
        self.last_slot_id += 1;
        let id = format!("ts{}", self.last_slot_id);
        self.index.insert(id.clone(), self.slots.len());
        self.slots.push(TimeSlot::new(id.clone(), value));
        id
    }

    /// Time value of a slot, if the slot exists and is valued.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<u64> {
        self.slot(id).and_then(|s| s.value)
    }

    /// Look up a slot by identifier.
    #[must_use]
    pub fn slot(&self, id: &str) -> Option<&TimeSlot> {
        match self.index.get(id) {
            Some(&i) => self.slots.get(i),
            // The index is skipped by serde; fall back to a scan so a
            // deserialized table still resolves ids.
            None => self.slots.iter().find(|s| s.id == id),
        }
    }

    /// Order two slots by value, ties broken by identifier suffix then id.
    ///
    /// Unvalued slots sort after valued ones.
    #[must_use]
    pub fn cmp_slots(&self, a: &str, b: &str) -> Ordering {
        match (self.value(a), self.value(b)) {
            (Some(va), Some(vb)) => va
                .cmp(&vb)
                .then_with(|| numeric_suffix(a).cmp(&numeric_suffix(b)))
                .then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => numeric_suffix(a)
                .cmp(&numeric_suffix(b))
                .then_with(|| a.cmp(b)),
        }
    }

    /// True if the interval `[inner.0, inner.1]` lies within
    /// `[outer.0, outer.1]` by time value.
    ///
    /// Any unvalued or unknown slot makes the comparison false.
    #[must_use]
    pub fn contains_interval(&self, outer: (&str, &str), inner: (&str, &str)) -> bool {
        let (Some(os), Some(oe)) = (self.value(outer.0), self.value(outer.1)) else {
            return false;
        };
        let (Some(is), Some(ie)) = (self.value(inner.0), self.value(inner.1)) else {
            return false;
        };
        os <= is && ie <= oe
    }

    /// Last time-slot counter value seen or minted.
    #[must_use]
    pub fn last_used_slot_id(&self) -> u64 {
        self.last_slot_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("a12"), 12);
        assert_eq!(numeric_suffix("ts4"), 4);
        assert_eq!(numeric_suffix("head"), 0);
    }

    #[test]
    fn test_mint_after_load() {
        let mut order = TimeOrder::new();
        order.push_slot(TimeSlot::new("ts7", Some(100)));
        order.push_slot(TimeSlot::new("ts2", Some(50)));
        assert_eq!(order.add_slot(Some(200)), "ts8");
        assert_eq!(order.value("ts8"), Some(200));
    }

    #[test]
    fn test_cmp_slots_by_value_then_id() {
        let mut order = TimeOrder::new();
        order.push_slot(TimeSlot::new("ts1", Some(100)));
        order.push_slot(TimeSlot::new("ts2", Some(100)));
        order.push_slot(TimeSlot::new("ts3", Some(50)));
        order.push_slot(TimeSlot::new("ts4", None));
        assert_eq!(order.cmp_slots("ts3", "ts1"), Ordering::Less);
        assert_eq!(order.cmp_slots("ts1", "ts2"), Ordering::Less);
        assert_eq!(order.cmp_slots("ts1", "ts4"), Ordering::Less);
    }

    #[test]
    fn test_contains_interval() {
        let mut order = TimeOrder::new();
        order.push_slot(TimeSlot::new("ts1", Some(0)));
        order.push_slot(TimeSlot::new("ts2", Some(500)));
        order.push_slot(TimeSlot::new("ts3", Some(700)));
        order.push_slot(TimeSlot::new("ts4", Some(1000)));
        order.push_slot(TimeSlot::new("ts5", None));
        assert!(order.contains_interval(("ts1", "ts4"), ("ts2", "ts3")));
        assert!(order.contains_interval(("ts1", "ts4"), ("ts1", "ts4")));
        assert!(!order.contains_interval(("ts2", "ts3"), ("ts1", "ts4")));
        assert!(!order.contains_interval(("ts1", "ts4"), ("ts2", "ts5")));
    }
}

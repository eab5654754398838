//! Sequence property and the live, index-addressable list it produces.

use std::fmt;
use std::ops::{Bound, RangeBounds};

use crate::errors::{ConformResult, Error};
use crate::schema::{Invalid, Position, SchemaNode};
use crate::value::Value;

use super::{MappingValue, Property, Slot};

/// Property for a homogeneous sequence node.
///
/// Building treats null as an empty sequence and pre-checks the container
/// shape; a bare scalar is accepted as a one-element sequence only when the
/// schema declares the toggle. Every element validates independently against
/// the shared element node, with per-index failures aggregated.
#[derive(Debug, Clone)]
pub struct SequenceProperty {
    node: SchemaNode,
    element: Box<Property>,
    accept_scalar: bool,
}

impl SequenceProperty {
    pub(crate) fn new(node: SchemaNode, element: Property, accept_scalar: bool) -> Self {
        Self {
            node,
            element: Box::new(element),
            accept_scalar,
        }
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// Validates `raw` and produces the live list.
    pub fn build(&self, raw: Value) -> ConformResult<SequenceValue> {
        let items = match raw {
            Value::Null => Vec::new(),
            Value::Sequence(items) | Value::Tuple(items) => items,
            other if self.accept_scalar => vec![other],
            other => {
                return Err(
                    Invalid::new(&self.node, format!("{} is not iterable", other)).into(),
                );
            }
        };

        let mut slots = Vec::with_capacity(items.len());
        let mut error = Invalid::root(&self.node);
        for (i, item) in items.into_iter().enumerate() {
            match self.element.build(item) {
                Ok(slot) => slots.push(slot),
                Err(Error::Invalid(e)) => error.add(Position::Index(i), e),
                Err(other) => return Err(other),
            }
        }
        if !error.is_empty() {
            return Err(error.into());
        }

        let sequence = SequenceValue {
            node: self.node.clone(),
            element: (*self.element).clone(),
            items: slots,
        };
        self.node.validate_value(&sequence.appstruct())?;
        Ok(sequence)
    }
}

/// A live, ordered, mutable list whose every element has passed the shared
/// element node's validation.
///
/// Mutating operations validate exactly what they insert and leave existing
/// elements untouched; read operations hand out plain values.
#[derive(Debug, Clone)]
pub struct SequenceValue {
    node: SchemaNode,
    element: Property,
    items: Vec<Slot>,
}

impl SequenceValue {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The element's validated slot, for live access to composite elements.
    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.items.get(index)
    }

    /// The element's plain value.
    pub fn value(&self, index: usize) -> Option<Value> {
        self.items.get(index).map(Slot::appstruct)
    }

    /// All plain values, in order.
    pub fn values(&self) -> Vec<Value> {
        self.items.iter().map(Slot::appstruct).collect()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.items
    }

    /// In-order iteration over plain values; the list itself can be
    /// iterated repeatedly.
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        self.items.iter().map(Slot::appstruct)
    }

    /// Replaces the element at `index`, validating the new value first.
    pub fn set(&mut self, index: usize, raw: Value) -> ConformResult<()> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let slot = self.build_element(index, raw)?;
        self.items[index] = slot;
        Ok(())
    }

    /// Appends a validated element; invalid input is rejected without
    /// mutating.
    pub fn push(&mut self, raw: Value) -> ConformResult<()> {
        let slot = self.build_element(self.items.len(), raw)?;
        self.items.push(slot);
        Ok(())
    }

    /// Appends every item, all-or-nothing: each is validated (failures
    /// aggregated by its would-be index) before any is committed.
    pub fn extend<I: IntoIterator<Item = Value>>(&mut self, items: I) -> ConformResult<()> {
        let mut new_slots = Vec::new();
        let mut error = Invalid::root(&self.node);
        for (offset, item) in items.into_iter().enumerate() {
            match self.element.build(item) {
                Ok(slot) => new_slots.push(slot),
                Err(Error::Invalid(e)) => {
                    error.add(Position::Index(self.items.len() + offset), e);
                }
                Err(other) => return Err(other),
            }
        }
        if !error.is_empty() {
            return Err(error.into());
        }
        self.items.append(&mut new_slots);
        Ok(())
    }

    /// Inserts a validated element at `index`, shifting the tail right.
    pub fn insert(&mut self, index: usize, raw: Value) -> ConformResult<()> {
        if index > self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let slot = self.build_element(index, raw)?;
        self.items.insert(index, slot);
        Ok(())
    }

    /// Removes the element at `index`.
    pub fn delete(&mut self, index: usize) -> ConformResult<()> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.remove(index);
        Ok(())
    }

    /// Removes every element in `range` (clamped to the current length).
    pub fn delete_range<R: RangeBounds<usize>>(&mut self, range: R) {
        let (start, end) = self.clamp(range);
        self.items.drain(start..end);
    }

    /// Removes and returns the last element's plain value.
    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop().map(|slot| slot.appstruct())
    }

    /// Removes and returns the plain value at `index`.
    pub fn pop_at(&mut self, index: usize) -> ConformResult<Value> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index).appstruct())
    }

    /// Removes the first occurrence of `value`; a miss is a not-found
    /// condition, not a validation error.
    pub fn remove_value(&mut self, value: &Value) -> ConformResult<()> {
        let index = self
            .items
            .iter()
            .position(|slot| slot.appstruct() == *value)
            .ok_or(Error::NotFound)?;
        self.items.remove(index);
        Ok(())
    }

    /// Occurrences of `value`, by plain-value equality.
    pub fn count(&self, value: &Value) -> usize {
        self.items
            .iter()
            .filter(|slot| slot.appstruct() == *value)
            .count()
    }

    /// Index of the first occurrence of `value` in `[start, stop)`; `stop`
    /// of `None` searches to the end.
    pub fn position(
        &self,
        value: &Value,
        start: usize,
        stop: Option<usize>,
    ) -> ConformResult<usize> {
        let stop = stop.unwrap_or(self.items.len()).min(self.items.len());
        let start = start.min(stop);
        self.items[start..stop]
            .iter()
            .position(|slot| slot.appstruct() == *value)
            .map(|offset| start + offset)
            .ok_or(Error::NotFound)
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|slot| slot.appstruct() == *value)
    }

    /// In-place order reversal; no values change, so nothing re-validates.
    pub fn reverse(&mut self) {
        self.items.reverse();
    }

    /// Plain values in `range` (clamped).
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Vec<Value> {
        let (start, end) = self.clamp(range);
        self.items[start..end].iter().map(Slot::appstruct).collect()
    }

    /// Replaces `range` with `replacement`, all-or-nothing: every new item
    /// validates (failures keyed by its position within the replacement
    /// list) before any element is committed.
    pub fn splice<R: RangeBounds<usize>>(
        &mut self,
        range: R,
        replacement: Vec<Value>,
    ) -> ConformResult<()> {
        let (start, end) = self.clamp(range);
        let mut new_slots = Vec::with_capacity(replacement.len());
        let mut error = Invalid::root(&self.node);
        for (i, item) in replacement.into_iter().enumerate() {
            match self.element.build(item) {
                Ok(slot) => new_slots.push(slot),
                Err(Error::Invalid(e)) => error.add(Position::Index(i), e),
                Err(other) => return Err(other),
            }
        }
        if !error.is_empty() {
            return Err(error.into());
        }
        self.items.splice(start..end, new_slots);
        Ok(())
    }

    /// Live access to a sequence-shaped element.
    pub fn sequence_at(&self, index: usize) -> ConformResult<&SequenceValue> {
        match self.slot_at(index)? {
            Slot::Sequence(s) => Ok(s),
            other => Err(wrong_shape(index, "sequence", other)),
        }
    }

    pub fn sequence_at_mut(&mut self, index: usize) -> ConformResult<&mut SequenceValue> {
        match self.slot_at_mut(index)? {
            Slot::Sequence(s) => Ok(s),
            other => Err(wrong_shape(index, "sequence", other)),
        }
    }

    /// Live access to a mapping-shaped element.
    pub fn mapping_at(&self, index: usize) -> ConformResult<&MappingValue> {
        match self.slot_at(index)? {
            Slot::Mapping(m) => Ok(m),
            other => Err(wrong_shape(index, "mapping", other)),
        }
    }

    pub fn mapping_at_mut(&mut self, index: usize) -> ConformResult<&mut MappingValue> {
        match self.slot_at_mut(index)? {
            Slot::Mapping(m) => Ok(m),
            other => Err(wrong_shape(index, "mapping", other)),
        }
    }

    /// The plain nested representation.
    pub fn appstruct(&self) -> Value {
        Value::Sequence(self.values())
    }

    fn build_element(&self, index: usize, raw: Value) -> ConformResult<Slot> {
        match self.element.build(raw) {
            Ok(slot) => Ok(slot),
            Err(Error::Invalid(e)) => {
                let mut root = Invalid::root(&self.node);
                root.add(Position::Index(index), e);
                Err(root.into())
            }
            Err(other) => Err(other),
        }
    }

    fn slot_at(&self, index: usize) -> ConformResult<&Slot> {
        let len = self.items.len();
        self.items
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    fn slot_at_mut(&mut self, index: usize) -> ConformResult<&mut Slot> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    fn clamp<R: RangeBounds<usize>>(&self, range: R) -> (usize, usize) {
        let len = self.items.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e + 1,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        let start = start.min(len);
        let end = end.min(len).max(start);
        (start, end)
    }
}

impl PartialEq for SequenceValue {
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

impl PartialEq<Vec<Value>> for SequenceValue {
    fn eq(&self, other: &Vec<Value>) -> bool {
        self.values() == *other
    }
}

impl PartialEq<[Value]> for SequenceValue {
    fn eq(&self, other: &[Value]) -> bool {
        self.values() == other
    }
}

impl PartialOrd<Vec<Value>> for SequenceValue {
    fn partial_cmp(&self, other: &Vec<Value>) -> Option<std::cmp::Ordering> {
        self.values().partial_cmp(other)
    }
}

impl fmt::Display for SequenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.appstruct())
    }
}

impl<'a> IntoIterator for &'a SequenceValue {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values().into_iter()
    }
}

fn wrong_shape(index: usize, expected: &'static str, actual: &Slot) -> Error {
    Error::WrongShape {
        location: format!("[{}]", index),
        expected,
        actual: actual.kind(),
    }
}

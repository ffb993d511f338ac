//! Reference-counted heap
//!
//! This module provides the heap the simulator allocates objects and arrays
//! on:
//! - Entries keyed by [`Address`], each with a type, a structured value and a
//!   reference count
//! - Allocation starts an entry at `ref_count == 1` (its first holder)
//! - [`Heap::retain`] / [`Heap::release`] adjust the count; an entry is removed
//!   exactly when its count reaches zero
//! - Collecting an array releases every reference its elements hold, which may
//!   in turn collect those referents
//!
//! There is no cycle detection. Objects only hold primitive fields and arrays
//! only hold primitives or object references, so no cycle can be built.

use super::address::Address;
use super::value::Value;
use crate::interpreter::errors::MemoryError;
use crate::parser::ast::{DeclaredType, PrimitiveType};
use rustc_hash::FxHashMap;
use tracing::trace;

/// Named, typed field of a heap object
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: PrimitiveType,
    pub value: Value,
}

/// Structured contents of a heap entry
#[derive(Debug, Clone, PartialEq)]
pub enum HeapValue {
    Object(Vec<Field>), // Constructor order
    Array(Vec<Value>),
}

impl HeapValue {
    /// Addresses this value holds references to, one per holder.
    pub fn references(&self) -> Vec<Address> {
        match self {
            HeapValue::Object(fields) => fields
                .iter()
                .filter_map(|field| field.value.referent().cloned())
                .collect(),
            HeapValue::Array(elements) => elements
                .iter()
                .filter_map(|element| element.referent().cloned())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HeapValue::Object(fields) => fields.len(),
            HeapValue::Array(elements) => elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A live heap allocation
#[derive(Debug, Clone, PartialEq)]
pub struct HeapEntry {
    pub address: Address,
    pub entry_type: DeclaredType,
    pub value: HeapValue,
    pub ref_count: usize,
    pub sequence: u64, // Allocation order, for display
}

/// The heap
#[derive(Debug, Clone)]
pub struct Heap {
    entries: FxHashMap<Address, HeapEntry>,
    next_sequence: u64,
    max_entries: usize,
}

impl Heap {
    /// Create a new heap with a maximum number of live entries
    pub fn new(max_entries: usize) -> Self {
        Heap {
            entries: FxHashMap::default(),
            next_sequence: 0,
            max_entries,
        }
    }

    /// Whether `count` more entries fit under the limit
    pub fn has_capacity(&self, count: usize) -> bool {
        self.entries.len() + count <= self.max_entries
    }

    /// Allocate an entry with a reference count of one.
    ///
    /// References held by `value` must already have been retained by the
    /// caller.
    pub fn allocate(
        &mut self,
        address: Address,
        entry_type: DeclaredType,
        value: HeapValue,
    ) -> Result<(), MemoryError> {
        if !self.has_capacity(1) {
            return Err(MemoryError::OutOfHeap {
                limit: self.max_entries,
            });
        }
        if self.entries.contains_key(&address) {
            return Err(MemoryError::InvariantViolation(format!(
                "address {} allocated twice",
                address
            )));
        }

        trace!(%address, %entry_type, "heap allocate");
        let entry = HeapEntry {
            address: address.clone(),
            entry_type,
            value,
            ref_count: 1,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.entries.insert(address, entry);
        Ok(())
    }

    /// Add one holder to an entry. Returns the new count.
    pub fn retain(&mut self, address: &Address) -> Result<usize, MemoryError> {
        let entry = self
            .entries
            .get_mut(address)
            .ok_or_else(|| MemoryError::dangling(address))?;
        entry.ref_count += 1;
        trace!(%address, ref_count = entry.ref_count, "heap retain");
        Ok(entry.ref_count)
    }

    /// Remove one holder from an entry, collecting it at zero.
    ///
    /// Returns every entry collected as a consequence, in collection order
    /// (the entry itself first, then anything only it kept alive).
    pub fn release(&mut self, address: &Address) -> Result<Vec<HeapEntry>, MemoryError> {
        let mut collected = Vec::new();
        let mut pending = vec![address.clone()];

        while let Some(address) = pending.pop() {
            let entry = self
                .entries
                .get_mut(&address)
                .ok_or_else(|| MemoryError::dangling(&address))?;
            entry.ref_count = entry.ref_count.checked_sub(1).ok_or_else(|| {
                MemoryError::InvariantViolation(format!("negative reference count at {}", address))
            })?;
            trace!(%address, ref_count = entry.ref_count, "heap release");

            if entry.ref_count == 0 {
                if let Some(entry) = self.entries.remove(&address) {
                    trace!(%address, "heap collect");
                    // Push in reverse so elements are released front to back
                    pending.extend(entry.value.references().into_iter().rev());
                    collected.push(entry);
                }
            }
        }

        Ok(collected)
    }

    pub fn get(&self, address: &Address) -> Option<&HeapEntry> {
        self.entries.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.entries.contains_key(address)
    }

    /// Live entries in allocation order (for display)
    pub fn entries(&self) -> Vec<&HeapEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

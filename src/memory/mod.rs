//! Memory model for the simulator
//!
//! This module provides the authoritative store every command mutates:
//! - [`address`]: Deterministic address tokens and the allocation counter
//! - [`value`]: Runtime value representation (primitives, references, null)
//! - [`stack`]: Call stack with frames and declared slots
//! - [`heap`]: Reference-counted heap with cascading collection
//!
//! # Reference Discipline
//!
//! Every non-null reference held by a slot or by an array element counts as one
//! holder of its referent. Rebinding a reference releases the old referent
//! before the new one is retained, and leaving a frame releases every
//! reference it holds before the frame is popped. An entry disappears exactly
//! when its count reaches zero.
//!
//! # Atomicity
//!
//! Every operation checks names, types and limits before the first mutation,
//! so a failed call leaves the model exactly as it was.

pub mod address;
pub mod heap;
pub mod stack;
pub mod value;

use crate::config::SimConfig;
use crate::interpreter::errors::MemoryError;
use crate::parser::ast::{DeclaredType, PrimitiveType};
use crate::snapshot::Snapshot;
use address::{Address, AddressGenerator};
use heap::{Field, Heap, HeapEntry, HeapValue};
use rustc_hash::FxHashMap;
use stack::{Stack, StackFrame, StackSlot};
use tracing::trace;
use value::Value;

/// One element of an array declaration after literal typing
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    /// Already typed literal (or `null`)
    Value(Value),
    /// Name of a variable in the declaring frame
    Variable(String),
}

/// A frame that was left, with everything its departure collected
#[derive(Debug, Clone, PartialEq)]
pub struct LeftFrame {
    pub frame: StackFrame,
    pub collected: Vec<HeapEntry>,
}

/// The simulator's stack and heap
#[derive(Debug, Clone)]
pub struct MemoryModel {
    stack: Stack,
    heap: Heap,
    addresses: AddressGenerator,
    max_frames: usize,
}

impl MemoryModel {
    pub fn new(config: &SimConfig) -> Self {
        MemoryModel {
            stack: Stack::new(&config.root_frame_name),
            heap: Heap::new(config.max_heap_entries),
            addresses: AddressGenerator::new(),
            max_frames: config.max_frames,
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Id of the innermost frame
    pub fn current_frame_id(&self) -> usize {
        self.stack.current_frame().id
    }

    fn frame(&self, frame: usize) -> Result<&StackFrame, MemoryError> {
        self.stack.frame(frame).ok_or(MemoryError::UnknownFrame(frame))
    }

    fn frame_mut(&mut self, frame: usize) -> Result<&mut StackFrame, MemoryError> {
        self.stack.frame_mut(frame).ok_or(MemoryError::UnknownFrame(frame))
    }

    /// Look up a declared variable in one frame
    pub fn lookup(&self, frame: usize, name: &str) -> Result<&StackSlot, MemoryError> {
        let owner = self.frame(frame)?;
        owner
            .get_slot(name)
            .ok_or_else(|| MemoryError::UndefinedVariable {
                name: name.to_string(),
                frame: owner.name.clone(),
            })
    }

    /// Declared type of a variable, for typing right-hand sides against it
    pub fn slot_type(&self, frame: usize, name: &str) -> Result<&DeclaredType, MemoryError> {
        self.lookup(frame, name).map(|slot| &slot.declared_type)
    }

    fn ensure_free(&self, frame: usize, name: &str) -> Result<(), MemoryError> {
        let owner = self.frame(frame)?;
        if owner.contains(name) {
            return Err(MemoryError::DuplicateVariable {
                name: name.to_string(),
                frame: owner.name.clone(),
            });
        }
        Ok(())
    }

    fn ensure_heap_room(&self) -> Result<(), MemoryError> {
        if self.heap.has_capacity(1) {
            Ok(())
        } else {
            Err(MemoryError::OutOfHeap {
                limit: self.heap.max_entries(),
            })
        }
    }

    /// Append a slot with a fresh address. All checks are done by the caller.
    fn push_slot(
        &mut self,
        frame: usize,
        name: &str,
        declared_type: DeclaredType,
        value: Value,
    ) -> Result<Address, MemoryError> {
        let address = self.addresses.next();
        trace!(frame, variable = name, %address, %declared_type, "declare slot");
        let slot = StackSlot::new(address.clone(), name.to_string(), declared_type, value);
        self.frame_mut(frame)?.push_slot(slot);
        Ok(address)
    }

    // ========== Declarations ==========

    /// Declare a primitive variable holding an already typed value
    pub fn declare_scalar(
        &mut self,
        frame: usize,
        name: &str,
        scalar_type: PrimitiveType,
        value: Value,
    ) -> Result<Address, MemoryError> {
        self.ensure_free(frame, name)?;
        if value.is_reference() {
            return Err(MemoryError::IncompatibleTypes {
                target: name.to_string(),
                target_type: scalar_type.to_string(),
                source_type: "a reference".to_string(),
            });
        }
        self.push_slot(
            frame,
            name,
            DeclaredType::Primitive(scalar_type),
            value.widen_to(scalar_type),
        )
    }

    /// Declare a reference variable that refers to nothing
    pub fn declare_null(
        &mut self,
        frame: usize,
        name: &str,
        reference_type: DeclaredType,
    ) -> Result<Address, MemoryError> {
        self.ensure_free(frame, name)?;
        if !reference_type.is_reference() {
            return Err(MemoryError::IncompatibleTypes {
                target: name.to_string(),
                target_type: reference_type.to_string(),
                source_type: "null".to_string(),
            });
        }
        self.push_slot(frame, name, reference_type, Value::Null)
    }

    /// Construct an object on the heap and declare a variable referring to it.
    ///
    /// Returns the heap address of the new object.
    pub fn declare_object(
        &mut self,
        frame: usize,
        name: &str,
        type_name: &str,
        fields: Vec<Field>,
    ) -> Result<Address, MemoryError> {
        self.ensure_free(frame, name)?;
        self.ensure_heap_room()?;

        let entry_type = DeclaredType::Object(type_name.to_string());
        let heap_address = self.addresses.next();
        self.heap
            .allocate(heap_address.clone(), entry_type.clone(), HeapValue::Object(fields))?;
        self.push_slot(frame, name, entry_type, Value::ObjectRef(heap_address.clone()))?;
        Ok(heap_address)
    }

    /// Construct an array on the heap and declare a variable referring to it.
    ///
    /// Variable elements are resolved in `frame` and copied: primitives by
    /// value, references by retaining their referent. Returns the heap address
    /// of the new array.
    pub fn declare_array(
        &mut self,
        frame: usize,
        name: &str,
        element_type: DeclaredType,
        elements: Vec<ArrayElement>,
    ) -> Result<Address, MemoryError> {
        self.ensure_free(frame, name)?;
        self.ensure_heap_room()?;

        let mut values = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            let value = match element {
                ArrayElement::Value(value) => value,
                ArrayElement::Variable(source) => {
                    let slot = self.lookup(frame, &source)?;
                    if !element_type.accepts(&slot.declared_type) {
                        return Err(MemoryError::IncompatibleTypes {
                            target: format!("{}[{}]", name, index),
                            target_type: element_type.to_string(),
                            source_type: slot.declared_type.to_string(),
                        });
                    }
                    match element_type.as_primitive() {
                        Some(primitive) => slot.value.clone().widen_to(primitive),
                        None => slot.value.clone(),
                    }
                }
            };
            values.push(value);
        }

        for referent in values.iter().filter_map(Value::referent) {
            self.heap.retain(referent)?;
        }

        let array_type = DeclaredType::array_of(element_type);
        let heap_address = self.addresses.next();
        self.heap
            .allocate(heap_address.clone(), array_type.clone(), HeapValue::Array(values))?;
        self.push_slot(frame, name, array_type, Value::ArrayRef(heap_address.clone()))?;
        Ok(heap_address)
    }

    /// Declare a variable initialized from an existing one.
    ///
    /// Primitives are copied by value; references share the referent, which
    /// gains a holder.
    pub fn declare_reference(
        &mut self,
        frame: usize,
        name: &str,
        declared_type: DeclaredType,
        source: &str,
    ) -> Result<Address, MemoryError> {
        self.ensure_free(frame, name)?;
        let slot = self.lookup(frame, source)?;
        if !declared_type.accepts(&slot.declared_type) {
            return Err(MemoryError::IncompatibleTypes {
                target: name.to_string(),
                target_type: declared_type.to_string(),
                source_type: slot.declared_type.to_string(),
            });
        }
        let value = match declared_type.as_primitive() {
            Some(primitive) => slot.value.clone().widen_to(primitive),
            None => slot.value.clone(),
        };

        if let Some(referent) = value.referent() {
            self.heap.retain(referent)?;
        }
        self.push_slot(frame, name, declared_type, value)
    }

    // ========== Assignment ==========

    /// Copy `source` into `target`, both resolved in `frame`.
    ///
    /// Returns whatever rebinding a reference collected.
    pub fn assign(
        &mut self,
        frame: usize,
        target: &str,
        source: &str,
    ) -> Result<Vec<HeapEntry>, MemoryError> {
        let target_type = self.slot_type(frame, target)?.clone();
        let source_slot = self.lookup(frame, source)?;
        if !target_type.accepts(&source_slot.declared_type) {
            return Err(MemoryError::IncompatibleTypes {
                target: target.to_string(),
                target_type: target_type.to_string(),
                source_type: source_slot.declared_type.to_string(),
            });
        }

        match target_type.as_primitive() {
            Some(primitive) => {
                let value = source_slot.value.clone().widen_to(primitive);
                self.overwrite(frame, target, value)?;
                Ok(Vec::new())
            }
            None => {
                let value = source_slot.value.clone();
                self.rebind(frame, target, value, true)
            }
        }
    }

    /// Overwrite a primitive variable with an already typed literal
    pub fn assign_literal(
        &mut self,
        frame: usize,
        target: &str,
        value_type: PrimitiveType,
        value: Value,
    ) -> Result<(), MemoryError> {
        let target_type = self.slot_type(frame, target)?.clone();
        let primitive = target_type
            .as_primitive()
            .filter(|primitive| primitive.accepts(value_type) && !value.is_reference())
            .ok_or_else(|| MemoryError::IncompatibleTypes {
                target: target.to_string(),
                target_type: target_type.to_string(),
                source_type: value_type.to_string(),
            })?;
        self.overwrite(frame, target, value.widen_to(primitive))
    }

    /// Make a reference variable refer to nothing, releasing its referent
    pub fn assign_null(&mut self, frame: usize, target: &str) -> Result<Vec<HeapEntry>, MemoryError> {
        let target_type = self.slot_type(frame, target)?;
        if !target_type.is_reference() {
            return Err(MemoryError::IncompatibleTypes {
                target: target.to_string(),
                target_type: target_type.to_string(),
                source_type: "null".to_string(),
            });
        }
        self.rebind(frame, target, Value::Null, true)
    }

    /// Construct an object and rebind `target` to it.
    ///
    /// Returns the heap address of the new object.
    pub fn assign_new_object(
        &mut self,
        frame: usize,
        target: &str,
        type_name: &str,
        fields: Vec<Field>,
    ) -> Result<Address, MemoryError> {
        let target_type = self.slot_type(frame, target)?;
        let entry_type = DeclaredType::Object(type_name.to_string());
        if *target_type != entry_type {
            return Err(MemoryError::IncompatibleTypes {
                target: target.to_string(),
                target_type: target_type.to_string(),
                source_type: entry_type.to_string(),
            });
        }
        self.ensure_heap_room()?;

        let heap_address = self.addresses.next();
        // The new entry starts with the target as its only holder
        self.heap
            .allocate(heap_address.clone(), entry_type, HeapValue::Object(fields))?;
        self.rebind(frame, target, Value::ObjectRef(heap_address.clone()), false)?;
        Ok(heap_address)
    }

    fn overwrite(&mut self, frame: usize, target: &str, value: Value) -> Result<(), MemoryError> {
        let owner = self.frame_mut(frame)?;
        let frame_name = owner.name.clone();
        let slot = owner
            .get_slot_mut(target)
            .ok_or_else(|| MemoryError::UndefinedVariable {
                name: target.to_string(),
                frame: frame_name,
            })?;
        slot.value = value;
        Ok(())
    }

    /// Point a reference slot at `value`: release the old referent first, then
    /// retain the new one (unless the caller already counted it).
    fn rebind(
        &mut self,
        frame: usize,
        target: &str,
        value: Value,
        retain_new: bool,
    ) -> Result<Vec<HeapEntry>, MemoryError> {
        let old = self.lookup(frame, target)?.value.clone();
        if old == value {
            return Ok(Vec::new());
        }

        let collected = match old.referent() {
            Some(referent) => self.heap.release(referent)?,
            None => Vec::new(),
        };
        if retain_new {
            if let Some(referent) = value.referent() {
                self.heap.retain(referent)?;
            }
        }
        self.overwrite(frame, target, value)?;
        Ok(collected)
    }

    // ========== Scopes ==========

    /// Push a new, empty frame and return its id
    pub fn enter_frame(&mut self, name: &str) -> Result<usize, MemoryError> {
        if self.stack.depth() >= self.max_frames {
            return Err(MemoryError::StackOverflow {
                limit: self.max_frames,
            });
        }
        let id = self.stack.push_frame(name);
        trace!(id, frame_name = name, "frame pushed");
        Ok(id)
    }

    /// Release every reference held by the innermost frame, then pop it.
    ///
    /// The root frame can never be left.
    pub fn leave_frame(&mut self) -> Result<LeftFrame, MemoryError> {
        if self.stack.depth() <= 1 {
            return Err(MemoryError::RootFrameExit(
                self.stack.root_frame().name.clone(),
            ));
        }

        let held = self.stack.current_frame().held_references();
        let mut collected = Vec::new();
        for referent in held {
            collected.extend(self.heap.release(&referent)?);
        }

        let frame = self.stack.pop_frame().ok_or_else(|| {
            MemoryError::InvariantViolation("frame vanished while leaving".to_string())
        })?;
        trace!(id = frame.id, frame_name = %frame.name, collected = collected.len(), "frame popped");
        Ok(LeftFrame { frame, collected })
    }

    // ========== Inspection ==========

    /// Read-only view of every frame and every live heap entry
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.stack, &self.heap)
    }

    /// Recount every holder and compare with the stored reference counts.
    ///
    /// Fails on a count mismatch, a zero-count entry, a dangling reference or
    /// a slot whose value does not fit its declared type.
    pub fn check_invariants(&self) -> Result<(), MemoryError> {
        let mut holders: FxHashMap<Address, usize> = FxHashMap::default();

        for frame in self.stack.frames() {
            for slot in frame.slots() {
                if slot.is_reference() != slot.value.is_reference() {
                    return Err(MemoryError::InvariantViolation(format!(
                        "slot '{}' of type {} holds {}",
                        slot.name, slot.declared_type, slot.value
                    )));
                }
                if let Some(referent) = slot.value.referent() {
                    *holders.entry(referent.clone()).or_default() += 1;
                }
            }
        }
        for entry in self.heap.entries() {
            for referent in entry.value.references() {
                *holders.entry(referent).or_default() += 1;
            }
        }

        if let Some(address) = holders.keys().find(|address| !self.heap.contains(address)) {
            return Err(MemoryError::dangling(address));
        }
        for entry in self.heap.entries() {
            let expected = holders.get(&entry.address).copied().unwrap_or(0);
            if entry.ref_count == 0 || entry.ref_count != expected {
                return Err(MemoryError::InvariantViolation(format!(
                    "{} has ref_count {} but {} holders",
                    entry.address, entry.ref_count, expected
                )));
            }
        }
        Ok(())
    }
}

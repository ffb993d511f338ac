//! Call stack implementation
//!
//! This module provides the call stack the simulator mutates:
//! - [`Stack`]: The ordered list of frames, oldest first
//! - [`StackFrame`]: One lexical scope with its slots in declaration order
//! - [`StackSlot`]: A declared variable with its own address
//!
//! The root frame is created with the stack and can never be popped. Frame ids
//! increase monotonically and are never reused, even after a frame is left.

use super::address::Address;
use super::value::Value;
use crate::parser::ast::DeclaredType;

/// One declared variable inside a frame
#[derive(Debug, Clone, PartialEq)]
pub struct StackSlot {
    pub address: Address, // Fixed at declaration
    pub name: String,
    pub declared_type: DeclaredType,
    pub value: Value,
}

impl StackSlot {
    pub fn new(address: Address, name: String, declared_type: DeclaredType, value: Value) -> Self {
        StackSlot {
            address,
            name,
            declared_type,
            value,
        }
    }

    /// Reference slots hold a heap address (or null) instead of a primitive.
    pub fn is_reference(&self) -> bool {
        self.declared_type.is_reference()
    }
}

/// Stack frame for one scope
#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    pub id: usize,
    pub name: String,
    slots: Vec<StackSlot>, // Declaration order
}

impl StackFrame {
    pub fn new(id: usize, name: String) -> Self {
        StackFrame {
            id,
            name,
            slots: Vec::new(),
        }
    }

    pub fn slots(&self) -> &[StackSlot] {
        &self.slots
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_slot(name).is_some()
    }

    pub fn get_slot(&self, name: &str) -> Option<&StackSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn get_slot_mut(&mut self, name: &str) -> Option<&mut StackSlot> {
        self.slots.iter_mut().find(|slot| slot.name == name)
    }

    /// Append a slot. The caller has already checked the name is free.
    pub(crate) fn push_slot(&mut self, slot: StackSlot) {
        debug_assert!(!self.contains(&slot.name), "duplicate slot {}", slot.name);
        self.slots.push(slot);
    }

    /// Every heap address held by this frame's slots, in declaration order.
    pub fn held_references(&self) -> Vec<Address> {
        self.slots
            .iter()
            .filter_map(|slot| slot.value.referent().cloned())
            .collect()
    }
}

/// The call stack
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    frames: Vec<StackFrame>,
    next_frame_id: usize,
}

impl Stack {
    /// Create a stack holding only the root frame (id 0).
    pub fn new(root_name: &str) -> Self {
        Stack {
            frames: vec![StackFrame::new(0, root_name.to_string())],
            next_frame_id: 1,
        }
    }

    /// Push a new, empty frame and return its id
    pub fn push_frame(&mut self, name: &str) -> usize {
        let id = self.next_frame_id;
        self.next_frame_id += 1;
        self.frames.push(StackFrame::new(id, name.to_string()));
        id
    }

    /// Pop the top frame. The root frame is never popped.
    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Get the current (top) frame
    pub fn current_frame(&self) -> &StackFrame {
        // The root frame is never popped, so there is always a last frame
        &self.frames[self.frames.len() - 1]
    }

    pub fn root_frame(&self) -> &StackFrame {
        &self.frames[0]
    }

    pub fn frame(&self, id: usize) -> Option<&StackFrame> {
        self.frames.iter().find(|frame| frame.id == id)
    }

    pub fn frame_mut(&mut self, id: usize) -> Option<&mut StackFrame> {
        self.frames.iter_mut().find(|frame| frame.id == id)
    }

    /// Get all frames, oldest first (for display)
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Get the depth of the call stack
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::address::address_for;
    use crate::parser::ast::PrimitiveType;

    fn int_slot(seed: f64, name: &str, value: i64) -> StackSlot {
        StackSlot::new(
            address_for(seed),
            name.to_string(),
            DeclaredType::Primitive(PrimitiveType::Int),
            Value::Int(value),
        )
    }

    #[test]
    fn test_root_frame_is_permanent() {
        let mut stack = Stack::new("main");

        assert_eq!(stack.depth(), 1);
        assert!(stack.pop_frame().is_none());
        assert_eq!(stack.current_frame().name, "main");
        assert_eq!(stack.current_frame().id, 0);
    }

    #[test]
    fn test_frame_ids_are_never_reused() {
        let mut stack = Stack::new("main");

        assert_eq!(stack.push_frame("foo"), 1);
        assert_eq!(stack.pop_frame().map(|f| f.name), Some("foo".to_string()));
        assert_eq!(stack.push_frame("bar"), 2);
        assert_eq!(stack.current_frame().name, "bar");
        assert!(stack.frame(1).is_none());
    }

    #[test]
    fn test_slots_keep_declaration_order() {
        let mut frame = StackFrame::new(0, "main".into());
        frame.push_slot(int_slot(1.0, "b", 1));
        frame.push_slot(int_slot(2.0, "a", 2));

        let names: Vec<_> = frame.slots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(frame.contains("a"));
        assert!(!frame.contains("c"));

        frame.get_slot_mut("a").unwrap().value = Value::Int(9);
        assert_eq!(frame.get_slot("a").unwrap().value, Value::Int(9));
    }

    #[test]
    fn test_held_references() {
        let mut frame = StackFrame::new(0, "main".into());
        let object = DeclaredType::Object("object".into());
        frame.push_slot(int_slot(1.0, "x", 1));
        frame.push_slot(StackSlot::new(
            address_for(2.0),
            "p".into(),
            object.clone(),
            Value::ObjectRef(address_for(3.0)),
        ));
        frame.push_slot(StackSlot::new(address_for(4.0), "q".into(), object, Value::Null));

        assert_eq!(frame.held_references(), vec![address_for(3.0)]);
        assert!(frame.get_slot("q").unwrap().is_reference());
        assert!(!frame.get_slot("x").unwrap().is_reference());
    }
}

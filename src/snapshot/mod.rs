// Read-only views of the memory model, the browsing history and the command transcript

use crate::interpreter::engine::Outcome;
use crate::memory::address::Address;
use crate::memory::heap::{Heap, HeapValue};
use crate::memory::stack::Stack;
use crate::memory::value::Value;
use crate::parser::ast::DeclaredType;
use std::collections::VecDeque;
use std::fmt;

/// One declared variable as seen from outside the model
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub address: Address,
    pub name: String,
    pub declared_type: DeclaredType,
    pub is_reference: bool,
    pub value: Value, // Inline primitive, referenced address, or null
}

/// One frame as seen from outside the model
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub id: usize,
    pub name: String,
    pub slots: Vec<SlotView>, // Declaration order
}

impl FrameView {
    pub fn slot(&self, name: &str) -> Option<&SlotView> {
        self.slots.iter().find(|slot| slot.name == name)
    }
}

/// One live heap entry as seen from outside the model
#[derive(Debug, Clone, PartialEq)]
pub struct HeapView {
    pub address: Address,
    pub entry_type: DeclaredType,
    pub ref_count: usize,
    pub value: HeapValue,
}

/// Snapshot of the whole model: frames oldest first, heap in allocation order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub frames: Vec<FrameView>,
    pub heap: Vec<HeapView>,
}

impl Snapshot {
    pub(crate) fn capture(stack: &Stack, heap: &Heap) -> Self {
        let frames = stack
            .frames()
            .iter()
            .map(|frame| FrameView {
                id: frame.id,
                name: frame.name.clone(),
                slots: frame
                    .slots()
                    .iter()
                    .map(|slot| SlotView {
                        address: slot.address.clone(),
                        name: slot.name.clone(),
                        declared_type: slot.declared_type.clone(),
                        is_reference: slot.is_reference(),
                        value: slot.value.clone(),
                    })
                    .collect(),
            })
            .collect();

        let heap = heap
            .entries()
            .into_iter()
            .map(|entry| HeapView {
                address: entry.address.clone(),
                entry_type: entry.entry_type.clone(),
                ref_count: entry.ref_count,
                value: entry.value.clone(),
            })
            .collect();

        Snapshot { frames, heap }
    }

    /// The innermost frame
    pub fn current_frame(&self) -> Option<&FrameView> {
        self.frames.last()
    }

    /// Innermost frame with this name
    pub fn frame(&self, name: &str) -> Option<&FrameView> {
        self.frames.iter().rev().find(|frame| frame.name == name)
    }

    /// Look a variable up in the innermost frame only
    pub fn slot(&self, name: &str) -> Option<&SlotView> {
        self.current_frame().and_then(|frame| frame.slot(name))
    }

    pub fn heap_entry(&self, address: &Address) -> Option<&HeapView> {
        self.heap.iter().find(|entry| &entry.address == address)
    }

    /// Heap entry a variable of the innermost frame refers to
    pub fn referent_of(&self, name: &str) -> Option<&HeapView> {
        let address = self.slot(name)?.value.referent()?;
        self.heap_entry(address)
    }

    /// Rough memory footprint, for the history budget
    pub fn estimated_size(&self) -> usize {
        let slots: usize = self
            .frames
            .iter()
            .map(|frame| 64 + frame.name.len() + frame.slots.len() * 96)
            .sum();
        let heap: usize = self.heap.iter().map(|entry| 96 + entry.value.len() * 64).sum();
        slots + heap
    }
}

impl fmt::Display for SlotView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.is_reference { "->" } else { "=" };
        write!(
            f,
            "{} {} {} {} {}",
            self.address, self.declared_type, self.name, arrow, self.value
        )
    }
}

impl fmt::Display for HeapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (refs: {}) ",
            self.address, self.entry_type, self.ref_count
        )?;
        match &self.value {
            HeapValue::Object(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{} {} = {}", field.field_type, field.name, field.value))
                    .collect();
                write!(f, "{{ {} }}", fields.join(", "))
            }
            HeapValue::Array(elements) => {
                let elements: Vec<String> = elements.iter().map(Value::to_string).collect();
                write!(f, "[{}]", elements.join(", "))
            }
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "stack:")?;
        for frame in &self.frames {
            writeln!(f, "  #{} {}", frame.id, frame.name)?;
            if frame.slots.is_empty() {
                writeln!(f, "    (empty)")?;
            }
            for slot in &frame.slots {
                writeln!(f, "    {}", slot)?;
            }
        }

        writeln!(f, "heap:")?;
        if self.heap.is_empty() {
            writeln!(f, "  (empty)")?;
        }
        for entry in &self.heap {
            writeln!(f, "  {}", entry)?;
        }
        Ok(())
    }
}

/// Snapshot taken after a command, labelled with that command
#[derive(Debug, Clone)]
pub struct Recorded {
    pub command: String,
    pub snapshot: Snapshot,
}

/// Bounded history of snapshots for browsing earlier states.
///
/// When a new snapshot would exceed the memory budget the oldest ones are
/// evicted. Browsing never changes the model.
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: VecDeque<Recorded>,
    max_memory: usize,
    current_memory: usize,
    evicted: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: VecDeque::new(),
            max_memory,
            current_memory: 0,
            evicted: 0,
        }
    }

    /// Add a snapshot to history, evicting the oldest ones to stay in budget.
    ///
    /// A snapshot larger than the whole budget is still kept, alone.
    pub fn push(&mut self, command: impl Into<String>, snapshot: Snapshot) {
        let snapshot_size = snapshot.estimated_size();

        while !self.snapshots.is_empty() && self.current_memory + snapshot_size > self.max_memory {
            if let Some(oldest) = self.snapshots.pop_front() {
                self.current_memory -= oldest.snapshot.estimated_size();
                self.evicted += 1;
            }
        }

        self.current_memory += snapshot_size;
        self.snapshots.push_back(Recorded {
            command: command.into(),
            snapshot,
        });
    }

    /// Get a snapshot by index, oldest retained first
    pub fn get(&self, index: usize) -> Option<&Recorded> {
        self.snapshots.get(index)
    }

    pub fn latest(&self) -> Option<&Recorded> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// How many snapshots were dropped to stay in budget
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

/// One executed command and what came of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub command: String,
    pub outcome: Outcome,
}

/// Ordered record of every command run, for display
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Transcript {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, command: &str, outcome: Outcome) {
        self.entries.push(TranscriptEntry {
            command: command.trim().to_string(),
            outcome,
        });
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.outcome.ok).count()
    }

    /// Get all entries as display lines: the command, then its status
    pub fn get_output(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| {
                let status = if entry.outcome.ok { "ok" } else { "error" };
                [
                    format!("> {}", entry.command),
                    format!("  {}: {}", status, entry.outcome.message),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::address::address_for;
    use crate::memory::heap::Field;
    use crate::parser::ast::PrimitiveType;
    use pretty_assertions::assert_eq;

    fn sample() -> Snapshot {
        Snapshot {
            frames: vec![
                FrameView {
                    id: 0,
                    name: "main".into(),
                    slots: vec![
                        SlotView {
                            address: address_for(1.0),
                            name: "x".into(),
                            declared_type: DeclaredType::Primitive(PrimitiveType::Int),
                            is_reference: false,
                            value: Value::Int(3),
                        },
                        SlotView {
                            address: address_for(3.0),
                            name: "p".into(),
                            declared_type: DeclaredType::Object("object".into()),
                            is_reference: true,
                            value: Value::ObjectRef(address_for(2.0)),
                        },
                    ],
                },
                FrameView {
                    id: 1,
                    name: "foo".into(),
                    slots: Vec::new(),
                },
            ],
            heap: vec![HeapView {
                address: address_for(2.0),
                entry_type: DeclaredType::Object("object".into()),
                ref_count: 1,
                value: HeapValue::Object(vec![Field {
                    name: "nombre".into(),
                    field_type: PrimitiveType::String,
                    value: Value::Text("Ana".into()),
                }]),
            }],
        }
    }

    #[test]
    fn test_display() {
        let expected = "\
stack:
  #0 main
    0x1 int x = 3
    0x3 object p -> 0x2
  #1 foo
    (empty)
heap:
  0x2 object (refs: 1) { String nombre = \"Ana\" }
";
        assert_eq!(sample().to_string(), expected);
        assert_eq!(Snapshot::default().to_string(), "stack:\nheap:\n  (empty)\n");
    }

    #[test]
    fn test_lookups_use_innermost_frame() {
        let snapshot = sample();
        assert!(snapshot.slot("x").is_none());
        assert_eq!(snapshot.frame("main").map(|f| f.slots.len()), Some(2));
        assert!(snapshot.referent_of("p").is_none());

        let mut main_only = snapshot.clone();
        main_only.frames.pop();
        assert_eq!(main_only.referent_of("p").map(|e| e.ref_count), Some(1));
    }

    #[test]
    fn test_history_evicts_oldest() {
        let size = sample().estimated_size();
        let mut history = SnapshotManager::new(size * 2);

        history.push("a;", sample());
        history.push("b;", sample());
        assert_eq!(history.len(), 2);

        history.push("c;", sample());
        assert_eq!(history.len(), 2);
        assert_eq!(history.evicted(), 1);
        assert_eq!(history.get(0).map(|r| r.command.as_str()), Some("b;"));
        assert_eq!(history.latest().map(|r| r.command.as_str()), Some("c;"));
        assert!(history.memory_usage() <= history.memory_limit());
    }

    #[test]
    fn test_oversized_snapshot_is_kept_alone() {
        let mut history = SnapshotManager::new(1);
        history.push("a;", sample());
        history.push("b;", sample());
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().map(|r| r.command.as_str()), Some("b;"));
    }

    #[test]
    fn test_transcript_output() {
        let mut transcript = Transcript::new();
        transcript.record(" int x = 3; ", Outcome::success("declared int x = 3 at 0x1"));
        transcript.record("leave;", Outcome::failure("cannot leave the root frame 'main'"));

        assert_eq!(transcript.failures(), 1);
        assert_eq!(
            transcript.get_output(),
            vec![
                "> int x = 3;",
                "  ok: declared int x = 3 at 0x1",
                "> leave;",
                "  error: cannot leave the root frame 'main'",
            ]
        );
    }
}

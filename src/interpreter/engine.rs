// Command dispatcher for the memory simulator

use crate::config::SimConfig;
use crate::interpreter::declarations::{process, Declaration};
use crate::interpreter::errors::{MemoryError, SimError, TypeError};
use crate::interpreter::type_system::{check_assignable, check_object};
use crate::memory::address::Address;
use crate::memory::heap::HeapEntry;
use crate::memory::MemoryModel;
use crate::parser::ast::{CommandShape, PrimitiveType, ValueSource};
use crate::parser::syntax::{classify, value_source};
use crate::snapshot::{Snapshot, Transcript};
use tracing::debug;

/// Result of one command: success flag and a single-line status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub ok: bool,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Outcome {
            ok: false,
            message: message.into(),
        }
    }
}

/// Runs command lines against a memory model
pub struct Executor {
    /// The only state that influences execution
    memory: MemoryModel,

    /// Record of every command run, never read back by `run`
    transcript: Transcript,
}

impl Executor {
    pub fn new(config: &SimConfig) -> Self {
        Executor {
            memory: MemoryModel::new(config),
            transcript: Transcript::new(),
        }
    }

    /// Run one command. Failures never escape: they come back as an
    /// [`Outcome`] with `ok == false` and the model untouched.
    pub fn run(&mut self, line: &str) -> Outcome {
        let outcome = match self.execute(line) {
            Ok(message) => {
                debug!(command = line.trim(), %message, "command applied");
                debug_assert!(
                    self.memory.check_invariants().is_ok(),
                    "invariants broken after {:?}: {:?}",
                    line,
                    self.memory.check_invariants()
                );
                Outcome::success(message)
            }
            Err(err) => {
                debug!(command = line.trim(), error = %err, "command rejected");
                Outcome::failure(err.to_string())
            }
        };

        self.transcript.record(line, outcome.clone());
        outcome
    }

    /// Classify and apply one command, returning its confirmation message.
    pub fn execute(&mut self, line: &str) -> Result<String, SimError> {
        match classify(line)? {
            CommandShape::Enter { name } => {
                let id = self.memory.enter_frame(&name)?;
                Ok(format!("entered frame '{}' (#{})", name, id))
            }
            CommandShape::Leave => {
                let left = self.memory.leave_frame()?;
                Ok(format!(
                    "left frame '{}'{}",
                    left.frame.name,
                    collected_suffix(&left.collected)
                ))
            }
            CommandShape::Assignment { target, value } => self.assign(&target, &value),
            CommandShape::Declaration => self.declare(line),
        }
    }

    /// `target = value;` against the innermost frame
    fn assign(&mut self, target: &str, value: &str) -> Result<String, SimError> {
        let frame = self.memory.current_frame_id();
        let target_type = self.memory.slot_type(frame, target)?.clone();

        match value_source(value)? {
            ValueSource::Variable(source) => {
                let collected = self.memory.assign(frame, target, &source)?;
                Ok(format!("{} = {}{}", target, source, collected_suffix(&collected)))
            }
            ValueSource::Null => {
                let collected = self.memory.assign_null(frame, target)?;
                Ok(format!("{} = null{}", target, collected_suffix(&collected)))
            }
            ValueSource::Construct {
                type_name,
                attributes,
            } => {
                if PrimitiveType::from_name(&type_name).is_some() {
                    return Err(TypeError::NotConstructible(type_name).into());
                }
                let fields = check_object(&type_name, &attributes)?;
                let address = self.memory.assign_new_object(frame, target, &type_name, fields)?;
                Ok(format!("{} = new {} at {}", target, type_name, address))
            }
            ValueSource::Literal(literal) => {
                let primitive = target_type.as_primitive().ok_or_else(|| MemoryError::IncompatibleTypes {
                    target: target.to_string(),
                    target_type: target_type.to_string(),
                    source_type: format!("literal {}", literal),
                })?;
                let typed = check_assignable(primitive, &literal)?;
                let shown = typed.to_string();
                self.memory.assign_literal(frame, target, primitive, typed)?;
                Ok(format!("{} = {}", target, shown))
            }
        }
    }

    /// A declaration line, gated by the declaration controller
    fn declare(&mut self, line: &str) -> Result<String, SimError> {
        let frame = self.memory.current_frame_id();

        let message = match process(line)? {
            Declaration::Scalar {
                name,
                scalar_type,
                value,
            } => {
                let shown = value.to_string();
                let address = self.memory.declare_scalar(frame, &name, scalar_type, value)?;
                format!("declared {} {} = {} at {}", scalar_type, name, shown, address)
            }
            Declaration::NullReference {
                name,
                declared_type,
            } => {
                let shown = declared_type.to_string();
                let address = self.memory.declare_null(frame, &name, declared_type)?;
                format!("declared {} {} = null at {}", shown, name, address)
            }
            Declaration::Alias {
                name,
                declared_type,
                source,
            } => {
                let shown = declared_type.to_string();
                let address = self.memory.declare_reference(frame, &name, declared_type, &source)?;
                format!("declared {} {} = {} at {}", shown, name, source, address)
            }
            Declaration::Object {
                name,
                type_name,
                fields,
            } => {
                let count = fields.len();
                let address = self.memory.declare_object(frame, &name, &type_name, fields)?;
                format!(
                    "constructed {} with {} attribute{} at {} for '{}'",
                    type_name,
                    count,
                    plural(count),
                    address,
                    name
                )
            }
            Declaration::Array {
                name,
                element_type,
                elements,
            } => {
                let count = elements.len();
                let shown = element_type.to_string();
                let address = self.memory.declare_array(frame, &name, element_type, elements)?;
                format!(
                    "constructed {}[{}] at {} for '{}'",
                    shown, count, address, name
                )
            }
        };

        Ok(message)
    }

    /// Read-only view of the model
    pub fn snapshot(&self) -> Snapshot {
        self.memory.snapshot()
    }

    /// Address of the heap entry a variable of the innermost frame refers to
    pub fn referent(&self, name: &str) -> Option<Address> {
        self.memory
            .lookup(self.memory.current_frame_id(), name)
            .ok()
            .and_then(|slot| slot.value.referent().cloned())
    }

    pub fn memory(&self) -> &MemoryModel {
        &self.memory
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn collected_suffix(collected: &[HeapEntry]) -> String {
    if collected.is_empty() {
        return String::new();
    }
    let addresses: Vec<&str> = collected.iter().map(|entry| entry.address.as_str()).collect();
    format!("; collected {}", addresses.join(", "))
}

//! Command execution for the memory simulator
//!
//! This module provides the layers between a command line and the memory model:
//! - [`declarations`]: The declaration gate (syntax check, then literal typing)
//! - [`type_system`]: Literal ranges, widening and attribute typing
//! - [`engine`]: The executor that dispatches every command kind
//! - [`errors`]: Syntax, type and memory error types
//! - [`constants`]: Numeric ranges and default limits
//!
//! # Execution Model
//!
//! Each command is validated completely before anything is written. A
//! rejected command produces one diagnostic and leaves the model unchanged;
//! an accepted one produces one confirmation line.

pub mod constants;
pub mod declarations;
pub mod engine;
pub mod errors;
pub mod type_system;

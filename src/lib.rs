//! # Introduction
//!
//! memsim is a teaching simulator for the stack and heap of a Java-like
//! language. Each command line declares, assigns or scopes variables, and the
//! resulting memory state is shown in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Command pipeline
//!
//! ```text
//! Line → Lexer → Syntax check → Typing → Memory model → Snapshot → TUI
//! ```
//!
//! 1. [`parser`]: tokenises a line and checks its shape.
//! 2. [`interpreter`]: types literals, gates declarations and dispatches
//!    commands to the model.
//! 3. [`memory`]: the authoritative model: a [`memory::stack::Stack`] of
//!    frames and a reference-counted [`memory::heap::Heap`].
//! 4. [`snapshot`]: read-only views, the bounded browsing history and the
//!    command transcript.
//! 5. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Supported commands
//!
//! Types: `byte`, `short`, `int`, `long`, `float`, `double`, `char`,
//! `boolean`, `String`, object types and one-dimensional arrays.
//! Commands: declarations, assignments, `enter name(...);` and `leave;`.

pub mod config;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod script;
pub mod snapshot;
pub mod ui;

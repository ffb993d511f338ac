//! Command-line parsing for the simulator
//!
//! This module turns one command line into structured fields:
//! - [`lexer`]: Tokenization (command text → tokens with byte spans)
//! - [`syntax`]: Statement shape checks and dispatch classification
//! - [`ast`]: Type names, parsed fields and value sources
//!
//! # Supported Statements
//!
//! - Scalar declaration: `int x = 3;`
//! - Object declaration: `object p = new object(nombre = "Ana");`
//! - Array declaration: `int[] xs = {1, 2, 3};`
//! - Assignment: `x = y;`, `x = 4;`, `p = null;`, `p = new object(id = 1);`
//! - Scope control: `enter foo();`, `leave;`
//!
//! No expressions, loops or control flow. Every check here is a pure function
//! of the line; nothing in this module sees the memory model.

pub mod ast;
pub mod lexer;
pub mod syntax;

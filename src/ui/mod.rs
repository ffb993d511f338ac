//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, input line editing,
//!   pane focus and snapshot history browsing
//! - **[`panes`]**: stateless render functions for each visible pane (stack,
//!   heap, transcript, input line, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with an [`Executor`] and
//! call [`App::run`] to start the event loop.
//!
//! [`Executor`]: crate::interpreter::engine::Executor
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;

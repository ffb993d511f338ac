//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`stack`]: Frames and their slots, innermost frame marked
//! - [`heap`]: Live heap entries with reference counts and contents
//! - [`transcript`]: Every command run so far with its outcome
//! - [`input`]: The command line being edited
//! - [`status`]: Status bar with keybindings and history position
//! - `utils`: Shared value styling, borders and scroll clamping
//!
//! Each pane exports one stateless `render_*` function. Scroll offsets live
//! in the [`App`](crate::ui::App) and are clamped while rendering.

mod utils;

pub mod heap;
pub mod input;
pub mod stack;
pub mod status;
pub mod transcript;

pub use heap::render_heap_pane;
pub use input::render_input_line;
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use transcript::render_transcript_pane;

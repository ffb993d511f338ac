//! Simulator configuration
//!
//! [`SimConfig`] carries the knobs the memory model honours. The binary builds
//! it from command-line flags; tests usually take [`SimConfig::default`] and
//! override one field.

use crate::interpreter::constants::{DEFAULT_MAX_FRAMES, DEFAULT_MAX_HEAP_ENTRIES, DEFAULT_ROOT_FRAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Name of the frame that exists for the whole run.
    pub root_frame_name: String,
    /// Maximum stack depth, root frame included.
    pub max_frames: usize,
    /// Maximum number of live heap entries.
    pub max_heap_entries: usize,
}

impl SimConfig {
    pub fn with_root_frame(mut self, name: impl Into<String>) -> Self {
        self.root_frame_name = name.into();
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_max_heap_entries(mut self, max_heap_entries: usize) -> Self {
        self.max_heap_entries = max_heap_entries;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            root_frame_name: DEFAULT_ROOT_FRAME.to_string(),
            max_frames: DEFAULT_MAX_FRAMES,
            max_heap_entries: DEFAULT_MAX_HEAP_ENTRIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_override_one_field() {
        let config = SimConfig::default().with_max_frames(8);
        assert_eq!(config.max_frames, 8);
        assert_eq!(config.root_frame_name, "main");
        assert_eq!(config.max_heap_entries, DEFAULT_MAX_HEAP_ENTRIES);

        let config = config.with_root_frame("global").with_max_heap_entries(1);
        assert_eq!(config.root_frame_name, "global");
        assert_eq!(config.max_heap_entries, 1);
    }
}

// Constants for the memory simulator

/// Prefix of every printable address token
pub const ADDRESS_MARKER: &str = "0x";

/// Digits used to encode address seeds, least significant first
pub const ADDRESS_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Name of the frame that exists for the whole simulation
pub const DEFAULT_ROOT_FRAME: &str = "main";

/// Default maximum call-stack depth, root frame included
pub const DEFAULT_MAX_FRAMES: usize = 256;

/// Default maximum number of live heap entries
pub const DEFAULT_MAX_HEAP_ENTRIES: usize = 4096;

/// Default snapshot history budget for the visualizer (16 MB)
pub const DEFAULT_HISTORY_LIMIT: usize = 16 * 1024 * 1024;

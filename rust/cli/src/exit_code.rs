//! Exit code constants for the CLI application.

/// Success exit code (standard Unix convention).
pub const SUCCESS: i32 = 0;

/// Any failure: bad arguments, configuration, store or I/O errors.
pub const ERROR: i32 = 2;

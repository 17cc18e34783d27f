//! Exit code constants for the brandsmith CLI.
//!
//! - 0: Success (or no candidate carried a config block)
//! - 1: User error (bad args, unreadable input, empty config, bad identifier)
//! - 2: A pattern key had no value and no `Default`
//! - 3: Filesystem failure while materializing or substituting
//! - 4: A build step exited non-zero

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid settings, or unusable brand config.
pub const USER_ERROR: i32 = 1;

/// A pattern key could not be resolved from the brand config.
pub const MISSING_VALUE: i32 = 2;

/// Copying the template or rewriting an instance file failed.
pub const FILESYSTEM_FAILURE: i32 = 3;

/// A build step reported a non-zero completion status.
pub const BUILD_FAILURE: i32 = 4;

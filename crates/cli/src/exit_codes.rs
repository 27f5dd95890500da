//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: schedulers and wrapper scripts
//! treat anything but 0 as "the output file must not be used".
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                                   |
//! |---------|------------|-----------------------------------------------|
//! | 0       | Universal  | Success                                       |
//! | 2       | Universal  | CLI usage error (bad args)                    |
//! | 10-19   | sync       | Config, data consistency and runtime failures |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `PipelineError::exit_code`

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - every stage completed and the output file is in place.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Sync (10-19)
// =============================================================================

/// Config could not be parsed or failed validation (including missing
/// columns in the real CSV headers, malformed globs, duplicate action codes).
pub const EXIT_SYNC_INVALID_CONFIG: u8 = 10;

/// Duplicate key tuples in `provided_data` or `current_data`.
pub const EXIT_SYNC_DUPLICATE_KEYS: u8 = 11;

/// Runtime failure: unreadable file, store error, unparseable cell, write failure.
pub const EXIT_SYNC_RUNTIME: u8 = 12;

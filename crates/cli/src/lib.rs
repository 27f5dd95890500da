//! Library half of the `tablesync` binary, so integration tests can drive the
//! pipeline without spawning a process.

pub mod exit_codes;
pub mod logging;
pub mod pipeline;

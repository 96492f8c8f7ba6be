//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract: scripts chaining imports
//! rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success (row-level skips included)             |
//! | 2    | Usage error (bad arguments, clap failures)     |
//! | 3    | Input file or species not found                |
//! | 4    | Input could not be decoded                     |
//! | 5    | Unsupported format, table or container shape   |
//! | 6    | Database failure                               |
//! | 7    | Hydro-Québec registry unreachable or rejected  |
//! | 8    | Invalid or unreadable configuration            |
//!
//! A run in which some rows were skipped still exits 0: the per-row
//! outcome is in the report.

pub const EXIT_SUCCESS: u8 = 0;

pub const EXIT_USAGE: u8 = 2;

pub const EXIT_NOT_FOUND: u8 = 3;

pub const EXIT_PARSE: u8 = 4;

pub const EXIT_FORMAT: u8 = 5;

pub const EXIT_STORAGE: u8 = 6;

pub const EXIT_FETCH: u8 = 7;

pub const EXIT_CONFIG: u8 = 8;

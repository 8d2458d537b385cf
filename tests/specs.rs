//! Behavioral specifications for the lodge client.
//!
//! These tests drive the public client API end to end against the fake
//! and file-backed stores, and verify what ends up stored and buffered.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// write/
#[path = "specs/write/abandon.rs"]
mod write_abandon;
#[path = "specs/write/recovery.rs"]
mod write_recovery;

// read/
#[path = "specs/read/groups.rs"]
mod read_groups;

// storage/
#[path = "specs/storage/jsonl.rs"]
mod storage_jsonl;

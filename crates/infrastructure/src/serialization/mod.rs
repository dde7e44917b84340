//! Deterministic JSON serialization for the session file.
//!
//! Keys come out sorted (the file is a `BTreeMap`), indented by two spaces
//! and followed by a trailing newline, so a hand-edited file diffs cleanly.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};

//! Feed payload decoding and snapshot reconstruction.

pub mod parser;
pub mod raw;

pub use parser::{decode_payload, SnapshotParser};
pub use raw::RawGame;

//! Writing compiled artifacts to disk.

pub mod writer;

pub use writer::write_targets;

//! Filesystem mutation primitives used by the plan executor.
pub mod fs;
pub mod symlink;

//! Internal helpers shared by the copy operations.

pub(crate) mod path;

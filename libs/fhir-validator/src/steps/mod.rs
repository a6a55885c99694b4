//! Individual validation checks
//!
//! Each step is a free function pushing into the shared issue list; the
//! walk in `validator.rs` decides which steps apply to which field.

pub(crate) mod binding;
pub(crate) mod cardinality;
pub(crate) mod choice;
pub(crate) mod primitive;

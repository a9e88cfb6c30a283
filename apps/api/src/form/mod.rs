//! Form model: everything the requester edits before submitting.
//! Holds all archetypes' fields at once; `assembler` projects the active one.
#![allow(dead_code)]

pub mod assembler;
pub mod editors;
pub mod state;

pub use assembler::assemble;
pub use state::{Collection, FormState, RecordField, ScalarField};

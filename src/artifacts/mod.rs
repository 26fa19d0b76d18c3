//! Core data structures and algorithms
//!
//! - `objects`: the four object kinds and their codec (blob, tree, commit, tag)
//! - `revision`: resolves a user-supplied name to an object id
//! - `checkout`: walks and materializes a tree into a directory

pub mod checkout;
pub mod objects;
pub mod revision;

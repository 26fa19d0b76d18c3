//! Repository-level storage backends
//!
//! - `database`: the object store (read/write/find-by-prefix)
//! - `refs`: the reference store (resolve/list/create, HEAD semantics)
//! - `repository`: path locator, discovery/init, and config

pub mod database;
pub mod refs;
pub mod repository;

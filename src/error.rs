//! Typed domain errors for the object store, reference store, and resolver.
//!
//! Command drivers convert these into `anyhow::Error` with `?` and add
//! context; the domain layers below `commands` never depend on `anyhow`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a repository (or any parent up to mount point): {0}")]
    NotARepository(PathBuf),
    #[error("{0} is not empty")]
    NotEmpty(PathBuf),
    #[error("missing config file at {0}")]
    ConfigMissing(PathBuf),
    #[error("unsupported core.repositoryformatversion {0}")]
    BadVersion(i64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("object {0} not found")]
    NotFound(String),
    #[error("malformed object: {0}")]
    Malformed(String),
    #[error("unknown object kind {0:?}")]
    UnknownKind(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("reference {0} not found")]
    NotFound(String),
    #[error("reference indirection starting at {0} exceeded depth {1}")]
    TooDeep(String, u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RevError {
    #[error("{0} is ambiguous, candidates: {}", .1.join(", "))]
    Ambiguous(String, Vec<String>),
    #[error("revision {0} could not be resolved")]
    NotFound(String),
    #[error(transparent)]
    Object(#[from] ObjectError),
    #[error(transparent)]
    Ref(#[from] RefError),
}

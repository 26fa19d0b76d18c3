//! Tree entry mode
//!
//! A mode is the ASCII octal digit string preceding a tree entry's path, as
//! written on the wire (e.g. `100644`, `100755`, `40000`). Unlike the index's
//! closed set of well-known modes, a tree entry's mode is read back verbatim
//! from storage: this type only enforces the wire-format width constraint
//! (5 or 6 ASCII digits), not a fixed vocabulary of permission bits.

use crate::error::ObjectError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode(String);

/// Regular file, non-executable.
pub const REGULAR_FILE: &str = "100644";
/// Regular file, executable.
pub const EXECUTABLE_FILE: &str = "100755";
/// Symbolic link.
pub const SYMLINK: &str = "120000";
/// Subdirectory (nested tree).
pub const DIRECTORY: &str = "40000";

impl Mode {
    pub fn try_parse(raw: impl Into<String>) -> anyhow::Result<Self> {
        let raw = raw.into();
        if raw.len() != 5 && raw.len() != 6 {
            return Err(ObjectError::Malformed(format!(
                "tree entry mode must be 5 or 6 digits, got {:?}",
                raw
            ))
            .into());
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(
                ObjectError::Malformed(format!("tree entry mode is not all digits: {:?}", raw))
                    .into(),
            );
        }
        Ok(Self(raw))
    }

    pub fn directory() -> Self {
        Self(DIRECTORY.to_string())
    }

    pub fn regular_file() -> Self {
        Self(REGULAR_FILE.to_string())
    }

    pub fn is_directory(&self) -> bool {
        self.0 == DIRECTORY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_five_and_six_digits() {
        assert!(Mode::try_parse("40000").is_ok());
        assert!(Mode::try_parse("100644").is_ok());
    }

    #[test]
    fn rejects_other_widths() {
        assert!(Mode::try_parse("4000").is_err());
        assert!(Mode::try_parse("1000644").is_err());
    }

    #[test]
    fn rejects_non_digits() {
        assert!(Mode::try_parse("10064x").is_err());
    }
}

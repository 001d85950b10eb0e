//! A declared, globally-unique name for a code unit's exported surface.

use crate::project::file::FileId;

/// A namespace declared by exactly one code unit.
///
/// Carries a canonical `name` (used by the import closure and all registry
/// keys) and a `file_prefix` (used when rewriting declaration names). When
/// the directive supplies only one token, it serves as both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    name: String,
    file_prefix: String,
    file: FileId,
}

impl Namespace {
    /// Returns `None` when both tokens are blank.
    pub fn new(name: &str, file_prefix: &str, file: FileId) -> Option<Self> {
        let name = name.trim();
        let file_prefix = file_prefix.trim();
        let resolved_name = if name.is_empty() { file_prefix } else { name };
        let resolved_prefix = if file_prefix.is_empty() { name } else { file_prefix };
        if resolved_name.is_empty() {
            return None;
        }
        Some(Self {
            name: resolved_name.to_owned(),
            file_prefix: resolved_prefix.to_owned(),
            file,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// The declaring file. Ownership is non-transferable.
    pub fn file(&self) -> FileId {
        self.file
    }
}

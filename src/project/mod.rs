//! Project model: files, namespaces, the registry that owns them, and the
//! discovery pass that populates it.

pub mod discovery;
pub mod file;
pub mod namespace;
pub mod registry;

pub use file::{FileId, FileKind, SourceFile};
pub use namespace::Namespace;
pub use registry::FileRegistry;

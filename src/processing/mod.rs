//! The processing passes and the pipeline that sequences them.

pub mod bindings;
pub mod imports;
pub mod injector;
pub mod namespaces;
pub mod processor;

pub use bindings::BindingProcessor;
pub use imports::ImportResolver;
pub use injector::MarkupInjector;
pub use namespaces::NamespaceProcessor;
pub use processor::{BuildSummary, ProjectProcessor};

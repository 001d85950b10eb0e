//! sgweave - build-time preprocessor for SceneGraph view projects
//!
//! sgweave weaves a project's views and code units together before
//! packaging: it resolves `'@Import` directives transitively, injects the
//! matching script includes into view markup, extracts `@{...}` binding
//! expressions, and prefixes declarations with their `'@Namespace` prefix so
//! merged code cannot collide.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `project`: Project model (files, namespaces, registry, discovery)
//! - `processing`: The passes and the pipeline that sequences them
//! - `markup`: Regex-level markup scanning
//! - `feedback`: Build diagnostics
//! - `error`: Failure taxonomy

pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod markup;
pub mod processing;
pub mod project;
pub mod settings;
pub mod utils;

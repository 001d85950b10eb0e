//! Canonical store of files and namespaces for one build pass.
//!
//! The registry arena-owns every [`SourceFile`]; relations between files are
//! [`FileId`] indices. All string indexes are case-insensitive. Lookups
//! return `Option`, never panic. Created fresh per build invocation and
//! discarded at the end.

use std::collections::HashMap;

use crate::project::file::{FileId, SourceFile};
use crate::project::namespace::Namespace;

#[derive(Debug, Default)]
pub struct FileRegistry {
    files: Vec<SourceFile>,
    by_full_path: HashMap<String, FileId>,
    by_pkg_path: HashMap<String, FileId>,
    namespaces_by_name: HashMap<String, FileId>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the file by absolute path and package path. If it already
    /// declares a namespace, index that too.
    pub fn add_file(&mut self, file: SourceFile) -> FileId {
        let id = FileId(self.files.len());
        self.by_full_path
            .insert(file.path_string().to_lowercase(), id);
        self.by_pkg_path.insert(file.pkg_path().to_lowercase(), id);
        if let Some(ns) = &file.namespace {
            self.namespaces_by_name.insert(ns.name().to_lowercase(), id);
        }
        self.files.push(file);
        id
    }

    /// Index a namespace name onto its declaring file. Called by the
    /// namespace extractor after registration checks pass.
    pub fn index_namespace(&mut self, name: &str, file: FileId) {
        self.namespaces_by_name.insert(name.to_lowercase(), file);
    }

    pub fn get(&self, id: FileId) -> &SourceFile {
        &self.files[id.0]
    }

    pub fn get_mut(&mut self, id: FileId) -> &mut SourceFile {
        &mut self.files[id.0]
    }

    pub fn id_by_path(&self, full_path: &str) -> Option<FileId> {
        self.by_full_path.get(&full_path.to_lowercase()).copied()
    }

    pub fn id_by_pkg_path(&self, pkg_path: &str) -> Option<FileId> {
        self.by_pkg_path
            .get(&pkg_path.replace('\\', "/").to_lowercase())
            .copied()
    }

    pub fn get_file(&self, full_path: &str) -> Option<&SourceFile> {
        self.id_by_path(full_path).map(|id| self.get(id))
    }

    pub fn get_file_by_pkg_path(&self, pkg_path: &str) -> Option<&SourceFile> {
        self.id_by_pkg_path(pkg_path).map(|id| self.get(id))
    }

    pub fn namespace_by_name(&self, name: &str) -> Option<&Namespace> {
        self.file_id_by_namespace_name(name)
            .and_then(|id| self.get(id).namespace.as_ref())
    }

    pub fn file_id_by_namespace_name(&self, name: &str) -> Option<FileId> {
        self.namespaces_by_name.get(&name.to_lowercase()).copied()
    }

    pub fn file_by_namespace_name(&self, name: &str) -> Option<&SourceFile> {
        self.file_id_by_namespace_name(name).map(|id| self.get(id))
    }

    /// Snapshot of all ids in insertion order. Callers may rely on this
    /// order for determinism only, not correctness.
    pub fn all_ids(&self) -> Vec<FileId> {
        (0..self.files.len()).map(FileId).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Link the view/code-unit pairing symmetrically.
    pub fn associate(&mut self, a: FileId, b: FileId) {
        self.get_mut(a).associated_file = Some(b);
        self.get_mut(b).associated_file = Some(a);
    }
}

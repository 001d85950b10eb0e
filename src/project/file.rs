//! One source unit of the project: a view, a code unit, or a pairing of both.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::processing::bindings::Binding;
use crate::project::namespace::Namespace;

/// Extension (without the dot) of imperative code units.
pub const CODE_EXTENSION: &str = "brs";

/// Extension (without the dot) of declarative markup files.
pub const MARKUP_EXTENSION: &str = "xml";

/// Filename-stem suffix that marks a code unit as a mixin.
pub const MIXIN_SUFFIX: &str = "Mixin";

/// Index of a file inside the [`FileRegistry`](crate::project::registry::FileRegistry)
/// arena. All file-to-file relations are expressed as ids, never as owning
/// pointers, so the registry stays the sole owner of file lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub usize);

/// Derived classification. Never stored: a pure function of extension and
/// associated-file presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Code unit with no paired view.
    Code,
    /// Code unit paired with a view.
    CodeBehind,
    /// Markup with no paired code unit.
    Markup,
    /// Markup paired with a code unit.
    View,
    Other,
}

impl FileKind {
    pub fn is_code(self) -> bool {
        matches!(self, FileKind::Code | FileKind::CodeBehind)
    }

    pub fn is_markup(self) -> bool {
        matches!(self, FileKind::Markup | FileKind::View)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Code => write!(f, "code"),
            FileKind::CodeBehind => write!(f, "code-behind"),
            FileKind::Markup => write!(f, "markup"),
            FileKind::View => write!(f, "view"),
            FileKind::Other => write!(f, "other"),
        }
    }
}

/// One physical file, created during discovery and mutated by the processing
/// passes. Lives for the duration of one build; a rebuild starts from a fresh
/// registry.
#[derive(Debug)]
pub struct SourceFile {
    full_path: PathBuf,
    pkg_path: String,
    filename: String,
    extension: String,

    /// The paired view / code-unit. Symmetric: setting one side sets the other.
    pub associated_file: Option<FileId>,
    /// The view this view inherits from. Forms a forest; a file may not be
    /// its own ancestor.
    pub parent_file: Option<FileId>,

    pub namespace: Option<Namespace>,
    /// Raw names referenced directly by this unit's `'@Import` directives.
    pub imported_namespace_names: BTreeSet<String>,
    /// Full transitive closure after resolution.
    pub required_namespaces: Vec<String>,
    /// Closure minus anything an ancestor already imports; this is what gets
    /// injected into the markup.
    pub imported_namespaces: Vec<String>,

    pub bindings: Vec<Binding>,
    /// Element ids that carry at least one valid binding.
    pub component_ids: BTreeSet<String>,

    /// Declared `<component name="...">`, markup only.
    pub component_name: Option<String>,
    /// Declared `extends="..."`, markup only.
    pub parent_component_name: Option<String>,

    pub has_processed_imports: bool,

    contents: Option<String>,
    dirty: bool,
}

impl SourceFile {
    pub fn new(full_path: PathBuf, pkg_path: String) -> Self {
        let filename = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = full_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            full_path,
            pkg_path: pkg_path.replace('\\', "/"),
            filename,
            extension,
            associated_file: None,
            parent_file: None,
            namespace: None,
            imported_namespace_names: BTreeSet::new(),
            required_namespaces: Vec::new(),
            imported_namespaces: Vec::new(),
            bindings: Vec::new(),
            component_ids: BTreeSet::new(),
            component_name: None,
            parent_component_name: None,
            has_processed_imports: false,
            contents: None,
            dirty: false,
        }
    }

    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Filesystem path as a display string, used in feedback entries.
    pub fn path_string(&self) -> String {
        self.full_path.to_string_lossy().into_owned()
    }

    /// Logical, build-output-relative path used for include directives.
    pub fn pkg_path(&self) -> &str {
        &self.pkg_path
    }

    /// The `pkg:/` URI substituted into the include template.
    pub fn pkg_uri(&self) -> String {
        format!("pkg:/{}", self.pkg_path)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File stem without extension.
    pub fn stem(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map_or(self.filename.as_str(), |(stem, _)| stem)
    }

    pub fn kind(&self) -> FileKind {
        match self.extension.as_str() {
            CODE_EXTENSION => {
                if self.associated_file.is_some() {
                    FileKind::CodeBehind
                } else {
                    FileKind::Code
                }
            }
            MARKUP_EXTENSION => {
                if self.associated_file.is_some() {
                    FileKind::View
                } else {
                    FileKind::Markup
                }
            }
            _ => FileKind::Other,
        }
    }

    pub fn is_mixin(&self) -> bool {
        self.stem().ends_with(MIXIN_SUFFIX)
    }

    /// Lazily-loaded file text. Discovery usually preloads this; files
    /// touched outside discovery fall back to a read here.
    pub fn contents(&mut self) -> Result<&str> {
        if self.contents.is_none() {
            let text = fs::read_to_string(&self.full_path)
                .with_context(|| format!("failed to read {}", self.full_path.display()))?;
            self.contents = Some(text);
        }
        Ok(self.contents.as_deref().unwrap_or_default())
    }

    pub fn set_contents(&mut self, contents: String) {
        self.contents = Some(contents);
        self.dirty = true;
    }

    /// Preload text without marking the file dirty (discovery path).
    pub fn preload_contents(&mut self, contents: String) {
        self.contents = Some(contents);
    }

    pub fn unload_contents(&mut self) {
        self.contents = None;
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write modified contents back to disk.
    pub fn save(&mut self) -> Result<()> {
        if let Some(contents) = &self.contents {
            fs::write(&self.full_path, contents)
                .with_context(|| format!("failed to write {}", self.full_path.display()))?;
            self.dirty = false;
        }
        Ok(())
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {}",
            self.filename,
            self.kind(),
            self.full_path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn file(path: &str, pkg: &str) -> SourceFile {
        SourceFile::new(PathBuf::from(path), pkg.to_owned())
    }

    #[test]
    fn test_kind_is_derived_from_extension_and_pairing() {
        let mut code = file("/p/source/FocusMixin.brs", "source/FocusMixin.brs");
        assert_eq!(code.kind(), FileKind::Code);
        code.associated_file = Some(FileId(1));
        assert_eq!(code.kind(), FileKind::CodeBehind);

        let mut markup = file("/p/views/Home.xml", "views/Home.xml");
        assert_eq!(markup.kind(), FileKind::Markup);
        markup.associated_file = Some(FileId(0));
        assert_eq!(markup.kind(), FileKind::View);

        let other = file("/p/assets/logo.png", "assets/logo.png");
        assert_eq!(other.kind(), FileKind::Other);
    }

    #[test]
    fn test_pkg_uri_and_stem() {
        let f = file("/p/source/FocusMixin.brs", "source/FocusMixin.brs");
        assert_eq!(f.pkg_uri(), "pkg:/source/FocusMixin.brs");
        assert_eq!(f.stem(), "FocusMixin");
        assert!(f.is_mixin());

        let f = file("/p/views/Home.xml", "views/Home.xml");
        assert!(!f.is_mixin());
    }

    #[test]
    fn test_set_contents_marks_dirty() {
        let mut f = file("/p/views/Home.xml", "views/Home.xml");
        f.preload_contents("<component/>".to_owned());
        assert!(!f.is_dirty());
        f.set_contents("<component></component>".to_owned());
        assert!(f.is_dirty());
    }
}

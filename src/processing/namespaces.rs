//! Namespace handling for code units: directive extraction, registration,
//! and declaration-name rewriting.

use anyhow::Result;

use crate::error::ProcessError;
use crate::feedback::FeedbackChannel;
use crate::project::file::FileId;
use crate::project::namespace::Namespace;
use crate::project::registry::FileRegistry;
use crate::settings::ProcessorSettings;

pub struct NamespaceProcessor<'a> {
    settings: &'a ProcessorSettings,
}

impl<'a> NamespaceProcessor<'a> {
    pub fn new(settings: &'a ProcessorSettings) -> Self {
        Self { settings }
    }

    /// Scan the unit's `'@Import` directives and record the raw names on the
    /// file. Applicable to code and code-behind files only.
    pub fn scan_import_names(
        &self,
        registry: &mut FileRegistry,
        id: FileId,
    ) -> Result<()> {
        let file = registry.get_mut(id);
        let kind = file.kind();
        if !kind.is_code() {
            return Err(ProcessError::UnsupportedFileKind {
                expected: "code",
                kind: kind.to_string(),
            }
            .into());
        }

        let contents = file.contents()?.to_owned();
        let names: Vec<String> = self
            .settings
            .import_directive
            .captures_iter(&contents)
            .map(|c| c[1].to_owned())
            .collect();
        registry.get_mut(id).imported_namespace_names.extend(names);
        Ok(())
    }

    /// Extract the unit's `'@Namespace` directive, if any, and register it.
    ///
    /// Re-running extraction on an already-processed file is a no-op. More
    /// than one directive in one file, or a name collision with a namespace
    /// declared by a different file, is a `DuplicateNamespace` error
    /// (recorded, then raised).
    pub fn extract_namespace(
        &self,
        registry: &mut FileRegistry,
        feedback: &mut FeedbackChannel,
        id: FileId,
    ) -> Result<Option<Namespace>> {
        let file = registry.get_mut(id);
        let kind = file.kind();
        if !kind.is_code() {
            return Err(ProcessError::UnsupportedFileKind {
                expected: "code",
                kind: kind.to_string(),
            }
            .into());
        }

        let path = file.path_string();
        let contents = file.contents()?.to_owned();

        let mut captures = self.settings.namespace_directive.captures_iter(&contents);
        let Some(first) = captures.next() else {
            return Ok(None);
        };
        if captures.next().is_some() {
            let err = ProcessError::DuplicateNamespace {
                name: first[1].to_owned(),
                existing: path.clone(),
            };
            feedback.error(
                Some(&path),
                "file declares more than one namespace directive",
            );
            return Err(err.into());
        }

        let prefix = &first[1];
        let name = first.get(2).map_or(prefix, |m| m.as_str());
        let Some(namespace) = Namespace::new(name, prefix, id) else {
            feedback.error(Some(&path), "namespace directive has no usable name");
            return Ok(None);
        };

        if let Some(existing) = registry.file_id_by_namespace_name(namespace.name()) {
            if existing == id {
                // Idempotent re-registration from the same file.
                return Ok(registry.get(id).namespace.clone());
            }
            let existing_path = registry.get(existing).path_string();
            let err = ProcessError::DuplicateNamespace {
                name: namespace.name().to_owned(),
                existing: existing_path.clone(),
            };
            feedback.error(
                Some(&path),
                format!(
                    "namespace \"{}\" is already declared by {}",
                    namespace.name(),
                    existing_path
                ),
            );
            return Err(err.into());
        }

        registry.index_namespace(namespace.name(), id);
        registry.get_mut(id).namespace = Some(namespace.clone());
        Ok(Some(namespace))
    }

    /// Prefix every top-level `function`/`sub` declaration name with the
    /// unit's namespace prefix, so identically-named helpers in different
    /// mixins cannot collide once merged into one flat runtime namespace.
    /// Call sites are an external convention and are left alone.
    pub fn apply_namespace(&self, registry: &mut FileRegistry, id: FileId) -> Result<()> {
        let file = registry.get_mut(id);
        let kind = file.kind();
        if !kind.is_code() {
            return Err(ProcessError::UnsupportedFileKind {
                expected: "code",
                kind: kind.to_string(),
            }
            .into());
        }

        let Some(prefix) = file.namespace.as_ref().map(|n| n.file_prefix().to_owned()) else {
            return Ok(());
        };

        let contents = file.contents()?.to_owned();
        let replacement = format!("${{1}}{}_${{2}}", prefix);
        let updated = self
            .settings
            .declaration_name
            .replace_all(&contents, replacement.as_str());
        if updated != contents {
            let updated = updated.into_owned();
            registry.get_mut(id).set_contents(updated);
        }
        Ok(())
    }
}

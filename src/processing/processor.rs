//! The build pipeline: copy, discover, then run the processing passes in
//! dependency order and save whatever changed.
//!
//! Pass order matters. Namespaces are registered before import resolution so
//! every name is known; bindings are extracted before import resolution so
//! binding support can be seeded; declaration rewriting runs last because
//! nothing depends on the rewritten code text.
//!
//! A defect in one file (bad binding, missing import, markup with no closing
//! tag) is recorded and the build moves on to the next file. Only programmer
//! misuse and environmental failures abort the build.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::ProcessError;
use crate::feedback::FeedbackChannel;
use crate::processing::bindings::BindingProcessor;
use crate::processing::imports::ImportResolver;
use crate::processing::namespaces::NamespaceProcessor;
use crate::project::discovery;
use crate::project::file::FileId;
use crate::project::registry::FileRegistry;
use crate::settings::ProcessorSettings;

#[derive(Debug, Default, Clone, Copy)]
pub struct BuildSummary {
    pub files_discovered: usize,
    pub files_written: usize,
}

pub struct ProjectProcessor {
    config: Config,
    settings: ProcessorSettings,
    registry: FileRegistry,
    feedback: FeedbackChannel,
}

impl ProjectProcessor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            settings: ProcessorSettings::default(),
            registry: FileRegistry::new(),
            feedback: FeedbackChannel::new(),
        }
    }

    pub fn feedback(&self) -> &FeedbackChannel {
        &self.feedback
    }

    pub fn into_feedback(self) -> FeedbackChannel {
        self.feedback
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Run the whole pipeline. Defects in the project are recorded on the
    /// feedback channel and do not abort; an `Err` here means the build
    /// itself could not proceed.
    pub fn process(&mut self) -> Result<BuildSummary> {
        let source_root = PathBuf::from(&self.config.source_root);
        let root = match &self.config.output_root {
            Some(output) => {
                let output = PathBuf::from(output);
                copy_tree(&source_root, &output)?;
                output
            }
            None => source_root,
        };

        let files_discovered = discovery::discover(
            &self.config,
            &self.settings,
            &mut self.registry,
            &mut self.feedback,
            &root,
        )?;

        let ids = self.registry.all_ids();
        let code_units: Vec<FileId> = ids
            .iter()
            .copied()
            .filter(|&id| self.registry.get(id).kind().is_code())
            .collect();
        let markup_units: Vec<FileId> = ids
            .iter()
            .copied()
            .filter(|&id| self.registry.get(id).kind().is_markup())
            .collect();

        let namespaces = NamespaceProcessor::new(&self.settings);
        for &id in &code_units {
            if let Err(err) = namespaces
                .scan_import_names(&mut self.registry, id)
                .and_then(|()| {
                    namespaces
                        .extract_namespace(&mut self.registry, &mut self.feedback, id)
                        .map(|_| ())
                })
            {
                Self::note_failure(&self.registry, id, err)?;
            }
        }

        let bindings = BindingProcessor::new(&self.settings);
        for &id in &markup_units {
            if let Err(err) = bindings.extract_bindings(&mut self.registry, &mut self.feedback, id)
            {
                Self::note_failure(&self.registry, id, err)?;
            }
        }

        let mut resolver = ImportResolver::new(&self.settings);
        for &id in &markup_units {
            if let Err(err) =
                resolver.add_imports_to_view(&mut self.registry, &mut self.feedback, id)
            {
                Self::note_failure(&self.registry, id, err)?;
            }
        }

        for &id in &code_units {
            if let Err(err) = namespaces.apply_namespace(&mut self.registry, id) {
                Self::note_failure(&self.registry, id, err)?;
            }
        }

        let mut files_written = 0;
        for id in ids {
            let file = self.registry.get_mut(id);
            if file.is_dirty() {
                file.save()?;
                files_written += 1;
            }
        }

        Ok(BuildSummary {
            files_discovered,
            files_written,
        })
    }

    /// A pass failed on one file. Project defects are already on the
    /// feedback channel; anything else (misuse, I/O) aborts the build.
    fn note_failure(registry: &FileRegistry, id: FileId, err: anyhow::Error) -> Result<()> {
        match err.downcast_ref::<ProcessError>() {
            Some(process_err) if !process_err.is_misuse() => Ok(()),
            Some(_) => Err(err),
            None => {
                let path = registry.get(id).path_string();
                Err(err.context(format!("while processing {}", path)))
            }
        }
    }
}

/// Mirror the source tree into the output root before processing, so the
/// originals are never rewritten.
fn copy_tree(source: &Path, output: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.with_context(|| format!("failed to walk {}", source.display()))?;
        let path = entry.path();
        // An output root nested inside the source tree must not be recopied
        // into itself.
        if path.starts_with(output) && output != source {
            continue;
        }
        let relative = path.strip_prefix(source).unwrap_or(path);
        let destination = output.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)
                .with_context(|| format!("failed to create {}", destination.display()))?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::copy(path, &destination).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    path.display(),
                    destination.display()
                )
            })?;
        }
    }
    Ok(())
}

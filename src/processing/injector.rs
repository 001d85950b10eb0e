//! Script-include injection into view markup.
//!
//! Includes are inserted immediately before the closing component tag, one
//! per resolved namespace plus the view's own code-behind. Includes the
//! markup already declares are never duplicated.

use anyhow::Result;

use crate::error::ProcessError;
use crate::feedback::FeedbackChannel;
use crate::markup;
use crate::project::file::FileId;
use crate::project::registry::FileRegistry;
use crate::settings::{IMPORT_TEMPLATE, PATH_PLACEHOLDER, ProcessorSettings};
use crate::utils::splice_string;

pub struct MarkupInjector<'a> {
    settings: &'a ProcessorSettings,
}

impl<'a> MarkupInjector<'a> {
    pub fn new(settings: &'a ProcessorSettings) -> Self {
        Self { settings }
    }

    /// Inject include directives for the view's code-behind and its resolved
    /// `imported_namespaces` into the markup.
    ///
    /// The view must have been resolved first. Markup without a closing
    /// component tag is a `MalformedMarkup` error.
    pub fn inject(
        &self,
        registry: &mut FileRegistry,
        feedback: &mut FeedbackChannel,
        id: FileId,
    ) -> Result<()> {
        let kind = registry.get(id).kind();
        if !kind.is_markup() {
            return Err(ProcessError::UnsupportedFileKind {
                expected: "markup",
                kind: kind.to_string(),
            }
            .into());
        }

        let path = registry.get(id).path_string();
        let contents = registry.get_mut(id).contents()?.to_owned();
        let existing: Vec<String> = markup::script_include_paths(self.settings, &contents)
            .into_iter()
            .map(|p| p.to_lowercase())
            .collect();

        let mut uris: Vec<String> = Vec::new();
        if let Some(code_behind) = registry.get(id).associated_file {
            let code_behind = registry.get(code_behind);
            if !existing.contains(&code_behind.pkg_path().to_lowercase()) {
                uris.push(code_behind.pkg_uri());
            }
        }
        for name in registry.get(id).imported_namespaces.clone() {
            let Some(declaring) = registry.file_by_namespace_name(&name) else {
                feedback.error(
                    Some(&path),
                    format!("cannot inject import - no namespace named \"{}\" is declared", name),
                );
                return Err(ProcessError::MissingNamespace { name }.into());
            };
            if !existing.contains(&declaring.pkg_path().to_lowercase()) {
                uris.push(declaring.pkg_uri());
            }
        }
        if uris.is_empty() {
            return Ok(());
        }

        let Some(closing) = self.settings.end_of_component.find(&contents) else {
            feedback.error(
                Some(&path),
                "markup has no component closing tag to inject scripts before",
            );
            return Err(ProcessError::MalformedMarkup.into());
        };

        let mut block = String::new();
        for uri in &uris {
            block.push_str(&IMPORT_TEMPLATE.replace(PATH_PLACEHOLDER, uri));
            block.push('\n');
        }

        let updated = splice_string(&contents, closing.start(), 0, &block);
        registry.get_mut(id).set_contents(updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::project::file::SourceFile;
    use crate::project::namespace::Namespace;

    fn add(registry: &mut FileRegistry, pkg: &str, contents: &str) -> FileId {
        let mut file = SourceFile::new(PathBuf::from(format!("/p/{pkg}")), pkg.to_owned());
        file.preload_contents(contents.to_owned());
        registry.add_file(file)
    }

    fn mixin(registry: &mut FileRegistry, name: &str) -> FileId {
        let id = add(
            registry,
            &format!("source/{name}.brs"),
            "sub init()\nend sub\n",
        );
        let ns = Namespace::new(name, name, id).unwrap();
        registry.index_namespace(name, id);
        registry.get_mut(id).namespace = Some(ns);
        id
    }

    fn fixture() -> (ProcessorSettings, FileRegistry, FeedbackChannel) {
        (
            ProcessorSettings::default(),
            FileRegistry::new(),
            FeedbackChannel::new(),
        )
    }

    #[test]
    fn test_injects_code_behind_and_namespaces() {
        let (settings, mut registry, mut feedback) = fixture();
        mixin(&mut registry, "FocusMixin");
        let view = add(
            &mut registry,
            "views/Home.xml",
            "<component name=\"Home\">\n</component>\n",
        );
        let code = add(&mut registry, "views/Home.brs", "sub init()\nend sub\n");
        registry.associate(view, code);
        registry.get_mut(view).imported_namespaces = vec!["FocusMixin".to_owned()];

        MarkupInjector::new(&settings)
            .inject(&mut registry, &mut feedback, view)
            .unwrap();

        let contents = registry.get_mut(view).contents().unwrap();
        assert_eq!(
            contents,
            concat!(
                "<component name=\"Home\">\n",
                "<script type=\"text/brightscript\" uri=\"pkg:/views/Home.brs\" />\n",
                "<script type=\"text/brightscript\" uri=\"pkg:/source/FocusMixin.brs\" />\n",
                "</component>\n"
            )
        );
        assert!(feedback.is_empty());
    }

    #[test]
    fn test_existing_includes_are_not_duplicated() {
        let (settings, mut registry, mut feedback) = fixture();
        mixin(&mut registry, "FocusMixin");
        let xml = concat!(
            "<component name=\"Home\">\n",
            "<script type=\"text/brightscript\" uri=\"pkg:/views/Home.brs\" />\n",
            "</component>\n"
        );
        let view = add(&mut registry, "views/Home.xml", xml);
        let code = add(&mut registry, "views/Home.brs", "sub init()\nend sub\n");
        registry.associate(view, code);
        registry.get_mut(view).imported_namespaces = vec!["FocusMixin".to_owned()];

        MarkupInjector::new(&settings)
            .inject(&mut registry, &mut feedback, view)
            .unwrap();

        let contents = registry.get_mut(view).contents().unwrap();
        assert_eq!(contents.matches("pkg:/views/Home.brs").count(), 1);
        assert_eq!(contents.matches("pkg:/source/FocusMixin.brs").count(), 1);
    }

    #[test]
    fn test_nothing_to_inject_leaves_file_untouched() {
        let (settings, mut registry, mut feedback) = fixture();
        let xml = "<component name=\"Plain\">\n</component>\n";
        let view = add(&mut registry, "views/Plain.xml", xml);

        MarkupInjector::new(&settings)
            .inject(&mut registry, &mut feedback, view)
            .unwrap();

        let file = registry.get_mut(view);
        assert!(!file.is_dirty());
        assert_eq!(file.contents().unwrap(), xml);
    }

    #[test]
    fn test_missing_closing_tag_is_malformed() {
        let (settings, mut registry, mut feedback) = fixture();
        let view = add(&mut registry, "views/Broken.xml", "<component name=\"B\">\n");
        let code = add(&mut registry, "views/Broken.brs", "sub init()\nend sub\n");
        registry.associate(view, code);

        let err = MarkupInjector::new(&settings)
            .inject(&mut registry, &mut feedback, view)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::MalformedMarkup)
        ));
        assert!(feedback.has_errors());
    }

    #[test]
    fn test_unknown_namespace_fails() {
        let (settings, mut registry, mut feedback) = fixture();
        let view = add(
            &mut registry,
            "views/Home.xml",
            "<component name=\"Home\">\n</component>\n",
        );
        registry.get_mut(view).imported_namespaces = vec!["Ghost".to_owned()];

        let err = MarkupInjector::new(&settings)
            .inject(&mut registry, &mut feedback, view)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::MissingNamespace { .. })
        ));
    }

    #[test]
    fn test_rejects_code_files() {
        let (settings, mut registry, mut feedback) = fixture();
        let id = add(&mut registry, "source/A.brs", "sub init()\nend sub\n");

        let err = MarkupInjector::new(&settings)
            .inject(&mut registry, &mut feedback, id)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::UnsupportedFileKind { .. })
        ));
    }
}

//! Binding extraction: scan a view's elements for `@{...}` attribute values,
//! collect validated binding records, and blank the expressions in place.
//!
//! Blanking is length-preserving, so a rewritten element never moves the
//! byte offsets of anything else in the file. Rewritten spans are spliced
//! back in ascending start-offset order.

mod binding;
mod tag;

pub use binding::{Binding, BindingMode};
pub use tag::XmlTag;

use anyhow::Result;

use crate::error::ProcessError;
use crate::feedback::FeedbackChannel;
use crate::markup;
use crate::project::file::FileId;
use crate::project::registry::FileRegistry;
use crate::settings::ProcessorSettings;
use crate::utils::splice_string;

pub struct BindingProcessor<'a> {
    settings: &'a ProcessorSettings,
}

impl<'a> BindingProcessor<'a> {
    pub fn new(settings: &'a ProcessorSettings) -> Self {
        Self { settings }
    }

    /// Extract all bindings declared in the view's markup, record them on
    /// the file, and rewrite its contents with the expressions blanked.
    ///
    /// Invalid bindings are reported and excluded; they never abort the
    /// file. Only markup files are accepted.
    pub fn extract_bindings(
        &self,
        registry: &mut FileRegistry,
        feedback: &mut FeedbackChannel,
        id: FileId,
    ) -> Result<()> {
        let file = registry.get_mut(id);
        let kind = file.kind();
        if !kind.is_markup() {
            return Err(ProcessError::UnsupportedFileKind {
                expected: "markup",
                kind: kind.to_string(),
            }
            .into());
        }

        let path = file.path_string();
        let contents = file.contents()?.to_owned();

        let elements = markup::scan_elements(self.settings, &contents);
        let mut tags = Vec::new();
        for element in &elements {
            let tag_text = &contents[element.start..element.end];
            tags.push(XmlTag::parse(
                self.settings,
                element,
                tag_text,
                &path,
                &contents,
                feedback,
            ));
        }

        let mut rewritten = contents.clone();
        let mut changed = false;
        let file = registry.get_mut(id);
        for tag in tags {
            for binding in &tag.bindings {
                file.component_ids.insert(binding.node_id.clone());
            }
            file.bindings.extend(tag.bindings);

            // Same-length replacement; earlier splices cannot shift later
            // offsets.
            if tag.text != contents[tag.start..tag.end] {
                rewritten = splice_string(&rewritten, tag.start, tag.end - tag.start, &tag.text);
                changed = true;
            }
        }

        if changed {
            file.set_contents(rewritten);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::project::file::SourceFile;

    fn view(registry: &mut FileRegistry, pkg: &str, contents: &str) -> FileId {
        let mut file = SourceFile::new(PathBuf::from(format!("/p/{pkg}")), pkg.to_owned());
        file.preload_contents(contents.to_owned());
        registry.add_file(file)
    }

    #[test]
    fn test_extracts_bindings_and_blanks_expressions() {
        let xml = concat!(
            "<component name=\"Home\">\n",
            "  <Label id=\"title\" text=\"@{vm.title}\" />\n",
            "  <Button id=\"go\" visible=\"@{vm.canGo}\" />\n",
            "</component>\n"
        );
        let settings = ProcessorSettings::default();
        let mut registry = FileRegistry::new();
        let mut feedback = FeedbackChannel::new();
        let id = view(&mut registry, "views/Home.xml", xml);

        BindingProcessor::new(&settings)
            .extract_bindings(&mut registry, &mut feedback, id)
            .unwrap();

        let file = registry.get_mut(id);
        assert_eq!(file.bindings.len(), 2);
        assert_eq!(
            file.component_ids
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            vec!["go", "title"]
        );

        let rewritten = file.contents().unwrap().to_owned();
        assert_eq!(rewritten.len(), xml.len());
        assert!(!rewritten.contains("@{"));
        // Everything outside the two attribute values is unchanged.
        assert_eq!(&rewritten[..24], &xml[..24]);
        assert!(rewritten.contains("<Label id=\"title\" text=\"\""));
    }

    #[test]
    fn test_invalid_binding_is_excluded_but_others_survive() {
        let xml = concat!(
            "<component name=\"Home\">\n",
            "  <Button id=\"save\" selected=\"@{vm.save(), mode=twoway}\" />\n",
            "  <Label id=\"title\" text=\"@{vm.title}\" />\n",
            "</component>\n"
        );
        let settings = ProcessorSettings::default();
        let mut registry = FileRegistry::new();
        let mut feedback = FeedbackChannel::new();
        let id = view(&mut registry, "views/Home.xml", xml);

        BindingProcessor::new(&settings)
            .extract_bindings(&mut registry, &mut feedback, id)
            .unwrap();

        let file = registry.get_mut(id);
        assert_eq!(file.bindings.len(), 1);
        assert_eq!(file.bindings[0].observer_field, "title");
        assert!(feedback.has_errors());

        // The invalid expression is still blanked.
        let rewritten = file.contents().unwrap();
        assert!(!rewritten.contains("@{"));
    }

    #[test]
    fn test_rejects_code_files() {
        let settings = ProcessorSettings::default();
        let mut registry = FileRegistry::new();
        let mut feedback = FeedbackChannel::new();
        let id = view(&mut registry, "source/UtilsMixin.brs", "sub init()\nend sub");

        let err = BindingProcessor::new(&settings)
            .extract_bindings(&mut registry, &mut feedback, id)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::UnsupportedFileKind { .. })
        ));
    }

    #[test]
    fn test_view_without_bindings_is_untouched() {
        let xml = "<component name=\"Home\">\n  <Label id=\"t\" text=\"static\" />\n</component>\n";
        let settings = ProcessorSettings::default();
        let mut registry = FileRegistry::new();
        let mut feedback = FeedbackChannel::new();
        let id = view(&mut registry, "views/Home.xml", xml);

        BindingProcessor::new(&settings)
            .extract_bindings(&mut registry, &mut feedback, id)
            .unwrap();

        let file = registry.get_mut(id);
        assert!(file.bindings.is_empty());
        assert!(!file.is_dirty());
        assert_eq!(file.contents().unwrap(), xml);
    }
}

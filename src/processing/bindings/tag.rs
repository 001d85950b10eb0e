//! Per-element binding parsing and length-preserving blanking.

use crate::feedback::{Feedback, FeedbackChannel, Severity};
use crate::markup::MarkupElement;
use crate::processing::bindings::binding::{Binding, BindingMode};
use crate::settings::ProcessorSettings;
use crate::utils::{line_at_offset, offset_to_line_col};

/// One markup element's parsed view during a binding-extraction pass.
///
/// `text` is the element's rewritten opening tag: every `@{...}` attribute
/// value is blanked to `""` padded with spaces to the original character
/// length, so the rewritten text is byte-for-byte the same length as the
/// original and no offset elsewhere in the file moves.
#[derive(Debug)]
pub struct XmlTag {
    pub start: usize,
    pub end: usize,
    pub id: Option<String>,
    /// Valid bindings only; invalid ones are reported and dropped.
    pub bindings: Vec<Binding>,
    pub text: String,
}

impl XmlTag {
    pub fn parse(
        settings: &ProcessorSettings,
        element: &MarkupElement,
        tag_text: &str,
        file_path: &str,
        file_text: &str,
        feedback: &mut FeedbackChannel,
    ) -> Self {
        let id = element.id().map(str::to_owned);
        let (line, col) = offset_to_line_col(file_text, element.start);
        let source_line = line_at_offset(file_text, element.start).to_owned();

        let mut bindings = Vec::new();
        for (attr_name, attr_value) in &element.attributes {
            if attr_name.eq_ignore_ascii_case("id") {
                continue;
            }
            let Some(caps) = settings.binding_expression.captures(attr_value) else {
                continue;
            };

            let mut binding = Binding::new();
            binding.node_id = id.clone().unwrap_or_default();
            binding.node_field = attr_name.clone();
            for (index, part) in caps[1].split(',').enumerate() {
                let part: String = part.chars().filter(|c| !c.is_whitespace()).collect();
                parse_binding_part(index, &part, &mut binding, file_path, line, col, feedback);
            }
            binding.validate();

            if binding.is_valid {
                bindings.push(binding);
            } else {
                let reason = binding.error_message.as_deref().unwrap_or("invalid binding");
                feedback.push(
                    Feedback::new(
                        Severity::Error,
                        Some(file_path),
                        format!(
                            "could not parse binding for attribute \"{}\": {}",
                            attr_name, reason
                        ),
                    )
                    .with_location(line, col, Some(source_line.clone())),
                );
            }
        }

        // Blank every binding expression, valid or not, preserving length.
        let text = settings
            .quoted_binding
            .replace_all(tag_text, |m: &regex::Captures| {
                format!("{:<width$}", "\"\"", width = m[0].len())
            })
            .into_owned();

        Self {
            start: element.start,
            end: element.end,
            id,
            bindings,
            text,
        }
    }

}

fn parse_binding_part(
    index: usize,
    part: &str,
    binding: &mut Binding,
    file_path: &str,
    line: usize,
    col: usize,
    feedback: &mut FeedbackChannel,
) {
    if index == 0 {
        let mut tokens = part.split('.');
        if let (Some(id), Some(field), None) = (tokens.next(), tokens.next(), tokens.next()) {
            binding.observer_id = id.to_owned();
            binding.observer_field = field.to_owned();
            binding.is_function_binding = field.ends_with("()");
        } else {
            binding.error_message = Some(format!(
                "could not parse observer details from \"{}\"",
                part
            ));
        }
        return;
    }

    let lowered = part.to_lowercase();
    if let Some(value) = lowered.strip_prefix("mode=") {
        match BindingMode::parse(value) {
            Some(mode) => binding.mode = mode,
            None => warn(
                feedback,
                file_path,
                line,
                col,
                format!("could not parse binding mode from \"{}\"", part),
            ),
        }
    } else if lowered.starts_with("transform=") {
        let value = &part["transform=".len()..];
        if value.is_empty() {
            warn(
                feedback,
                file_path,
                line,
                col,
                format!("could not parse transform function from \"{}\"", part),
            );
        } else {
            binding.transform_function = Some(value.to_owned());
        }
    } else if let Some(value) = lowered.strip_prefix("issettinginitialvalue=") {
        if value.is_empty() {
            warn(
                feedback,
                file_path,
                line,
                col,
                format!("could not parse isSettingInitialValue from \"{}\"", part),
            );
        } else {
            binding.is_setting_initial_value = value == "true";
        }
    } else {
        warn(
            feedback,
            file_path,
            line,
            col,
            format!("unrecognized binding modifier \"{}\"", part),
        );
    }
}

fn warn(
    feedback: &mut FeedbackChannel,
    file_path: &str,
    line: usize,
    col: usize,
    message: String,
) {
    feedback.push(
        Feedback::new(Severity::Warning, Some(file_path), message).with_location(line, col, None),
    );
}

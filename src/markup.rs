//! Regex-level markup scanning.
//!
//! This is deliberately not an XML parser. The passes only need, per element,
//! a byte-offset span over the opening tag and an attribute map in document
//! order; everything else about the markup is left untouched so line/column
//! reporting for the rest of the file stays exact. Comments are masked to
//! same-length whitespace before scanning so offsets inside real elements
//! are unaffected.

use std::borrow::Cow;

use crate::settings::ProcessorSettings;

/// One markup element's opening tag, as seen by a scanning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    pub tag: String,
    /// Byte span of the whole opening tag, `<` through `>` inclusive.
    pub start: usize,
    pub end: usize,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
}

impl MarkupElement {
    /// Case-insensitive attribute lookup.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }
}

/// Scan every opening (or self-closing) element in document order.
pub fn scan_elements(settings: &ProcessorSettings, text: &str) -> Vec<MarkupElement> {
    let masked = mask_comments(settings, text);
    let mut elements = Vec::new();
    for caps in settings.element_tag.captures_iter(&masked) {
        let whole = caps.get(0).unwrap();
        let tag = caps[1].to_owned();
        let attr_chunk = caps.get(2).map_or("", |m| m.as_str());
        let attributes = settings
            .attribute
            .captures_iter(attr_chunk)
            .map(|a| (a[1].to_owned(), a[2].to_owned()))
            .collect();
        elements.push(MarkupElement {
            tag,
            start: whole.start(),
            end: whole.end(),
            attributes,
        });
    }
    elements
}

/// Package-relative paths of every `<script uri="pkg:/..."/>` include the
/// markup already declares.
pub fn script_include_paths(settings: &ProcessorSettings, text: &str) -> Vec<String> {
    settings
        .script_include
        .captures_iter(text)
        .map(|c| c[1].to_owned())
        .collect()
}

/// The root `<component name="..." extends="...">` declaration, if any.
/// Returns `(name, extends)`.
pub fn component_declaration(
    settings: &ProcessorSettings,
    text: &str,
) -> Option<(String, Option<String>)> {
    scan_elements(settings, text)
        .into_iter()
        .find(|el| el.tag.eq_ignore_ascii_case("component"))
        .and_then(|el| {
            let name = el.attribute("name")?.to_owned();
            let extends = el.attribute("extends").map(str::to_owned);
            Some((name, extends))
        })
}

/// Replace comment bytes with spaces, preserving length and newlines so all
/// other offsets stay valid.
fn mask_comments<'a>(settings: &ProcessorSettings, text: &'a str) -> Cow<'a, str> {
    settings.comment.replace_all(text, |caps: &regex::Captures| {
        caps[0]
            .chars()
            .map(|c| if c == '\n' { '\n' } else { ' ' })
            .collect::<String>()
    })
}

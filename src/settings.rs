//! Compiled pattern set for directive and markup scanning.
//!
//! The directive syntax is a textual convention, not a grammar, so the whole
//! surface lives here as one struct of precompiled patterns. Components take
//! a `&ProcessorSettings` instead of compiling regexes ad hoc, which keeps
//! the convention in one versionable place.
//!
//! Directive forms:
//! - `'@Import <namespaceName>` - a direct namespace import
//! - `'@Namespace <filePrefix> <name>` - the unit's namespace declaration
//!   (a single token serves as both prefix and name)

use regex::Regex;

/// Template for one injected include directive. `$PATH$` is substituted with
/// the target file's package URI.
pub const IMPORT_TEMPLATE: &str = r#"<script type="text/brightscript" uri="$PATH$" />"#;

/// Substitution point inside [`IMPORT_TEMPLATE`].
pub const PATH_PLACEHOLDER: &str = "$PATH$";

/// Namespaces force-added to any view that declares bindings.
pub const BINDING_SUPPORT_NAMESPACES: [&str; 2] = ["ObservableMixin", "BaseObservable"];

#[derive(Debug)]
pub struct ProcessorSettings {
    /// `'@Import Name` in a code unit. Capture 1 is the namespace name.
    pub import_directive: Regex,

    /// `'@Namespace prefix name` in a code unit. Capture 1 is the file
    /// prefix, capture 2 (optional) the canonical name.
    pub namespace_directive: Regex,

    /// An existing `<script ... uri="pkg:/..." />` include in markup.
    /// Capture 1 is the package-relative path.
    pub script_include: Regex,

    /// The closing root-element tag of a view. Injection happens immediately
    /// before its first occurrence.
    pub end_of_component: Regex,

    /// A whole attribute value of the form `@{...}`. Capture 1 is the inner
    /// expression.
    pub binding_expression: Regex,

    /// A quoted binding expression inside raw tag text, used for
    /// length-preserving blanking.
    pub quoted_binding: Regex,

    /// A top-level `function`/`sub` declaration in a code unit. Capture 1 is
    /// the leading keyword text, capture 2 the declared name.
    pub declaration_name: Regex,

    /// One opening (or self-closing) markup element. Capture 1 is the tag
    /// name, capture 2 the raw attribute chunk.
    pub element_tag: Regex,

    /// One `name="value"` attribute inside an element's attribute chunk.
    pub attribute: Regex,

    /// An XML comment, masked out before element scanning.
    pub comment: Regex,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            import_directive: Regex::new(r"(?m)^[ \t]*'@Import[ \t]+(\w+)").unwrap(),
            namespace_directive: Regex::new(r"(?m)^[ \t]*'@Namespace[ \t]+(\w+)(?:[ \t]+(\w+))?")
                .unwrap(),
            script_include: Regex::new(r#"(?i)<script\b[^>]*\buri\s*=\s*"pkg:/([^"]+)"[^>]*>"#)
                .unwrap(),
            end_of_component: Regex::new(r"(?i)</component\s*>").unwrap(),
            binding_expression: Regex::new(r"(?s)^@\{(.*)\}$").unwrap(),
            quoted_binding: Regex::new(r#""@\{[^}]*\}""#).unwrap(),
            declaration_name: Regex::new(r"(?mi)^([ \t]*(?:function|sub)[ \t]+)([A-Za-z_]\w*)")
                .unwrap(),
            element_tag: Regex::new(r#"<([A-Za-z_][\w.:-]*)((?:"[^"]*"|'[^']*'|[^>"'])*)>"#)
                .unwrap(),
            attribute: Regex::new(r#"([A-Za-z_][\w.:-]*)\s*=\s*"([^"]*)""#).unwrap(),
            comment: Regex::new(r"(?s)<!--.*?-->").unwrap(),
        }
    }
}

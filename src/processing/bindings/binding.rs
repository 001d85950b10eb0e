//! A declared observer/subject link extracted from one markup attribute.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingMode {
    #[default]
    OneWay,
    TwoWay,
    OneWaySource,
}

impl BindingMode {
    /// Parse a `mode=` modifier value, case-insensitively.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "oneway" => Some(Self::OneWay),
            "twoway" => Some(Self::TwoWay),
            "onewaysource" => Some(Self::OneWaySource),
            _ => None,
        }
    }
}

impl fmt::Display for BindingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingMode::OneWay => write!(f, "oneway"),
            BindingMode::TwoWay => write!(f, "twoway"),
            BindingMode::OneWaySource => write!(f, "onewaysource"),
        }
    }
}

/// One binding between a markup element's field (the subject) and an
/// observer's field, as declared in an `@{...}` attribute value.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    /// Id of the element the attribute lives on.
    pub node_id: String,
    /// The attribute name the expression was found in.
    pub node_field: String,
    pub observer_id: String,
    pub observer_field: String,
    pub mode: BindingMode,
    pub transform_function: Option<String>,
    /// Whether the binding pushes the current value when first connected.
    pub is_setting_initial_value: bool,
    /// The observer field names a function call (`name()`), not a property.
    pub is_function_binding: bool,
    pub is_valid: bool,
    pub error_message: Option<String>,
}

impl Binding {
    pub fn new() -> Self {
        Self {
            is_setting_initial_value: true,
            ..Self::default()
        }
    }

    /// Check the declared shape and record the first failure reason.
    pub fn validate(&mut self) {
        self.error_message = self.first_error().map(str::to_owned);
        self.is_valid = self.error_message.is_none();
    }

    fn first_error(&self) -> Option<&'static str> {
        if self.node_id.is_empty() {
            return Some("node id is not defined");
        }
        if self.node_field.is_empty() {
            return Some("node field is not defined");
        }
        if self.observer_id.is_empty() {
            return Some("observer id is not defined");
        }
        if self.observer_field.is_empty() {
            return Some("observer field is not defined");
        }
        if self.is_function_binding && self.mode != BindingMode::OneWay {
            return Some("observer callbacks on functions are only supported for one way bindings");
        }
        None
    }
}

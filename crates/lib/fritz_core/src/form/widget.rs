//! Widget descriptors produced for each visible component.

use serde::Serialize;

/// Step of a number input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberStep {
    Whole,
    Any,
}

/// Type-specific control with its current display value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "lowercase")]
pub enum Widget {
    Text {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    TextArea {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Number {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        step: NumberStep,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Date {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    /// Visible notice for a type this build cannot render.
    Unsupported { type_id: String, notice: String },
}

impl Widget {
    pub fn unsupported(type_id: &str) -> Self {
        Self::Unsupported {
            type_id: type_id.to_string(),
            notice: format!("Unsupported field type: {type_id}"),
        }
    }

    /// Current value as shown in the control.
    pub fn display_value(&self) -> &str {
        match self {
            Self::Text { value, .. }
            | Self::TextArea { value, .. }
            | Self::Number { value, .. }
            | Self::Date { value, .. } => value,
            Self::Unsupported { .. } => "",
        }
    }
}

/// One rendered form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub name: String,
    /// Title, followed by ` *` for mandatory fields.
    pub label: String,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub widget: Widget,
}

pub(crate) fn placeholder(default: Option<String>) -> Option<String> {
    default.map(|v| format!("Default: {v}"))
}

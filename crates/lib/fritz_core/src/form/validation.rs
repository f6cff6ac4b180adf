//! Record validation against a layout.

use std::collections::BTreeMap;

use serde_json::Value;

use super::kind::kind_for;
use crate::definition::{FieldComponent, Layout};
use crate::entity::RecordData;

/// Validation messages by component name. Empty means the record is valid.
pub type FieldErrors = BTreeMap<String, String>;

/// `null`, missing and `""` count as no value.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Message for one component's value, if it fails.
pub fn validate_field(component: &FieldComponent, value: Option<&Value>) -> Option<String> {
    if is_blank(value) {
        return component
            .is_mandatory()
            .then(|| format!("{} is required", component.title()));
    }
    let value = value?;
    let kind = kind_for(component.field_type()?);
    kind.check_value(component.title(), component.settings(), value)
}

/// Validate every visible component. Pure: same inputs, same errors.
pub fn validate_record(layout: &Layout, data: &RecordData) -> FieldErrors {
    layout
        .visible()
        .filter_map(|c| {
            validate_field(c, data.get(c.name())).map(|msg| (c.name().to_string(), msg))
        })
        .collect()
}

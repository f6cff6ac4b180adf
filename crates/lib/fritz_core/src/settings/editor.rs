//! Settings editor dispatch.
//!
//! [`resolve`] maps a field type id to the editor for its settings shape.
//! Editors describe their inputs and turn raw input into [`SettingsEdit`]
//! values; they never mutate a component themselves.

use super::{FieldSettings, SettingKey, SettingValue, SettingsEdit, values};
use crate::registry::FieldType;

/// Shown in place of a settings panel for types without an editor.
pub const NO_SETTINGS_MESSAGE: &str = "No additional settings available for this component type";

/// Kind of control a settings input is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    TextArea,
    Number,
    Checkbox,
    Date,
}

/// One input of a settings panel with its current display value.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsInput {
    pub key: SettingKey,
    pub label: &'static str,
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
}

impl SettingsInput {
    fn field(key: SettingKey, kind: InputKind, value: Option<String>) -> Self {
        Self {
            key,
            label: key.label(),
            kind,
            value: value.unwrap_or_default(),
            checked: false,
        }
    }

    fn checkbox(key: SettingKey, checked: bool) -> Self {
        Self {
            key,
            label: key.label(),
            kind: InputKind::Checkbox,
            value: String::new(),
            checked,
        }
    }
}

/// Raw value coming out of a settings control.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Text(String),
    Toggle(bool),
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for RawInput {
    fn from(b: bool) -> Self {
        Self::Toggle(b)
    }
}

/// Result of a single edit: a pair to merge, or nothing to change.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Emit(SettingsEdit),
    Rejected,
}

/// Per-type settings editor.
pub trait SettingsEditor: Send + Sync {
    /// Inputs shown for the given settings, in display order.
    fn inputs(&self, settings: &FieldSettings) -> Vec<SettingsInput>;

    /// Turn raw input for `key` into an edit.
    fn edit(&self, key: SettingKey, raw: RawInput) -> EditOutcome;
}

/// Editor for `input` and `textarea`.
pub struct TextEditor {
    multiline: bool,
}

/// Editor for `integer`.
pub struct IntegerEditor;

/// Editor for `float4` and `float8`.
pub struct FloatEditor;

/// Editor for `date`.
pub struct DateEditor;

static INPUT_EDITOR: TextEditor = TextEditor { multiline: false };
static TEXTAREA_EDITOR: TextEditor = TextEditor { multiline: true };
static INTEGER_EDITOR: IntegerEditor = IntegerEditor;
static FLOAT_EDITOR: FloatEditor = FloatEditor;
static DATE_EDITOR: DateEditor = DateEditor;

/// Editor for a field type id, or `None` when the type has no settings editor.
pub fn resolve(type_id: &str) -> Option<&'static dyn SettingsEditor> {
    let editor: &'static dyn SettingsEditor = match FieldType::parse(type_id)? {
        FieldType::Input => &INPUT_EDITOR,
        FieldType::Textarea => &TEXTAREA_EDITOR,
        FieldType::Integer => &INTEGER_EDITOR,
        FieldType::Float4 | FieldType::Float8 => &FLOAT_EDITOR,
        FieldType::Date => &DATE_EDITOR,
    };
    Some(editor)
}

/// Settings panel state for a component.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsPanel {
    Inputs(Vec<SettingsInput>),
    Empty,
}

impl SettingsPanel {
    pub fn for_settings(settings: &FieldSettings) -> Self {
        match resolve(settings.type_id()) {
            Some(editor) => Self::Inputs(editor.inputs(settings)),
            None => Self::Empty,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Empty => Some(NO_SETTINGS_MESSAGE),
            Self::Inputs(_) => None,
        }
    }
}

fn text_of(raw: RawInput) -> Option<String> {
    match raw {
        RawInput::Text(s) => Some(s),
        RawInput::Toggle(_) => None,
    }
}

/// Numeric text: empty clears the key, anything unparsable is rejected.
fn numeric<T: std::str::FromStr>(
    key: SettingKey,
    raw: RawInput,
    wrap: impl Fn(T) -> SettingValue,
) -> EditOutcome {
    let Some(text) = text_of(raw) else {
        return EditOutcome::Rejected;
    };
    let text = text.trim();
    if text.is_empty() {
        return EditOutcome::Emit(SettingsEdit::unset(key));
    }
    match text.parse::<T>() {
        Ok(v) => EditOutcome::Emit(SettingsEdit::new(key, wrap(v))),
        Err(_) => {
            log::debug!("rejected non-numeric input for {}: {text:?}", key.as_str());
            EditOutcome::Rejected
        }
    }
}

fn text_value(key: SettingKey, raw: RawInput) -> EditOutcome {
    match text_of(raw) {
        Some(t) if t.is_empty() => EditOutcome::Emit(SettingsEdit::unset(key)),
        Some(t) => EditOutcome::Emit(SettingsEdit::new(key, SettingValue::Text(t))),
        None => EditOutcome::Rejected,
    }
}

impl SettingsEditor for TextEditor {
    fn inputs(&self, settings: &FieldSettings) -> Vec<SettingsInput> {
        let s = settings.text().cloned().unwrap_or_default();
        let default_kind = if self.multiline {
            InputKind::TextArea
        } else {
            InputKind::Text
        };
        vec![
            SettingsInput::field(SettingKey::DefaultValue, default_kind, s.default_value),
            SettingsInput::field(
                SettingKey::ColumnLength,
                InputKind::Number,
                s.column_length.map(|n| n.to_string()),
            ),
            SettingsInput::field(SettingKey::RegexValidation, InputKind::Text, s.regex_validation),
        ]
    }

    fn edit(&self, key: SettingKey, raw: RawInput) -> EditOutcome {
        match key {
            SettingKey::DefaultValue | SettingKey::RegexValidation => text_value(key, raw),
            SettingKey::ColumnLength => numeric::<i64>(key, raw, SettingValue::Integer),
            _ => EditOutcome::Rejected,
        }
    }
}

impl SettingsEditor for IntegerEditor {
    fn inputs(&self, settings: &FieldSettings) -> Vec<SettingsInput> {
        let s = settings.integer().cloned().unwrap_or_default();
        let num = |v: Option<i64>| v.map(|n| n.to_string());
        vec![
            SettingsInput::field(SettingKey::DefaultValue, InputKind::Number, num(s.default_value)),
            SettingsInput::field(SettingKey::MinValue, InputKind::Number, num(s.min_value)),
            SettingsInput::field(SettingKey::MaxValue, InputKind::Number, num(s.max_value)),
            SettingsInput::checkbox(SettingKey::Unsigned, s.unsigned),
        ]
    }

    fn edit(&self, key: SettingKey, raw: RawInput) -> EditOutcome {
        match key {
            SettingKey::DefaultValue | SettingKey::MinValue | SettingKey::MaxValue => {
                numeric::<i64>(key, raw, SettingValue::Integer)
            }
            // No cross-check against minValue here; that happens on submit.
            SettingKey::Unsigned => match raw {
                RawInput::Toggle(b) => EditOutcome::Emit(SettingsEdit::new(key, SettingValue::Flag(b))),
                RawInput::Text(_) => EditOutcome::Rejected,
            },
            _ => EditOutcome::Rejected,
        }
    }
}

impl SettingsEditor for FloatEditor {
    fn inputs(&self, settings: &FieldSettings) -> Vec<SettingsInput> {
        let s = settings.float().cloned().unwrap_or_default();
        let num = |v: Option<f64>| v.map(|n| n.to_string());
        vec![
            SettingsInput::field(SettingKey::DefaultValue, InputKind::Number, num(s.default_value)),
            SettingsInput::field(SettingKey::MinValue, InputKind::Number, num(s.min_value)),
            SettingsInput::field(SettingKey::MaxValue, InputKind::Number, num(s.max_value)),
        ]
    }

    fn edit(&self, key: SettingKey, raw: RawInput) -> EditOutcome {
        match key {
            SettingKey::DefaultValue | SettingKey::MinValue | SettingKey::MaxValue => {
                match numeric::<f64>(key, raw, SettingValue::Float) {
                    EditOutcome::Emit(SettingsEdit {
                        value: SettingValue::Float(f),
                        ..
                    }) if !f.is_finite() => EditOutcome::Rejected,
                    outcome => outcome,
                }
            }
            _ => EditOutcome::Rejected,
        }
    }
}

impl SettingsEditor for DateEditor {
    fn inputs(&self, settings: &FieldSettings) -> Vec<SettingsInput> {
        let s = settings.date().cloned().unwrap_or_default();
        vec![SettingsInput::field(
            SettingKey::DefaultValue,
            InputKind::Date,
            s.default_value.map(values::format_date),
        )]
    }

    fn edit(&self, key: SettingKey, raw: RawInput) -> EditOutcome {
        if key != SettingKey::DefaultValue {
            return EditOutcome::Rejected;
        }
        let Some(text) = text_of(raw) else {
            return EditOutcome::Rejected;
        };
        if text.trim().is_empty() {
            return EditOutcome::Emit(SettingsEdit::unset(key));
        }
        match values::parse_date(&text) {
            Some(d) => EditOutcome::Emit(SettingsEdit::new(key, SettingValue::Date(d))),
            None => EditOutcome::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_known_and_unknown_types() {
        assert!(resolve("input").is_some());
        assert!(resolve("float8").is_some());
        assert!(resolve("wysiwyg").is_none());
    }

    #[test]
    fn unknown_type_renders_empty_panel() {
        let settings = FieldSettings::from_json("wysiwyg", None);
        let panel = SettingsPanel::for_settings(&settings);
        assert_eq!(panel, SettingsPanel::Empty);
        assert_eq!(panel.message(), Some(NO_SETTINGS_MESSAGE));
    }

    #[test]
    fn integer_editor_lists_bounds_and_unsigned_toggle() {
        let settings = FieldSettings::from_json("integer", Some(&json!({"maxValue": 10})));
        let SettingsPanel::Inputs(inputs) = SettingsPanel::for_settings(&settings) else {
            panic!("integer has an editor");
        };
        let keys: Vec<SettingKey> = inputs.iter().map(|i| i.key).collect();
        assert_eq!(
            keys,
            vec![
                SettingKey::DefaultValue,
                SettingKey::MinValue,
                SettingKey::MaxValue,
                SettingKey::Unsigned
            ]
        );
        assert_eq!(inputs[2].value, "10");
        assert_eq!(inputs[3].kind, InputKind::Checkbox);
    }

    #[test]
    fn numeric_empty_string_clears_key() {
        let editor = resolve("integer").unwrap();
        assert_eq!(
            editor.edit(SettingKey::MinValue, "".into()),
            EditOutcome::Emit(SettingsEdit::unset(SettingKey::MinValue))
        );
    }

    #[test]
    fn numeric_garbage_is_rejected() {
        let editor = resolve("integer").unwrap();
        assert_eq!(editor.edit(SettingKey::MaxValue, "ten".into()), EditOutcome::Rejected);
        assert_eq!(editor.edit(SettingKey::MaxValue, "1.5".into()), EditOutcome::Rejected);

        let editor = resolve("float4").unwrap();
        assert_eq!(
            editor.edit(SettingKey::MaxValue, "1.5".into()),
            EditOutcome::Emit(SettingsEdit::new(SettingKey::MaxValue, SettingValue::Float(1.5)))
        );
        assert_eq!(editor.edit(SettingKey::MinValue, "inf".into()), EditOutcome::Rejected);
    }

    #[test]
    fn unsigned_toggle_accepts_negative_min_at_edit_time() {
        let editor = resolve("integer").unwrap();
        let mut settings = FieldSettings::from_json("integer", Some(&json!({"minValue": -5})));
        let EditOutcome::Emit(edit) = editor.edit(SettingKey::Unsigned, true.into()) else {
            panic!("toggle emits");
        };
        assert!(settings.apply(&edit));
        assert!(settings.integer().unwrap().unsigned);
        assert_eq!(settings.integer().unwrap().min_value, Some(-5));
    }

    #[test]
    fn text_editor_ignores_numeric_keys() {
        let editor = resolve("textarea").unwrap();
        assert_eq!(editor.edit(SettingKey::MinValue, "1".into()), EditOutcome::Rejected);
        assert_eq!(
            editor.edit(SettingKey::ColumnLength, "120".into()),
            EditOutcome::Emit(SettingsEdit::new(
                SettingKey::ColumnLength,
                SettingValue::Integer(120)
            ))
        );
    }

    #[test]
    fn date_editor_parses_iso_dates() {
        let editor = resolve("date").unwrap();
        assert!(matches!(
            editor.edit(SettingKey::DefaultValue, "2024-02-29".into()),
            EditOutcome::Emit(SettingsEdit {
                value: SettingValue::Date(_),
                ..
            })
        ));
        assert_eq!(
            editor.edit(SettingKey::DefaultValue, "2023-02-29".into()),
            EditOutcome::Rejected
        );
    }
}

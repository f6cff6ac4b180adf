//! Type-tagged component settings.
//!
//! The settings shape of a component is fixed by its field type. Raw JSON is
//! read leniently into [`FieldSettings`]; writes go through [`SettingsEdit`]
//! values produced by the per-type editors in [`editor`].

pub mod editor;
pub mod values;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::registry::FieldType;

pub use editor::{EditOutcome, RawInput, SettingsEditor, SettingsInput, SettingsPanel, resolve};

/// Internal consistency errors of a component's settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("columnLength must be greater than 0")]
    InvalidColumnLength(i64),

    #[error("invalid regex pattern: {0}")]
    InvalidRegex(String),

    #[error("minValue cannot be greater than maxValue")]
    MinGreaterThanMax,

    #[error("defaultValue cannot be negative when unsigned is true")]
    NegativeDefault,

    #[error("minValue cannot be negative when unsigned is true")]
    NegativeMin,
}

/// Settings keys across all field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    DefaultValue,
    ColumnLength,
    RegexValidation,
    MinValue,
    MaxValue,
    Unsigned,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultValue => "defaultValue",
            Self::ColumnLength => "columnLength",
            Self::RegexValidation => "regexValidation",
            Self::MinValue => "minValue",
            Self::MaxValue => "maxValue",
            Self::Unsigned => "unsigned",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DefaultValue => "Default Value",
            Self::ColumnLength => "Column Length",
            Self::RegexValidation => "Regex Validation",
            Self::MinValue => "Minimum Value",
            Self::MaxValue => "Maximum Value",
            Self::Unsigned => "Unsigned (positive numbers only)",
        }
    }

    pub fn parse(key: &str) -> Option<SettingKey> {
        [
            Self::DefaultValue,
            Self::ColumnLength,
            Self::RegexValidation,
            Self::MinValue,
            Self::MaxValue,
            Self::Unsigned,
        ]
        .into_iter()
        .find(|k| k.as_str() == key)
    }
}

/// A single settings value. `Unset` clears the key.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Unset,
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
    Date(NaiveDate),
}

/// A (key, value) pair emitted by an editor and merged by the definition model.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsEdit {
    pub key: SettingKey,
    pub value: SettingValue,
}

impl SettingsEdit {
    pub fn new(key: SettingKey, value: SettingValue) -> Self {
        Self { key, value }
    }

    pub fn unset(key: SettingKey) -> Self {
        Self::new(key, SettingValue::Unset)
    }
}

/// Settings of `input` and `textarea` components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSettings {
    pub default_value: Option<String>,
    pub column_length: Option<i64>,
    pub regex_validation: Option<String>,
}

/// Settings of `integer` components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegerSettings {
    pub default_value: Option<i64>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub unsigned: bool,
}

/// Settings of `float4` and `float8` components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatSettings {
    pub default_value: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Settings of `date` components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSettings {
    pub default_value: Option<NaiveDate>,
}

/// Settings of one component, tagged by its field type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSettings {
    Input(TextSettings),
    Textarea(TextSettings),
    Integer(IntegerSettings),
    Float4(FloatSettings),
    Float8(FloatSettings),
    Date(DateSettings),
    /// Type not known to this build; raw settings are carried through untouched.
    Unsupported {
        type_id: String,
        raw: Map<String, Value>,
    },
}

impl FieldSettings {
    /// Empty settings for a known field type.
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Input => Self::Input(TextSettings::default()),
            FieldType::Textarea => Self::Textarea(TextSettings::default()),
            FieldType::Integer => Self::Integer(IntegerSettings::default()),
            FieldType::Float4 => Self::Float4(FloatSettings::default()),
            FieldType::Float8 => Self::Float8(FloatSettings::default()),
            FieldType::Date => Self::Date(DateSettings::default()),
        }
    }

    /// Read raw settings for the given type id. Never fails: unreadable keys are unset.
    pub fn from_json(type_id: &str, raw: Option<&Value>) -> Self {
        let empty = Map::new();
        let map = match raw {
            Some(Value::Object(m)) => m,
            _ => &empty,
        };

        let Some(field_type) = FieldType::parse(type_id) else {
            return Self::Unsupported {
                type_id: type_id.to_string(),
                raw: map.clone(),
            };
        };

        let text = || TextSettings {
            default_value: values::read_string(map, "defaultValue"),
            column_length: values::read_i64(map, "columnLength"),
            regex_validation: values::read_string(map, "regexValidation"),
        };
        let float = || FloatSettings {
            default_value: values::read_f64(map, "defaultValue"),
            min_value: values::read_f64(map, "minValue"),
            max_value: values::read_f64(map, "maxValue"),
        };

        match field_type {
            FieldType::Input => Self::Input(text()),
            FieldType::Textarea => Self::Textarea(text()),
            FieldType::Integer => Self::Integer(IntegerSettings {
                default_value: values::read_i64(map, "defaultValue"),
                min_value: values::read_i64(map, "minValue"),
                max_value: values::read_i64(map, "maxValue"),
                unsigned: values::read_bool(map, "unsigned"),
            }),
            FieldType::Float4 => Self::Float4(float()),
            FieldType::Float8 => Self::Float8(float()),
            FieldType::Date => Self::Date(DateSettings {
                default_value: values::read_date(map, "defaultValue"),
            }),
        }
    }

    pub fn type_id(&self) -> &str {
        match self {
            Self::Unsupported { type_id, .. } => type_id,
            known => known.field_type().map(|t| t.as_str()).unwrap_or_default(),
        }
    }

    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::Input(_) => Some(FieldType::Input),
            Self::Textarea(_) => Some(FieldType::Textarea),
            Self::Integer(_) => Some(FieldType::Integer),
            Self::Float4(_) => Some(FieldType::Float4),
            Self::Float8(_) => Some(FieldType::Float8),
            Self::Date(_) => Some(FieldType::Date),
            Self::Unsupported { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&TextSettings> {
        match self {
            Self::Input(s) | Self::Textarea(s) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self) -> Option<&IntegerSettings> {
        match self {
            Self::Integer(s) => Some(s),
            _ => None,
        }
    }

    pub fn float(&self) -> Option<&FloatSettings> {
        match self {
            Self::Float4(s) | Self::Float8(s) => Some(s),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<&DateSettings> {
        match self {
            Self::Date(s) => Some(s),
            _ => None,
        }
    }

    /// JSON object holding only the keys that are set.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            Self::Input(s) | Self::Textarea(s) => {
                put(&mut map, "defaultValue", s.default_value.clone().map(Value::String));
                put(&mut map, "columnLength", s.column_length.map(Value::from));
                put(&mut map, "regexValidation", s.regex_validation.clone().map(Value::String));
            }
            Self::Integer(s) => {
                put(&mut map, "defaultValue", s.default_value.map(Value::from));
                put(&mut map, "minValue", s.min_value.map(Value::from));
                put(&mut map, "maxValue", s.max_value.map(Value::from));
                if s.unsigned {
                    map.insert("unsigned".into(), Value::Bool(true));
                }
            }
            Self::Float4(s) | Self::Float8(s) => {
                put(&mut map, "defaultValue", s.default_value.and_then(float_value));
                put(&mut map, "minValue", s.min_value.and_then(float_value));
                put(&mut map, "maxValue", s.max_value.and_then(float_value));
            }
            Self::Date(s) => {
                put(
                    &mut map,
                    "defaultValue",
                    s.default_value.map(|d| Value::String(values::format_date(d))),
                );
            }
            Self::Unsupported { raw, .. } => return Value::Object(raw.clone()),
        }
        Value::Object(map)
    }

    /// Merge one edit. Returns `false` when the key or value kind does not fit this shape.
    pub fn apply(&mut self, edit: &SettingsEdit) -> bool {
        use SettingKey as K;
        use SettingValue as V;

        match (self, edit.key, &edit.value) {
            (Self::Input(s) | Self::Textarea(s), key, value) => match (key, value) {
                (K::DefaultValue, V::Unset) => s.default_value = None,
                (K::DefaultValue, V::Text(t)) => s.default_value = non_empty(t),
                (K::ColumnLength, V::Unset) => s.column_length = None,
                (K::ColumnLength, V::Integer(n)) => s.column_length = Some(*n),
                (K::RegexValidation, V::Unset) => s.regex_validation = None,
                (K::RegexValidation, V::Text(t)) => s.regex_validation = non_empty(t),
                _ => return false,
            },
            (Self::Integer(s), key, value) => {
                let slot = match key {
                    K::DefaultValue => &mut s.default_value,
                    K::MinValue => &mut s.min_value,
                    K::MaxValue => &mut s.max_value,
                    K::Unsigned => {
                        return match value {
                            V::Flag(b) => {
                                s.unsigned = *b;
                                true
                            }
                            V::Unset => {
                                s.unsigned = false;
                                true
                            }
                            _ => false,
                        };
                    }
                    _ => return false,
                };
                match value {
                    V::Unset => *slot = None,
                    V::Integer(n) => *slot = Some(*n),
                    _ => return false,
                }
            }
            (Self::Float4(s) | Self::Float8(s), key, value) => {
                let slot = match key {
                    K::DefaultValue => &mut s.default_value,
                    K::MinValue => &mut s.min_value,
                    K::MaxValue => &mut s.max_value,
                    _ => return false,
                };
                match value {
                    V::Unset => *slot = None,
                    V::Float(f) if f.is_finite() => *slot = Some(*f),
                    V::Integer(n) => *slot = Some(*n as f64),
                    _ => return false,
                }
            }
            (Self::Date(s), K::DefaultValue, value) => match value {
                V::Unset => s.default_value = None,
                V::Date(d) => s.default_value = Some(*d),
                _ => return false,
            },
            _ => return false,
        }
        true
    }

    /// Check the settings for internal consistency.
    pub fn check(&self) -> Result<(), SettingsError> {
        match self {
            Self::Input(s) | Self::Textarea(s) => {
                if let Some(len) = s.column_length
                    && len <= 0
                {
                    return Err(SettingsError::InvalidColumnLength(len));
                }
                if let Some(pattern) = &s.regex_validation {
                    Regex::new(pattern).map_err(|e| SettingsError::InvalidRegex(e.to_string()))?;
                }
            }
            Self::Integer(s) => {
                if let (Some(min), Some(max)) = (s.min_value, s.max_value)
                    && min > max
                {
                    return Err(SettingsError::MinGreaterThanMax);
                }
                if s.unsigned {
                    if s.default_value.is_some_and(|v| v < 0) {
                        return Err(SettingsError::NegativeDefault);
                    }
                    if s.min_value.is_some_and(|v| v < 0) {
                        return Err(SettingsError::NegativeMin);
                    }
                }
            }
            Self::Float4(s) | Self::Float8(s) => {
                if let (Some(min), Some(max)) = (s.min_value, s.max_value)
                    && min > max
                {
                    return Err(SettingsError::MinGreaterThanMax);
                }
            }
            Self::Date(_) | Self::Unsupported { .. } => {}
        }
        Ok(())
    }
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        map.insert(key.to_string(), v);
    }
}

fn float_value(f: f64) -> Option<Value> {
    Number::from_f64(f).map(Value::Number)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

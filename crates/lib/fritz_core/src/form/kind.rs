//! Per-type form behaviour.
//!
//! [`kind_for`] is the only place a field type maps to its form logic. A new
//! field type adds one registry entry, one settings shape and one kind here.

use regex::Regex;
use serde_json::{Number, Value};

use super::widget::{NumberStep, Widget, placeholder};
use crate::registry::FieldType;
use crate::settings::FieldSettings;
use crate::settings::values::{as_f64, as_i64, format_date, parse_date};

/// Form behaviour of one field type.
pub trait FieldKind: Send + Sync {
    /// Initial value for a record that was never saved.
    fn derive_default(&self, settings: &FieldSettings) -> Value;

    /// Type-specific checks on a present value. Returns the message of the
    /// last failing check.
    fn check_value(&self, title: &str, settings: &FieldSettings, value: &Value) -> Option<String>;

    /// Widget showing `value`.
    fn widget(&self, settings: &FieldSettings, value: Option<&Value>) -> Widget;

    /// Turn raw widget input into a record value. `None` rejects the input.
    fn coerce_input(&self, raw: &str) -> Option<Value>;
}

pub struct TextKind {
    multiline: bool,
}

pub struct IntegerKind;

pub struct FloatKind;

pub struct DateKind;

static INPUT: TextKind = TextKind { multiline: false };
static TEXTAREA: TextKind = TextKind { multiline: true };
static INTEGER: IntegerKind = IntegerKind;
static FLOAT: FloatKind = FloatKind;
static DATE: DateKind = DateKind;

pub fn kind_for(field_type: FieldType) -> &'static dyn FieldKind {
    match field_type {
        FieldType::Input => &INPUT,
        FieldType::Textarea => &TEXTAREA,
        FieldType::Integer => &INTEGER,
        FieldType::Float4 | FieldType::Float8 => &FLOAT,
        FieldType::Date => &DATE,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn number_display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(v) => text_of(v),
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Format a bound so that whole numbers print without a fraction.
fn bound(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

impl FieldKind for TextKind {
    fn derive_default(&self, settings: &FieldSettings) -> Value {
        let default = settings.text().and_then(|s| s.default_value.clone());
        Value::String(default.unwrap_or_default())
    }

    fn check_value(&self, title: &str, settings: &FieldSettings, value: &Value) -> Option<String> {
        let s = settings.text()?;
        let text = text_of(value);
        let mut error = None;
        if let Some(pattern) = &s.regex_validation {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(&text) => {
                    error = Some(format!("{title} does not match the required pattern"));
                }
                Ok(_) => {}
                Err(e) => log::debug!("skipping malformed pattern {pattern:?}: {e}"),
            }
        }
        if let Some(max) = s.column_length.filter(|n| *n > 0)
            && text.chars().count() as i64 > max
        {
            error = Some(format!("{title} must be at most {max} characters"));
        }
        error
    }

    fn widget(&self, settings: &FieldSettings, value: Option<&Value>) -> Widget {
        let s = settings.text().cloned().unwrap_or_default();
        let value = value.map(text_of).unwrap_or_default();
        let max_length = s.column_length.filter(|n| *n > 0);
        let placeholder = placeholder(s.default_value);
        if self.multiline {
            Widget::TextArea {
                value,
                max_length,
                placeholder,
            }
        } else {
            Widget::Text {
                value,
                max_length,
                placeholder,
            }
        }
    }

    fn coerce_input(&self, raw: &str) -> Option<Value> {
        Some(Value::String(raw.to_string()))
    }
}

impl FieldKind for IntegerKind {
    fn derive_default(&self, settings: &FieldSettings) -> Value {
        settings
            .integer()
            .and_then(|s| s.default_value)
            .map(Value::from)
            .unwrap_or(Value::Null)
    }

    fn check_value(&self, title: &str, settings: &FieldSettings, value: &Value) -> Option<String> {
        let Some(f) = as_f64(value) else {
            return Some(format!("{title} must be a number"));
        };
        if f.fract() != 0.0 {
            return Some(format!("{title} must be a whole number"));
        }
        let s = settings.integer()?;
        // Whole numbers past the i64 range sit beyond any bound.
        let n = as_i64(value).unwrap_or(if f < 0.0 { i64::MIN } else { i64::MAX });
        let mut error = None;
        if let Some(min) = s.min_value
            && n < min
        {
            error = Some(format!("{title} must be at least {min}"));
        }
        if let Some(max) = s.max_value
            && n > max
        {
            error = Some(format!("{title} must be at most {max}"));
        }
        if s.unsigned && n < 0 {
            error = Some(format!("{title} must be a positive number"));
        }
        error
    }

    fn widget(&self, settings: &FieldSettings, value: Option<&Value>) -> Widget {
        let s = settings.integer().cloned().unwrap_or_default();
        let min = if s.unsigned {
            Some(0.0)
        } else {
            s.min_value.map(|v| v as f64)
        };
        Widget::Number {
            value: number_display(value),
            min,
            max: s.max_value.map(|v| v as f64),
            step: NumberStep::Whole,
            placeholder: placeholder(s.default_value.map(|v| v.to_string())),
        }
    }

    fn coerce_input(&self, raw: &str) -> Option<Value> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(Value::Null);
        }
        raw.parse::<i64>().ok().map(Value::from)
    }
}

impl FieldKind for FloatKind {
    fn derive_default(&self, settings: &FieldSettings) -> Value {
        settings
            .float()
            .and_then(|s| s.default_value)
            .map(float_value)
            .unwrap_or(Value::Null)
    }

    fn check_value(&self, title: &str, settings: &FieldSettings, value: &Value) -> Option<String> {
        let Some(n) = as_f64(value) else {
            return Some(format!("{title} must be a number"));
        };
        let s = settings.float()?;
        let mut error = None;
        if let Some(min) = s.min_value
            && n < min
        {
            error = Some(format!("{title} must be at least {}", bound(min)));
        }
        if let Some(max) = s.max_value
            && n > max
        {
            error = Some(format!("{title} must be at most {}", bound(max)));
        }
        error
    }

    fn widget(&self, settings: &FieldSettings, value: Option<&Value>) -> Widget {
        let s = settings.float().cloned().unwrap_or_default();
        Widget::Number {
            value: number_display(value),
            min: s.min_value,
            max: s.max_value,
            step: NumberStep::Any,
            placeholder: placeholder(s.default_value.map(bound)),
        }
    }

    fn coerce_input(&self, raw: &str) -> Option<Value> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(Value::Null);
        }
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(float_value)
    }
}

impl FieldKind for DateKind {
    fn derive_default(&self, settings: &FieldSettings) -> Value {
        settings
            .date()
            .and_then(|s| s.default_value)
            .map(|d| Value::String(format_date(d)))
            .unwrap_or(Value::Null)
    }

    fn check_value(&self, title: &str, _settings: &FieldSettings, value: &Value) -> Option<String> {
        match value {
            Value::String(s) if parse_date(s).is_some() => None,
            _ => Some(format!("{title} must be a valid date (YYYY-MM-DD)")),
        }
    }

    fn widget(&self, settings: &FieldSettings, value: Option<&Value>) -> Widget {
        let value = match value {
            Some(Value::String(s)) => parse_date(s).map(format_date).unwrap_or_default(),
            _ => String::new(),
        };
        let default = settings.date().and_then(|s| s.default_value).map(format_date);
        Widget::Date {
            value,
            placeholder: placeholder(default),
        }
    }

    fn coerce_input(&self, raw: &str) -> Option<Value> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(Value::Null);
        }
        parse_date(raw).map(|d| Value::String(format_date(d)))
    }
}

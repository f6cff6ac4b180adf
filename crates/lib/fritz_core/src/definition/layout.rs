//! Ordered component layout and its mutation operations.
//!
//! Component names stay pairwise distinct after every operation. Operations
//! addressing a component that does not exist change nothing and report it.

use serde::{Deserialize, Deserializer, Serialize};

use super::component::{FieldChange, FieldComponent};
use super::DefinitionError;
use crate::registry::FieldTypeDescriptor;
use crate::settings::SettingsEdit;

pub const DEFAULT_LAYOUT_TYPE: &str = "default";

/// Where a dragged component lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(rename = "type", default = "default_layout_type")]
    pub layout_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    components: Vec<FieldComponent>,
}

fn default_layout_type() -> String {
    DEFAULT_LAYOUT_TYPE.to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FieldComponent>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FieldComponent>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            layout_type: default_layout_type(),
            components: Vec::new(),
        }
    }
}

impl Layout {
    pub fn components(&self) -> &[FieldComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldComponent> {
        self.components.iter().find(|c| c.name() == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name())
    }

    /// Components shown on forms and checked by validation.
    pub fn visible(&self) -> impl Iterator<Item = &FieldComponent> {
        self.components.iter().filter(|c| !c.is_invisible())
    }

    /// `base`, or `base` followed by the first free counter starting at 1.
    pub fn unique_name(&self, base: &str) -> String {
        if self.get(base).is_none() {
            return base.to_string();
        }
        let mut counter = 1u32;
        loop {
            let candidate = format!("{base}{counter}");
            if self.get(&candidate).is_none() {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Append a fresh component of the given type under a unique name.
    pub fn add(&mut self, descriptor: &FieldTypeDescriptor) -> &FieldComponent {
        let name = self.unique_name(&descriptor.id.to_lowercase());
        log::debug!("adding component {name} of type {}", descriptor.id);
        let index = self.components.len();
        self.components
            .push(FieldComponent::from_descriptor(descriptor, name));
        &self.components[index]
    }

    /// Append a prepared component. Fails when its name is taken.
    pub fn push(&mut self, component: FieldComponent) -> Result<(), DefinitionError> {
        if self.get(component.name()).is_some() {
            return Err(DefinitionError::DuplicateComponentName(
                component.name().to_string(),
            ));
        }
        self.components.push(component);
        Ok(())
    }

    /// Move the component at `from` next to the one at `to`.
    ///
    /// Returns `false` and leaves the order untouched when dropping a component
    /// onto itself, when an index is out of range, or when the move would not
    /// change the order.
    pub fn reorder(&mut self, from: usize, to: usize, position: DropPosition) -> bool {
        let len = self.components.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let mut insert = to;
        if position == DropPosition::Below {
            insert += 1;
        }
        if from < to {
            insert -= 1;
        }
        if insert == from {
            return false;
        }
        let component = self.components.remove(from);
        let insert = insert.min(self.components.len());
        self.components.insert(insert, component);
        true
    }

    pub fn update_field(&mut self, name: &str, change: FieldChange) -> bool {
        match self.components.iter_mut().find(|c| c.name() == name) {
            Some(component) => {
                component.apply_change(change);
                true
            }
            None => {
                log::debug!("update of unknown component {name} ignored");
                false
            }
        }
    }

    pub fn update_settings(&mut self, name: &str, edit: &SettingsEdit) -> bool {
        match self.components.iter_mut().find(|c| c.name() == name) {
            Some(component) => component.apply_settings(edit),
            None => {
                log::debug!("settings update of unknown component {name} ignored");
                false
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldComponent> {
        let index = self.position(name)?;
        Some(self.components.remove(index))
    }
}

impl FromIterator<FieldComponent> for Layout {
    /// Collects components; later duplicates of a name are dropped.
    fn from_iter<I: IntoIterator<Item = FieldComponent>>(iter: I) -> Self {
        let mut layout = Layout::default();
        for component in iter {
            if let Err(e) = layout.push(component) {
                log::debug!("{e}");
            }
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldType;
    use crate::settings::{SettingKey, SettingValue};

    fn abc() -> Layout {
        ["a", "b", "c"]
            .into_iter()
            .map(|n| FieldComponent::new("input", n))
            .collect()
    }

    fn order(layout: &Layout) -> Vec<&str> {
        layout.names().collect()
    }

    #[test]
    fn add_same_type_twice_gets_counter_suffix() {
        let mut layout = Layout::default();
        layout.add(FieldType::Integer.descriptor());
        layout.add(FieldType::Integer.descriptor());
        layout.add(FieldType::Integer.descriptor());
        assert_eq!(order(&layout), vec!["integer", "integer1", "integer2"]);
    }

    #[test]
    fn add_uses_descriptor_defaults() {
        let mut layout = Layout::default();
        let c = layout.add(FieldType::Float8.descriptor());
        assert_eq!(c.title(), "Float 8-byte");
        assert_eq!(c.db_type().as_str(), "float8");
        assert!(!c.is_mandatory() && !c.is_invisible() && !c.is_not_editable());
        assert_eq!(c.settings().to_json(), serde_json::json!({}));
    }

    #[test]
    fn unique_name_fills_first_free_counter() {
        let layout: Layout = ["date", "date2"]
            .into_iter()
            .map(|n| FieldComponent::new("date", n))
            .collect();
        assert_eq!(layout.unique_name("date"), "date1");
        assert_eq!(layout.unique_name("input"), "input");
    }

    #[test]
    fn add_then_remove_restores_sequence() {
        let mut layout = abc();
        let before = layout.clone();
        let name = layout.add(FieldType::Input.descriptor()).name().to_string();
        assert!(layout.remove(&name).is_some());
        assert_eq!(layout, before);
    }

    #[test]
    fn drag_a_below_b() {
        let mut layout = abc();
        assert!(layout.reorder(0, 1, DropPosition::Below));
        assert_eq!(order(&layout), vec!["b", "a", "c"]);
    }

    #[test]
    fn drag_c_above_a() {
        let mut layout = abc();
        assert!(layout.reorder(2, 0, DropPosition::Above));
        assert_eq!(order(&layout), vec!["c", "a", "b"]);
    }

    #[test]
    fn drop_onto_itself_is_rejected() {
        let mut layout = abc();
        assert!(!layout.reorder(1, 1, DropPosition::Below));
        assert!(!layout.reorder(0, 1, DropPosition::Above));
        assert!(!layout.reorder(0, 7, DropPosition::Above));
        assert_eq!(order(&layout), vec!["a", "b", "c"]);
    }

    #[test]
    fn reorder_then_inverse_restores_order() {
        let names = ["a", "b", "c", "d"];
        for from in 0..names.len() {
            for to in 0..names.len() {
                for position in [DropPosition::Above, DropPosition::Below] {
                    let mut layout: Layout = names
                        .iter()
                        .map(|n| FieldComponent::new("input", *n))
                        .collect();
                    let original = layout.clone();
                    let moved = names[from];
                    if !layout.reorder(from, to, position) {
                        assert_eq!(layout, original);
                        continue;
                    }
                    let now = layout.position(moved).unwrap();
                    let back = if now < from {
                        DropPosition::Below
                    } else {
                        DropPosition::Above
                    };
                    assert!(layout.reorder(now, from, back));
                    assert_eq!(layout, original, "from {from} to {to} {position:?}");
                }
            }
        }
    }

    #[test]
    fn updates_of_unknown_names_are_no_ops() {
        let mut layout = abc();
        let before = layout.clone();
        assert!(!layout.update_field("zzz", FieldChange::Mandatory(true)));
        assert!(!layout.update_settings(
            "zzz",
            &SettingsEdit::new(SettingKey::ColumnLength, SettingValue::Integer(3))
        ));
        assert!(layout.remove("zzz").is_none());
        assert_eq!(layout, before);
    }

    #[test]
    fn update_touches_only_named_component() {
        let mut layout = abc();
        assert!(layout.update_field("b", FieldChange::Title("Bee".into())));
        assert_eq!(layout.get("b").unwrap().title(), "Bee");
        assert_eq!(layout.get("a").unwrap().title(), "Input");
        assert_eq!(layout.get("c").unwrap().title(), "Input");
    }

    #[test]
    fn push_rejects_duplicate_names() {
        let mut layout = abc();
        assert_eq!(
            layout.push(FieldComponent::new("integer", "a")),
            Err(DefinitionError::DuplicateComponentName("a".into()))
        );
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn null_components_read_as_empty() {
        let layout: Layout =
            serde_json::from_value(serde_json::json!({"type": "default", "components": null}))
                .unwrap();
        assert!(layout.is_empty());
    }
}

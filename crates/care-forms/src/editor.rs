//! Editor operations over a form configuration
//!
//! Grouping is a display projection over one flat ordered list; every
//! operation here works on that list, so cross-group moves need no special
//! handling.

use crate::{
    Conditional, FieldOption, FieldType, FieldValidation, FormConfig, FormField, FormsError,
    Result, UNGROUPED,
};

/// Partial change set merged into a field by [`FormConfig::update_field`].
///
/// `None` means "leave unchanged"; clearing `options` happens only as a
/// side effect of a type change.
#[derive(Clone, Debug, Default)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub field_type: Option<FieldType>,
    pub required: Option<bool>,
    pub description: Option<String>,
    pub options: Option<Vec<FieldOption>>,
    pub conditional: Option<Conditional>,
    pub validation: Option<FieldValidation>,
}

impl FormConfig {
    /// Append a new default field to the given group.
    ///
    /// `None`, the empty string and the "Individual" sentinel all mean
    /// ungrouped. Returns the new field's id.
    pub fn add_field(&mut self, group: Option<&str>) -> String {
        let field = FormField::new(group);
        let id = field.id.clone();
        self.fields.push(field);
        self.touch();
        id
    }

    /// Append a new field to a brand-new group created inline.
    pub fn add_field_to_new_group(&mut self, group: &str) -> Result<String> {
        let group = group.trim();
        if group.is_empty() {
            return Err(FormsError::EmptyGroupName);
        }
        if self.groups().iter().any(|g| *g == group) {
            return Err(FormsError::DuplicateGroup(group.to_string()));
        }
        Ok(self.add_field(Some(group)))
    }

    /// Merge a partial change set into the field matching `id`.
    ///
    /// Changing type away from an option-driven type clears `options`;
    /// changing into one seeds a single empty placeholder option when the
    /// field has none yet.
    pub fn update_field(&mut self, id: &str, patch: FieldPatch) -> Result<()> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FormsError::FieldNotFound(id.to_string()))?;

        if let Some(field_type) = patch.field_type {
            field.field_type = field_type;
            if !field_type.is_option_driven() {
                field.options = None;
            } else if field.options.is_none() {
                field.options = Some(vec![FieldOption::default()]);
            }
        }
        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        if let Some(description) = patch.description {
            field.description = Some(description);
        }
        if let Some(options) = patch.options {
            field.options = Some(options);
        }
        if let Some(conditional) = patch.conditional {
            field.conditional = Some(conditional);
        }
        if let Some(validation) = patch.validation {
            field.validation = Some(validation);
        }
        self.touch();
        Ok(())
    }

    /// Assign or clear a field's group label.
    pub fn set_group(&mut self, id: &str, group: Option<&str>) -> Result<()> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FormsError::FieldNotFound(id.to_string()))?;
        field.group = group
            .filter(|g| !g.is_empty() && *g != UNGROUPED)
            .map(str::to_string);
        self.touch();
        Ok(())
    }

    /// Move the field identified by `source_id` to the position of
    /// `target_id` within the flat field sequence.
    pub fn reorder_fields(&mut self, source_id: &str, target_id: &str) -> Result<()> {
        let from = self
            .fields
            .iter()
            .position(|f| f.id == source_id)
            .ok_or_else(|| FormsError::FieldNotFound(source_id.to_string()))?;
        let to = self
            .fields
            .iter()
            .position(|f| f.id == target_id)
            .ok_or_else(|| FormsError::FieldNotFound(target_id.to_string()))?;
        if from != to {
            let field = self.fields.remove(from);
            self.fields.insert(to, field);
            self.touch();
        }
        Ok(())
    }

    /// Remove a field. No cascades: nothing else embeds fields by reference.
    pub fn delete_field(&mut self, id: &str) -> Result<()> {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        if self.fields.len() == before {
            return Err(FormsError::FieldNotFound(id.to_string()));
        }
        self.touch();
        Ok(())
    }

    /// Distinct group labels in first-appearance order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for field in &self.fields {
            if let Some(group) = field.group.as_deref() {
                if !groups.contains(&group) {
                    groups.push(group);
                }
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_fields(ids: &[&str]) -> FormConfig {
        let mut config = FormConfig::new_default();
        for id in ids {
            let mut field = FormField::new(None);
            field.id = id.to_string();
            config.fields.push(field);
        }
        config
    }

    #[test]
    fn test_add_field_defaults() {
        let mut config = FormConfig::new_default();
        let id = config.add_field(Some("Family"));
        let field = config.field(&id).unwrap();
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.label, "New Field");
        assert!(!field.required);
        assert_eq!(field.group.as_deref(), Some("Family"));
    }

    #[test]
    fn test_add_field_individual_is_ungrouped() {
        let mut config = FormConfig::new_default();
        let id = config.add_field(Some(UNGROUPED));
        assert!(config.field(&id).unwrap().group.is_none());
    }

    #[test]
    fn test_add_field_to_new_group_validates_name() {
        let mut config = FormConfig::new_default();
        assert!(matches!(
            config.add_field_to_new_group("  "),
            Err(FormsError::EmptyGroupName)
        ));
        config.add_field_to_new_group("Household").unwrap();
        assert!(matches!(
            config.add_field_to_new_group("Household"),
            Err(FormsError::DuplicateGroup(_))
        ));
    }

    #[test]
    fn test_update_field_type_change_seeds_options() {
        let mut config = config_with_fields(&["f1"]);
        config
            .update_field(
                "f1",
                FieldPatch {
                    field_type: Some(FieldType::Select),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(
            config.field("f1").unwrap().options,
            Some(vec![FieldOption::default()])
        );
    }

    #[test]
    fn test_update_field_type_change_clears_options() {
        let mut config = config_with_fields(&["f1"]);
        config
            .update_field(
                "f1",
                FieldPatch {
                    field_type: Some(FieldType::Select),
                    options: Some(vec![FieldOption {
                        label: "A".into(),
                        value: "a".into(),
                    }]),
                    ..Default::default()
                },
            )
            .unwrap();
        config
            .update_field(
                "f1",
                FieldPatch {
                    field_type: Some(FieldType::Text),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(config.field("f1").unwrap().options.is_none());
    }

    #[test]
    fn test_update_field_refreshes_updated_at() {
        let mut config = config_with_fields(&["f1"]);
        let before = config.updated_at;
        config
            .update_field(
                "f1",
                FieldPatch {
                    label: Some("Client Name".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(config.updated_at >= before);
        assert_eq!(config.field("f1").unwrap().label, "Client Name");
    }

    #[test]
    fn test_update_unknown_field() {
        let mut config = FormConfig::new_default();
        assert!(matches!(
            config.update_field("nope", FieldPatch::default()),
            Err(FormsError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_reorder_fields_moves_source_to_target() {
        let mut config = config_with_fields(&["a", "b", "c", "d"]);
        config.reorder_fields("a", "c").unwrap();
        let order: Vec<&str> = config.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_reorder_fields_backwards() {
        let mut config = config_with_fields(&["a", "b", "c"]);
        config.reorder_fields("c", "a").unwrap();
        let order: Vec<&str> = config.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_delete_field() {
        let mut config = config_with_fields(&["a", "b"]);
        config.delete_field("a").unwrap();
        assert!(config.field("a").is_none());
        assert!(matches!(
            config.delete_field("a"),
            Err(FormsError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_groups_first_appearance_order() {
        let mut config = FormConfig::new_default();
        config.add_field(Some("B"));
        config.add_field(Some("A"));
        config.add_field(Some("B"));
        config.add_field(None);
        assert_eq!(config.groups(), vec!["B", "A"]);
    }
}

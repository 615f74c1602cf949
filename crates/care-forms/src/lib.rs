//! OpenCare Form Schema Engine
//!
//! Administrator-defined intake form driving the caseworker request flow.
//!
//! ## Features
//! - Ordered, groupable field definitions
//! - Conditional visibility rules
//! - Drag-to-reorder over a single flat field list
//! - Full-replace persistence of the default configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod editor;
pub mod render;
pub mod repository;

pub use editor::FieldPatch;
pub use render::{evaluate_condition, grouped_view, visible_fields, FieldGroupView};
pub use repository::{
    FormConfigRepository, FormConfigService, InMemoryFormConfigRepository, SaveFormConfig,
};

/// Document id of the single active configuration
pub const DEFAULT_FORM_ID: &str = "default-form";

/// Display bucket for fields without a group
pub const UNGROUPED: &str = "Individual";

// =============================================================================
// Core Types
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
    Checkbox,
    Radio,
    Textarea,
    Date,
}

impl FieldType {
    /// Types whose rendering requires an options list
    pub fn is_option_driven(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Checkbox | FieldType::Radio)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditional {
    pub field_id: String,
    pub operator: ConditionalOperator,
    pub value: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionalOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
}

/// Carried on the document for the renderer; not enforced by the engine
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl FormConfig {
    /// Fresh empty default configuration
    pub fn new_default() -> Self {
        let now = Utc::now();
        Self {
            id: DEFAULT_FORM_ID.to_string(),
            title: "Default Form".to_string(),
            description: None,
            fields: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub(crate) fn touch(&mut self) {
        let now = Utc::now();
        // updated_at is monotonically non-decreasing
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Check the configuration's structural invariants.
    ///
    /// Conditional rules may only reference earlier fields; evaluation is a
    /// single document-order pass, so a forward reference can never be
    /// satisfied and also rules out dependency cycles.
    pub fn validate(&self) -> Result<()> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if seen.contains(&field.id.as_str()) {
                return Err(FormsError::DuplicateFieldId(field.id.clone()));
            }
            if field.field_type.is_option_driven()
                && field.options.as_ref().map_or(true, |opts| opts.is_empty())
            {
                return Err(FormsError::MissingOptions(field.id.clone()));
            }
            if let Some(rule) = &field.conditional {
                if !seen.contains(&rule.field_id.as_str()) {
                    if self.field(&rule.field_id).is_some() {
                        return Err(FormsError::ForwardConditionalReference {
                            field: field.id.clone(),
                            target: rule.field_id.clone(),
                        });
                    }
                    return Err(FormsError::UnknownConditionalTarget {
                        field: field.id.clone(),
                        target: rule.field_id.clone(),
                    });
                }
            }
            seen.push(field.id.as_str());
        }
        Ok(())
    }
}

impl FormField {
    /// New field with the editor defaults: text type, not required
    pub fn new(group: Option<&str>) -> Self {
        let group = group
            .filter(|g| !g.is_empty() && *g != UNGROUPED)
            .map(str::to_string);
        Self {
            id: format!("field-{}", uuid::Uuid::new_v4()),
            field_type: FieldType::Text,
            label: "New Field".to_string(),
            required: false,
            description: None,
            group,
            options: None,
            conditional: None,
            validation: None,
        }
    }
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum FormsError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("duplicate field id: {0}")]
    DuplicateFieldId(String),

    #[error("field '{0}' requires at least one option")]
    MissingOptions(String),

    #[error("field '{field}' references unknown field '{target}'")]
    UnknownConditionalTarget { field: String, target: String },

    #[error("field '{field}' may only reference fields defined before it ('{target}')")]
    ForwardConditionalReference { field: String, target: String },

    #[error("group name cannot be empty")]
    EmptyGroupName,

    #[error("group already exists: {0}")]
    DuplicateGroup(String),

    #[error("storage error: {0}")]
    Storage(#[from] care_common::RepositoryError),
}

pub type Result<T> = std::result::Result<T, FormsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn select_field(id: &str, options: Vec<FieldOption>) -> FormField {
        FormField {
            id: id.to_string(),
            field_type: FieldType::Select,
            label: id.to_string(),
            required: false,
            description: None,
            group: None,
            options: Some(options),
            conditional: None,
            validation: None,
        }
    }

    #[test]
    fn test_validate_accepts_backward_reference() {
        let mut config = FormConfig::new_default();
        config.fields.push(select_field(
            "f1",
            vec![FieldOption {
                label: "Yes".into(),
                value: "yes".into(),
            }],
        ));
        let mut dependent = FormField::new(None);
        dependent.id = "f2".into();
        dependent.conditional = Some(Conditional {
            field_id: "f1".into(),
            operator: ConditionalOperator::Equals,
            value: json!("yes"),
        });
        config.fields.push(dependent);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_forward_reference() {
        let mut config = FormConfig::new_default();
        let mut dependent = FormField::new(None);
        dependent.id = "f1".into();
        dependent.conditional = Some(Conditional {
            field_id: "f2".into(),
            operator: ConditionalOperator::Equals,
            value: json!("yes"),
        });
        config.fields.push(dependent);
        let mut later = FormField::new(None);
        later.id = "f2".into();
        config.fields.push(later);

        assert!(matches!(
            config.validate(),
            Err(FormsError::ForwardConditionalReference { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_target() {
        let mut config = FormConfig::new_default();
        let mut dependent = FormField::new(None);
        dependent.id = "f1".into();
        dependent.conditional = Some(Conditional {
            field_id: "missing".into(),
            operator: ConditionalOperator::Equals,
            value: json!("yes"),
        });
        config.fields.push(dependent);

        assert!(matches!(
            config.validate(),
            Err(FormsError::UnknownConditionalTarget { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_option_type_without_options() {
        let mut config = FormConfig::new_default();
        config.fields.push(select_field("f1", vec![]));

        assert!(matches!(
            config.validate(),
            Err(FormsError::MissingOptions(_))
        ));
    }

    #[test]
    fn test_optional_keys_not_serialized_when_unset() {
        let field = FormField::new(None);
        let doc = serde_json::to_value(&field).unwrap();
        let obj = doc.as_object().unwrap();
        assert!(!obj.contains_key("options"));
        assert!(!obj.contains_key("group"));
        assert!(!obj.contains_key("conditional"));
        assert_eq!(obj["type"], json!("text"));
    }
}

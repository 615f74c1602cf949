//! Conditional visibility and the grouped display projection
//!
//! Fields are evaluated in document order, so a field's visibility only
//! ever depends on fields that precede it.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::{Conditional, ConditionalOperator, FormConfig, FormField, UNGROUPED};

/// One display bucket of the grouped projection
#[derive(Debug)]
pub struct FieldGroupView<'a> {
    pub name: &'a str,
    pub fields: Vec<&'a FormField>,
}

/// Evaluate a single conditional rule against the current field values.
///
/// A missing value is treated as JSON null.
pub fn evaluate_condition(rule: &Conditional, values: &HashMap<String, Value>) -> bool {
    let current = values.get(&rule.field_id).unwrap_or(&Value::Null);
    match rule.operator {
        ConditionalOperator::Equals => loose_eq(current, &rule.value),
        ConditionalOperator::NotEquals => !loose_eq(current, &rule.value),
        ConditionalOperator::Contains => contains(current, &rule.value),
        ConditionalOperator::GreaterThan => match (as_number(current), as_number(&rule.value)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ConditionalOperator::LessThan => match (as_number(current), as_number(&rule.value)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
    }
}

/// Compute the visible fields in document order.
///
/// A field with no conditional is always visible; a field whose
/// controlling field is itself hidden is hidden too.
pub fn visible_fields<'a>(
    config: &'a FormConfig,
    values: &HashMap<String, Value>,
) -> Vec<&'a FormField> {
    let mut visible_ids: HashSet<&str> = HashSet::new();
    let mut visible = Vec::new();
    for field in &config.fields {
        let shown = match &field.conditional {
            None => true,
            Some(rule) => {
                visible_ids.contains(rule.field_id.as_str()) && evaluate_condition(rule, values)
            }
        };
        if shown {
            visible_ids.insert(field.id.as_str());
            visible.push(field);
        }
    }
    visible
}

/// Cluster the visible fields by group label for display.
///
/// Buckets appear in first-appearance order and keep the flat-list order
/// inside each bucket; ungrouped fields land under [`UNGROUPED`]. Derived
/// view only, never persisted.
pub fn grouped_view<'a>(
    config: &'a FormConfig,
    values: &HashMap<String, Value>,
) -> Vec<FieldGroupView<'a>> {
    let mut groups: Vec<FieldGroupView<'a>> = Vec::new();
    for field in visible_fields(config, values) {
        let name = field.group.as_deref().unwrap_or(UNGROUPED);
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.fields.push(field),
            None => groups.push(FieldGroupView {
                name,
                fields: vec![field],
            }),
        }
    }
    groups
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x == y;
    }
    text_of(a) == text_of(b)
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::String(s) => s.contains(&text_of(needle)),
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldOption, FieldType, FormField};
    use serde_json::json;

    fn field(id: &str, group: Option<&str>, conditional: Option<Conditional>) -> FormField {
        FormField {
            id: id.to_string(),
            field_type: FieldType::Text,
            label: id.to_string(),
            required: false,
            description: None,
            group: group.map(str::to_string),
            options: None,
            conditional,
            validation: None,
        }
    }

    fn equals(target: &str, value: Value) -> Conditional {
        Conditional {
            field_id: target.to_string(),
            operator: ConditionalOperator::Equals,
            value,
        }
    }

    fn values(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_field_without_conditional_always_visible() {
        let mut config = FormConfig::new_default();
        config.fields.push(field("f1", None, None));
        let shown = visible_fields(&config, &HashMap::new());
        assert_eq!(shown.len(), 1);
    }

    #[test]
    fn test_equals_and_not_equals() {
        let rule = equals("f1", json!("yes"));
        let vals = values(&[("f1", json!("yes"))]);
        assert!(evaluate_condition(&rule, &vals));

        let negated = Conditional {
            operator: ConditionalOperator::NotEquals,
            ..rule
        };
        assert!(!evaluate_condition(&negated, &vals));
    }

    #[test]
    fn test_equals_numeric_string_coercion() {
        let rule = equals("f1", json!(5));
        let vals = values(&[("f1", json!("5"))]);
        assert!(evaluate_condition(&rule, &vals));
    }

    #[test]
    fn test_greater_and_less_than() {
        let vals = values(&[("age", json!("17"))]);
        let gt = Conditional {
            field_id: "age".into(),
            operator: ConditionalOperator::GreaterThan,
            value: json!(12),
        };
        let lt = Conditional {
            field_id: "age".into(),
            operator: ConditionalOperator::LessThan,
            value: json!(12),
        };
        assert!(evaluate_condition(&gt, &vals));
        assert!(!evaluate_condition(&lt, &vals));

        let non_numeric = values(&[("age", json!("unknown"))]);
        assert!(!evaluate_condition(&gt, &non_numeric));
    }

    #[test]
    fn test_contains_on_strings_and_arrays() {
        let rule = Conditional {
            field_id: "f1".into(),
            operator: ConditionalOperator::Contains,
            value: json!("coat"),
        };
        assert!(evaluate_condition(
            &rule,
            &values(&[("f1", json!("winter coat"))])
        ));
        assert!(evaluate_condition(
            &rule,
            &values(&[("f1", json!(["hat", "coat"]))])
        ));
        assert!(!evaluate_condition(&rule, &values(&[("f1", json!(42))])));
    }

    #[test]
    fn test_missing_value_satisfies_not_equals_only() {
        let vals = HashMap::new();
        let eq = equals("f1", json!("yes"));
        assert!(!evaluate_condition(&eq, &vals));
        let ne = Conditional {
            operator: ConditionalOperator::NotEquals,
            ..eq
        };
        assert!(evaluate_condition(&ne, &vals));
    }

    #[test]
    fn test_hidden_controller_hides_dependent() {
        let mut config = FormConfig::new_default();
        config.fields.push(field("f1", None, None));
        config
            .fields
            .push(field("f2", None, Some(equals("f1", json!("show")))));
        config
            .fields
            .push(field("f3", None, Some(equals("f2", json!("show")))));

        // f2 hidden (f1 != "show"), so f3 is hidden even though its own
        // rule would match the stale value for f2.
        let vals = values(&[("f1", json!("no")), ("f2", json!("show"))]);
        let shown: Vec<&str> = visible_fields(&config, &vals)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(shown, vec!["f1"]);
    }

    #[test]
    fn test_grouped_view_preserves_order() {
        let mut config = FormConfig::new_default();
        config.fields.push(field("a", Some("Family"), None));
        config.fields.push(field("b", None, None));
        config.fields.push(field("c", Some("Family"), None));

        let view = grouped_view(&config, &HashMap::new());
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].name, "Family");
        let family: Vec<&str> = view[0].fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(family, vec!["a", "c"]);
        assert_eq!(view[1].name, UNGROUPED);
    }

    #[test]
    fn test_select_field_options_preserved_in_view() {
        let mut config = FormConfig::new_default();
        let mut select = field("f1", None, None);
        select.field_type = FieldType::Select;
        select.options = Some(vec![FieldOption {
            label: "Yes".into(),
            value: "yes".into(),
        }]);
        config.fields.push(select);

        let view = grouped_view(&config, &HashMap::new());
        assert_eq!(view[0].fields[0].options.as_ref().unwrap().len(), 1);
    }
}

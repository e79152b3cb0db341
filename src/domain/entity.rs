use serde_json::{Map, Value};

/// One row of a target or candidate collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Position of the row in its input collection.
    pub id: usize,
    /// Every original column, in input order.
    pub raw_fields: Map<String, Value>,
    pub raw_skill_text: Option<String>,
    /// Display name resolved from the label column.
    pub label: Option<String>,
}

impl Entity {
    /// Build an entity from a raw record, resolving the skills and label
    /// columns when they are known.
    pub fn from_record(
        id: usize,
        raw_fields: Map<String, Value>,
        skills_field: Option<&str>,
        label_field: Option<&str>,
    ) -> Self {
        let raw_skill_text = skills_field
            .and_then(|field| raw_fields.get(field))
            .and_then(|value| {
                let text = coerce_text(value);
                if text.is_none() && !value.is_null() {
                    log::debug!("Skill field of row {id} is not text-like, treating as empty");
                }
                text
            });
        let label = label_field
            .and_then(|field| raw_fields.get(field))
            .and_then(coerce_text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Self {
            id,
            raw_fields,
            raw_skill_text,
            label,
        }
    }
}

/// Render a scalar JSON value as text.
///
/// Nulls, arrays and objects have no text form and yield `None`.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::{Entity, coerce_text};

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("record must be an object"),
        }
    }

    #[test]
    fn from_record_resolves_skills_and_label() {
        let fields = record(json!({"name": " Al ", "skills": "Go, SQL", "age": 30}));

        let entity = Entity::from_record(3, fields, Some("skills"), Some("name"));

        assert_eq!(entity.id, 3);
        assert_eq!(entity.raw_skill_text.as_deref(), Some("Go, SQL"));
        assert_eq!(entity.label.as_deref(), Some("Al"));
        let keys: Vec<_> = entity.raw_fields.keys().cloned().collect();
        assert_eq!(keys, vec!["name", "skills", "age"]);
    }

    #[test]
    fn non_text_skill_fields_are_treated_as_absent() {
        let fields = record(json!({"skills": ["Go", "SQL"]}));

        let entity = Entity::from_record(0, fields, Some("skills"), None);

        assert_eq!(entity.raw_skill_text, None);
        assert_eq!(entity.label, None);
    }

    #[test]
    fn scalars_coerce_to_their_string_form() {
        assert_eq!(coerce_text(&json!(42)).as_deref(), Some("42"));
        assert_eq!(coerce_text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(coerce_text(&Value::Null), None);
    }

    #[test]
    fn blank_labels_are_dropped() {
        let fields = record(json!({"title": "   "}));

        let entity = Entity::from_record(0, fields, None, Some("title"));

        assert_eq!(entity.label, None);
    }
}

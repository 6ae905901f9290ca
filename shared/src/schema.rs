use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;
use validator::Validate;

/// Names of the top-level fields a caller actually put in a request body.
///
/// A field set to its default value is still supplied, so this cannot be
/// recovered from the parsed value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(BTreeSet<String>);

impl FieldSet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Takes `new` when the caller supplied `name`, otherwise keeps `old`.
    pub fn pick<T: Clone>(&self, name: &str, new: T, old: &T) -> T {
        if self.contains(name) {
            new
        } else {
            old.clone()
        }
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A coerced request payload together with the fields the caller supplied.
#[derive(Debug, Clone)]
pub struct Submitted<T> {
    pub value: T,
    pub fields: FieldSet,
}

/// A request body type, naming the field that carries the record identity.
pub trait Payload: DeserializeOwned + Validate {
    const IDENTITY: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every bound applies, omitted fields take defaults.
    Create,
    /// As `Create`, except the identity comes from the path, so its bound
    /// is not checked here.
    Replace,
    /// Only bounds of supplied non-identity fields apply.
    Partial,
}

impl Mode {
    fn checks(self, field: &str, identity: &str, fields: &FieldSet) -> bool {
        match self {
            Mode::Create => true,
            Mode::Replace => field != identity,
            Mode::Partial => field != identity && fields.contains(field),
        }
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("invalid payload: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

pub fn parse<T>(body: Value, mode: Mode) -> Result<Submitted<T>, SchemaError>
where
    T: Payload,
{
    let fields = match &body {
        Value::Object(map) => map.keys().cloned().collect::<FieldSet>(),
        other => {
            return Err(SchemaError::Malformed(format!(
                "expected a JSON object, got {}",
                kind_of(other)
            )))
        }
    };

    let value: T =
        serde_json::from_value(body).map_err(|e| SchemaError::Malformed(e.to_string()))?;

    if let Err(report) = value.validate() {
        let mut problems: Vec<String> = report
            .field_errors()
            .into_iter()
            .map(|(field, errors)| (field.to_string(), errors))
            .filter(|(field, _)| mode.checks(field, T::IDENTITY, &fields))
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => format!("{field}: {message}"),
                        None => format!("{field}: failed {} check", e.code),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        if !problems.is_empty() {
            problems.sort();
            return Err(SchemaError::Invalid(problems));
        }
    }

    Ok(Submitted { value, fields })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProductRequest;
    use serde_json::json;

    #[test]
    fn records_supplied_keys_including_defaults() {
        let submitted: Submitted<ProductRequest> =
            parse(json!({"name": "Keyboard", "price": 10.0}), Mode::Create).unwrap();

        assert!(submitted.fields.contains("name"));
        assert!(submitted.fields.contains("price"));
        assert!(!submitted.fields.contains("description"));
        assert_eq!(submitted.value.description, None);
    }

    #[test]
    fn full_mode_checks_omitted_fields() {
        let err = parse::<ProductRequest>(json!({"price": 12.5}), Mode::Create).unwrap_err();
        match err {
            SchemaError::Invalid(problems) => {
                assert_eq!(problems.len(), 1);
                assert!(problems[0].starts_with("name:"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn partial_mode_only_checks_supplied_fields() {
        let ok = parse::<ProductRequest>(json!({"price": 5300.0}), Mode::Partial).unwrap();
        assert_eq!(ok.fields.iter().collect::<Vec<_>>(), vec!["price"]);

        let err = parse::<ProductRequest>(json!({"price": 0.0}), Mode::Partial).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }

    #[test]
    fn identity_bound_is_left_to_the_path_on_replace_and_merge() {
        assert!(parse::<ProductRequest>(json!({"name": "Pad", "id": 0}), Mode::Replace).is_ok());
        assert!(parse::<ProductRequest>(json!({"id": 0}), Mode::Partial).is_ok());

        let err = parse::<ProductRequest>(json!({"name": "Pad", "id": 0}), Mode::Create)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(ref p) if p[0].starts_with("id:")));
    }

    #[test]
    fn rejects_non_objects_and_wrong_types() {
        assert!(matches!(
            parse::<ProductRequest>(json!([1, 2]), Mode::Partial),
            Err(SchemaError::Malformed(_))
        ));
        assert!(matches!(
            parse::<ProductRequest>(json!({"price": "cheap"}), Mode::Partial),
            Err(SchemaError::Malformed(_))
        ));
        assert!(matches!(
            parse::<ProductRequest>(json!({"price": null}), Mode::Partial),
            Err(SchemaError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let submitted =
            parse::<ProductRequest>(json!({"name": "Mouse", "colour": "red"}), Mode::Create)
                .unwrap();
        assert_eq!(submitted.value.name, "Mouse");
    }

    #[test]
    fn pick_prefers_supplied_value() {
        let fields: FieldSet = ["price"].into_iter().collect();
        assert_eq!(fields.pick("price", 2.0, &1.0), 2.0);
        assert_eq!(fields.pick("name", "new".to_string(), &"old".to_string()), "old");
    }
}

//! Declarative handler config schemas.
//!
//! Each handler type publishes the fields its config accepts. The rule editor
//! renders forms from the schema, and the registry checks raw configs against
//! it before deserializing the typed config, so errors name the bad field.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use itemflow_domain::{HandlerConfig, HandlerType};

use super::error::HandlerConfigValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    String,
    StringList,
    Integer,
    Boolean,
    Object,
    /// A list of objects
    ObjectList,
    Any,
    Enum(&'static [&'static str]),
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::ObjectList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
            Self::Any => true,
            Self::Enum(values) => value.as_str().is_some_and(|s| values.contains(&s)),
        }
    }

    fn expected(&self) -> String {
        match self {
            Self::String => "a string".to_string(),
            Self::StringList => "a list of strings".to_string(),
            Self::Integer => "an integer".to_string(),
            Self::Boolean => "a boolean".to_string(),
            Self::Object => "an object".to_string(),
            Self::ObjectList => "a list of objects".to_string(),
            Self::Any => "any value".to_string(),
            Self::Enum(values) => format!("one of {}", values.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigSchema {
    fields: &'static [FieldSpec],
}

impl ConfigSchema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Check a raw config: no unknown fields, required fields present, kinds
    /// match. An explicit `null` counts as absent.
    pub fn validate(
        &self,
        handler_type: HandlerType,
        config: &HandlerConfig,
    ) -> Result<(), HandlerConfigValidationError> {
        for name in config.fields.keys() {
            if self.field(name).is_none() {
                return Err(HandlerConfigValidationError::new(
                    handler_type,
                    name,
                    "is not a known field",
                ));
            }
        }

        for spec in self.fields {
            match config.fields.get(spec.name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(HandlerConfigValidationError::new(
                        handler_type,
                        spec.name,
                        "is required",
                    ));
                }
                None | Some(Value::Null) => {}
                Some(value) if !spec.kind.accepts(value) => {
                    return Err(HandlerConfigValidationError::new(
                        handler_type,
                        spec.name,
                        format!("must be {}", spec.kind.expected()),
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Validate, then deserialize into the handler's typed config.
    pub fn parse<T: DeserializeOwned>(
        &self,
        handler_type: HandlerType,
        config: &HandlerConfig,
    ) -> Result<T, HandlerConfigValidationError> {
        self.validate(handler_type, config)?;
        serde_json::from_value(config.fields_value()).map_err(|e| {
            HandlerConfigValidationError::new(handler_type, "<config>", e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::required("attribute", FieldKind::String, "Attribute key"),
        FieldSpec::required("delta", FieldKind::Integer, "Amount to add"),
        FieldSpec::optional("mode", FieldKind::Enum(&["add", "sub"]), "Mode"),
    ]);

    #[derive(Debug, Deserialize)]
    struct Config {
        attribute: String,
        delta: i64,
    }

    fn config(fields: Value) -> HandlerConfig {
        HandlerConfig {
            handler_type: "modify-attribute".to_string(),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn missing_required_field_is_named() {
        let err = SCHEMA
            .validate(HandlerType::ModifyAttribute, &config(json!({"attribute": "speed"})))
            .unwrap_err();
        assert_eq!(err.field, "delta");
        assert_eq!(err.handler_type, HandlerType::ModifyAttribute);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let err = SCHEMA
            .validate(
                HandlerType::ModifyAttribute,
                &config(json!({"attribute": "speed", "delta": "lots"})),
            )
            .unwrap_err();
        assert_eq!(err.field, "delta");
        assert!(err.reason.contains("integer"));

        let err = SCHEMA
            .validate(
                HandlerType::ModifyAttribute,
                &config(json!({"attribute": "speed", "delta": 1, "mode": "mul"})),
            )
            .unwrap_err();
        assert_eq!(err.field, "mode");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = SCHEMA
            .validate(
                HandlerType::ModifyAttribute,
                &config(json!({"attribute": "speed", "delta": 1, "amount": 2})),
            )
            .unwrap_err();
        assert_eq!(err.field, "amount");
    }

    #[test]
    fn parse_returns_typed_config() {
        let parsed: Config = SCHEMA
            .parse(
                HandlerType::ModifyAttribute,
                &config(json!({"attribute": "speed", "delta": -1})),
            )
            .unwrap();
        assert_eq!(parsed.attribute, "speed");
        assert_eq!(parsed.delta, -1);
    }
}

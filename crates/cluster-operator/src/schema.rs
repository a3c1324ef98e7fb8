//! Operator schema definitions.
//!
//! Schemas are published by the cluster at `GET /api/operator/schema/{name}`
//! and describe, per operation, which arguments are accepted in each of the
//! `parameters`, `config` and `namespace` namespaces.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConversionError;
use crate::value::{ParamType, TypedValue};

/// Parameter declarations keyed by name.
///
/// Ordered so that validation visits entries deterministically.
pub type ParameterMap = BTreeMap<String, ParameterSchema>;

/// Declaration of a single argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameterSchema")]
pub struct ParameterSchema {
    /// Declared type.
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// Whether the caller must supply the value when there is no default.
    pub required: bool,
    /// Default value, already coerced to `param_type`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<TypedValue>,
    /// Human readable description.
    pub description: String,
}

impl ParameterSchema {
    /// A required parameter of the given type.
    #[must_use]
    pub fn required(param_type: ParamType) -> Self {
        Self {
            param_type,
            required: true,
            default: None,
            description: String::new(),
        }
    }

    /// An optional parameter of the given type.
    #[must_use]
    pub fn optional(param_type: ParamType) -> Self {
        Self {
            required: false,
            ..Self::required(param_type)
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: TypedValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Wire form of [`ParameterSchema`] before the default is coerced.
#[derive(Deserialize)]
struct RawParameterSchema {
    #[serde(rename = "type")]
    param_type: ParamType,
    #[serde(default, deserialize_with = "null_as_default")]
    required: bool,
    #[serde(default)]
    default: Option<TypedValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
}

impl TryFrom<RawParameterSchema> for ParameterSchema {
    type Error = ConversionError;

    fn try_from(raw: RawParameterSchema) -> Result<Self, Self::Error> {
        let default = raw
            .default
            .map(|value| value.coerce(&raw.param_type))
            .transpose()?;

        Ok(Self {
            param_type: raw.param_type,
            required: raw.required,
            default,
            description: raw.description,
        })
    }
}

/// Nil maps and strings arrive as `null`; treat them like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A required parameter, as presented to a user who forgot it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredParameter {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub param_type: ParamType,
    /// Description.
    pub description: String,
}

/// List the required parameters of a namespace, in name order.
#[must_use]
pub fn required_parameters(schema: &ParameterMap) -> Vec<RequiredParameter> {
    schema
        .iter()
        .filter(|(_, param)| param.required)
        .map(|(name, param)| RequiredParameter {
            name: name.clone(),
            param_type: param.param_type.clone(),
            description: param.description.clone(),
        })
        .collect()
}

/// One invokable action of an operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSchema {
    /// Description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Runtime arguments of the operation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: ParameterMap,
    /// Operator-wide configuration.
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: ParameterMap,
    /// Namespace arguments.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub namespace: ParameterMap,
}

/// The full schema of an operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorSchema {
    /// Operator name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Operator version.
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    /// Description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Operations keyed by name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub operations: BTreeMap<String, OperationSchema>,
}

impl OperatorSchema {
    /// Names of every declared operation, sorted.
    #[must_use]
    pub fn operation_names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aerospike_schema() -> serde_json::Value {
        json!({
            "name": "aerospike",
            "version": "1.2.0",
            "description": "Aerospike namespace management",
            "operations": {
                "add_namespace": {
                    "description": "Add a namespace",
                    "parameters": {
                        "name": {"type": "string", "required": true, "description": "Namespace name"},
                        "high_water_disk_pct": {"type": "int", "required": false, "default": 70}
                    },
                    "config": {
                        "dry_run": {"type": "bool", "required": false, "default": "false"}
                    }
                },
                "remove_namespace": {
                    "parameters": {
                        "name": {"type": "string", "required": true}
                    }
                }
            }
        })
    }

    #[test]
    fn decode_operator_schema() {
        let schema: OperatorSchema =
            serde_json::from_value(aerospike_schema()).expect("should decode");

        assert_eq!(schema.name, "aerospike");
        assert_eq!(schema.operation_names(), vec!["add_namespace", "remove_namespace"]);

        let op = &schema.operations["add_namespace"];
        assert_eq!(op.parameters["name"].param_type, ParamType::String);
        assert!(op.parameters["name"].required);
        assert_eq!(
            op.parameters["high_water_disk_pct"].default,
            Some(TypedValue::Int(70))
        );
        // String defaults are converted to the declared type.
        assert_eq!(op.config["dry_run"].default, Some(TypedValue::Bool(false)));
        assert!(op.namespace.is_empty());
    }

    #[test]
    fn decode_treats_null_collections_as_empty() {
        let schema: OperatorSchema = serde_json::from_value(json!({
            "name": "aerospike",
            "version": null,
            "description": null,
            "operations": {
                "add_namespace": {
                    "description": null,
                    "parameters": {
                        "name": {"type": "string", "required": true, "description": null}
                    },
                    "config": null,
                    "namespace": null
                },
                "noop": {"parameters": null}
            }
        }))
        .expect("should decode");

        let op = &schema.operations["add_namespace"];
        assert!(op.config.is_empty());
        assert!(op.namespace.is_empty());
        assert_eq!(op.description, "");
        assert_eq!(op.parameters["name"].description, "");
        assert!(schema.operations["noop"].parameters.is_empty());
        assert_eq!(schema.version, "");
    }

    #[test]
    fn decode_null_operations_is_empty() {
        let schema: OperatorSchema =
            serde_json::from_value(json!({"name": "redis", "operations": null})).expect("decode");
        assert!(schema.operations.is_empty());
    }

    #[test]
    fn decode_coerces_float_default_for_int() {
        let param: ParameterSchema =
            serde_json::from_value(json!({"type": "int", "default": 70.0})).expect("decode");
        assert_eq!(param.default, Some(TypedValue::Int(70)));
        assert!(!param.required);
    }

    #[test]
    fn decode_null_default_is_absent() {
        let param: ParameterSchema =
            serde_json::from_value(json!({"type": "string", "default": null})).expect("decode");
        assert_eq!(param.default, None);
    }

    #[test]
    fn decode_rejects_mismatched_default() {
        let result: Result<ParameterSchema, _> =
            serde_json::from_value(json!({"type": "int", "default": "seventy"}));
        assert!(result.is_err());
    }

    #[test]
    fn decode_keeps_unsupported_type() {
        let param: ParameterSchema =
            serde_json::from_value(json!({"type": "duration", "default": "30s"})).expect("decode");
        assert_eq!(param.param_type, ParamType::Other("duration".into()));
        assert_eq!(param.default, Some(TypedValue::String("30s".into())));
    }

    #[test]
    fn required_parameters_are_sorted_and_filtered() {
        let mut schema = ParameterMap::new();
        schema.insert("zone".into(), ParameterSchema::required(ParamType::String));
        schema.insert(
            "count".into(),
            ParameterSchema::required(ParamType::Int).with_description("How many"),
        );
        schema.insert("verbose".into(), ParameterSchema::optional(ParamType::Bool));

        let required = required_parameters(&schema);
        let names: Vec<_> = required.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["count", "zone"]);
        assert_eq!(required[0].description, "How many");
    }
}

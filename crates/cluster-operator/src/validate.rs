//! Validation of user supplied arguments against a parameter schema.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::schema::ParameterMap;
use crate::value::{TypedValue, convert};

/// Arguments as typed by the user, keyed by name.
pub type RawArguments = BTreeMap<String, String>;

/// Arguments after defaulting and type conversion.
pub type ValidatedArguments = BTreeMap<String, TypedValue>;

/// Validate `supplied` against `schema`.
///
/// Every schema entry is considered first: absent entries receive their
/// default, and an absent required entry without default fails. Only then are
/// the supplied values checked, so the reported error does not depend on what
/// else the user typed. Unknown names are rejected, never dropped.
///
/// Optional entries without a default that were not supplied are left out of
/// the result.
pub fn validate(
    supplied: &RawArguments,
    schema: &ParameterMap,
) -> Result<ValidatedArguments, ValidationError> {
    let mut result = ValidatedArguments::new();

    for (name, param) in schema {
        if supplied.contains_key(name) {
            continue;
        }
        match (&param.default, param.required) {
            (Some(default), _) => {
                result.insert(name.clone(), default.clone());
            }
            (None, true) => {
                return Err(ValidationError::MissingRequired { name: name.clone() });
            }
            (None, false) => {}
        }
    }

    for (name, raw) in supplied {
        let param = schema
            .get(name)
            .ok_or_else(|| ValidationError::UnknownParameter { name: name.clone() })?;

        let value = convert(raw, &param.param_type).map_err(|source| {
            ValidationError::ParameterType {
                name: name.clone(),
                source,
            }
        })?;
        result.insert(name.clone(), value);
    }

    Ok(result)
}

//! # Meta-Schema Validation
//!
//! Checks that a [`Value`] is a syntactically valid Draft 04 schema before
//! it is used to validate anything.
//!
//! ## Rules
//!
//! - A schema must be an object.
//! - If it has `$ref`, only `$ref` is checked. Sibling keywords on the same
//!   node are neither checked nor errors (Draft 04 semantics; later drafts
//!   changed this).
//! - Otherwise every recognized keyword present is shape-checked in the
//!   fixed order of [`KEYWORDS`]. The first failure aborts with its path.
//! - `exclusiveMaximum` requires `maximum`; `exclusiveMinimum` requires
//!   `minimum`.
//! - Unknown keywords are ignored.

use url::Url;
use vjson_core::pointer::{self, join};
use vjson_core::Value;

use crate::error::ValidationError;
use crate::pattern;

/// Primitive type names accepted by `type`.
pub const TYPE_NAMES: [&str; 7] = [
    "array", "boolean", "integer", "null", "number", "object", "string",
];

/// Placeholder base used to check relative URI references.
const URI_CHECK_BASE: &str = "http://validate-json.invalid/";

type Check = fn(&str, &Value) -> Result<(), ValidationError>;

/// Recognized keywords and their shape checks, in evaluation order.
const KEYWORDS: &[(&str, Check)] = &[
    ("type", check_type),
    ("id", check_uri),
    ("$schema", check_uri),
    ("title", check_string),
    ("description", check_string),
    ("multipleOf", check_multiple_of),
    ("maximum", check_number),
    ("minimum", check_number),
    ("exclusiveMaximum", check_boolean),
    ("exclusiveMinimum", check_boolean),
    ("minLength", check_count),
    ("maxLength", check_count),
    ("pattern", check_pattern),
    ("additionalItems", check_bool_or_schema),
    ("items", check_items),
    ("maxItems", check_count),
    ("minItems", check_count),
    ("uniqueItems", check_boolean),
    ("maxProperties", check_count),
    ("minProperties", check_count),
    ("required", check_string_array),
    ("additionalProperties", check_bool_or_schema),
    ("definitions", check_schema_map),
    ("properties", check_schema_map),
    ("patternProperties", check_pattern_map),
    ("dependencies", check_dependencies),
    ("enum", check_enum),
    ("allOf", check_schema_array),
    ("anyOf", check_schema_array),
    ("oneOf", check_schema_array),
    ("not", validate_schema),
];

/// Validate a whole document as a schema, reporting paths from `#`.
pub fn check_schema(doc: &Value) -> Result<(), ValidationError> {
    validate_schema(pointer::ROOT, doc)
}

/// Validate `doc` as a Draft 04 schema located at `path`.
pub fn validate_schema(path: &str, doc: &Value) -> Result<(), ValidationError> {
    let Value::Object(schema) = doc else {
        return Err(ValidationError::schema(
            path,
            format!("schema must be an object, found {}", doc.kind()),
        ));
    };

    if let Some(reference) = schema.get("$ref") {
        return check_uri(&join(path, "$ref"), reference);
    }

    for (keyword, check) in KEYWORDS {
        if let Some(value) = schema.get(*keyword) {
            check(&join(path, keyword), value)?;
        }
    }

    for (exclusive, bound) in [("exclusiveMaximum", "maximum"), ("exclusiveMinimum", "minimum")] {
        if schema.contains_key(exclusive) && !schema.contains_key(bound) {
            return Err(ValidationError::schema(
                join(path, exclusive),
                format!("{exclusive:?} requires {bound:?} to be present"),
            ));
        }
    }
    Ok(())
}

fn check_type(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::String(name) => check_type_name(path, name),
        Value::Array(names) => {
            if names.is_empty() {
                return Err(ValidationError::schema(path, "must have at least 1 element"));
            }
            for (i, name) in names.iter().enumerate() {
                let Value::String(name) = name else {
                    return Err(ValidationError::schema(
                        join(path, i.to_string()),
                        "each element must be a string",
                    ));
                };
                check_type_name(path, name)?;
            }
            check_unique(path, names)
        }
        _ => Err(ValidationError::schema(
            path,
            "must be a string or an array of strings",
        )),
    }
}

fn check_type_name(path: &str, name: &str) -> Result<(), ValidationError> {
    if TYPE_NAMES.contains(&name) {
        Ok(())
    } else {
        Err(ValidationError::schema(path, format!("{name:?} is not a valid type")))
    }
}

fn check_uri(path: &str, value: &Value) -> Result<(), ValidationError> {
    let Value::String(uri) = value else {
        return Err(ValidationError::schema(path, "must be a string"));
    };
    Url::parse(URI_CHECK_BASE)
        .and_then(|base| base.join(uri))
        .map(|_| ())
        .map_err(|e| ValidationError::schema(path, format!("{uri:?} must be a valid URI: {e}")))
}

fn check_string(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::String(_) => Ok(()),
        _ => Err(ValidationError::schema(path, "must be a string")),
    }
}

fn check_number(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Number(_) => Ok(()),
        _ => Err(ValidationError::schema(path, "must be a number")),
    }
}

fn check_boolean(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Bool(_) => Ok(()),
        _ => Err(ValidationError::schema(path, "must be a boolean")),
    }
}

fn check_multiple_of(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Number(n) if *n > 0.0 => Ok(()),
        Value::Number(_) => Err(ValidationError::schema(path, "must be > 0")),
        _ => Err(ValidationError::schema(path, "must be a number")),
    }
}

/// Non-negative integer (Draft 04 `positiveIntegerDefault0`).
fn check_count(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => Ok(()),
        Value::Number(_) => Err(ValidationError::schema(path, "must be a non-negative integer")),
        _ => Err(ValidationError::schema(path, "must be a number")),
    }
}

fn check_pattern(path: &str, value: &Value) -> Result<(), ValidationError> {
    let Value::String(source) = value else {
        return Err(ValidationError::schema(path, "must be a string"));
    };
    pattern::compile(path, source).map(|_| ())
}

fn check_bool_or_schema(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Bool(_) => Ok(()),
        other => validate_schema(path, other),
    }
}

fn check_items(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Array(_) => check_schema_array(path, value),
        other => validate_schema(path, other),
    }
}

fn check_schema_array(path: &str, value: &Value) -> Result<(), ValidationError> {
    let Value::Array(schemas) = value else {
        return Err(ValidationError::schema(path, "must be an array"));
    };
    if schemas.is_empty() {
        return Err(ValidationError::schema(path, "must have at least 1 element"));
    }
    for (i, schema) in schemas.iter().enumerate() {
        validate_schema(&join(path, i.to_string()), schema)?;
    }
    Ok(())
}

fn check_string_array(path: &str, value: &Value) -> Result<(), ValidationError> {
    let Value::Array(items) = value else {
        return Err(ValidationError::schema(path, "must be an array"));
    };
    if items.is_empty() {
        return Err(ValidationError::schema(path, "must have at least 1 element"));
    }
    for (i, item) in items.iter().enumerate() {
        if !matches!(item, Value::String(_)) {
            return Err(ValidationError::schema(
                join(path, i.to_string()),
                "each element must be a string",
            ));
        }
    }
    check_unique(path, items)
}

fn check_unique(path: &str, items: &[Value]) -> Result<(), ValidationError> {
    for (i, item) in items.iter().enumerate() {
        if let Some(j) = items[i + 1..].iter().position(|other| other == item) {
            return Err(ValidationError::schema(
                path,
                format!("elements must be unique, but {i} and {} are equal", i + 1 + j),
            ));
        }
    }
    Ok(())
}

fn check_schema_map(path: &str, value: &Value) -> Result<(), ValidationError> {
    let Value::Object(schemas) = value else {
        return Err(ValidationError::schema(path, "must be an object"));
    };
    for (name, schema) in schemas {
        validate_schema(&join(path, name), schema)?;
    }
    Ok(())
}

fn check_pattern_map(path: &str, value: &Value) -> Result<(), ValidationError> {
    check_schema_map(path, value)?;
    if let Value::Object(schemas) = value {
        for source in schemas.keys() {
            pattern::compile(&join(path, source), source)?;
        }
    }
    Ok(())
}

fn check_dependencies(path: &str, value: &Value) -> Result<(), ValidationError> {
    let Value::Object(dependencies) = value else {
        return Err(ValidationError::schema(path, "must be an object"));
    };
    for (name, dependency) in dependencies {
        let entry = join(path, name);
        match dependency {
            Value::Object(_) => validate_schema(&entry, dependency)?,
            Value::Array(_) => check_string_array(&entry, dependency)?,
            _ => return Err(ValidationError::schema(entry, "must be an array or an object")),
        }
    }
    Ok(())
}

fn check_enum(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Array(items) if !items.is_empty() => Ok(()),
        Value::Array(_) => Err(ValidationError::schema(path, "must have at least 1 element")),
        _ => Err(ValidationError::schema(path, "must be an array")),
    }
}

//! # Instance Validation
//!
//! Recursive descent over a schema node and an instance value. Keywords are
//! evaluated in a fixed order and the first failure is the reported cause:
//!
//! 1. `$ref`: resolve, then validate against the target. Sibling keywords on
//!    the same node are not evaluated.
//! 2. `type`
//! 3. `allOf`, `anyOf`, `oneOf`, `not`
//! 4. `enum`
//! 5. The keyword family for the instance's kind (string, array, object or
//!    number).
//!
//! Every sub-schema is checked against the meta-schema before it is used.
//! A malformed sub-schema is a hard error, never skipped.
//!
//! A `$ref` followed twice at the same instance location, with no descent
//! into the instance in between, is a cycle and a schema error. Recursion
//! that consumes the instance is unbounded apart from a stack guard
//! ([`ValidatorOptions::with_max_reference_depth`]).
//!
//! Only `anyOf` and `oneOf` aggregate: when no branch matches, every
//! branch failure is kept as a cause. `oneOf` evaluates all branches so an
//! ambiguous match can name each matching branch. Structural errors
//! (schema or resolution) from any branch surface immediately.

use std::sync::Arc;

use vjson_core::pointer::{self, join};
use vjson_core::{Map, Value};

use crate::error::{Combinator, ValidationError};
use crate::loader::Loader;
use crate::meta;
use crate::options::ValidatorOptions;
use crate::pattern::PatternCache;
use crate::resolve::resolve_ref;

/// Validates instances against one root schema.
///
/// `Validator` is `Send + Sync`; one instance may validate many values
/// from many threads. The loader, when present, is shared with every
/// scoped validator created while following references.
#[derive(Debug, Clone)]
pub struct Validator {
    root: Arc<Value>,
    loader: Option<Arc<Loader>>,
    options: ValidatorOptions,
    patterns: Arc<PatternCache>,
    depth: usize,
    trail: RefTrail,
}

/// `$ref`s followed since the instance last moved.
#[derive(Debug, Clone, Default)]
struct RefTrail {
    instance_path: String,
    visited: Vec<(Arc<Value>, String)>,
}

impl RefTrail {
    /// The trail after following `location` in `document` at `ipath`, or
    /// `None` if that reference was already followed at `ipath`.
    fn follow(&self, ipath: &str, document: &Arc<Value>, location: &str) -> Option<RefTrail> {
        if ipath != self.instance_path {
            return Some(RefTrail {
                instance_path: ipath.to_string(),
                visited: vec![(Arc::clone(document), location.to_string())],
            });
        }
        let revisited = self
            .visited
            .iter()
            .any(|(doc, loc)| Arc::ptr_eq(doc, document) && loc == location);
        if revisited {
            return None;
        }
        let mut next = self.clone();
        next.visited.push((Arc::clone(document), location.to_string()));
        Some(next)
    }
}

impl Validator {
    /// Build a validator for `schema`.
    ///
    /// Without a loader only local `#` references resolve.
    ///
    /// # Errors
    ///
    /// `ValidationError::Schema` if `schema` is not a valid Draft 04 schema.
    pub fn new(schema: Value, loader: Option<Arc<Loader>>) -> Result<Self, ValidationError> {
        Self::with_options(schema, loader, ValidatorOptions::default())
    }

    /// Build a validator with explicit [`ValidatorOptions`].
    pub fn with_options(
        schema: Value,
        loader: Option<Arc<Loader>>,
        options: ValidatorOptions,
    ) -> Result<Self, ValidationError> {
        meta::check_schema(&schema)?;
        Ok(Self {
            root: Arc::new(schema),
            loader,
            options,
            patterns: Arc::new(PatternCache::new()),
            depth: 0,
            trail: RefTrail::default(),
        })
    }

    /// The root schema.
    pub fn schema(&self) -> &Value {
        &self.root
    }

    /// The document loader remote references resolve through, if any.
    pub fn loader(&self) -> Option<&Arc<Loader>> {
        self.loader.as_ref()
    }

    /// Options this validator was built with.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validate `instance` against the root schema.
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationError> {
        self.validate_node(pointer::ROOT, instance, pointer::ROOT, &self.root)
    }

    /// True if `instance` is valid. Structural errors count as invalid.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validate(instance).is_ok()
    }

    /// A validator for a document reached through `$ref`, sharing the loader
    /// and pattern cache.
    fn scoped(&self, document: Arc<Value>, trail: RefTrail) -> Validator {
        Validator {
            root: document,
            loader: self.loader.clone(),
            options: self.options,
            patterns: Arc::clone(&self.patterns),
            depth: self.depth + 1,
            trail,
        }
    }

    fn validate_node(
        &self,
        ipath: &str,
        value: &Value,
        spath: &str,
        schema: &Value,
    ) -> Result<(), ValidationError> {
        let Value::Object(schema) = schema else {
            return Err(ValidationError::schema(spath, "schema must be an object"));
        };

        if let Some(reference) = schema.get("$ref") {
            return self.check_ref(ipath, value, &join(spath, "$ref"), reference);
        }
        if let Some(types) = schema.get("type") {
            self.check_type(ipath, value, &join(spath, "type"), types)?;
        }
        if let Some(branches) = schema.get("allOf") {
            self.check_all_of(ipath, value, &join(spath, "allOf"), branches)?;
        }
        if let Some(branches) = schema.get("anyOf") {
            self.check_any_of(ipath, value, &join(spath, "anyOf"), branches)?;
        }
        if let Some(branches) = schema.get("oneOf") {
            self.check_one_of(ipath, value, &join(spath, "oneOf"), branches)?;
        }
        if let Some(negated) = schema.get("not") {
            self.check_not(ipath, value, &join(spath, "not"), negated)?;
        }
        if let Some(candidates) = schema.get("enum") {
            check_enum(ipath, value, &join(spath, "enum"), candidates)?;
        }

        match value {
            Value::String(s) => self.check_string(ipath, s, spath, schema),
            Value::Array(items) => self.check_array(ipath, items, spath, schema),
            Value::Object(members) => self.check_object(ipath, value, members, spath, schema),
            Value::Number(n) => check_number(ipath, *n, spath, schema),
            Value::Null | Value::Bool(_) => Ok(()),
        }
    }

    fn check_ref(
        &self,
        ipath: &str,
        value: &Value,
        path: &str,
        reference: &Value,
    ) -> Result<(), ValidationError> {
        let Value::String(uri) = reference else {
            return Err(ValidationError::schema(path, "must be a string"));
        };
        if self.depth >= self.options.max_reference_depth() {
            return Err(ValidationError::schema(
                path,
                format!(
                    "reference {uri:?} exceeds the maximum nesting depth of {}",
                    self.options.max_reference_depth()
                ),
            ));
        }
        let resolved = resolve_ref(&self.root, uri, self.loader.as_deref())?;
        let trail = self
            .trail
            .follow(ipath, resolved.document(), resolved.location())
            .ok_or_else(|| {
                ValidationError::schema(
                    path,
                    format!(
                        "reference {uri:?} is circular: {} is reached again at {ipath} without descending into the instance",
                        resolved.location()
                    ),
                )
            })?;
        let target = resolved.target()?;
        meta::validate_schema(resolved.location(), target)?;
        self.scoped(Arc::clone(resolved.document()), trail)
            .validate_node(ipath, value, resolved.location(), target)
    }

    fn check_type(
        &self,
        ipath: &str,
        value: &Value,
        path: &str,
        types: &Value,
    ) -> Result<(), ValidationError> {
        let matched = match types {
            Value::String(name) => self.is_of_type(value, name),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .any(|name| self.is_of_type(value, name)),
            _ => return Err(ValidationError::schema(path, "must be a string or an array")),
        };
        if matched {
            Ok(())
        } else if types.as_array().is_some() {
            Err(ValidationError::instance(
                ipath,
                path,
                format!("must be of one of the types {types}"),
            ))
        } else {
            Err(ValidationError::instance(ipath, path, format!("must be of type {types}")))
        }
    }

    fn is_of_type(&self, value: &Value, name: &str) -> bool {
        match value {
            Value::Number(n) => match name {
                "number" => true,
                "integer" => !self.options.strict_integer() || n.fract() == 0.0,
                _ => false,
            },
            other => other.kind().as_str() == name,
        }
    }

    fn check_all_of(
        &self,
        ipath: &str,
        value: &Value,
        path: &str,
        branches: &Value,
    ) -> Result<(), ValidationError> {
        for (i, branch) in schema_array(path, branches)?.iter().enumerate() {
            let branch_path = join(path, i.to_string());
            meta::validate_schema(&branch_path, branch)?;
            self.validate_node(ipath, value, &branch_path, branch)?;
        }
        Ok(())
    }

    fn check_any_of(
        &self,
        ipath: &str,
        value: &Value,
        path: &str,
        branches: &Value,
    ) -> Result<(), ValidationError> {
        let branches = checked_branches(path, branches)?;
        let mut causes = Vec::with_capacity(branches.len());
        for (branch_path, branch) in branches {
            match self.validate_node(ipath, value, &branch_path, branch) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_structural() => return Err(e),
                Err(e) => {
                    tracing::trace!(instance = ipath, branch = %branch_path, "anyOf branch rejected");
                    causes.push(e);
                }
            }
        }
        Err(ValidationError::NoMatch {
            instance_path: ipath.to_string(),
            schema_path: path.to_string(),
            combinator: Combinator::AnyOf,
            causes,
        })
    }

    fn check_one_of(
        &self,
        ipath: &str,
        value: &Value,
        path: &str,
        branches: &Value,
    ) -> Result<(), ValidationError> {
        let branches = checked_branches(path, branches)?;
        let mut matched = Vec::new();
        let mut causes = Vec::new();
        for (branch_path, branch) in branches {
            match self.validate_node(ipath, value, &branch_path, branch) {
                Ok(()) => matched.push(branch_path),
                Err(e) if e.is_structural() => return Err(e),
                Err(e) => {
                    tracing::trace!(instance = ipath, branch = %branch_path, "oneOf branch rejected");
                    causes.push(e);
                }
            }
        }
        match matched.len() {
            1 => Ok(()),
            0 => Err(ValidationError::NoMatch {
                instance_path: ipath.to_string(),
                schema_path: path.to_string(),
                combinator: Combinator::OneOf,
                causes,
            }),
            _ => Err(ValidationError::Ambiguous {
                instance_path: ipath.to_string(),
                schema_path: path.to_string(),
                matched,
            }),
        }
    }

    fn check_not(
        &self,
        ipath: &str,
        value: &Value,
        path: &str,
        negated: &Value,
    ) -> Result<(), ValidationError> {
        meta::validate_schema(path, negated)?;
        match self.validate_node(ipath, value, path, negated) {
            Ok(()) => Err(ValidationError::instance(
                ipath,
                path,
                format!("must not be valid against {path}, but it is"),
            )),
            Err(e) if e.is_structural() => Err(e),
            Err(_) => Ok(()),
        }
    }

    fn check_string(
        &self,
        ipath: &str,
        s: &str,
        spath: &str,
        schema: &Map,
    ) -> Result<(), ValidationError> {
        // Length is measured in Unicode scalar values.
        let len = s.chars().count() as f64;
        if let Some(limit) = schema.get("minLength") {
            let path = join(spath, "minLength");
            let min = expect_number(&path, limit)?;
            if len < min {
                return Err(ValidationError::instance(
                    ipath,
                    &path,
                    format!("must have at least {min} characters"),
                ));
            }
        }
        if let Some(limit) = schema.get("maxLength") {
            let path = join(spath, "maxLength");
            let max = expect_number(&path, limit)?;
            if len > max {
                return Err(ValidationError::instance(
                    ipath,
                    &path,
                    format!("must have at most {max} characters"),
                ));
            }
        }
        if let Some(pattern) = schema.get("pattern") {
            let path = join(spath, "pattern");
            let Value::String(pattern) = pattern else {
                return Err(ValidationError::schema(path, "must be a string"));
            };
            if !self.patterns.is_match(&path, pattern, s)? {
                return Err(ValidationError::instance(
                    ipath,
                    &path,
                    format!("must match regexp {pattern:?}"),
                ));
            }
        }
        Ok(())
    }

    fn check_array(
        &self,
        ipath: &str,
        items: &[Value],
        spath: &str,
        schema: &Map,
    ) -> Result<(), ValidationError> {
        // Without "items" every element is valid and "additionalItems" is ignored.
        if let Some(item_schema) = schema.get("items") {
            let items_path = join(spath, "items");
            match item_schema {
                Value::Object(_) => {
                    meta::validate_schema(&items_path, item_schema)?;
                    for (i, item) in items.iter().enumerate() {
                        self.validate_node(&join(ipath, i.to_string()), item, &items_path, item_schema)?;
                    }
                }
                Value::Array(tuple) => {
                    for (i, positional) in tuple.iter().enumerate() {
                        meta::validate_schema(&join(&items_path, i.to_string()), positional)?;
                    }
                    for (i, (item, positional)) in items.iter().zip(tuple).enumerate() {
                        self.validate_node(
                            &join(ipath, i.to_string()),
                            item,
                            &join(&items_path, i.to_string()),
                            positional,
                        )?;
                    }
                    if let Some(additional) = schema.get("additionalItems") {
                        self.check_additional_items(ipath, items, tuple.len(), spath, additional)?;
                    }
                }
                _ => {
                    return Err(ValidationError::schema(
                        items_path,
                        "must be an array or an object",
                    ))
                }
            }
        }

        let len = items.len() as f64;
        if let Some(limit) = schema.get("maxItems") {
            let path = join(spath, "maxItems");
            let max = expect_number(&path, limit)?;
            if len > max {
                return Err(ValidationError::instance(
                    ipath,
                    &path,
                    format!("must have at most {max} items"),
                ));
            }
        }
        if let Some(limit) = schema.get("minItems") {
            let path = join(spath, "minItems");
            let min = expect_number(&path, limit)?;
            if len < min {
                return Err(ValidationError::instance(
                    ipath,
                    &path,
                    format!("must have at least {min} items"),
                ));
            }
        }
        if let Some(unique) = schema.get("uniqueItems") {
            let path = join(spath, "uniqueItems");
            if expect_bool(&path, unique)? {
                for (i, item) in items.iter().enumerate() {
                    for (j, other) in items.iter().enumerate().skip(i + 1) {
                        if item == other {
                            return Err(ValidationError::instance(
                                ipath,
                                &path,
                                format!("all items must be unique, but item {i} is equal to item {j}"),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_additional_items(
        &self,
        ipath: &str,
        items: &[Value],
        tuple_len: usize,
        spath: &str,
        additional: &Value,
    ) -> Result<(), ValidationError> {
        let path = join(spath, "additionalItems");
        match additional {
            Value::Bool(false) if items.len() > tuple_len => Err(ValidationError::instance(
                ipath,
                &path,
                format!("must have not more than {tuple_len} items"),
            )),
            Value::Bool(_) => Ok(()),
            Value::Object(_) => {
                meta::validate_schema(&path, additional)?;
                for (i, item) in items.iter().enumerate().skip(tuple_len) {
                    self.validate_node(&join(ipath, i.to_string()), item, &path, additional)?;
                }
                Ok(())
            }
            _ => Err(ValidationError::schema(path, "must be an object or a boolean")),
        }
    }

    fn check_object(
        &self,
        ipath: &str,
        value: &Value,
        members: &Map,
        spath: &str,
        schema: &Map,
    ) -> Result<(), ValidationError> {
        let len = members.len() as f64;
        if let Some(limit) = schema.get("maxProperties") {
            let path = join(spath, "maxProperties");
            let max = expect_number(&path, limit)?;
            if len > max {
                return Err(ValidationError::instance(
                    ipath,
                    &path,
                    format!("must have at most {max} properties"),
                ));
            }
        }
        if let Some(limit) = schema.get("minProperties") {
            let path = join(spath, "minProperties");
            let min = expect_number(&path, limit)?;
            if len < min {
                return Err(ValidationError::instance(
                    ipath,
                    &path,
                    format!("must have at least {min} properties"),
                ));
            }
        }
        if let Some(required) = schema.get("required") {
            let path = join(spath, "required");
            for (i, name) in schema_array(&path, required)?.iter().enumerate() {
                let Value::String(name) = name else {
                    return Err(ValidationError::schema(join(&path, i.to_string()), "must be a string"));
                };
                if !members.contains_key(name) {
                    return Err(ValidationError::instance(
                        ipath,
                        &path,
                        format!("must have property {name:?}"),
                    ));
                }
            }
        }

        self.check_members(ipath, members, spath, schema)?;

        if let Some(dependencies) = schema.get("dependencies") {
            let path = join(spath, "dependencies");
            for (name, dependency) in expect_object(&path, dependencies)? {
                if !members.contains_key(name) {
                    continue;
                }
                let entry = join(&path, name);
                match dependency {
                    Value::Array(required) => {
                        for (i, other) in required.iter().enumerate() {
                            let Value::String(other) = other else {
                                return Err(ValidationError::schema(
                                    join(&entry, i.to_string()),
                                    "must be a string",
                                ));
                            };
                            if !members.contains_key(other) {
                                return Err(ValidationError::instance(
                                    ipath,
                                    &entry,
                                    format!("{name:?} requires {other:?} to be also present"),
                                ));
                            }
                        }
                    }
                    Value::Object(_) => {
                        meta::validate_schema(&entry, dependency)?;
                        self.validate_node(ipath, value, &entry, dependency)?;
                    }
                    _ => return Err(ValidationError::schema(entry, "must be an array or an object")),
                }
            }
        }
        Ok(())
    }

    /// `properties`, `patternProperties` and `additionalProperties`.
    ///
    /// A member matched by both `properties` and one or more patterns must
    /// satisfy all of them, `properties` first. Members matched by neither
    /// fall to `additionalProperties`.
    fn check_members(
        &self,
        ipath: &str,
        members: &Map,
        spath: &str,
        schema: &Map,
    ) -> Result<(), ValidationError> {
        let properties_path = join(spath, "properties");
        let properties = match schema.get("properties") {
            Some(properties) => Some(expect_object(&properties_path, properties)?),
            None => None,
        };
        for (name, sub) in properties.into_iter().flatten() {
            meta::validate_schema(&join(&properties_path, name), sub)?;
        }

        let patterns_path = join(spath, "patternProperties");
        let patterns = match schema.get("patternProperties") {
            Some(patterns) => Some(expect_object(&patterns_path, patterns)?),
            None => None,
        };
        for (source, sub) in patterns.into_iter().flatten() {
            let path = join(&patterns_path, source);
            meta::validate_schema(&path, sub)?;
            self.patterns.get(&path, source)?;
        }

        let additional_path = join(spath, "additionalProperties");
        let additional = schema.get("additionalProperties");
        match additional {
            None | Some(Value::Bool(_)) => {}
            Some(sub @ Value::Object(_)) => meta::validate_schema(&additional_path, sub)?,
            Some(_) => {
                return Err(ValidationError::schema(
                    additional_path,
                    "must be an object or a boolean",
                ))
            }
        }

        let mut plan: Vec<(&str, &Value, Vec<(String, &Value)>)> = Vec::with_capacity(members.len());
        for (name, member) in members {
            let mut schemas = Vec::new();
            if let Some(sub) = properties.and_then(|p| p.get(name)) {
                schemas.push((join(&properties_path, name), sub));
            }
            for (source, sub) in patterns.into_iter().flatten() {
                let path = join(&patterns_path, source);
                if self.patterns.is_match(&path, source, name)? {
                    schemas.push((path, sub));
                }
            }
            if schemas.is_empty() {
                match additional {
                    Some(Value::Bool(false)) => {
                        return Err(ValidationError::instance(
                            &join(ipath, name),
                            &additional_path,
                            format!(
                                "is not in {properties_path}, is not matched by anything in \
                                 {patterns_path} and {additional_path} is set to false"
                            ),
                        ))
                    }
                    Some(sub @ Value::Object(_)) => schemas.push((additional_path.clone(), sub)),
                    _ => {}
                }
            }
            plan.push((name, member, schemas));
        }

        for (name, member, schemas) in plan {
            let member_path = join(ipath, name);
            for (path, sub) in schemas {
                self.validate_node(&member_path, member, &path, sub)?;
            }
        }
        Ok(())
    }
}

fn check_enum(
    ipath: &str,
    value: &Value,
    path: &str,
    candidates: &Value,
) -> Result<(), ValidationError> {
    if schema_array(path, candidates)?.iter().any(|c| c == value) {
        Ok(())
    } else {
        Err(ValidationError::instance(ipath, path, format!("must be one of {candidates}")))
    }
}

fn check_number(ipath: &str, n: f64, spath: &str, schema: &Map) -> Result<(), ValidationError> {
    if let Some(divisor) = schema.get("multipleOf") {
        let path = join(spath, "multipleOf");
        let divisor = match divisor {
            Value::Number(d) if *d > 0.0 => *d,
            _ => return Err(ValidationError::schema(path, "must be a number and greater than 0")),
        };
        // Float division: subject to rounding for non-integral divisors.
        let quotient = n / divisor;
        if !quotient.is_finite() || quotient.fract() != 0.0 {
            return Err(ValidationError::instance(
                ipath,
                &path,
                format!("must be a multiple of {divisor}"),
            ));
        }
    }
    if let Some(bound) = schema.get("maximum") {
        let path = join(spath, "maximum");
        let max = expect_number(&path, bound)?;
        let exclusive = exclusive_flag(spath, schema, "exclusiveMaximum")?;
        if exclusive && n >= max {
            return Err(ValidationError::instance(ipath, &path, format!("must be less than {max}")));
        }
        if !exclusive && n > max {
            return Err(ValidationError::instance(
                ipath,
                &path,
                format!("must be less than or equal to {max}"),
            ));
        }
    }
    if let Some(bound) = schema.get("minimum") {
        let path = join(spath, "minimum");
        let min = expect_number(&path, bound)?;
        let exclusive = exclusive_flag(spath, schema, "exclusiveMinimum")?;
        if exclusive && n <= min {
            return Err(ValidationError::instance(ipath, &path, format!("must be greater than {min}")));
        }
        if !exclusive && n < min {
            return Err(ValidationError::instance(
                ipath,
                &path,
                format!("must be greater than or equal to {min}"),
            ));
        }
    }
    Ok(())
}

fn exclusive_flag(spath: &str, schema: &Map, keyword: &str) -> Result<bool, ValidationError> {
    match schema.get(keyword) {
        Some(flag) => expect_bool(&join(spath, keyword), flag),
        None => Ok(false),
    }
}

/// Meta-check every branch of a combinator up front, pairing each with its
/// path.
fn checked_branches<'a>(
    path: &str,
    branches: &'a Value,
) -> Result<Vec<(String, &'a Value)>, ValidationError> {
    schema_array(path, branches)?
        .iter()
        .enumerate()
        .map(|(i, branch)| {
            let branch_path = join(path, i.to_string());
            meta::validate_schema(&branch_path, branch)?;
            Ok((branch_path, branch))
        })
        .collect()
}

fn schema_array<'a>(path: &str, value: &'a Value) -> Result<&'a [Value], ValidationError> {
    match value {
        Value::Array(items) if !items.is_empty() => Ok(items),
        Value::Array(_) => Err(ValidationError::schema(path, "must have at least 1 element")),
        _ => Err(ValidationError::schema(path, "must be an array")),
    }
}

fn expect_object<'a>(path: &str, value: &'a Value) -> Result<&'a Map, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::schema(path, "must be an object"))
}

fn expect_number(path: &str, value: &Value) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .ok_or_else(|| ValidationError::schema(path, "must be a number"))
}

fn expect_bool(path: &str, value: &Value) -> Result<bool, ValidationError> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::schema(path, "must be a boolean"))
}

//! # Slice Validation
//!
//! Turns compiled JSON Schema documents into executable validators using the
//! `jsonschema` crate, and evaluates JSON or YAML documents against them.
//!
//! ## Pipeline
//!
//! 1. [`crate::build::build_json_schema`] lowers the slice to a [`Schema`].
//! 2. [`CompileOptions`] select the draft and format checking.
//! 3. `jsonschema` compiles the document into a [`jsonschema::Validator`].
//!
//! Documents that fail validation are rejected with every violation,
//! including the instance path, the schema path and the engine's message.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use slice_core::SliceSchema;
use thiserror::Error;

use crate::build::build_json_schema;
use crate::json::Schema;

/// Source format of a document handed to a [`SliceValidator`] as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Yaml => f.write_str("YAML"),
        }
    }
}

/// Error while building a validator or validating a document.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the slice.
    #[error("validation failed with {} violation(s):\n{violations}", violations.len())]
    ValidationFailed {
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The engine rejected the generated JSON Schema document. Only
    /// reachable through a malformed `Schema::from_value` leaf.
    #[error("validator build error: {reason}")]
    ValidatorBuildError {
        /// Engine message.
        reason: String,
    },

    /// A text document could not be parsed.
    #[error("{format} document load error: {reason}")]
    DocumentLoadError {
        /// Format the text was parsed as.
        format: DocumentFormat,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// A valid document could not be deserialized into the requested type.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// One way a document failed to match its slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value in the document.
    pub instance_path: String,
    /// JSON Pointer to the keyword in the generated schema that failed.
    pub schema_path: String,
    /// Slice key the violation is about: the missing key for an absent
    /// field, otherwise the innermost object key on `instance_path`.
    pub field: Option<String>,
    /// Engine message.
    pub message: String,
}

impl Violation {
    fn from_engine(error: &jsonschema::ValidationError<'_>) -> Self {
        let instance_path = error.instance_path.to_string();
        let field = match &error.kind {
            ValidationErrorKind::Required { property } => property.as_str().map(str::to_string),
            _ => innermost_field(&instance_path),
        };
        Self {
            instance_path,
            schema_path: error.schema_path.to_string(),
            field,
            message: error.to_string(),
        }
    }
}

/// Last pointer segment that is not an array index, unescaped.
fn innermost_field(pointer: &str) -> Option<String> {
    pointer
        .rsplit('/')
        .take_while(|segment| !segment.is_empty())
        .find(|segment| segment.parse::<usize>().is_err())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        match &self.field {
            Some(field) => write!(f, "  {location} [{field}]: {}", self.message),
            None => write!(f, "  {location}: {}", self.message),
        }
    }
}

/// Every violation found in one document, in engine order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Distinct slice keys that have at least one violation, first seen first.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for field in self.violations.iter().filter_map(|v| v.field.as_deref()) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }

    /// Violations attributed to the slice key `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations
            .iter()
            .filter(move |v| v.field.as_deref() == Some(field))
    }
}

impl IntoIterator for ValidationViolations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.violations.iter();
        if let Some(first) = lines.next() {
            write!(f, "{first}")?;
        }
        for v in lines {
            write!(f, "\n{v}")?;
        }
        Ok(())
    }
}

/// Engine settings used when compiling a slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompileOptions {
    /// JSON Schema draft the generated documents are interpreted under.
    pub draft: Draft,
    /// Whether `format` keywords in data-slice schemas are enforced.
    pub validate_formats: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            draft: Draft::Draft202012,
            validate_formats: false,
        }
    }
}

impl CompileOptions {
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = draft;
        self
    }

    pub fn with_format_validation(mut self, enabled: bool) -> Self {
        self.validate_formats = enabled;
        self
    }
}

/// A slice compiled into an executable validator.
///
/// ## Thread Safety
///
/// `SliceValidator` is `Send + Sync`; one compiled validator can check
/// documents from many threads.
pub struct SliceValidator {
    schema: Schema,
    options: CompileOptions,
    validator: Validator,
}

impl fmt::Debug for SliceValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceValidator")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SliceValidator {
    /// Compile `slice` with default options (Draft 2020-12, formats off).
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuildError` if a data slice
    /// carries an invalid JSON Schema document.
    pub fn compile(slice: &SliceSchema<Schema>) -> Result<Self, SchemaValidationError> {
        Self::compile_with(slice, &CompileOptions::default())
    }

    /// Compile `slice` with explicit engine options.
    pub fn compile_with(
        slice: &SliceSchema<Schema>,
        options: &CompileOptions,
    ) -> Result<Self, SchemaValidationError> {
        tracing::debug!(
            kind = %slice.kind(),
            depth = slice.depth(),
            draft = ?options.draft,
            "compiling slice validator"
        );
        Self::from_schema(build_json_schema(slice), options)
    }

    /// Build a validator from an already lowered document.
    pub fn from_schema(
        schema: Schema,
        options: &CompileOptions,
    ) -> Result<Self, SchemaValidationError> {
        let validator = jsonschema::options()
            .with_draft(options.draft)
            .should_validate_formats(options.validate_formats)
            .build(schema.as_value())
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                reason: e.to_string(),
            })?;

        Ok(Self {
            schema,
            options: *options,
            validator,
        })
    }

    /// The JSON Schema document this validator was built from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Returns true if `instance` conforms to the slice.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Validate `instance`, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` with structured
    /// violation details if the instance is invalid.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let violations = ValidationViolations {
            violations: self
                .validator
                .iter_errors(instance)
                .map(|e| Violation::from_engine(&e))
                .collect(),
        };

        if violations.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            count = violations.len(),
            fields = ?violations.fields(),
            "document rejected"
        );
        Err(SchemaValidationError::ValidationFailed { violations })
    }

    /// Validate `instance`, then deserialize it into `T`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` if the instance does not conform, or
    /// `Deserialize` if it conforms but does not fit `T`.
    pub fn parse<T: DeserializeOwned>(&self, instance: Value) -> Result<T, SchemaValidationError> {
        self.validate(&instance)?;
        Ok(serde_json::from_value(instance)?)
    }

    /// Parse `source` as JSON and validate it, returning the parsed value.
    pub fn validate_json_str(&self, source: &str) -> Result<Value, SchemaValidationError> {
        let value: Value =
            serde_json::from_str(source).map_err(|e| SchemaValidationError::DocumentLoadError {
                format: DocumentFormat::Json,
                reason: e.to_string(),
            })?;
        self.validate(&value)?;
        Ok(value)
    }

    /// Parse `source` as YAML, resolve `<<` merge keys, convert it to the
    /// JSON data model and validate it, returning the converted value.
    pub fn validate_yaml_str(&self, source: &str) -> Result<Value, SchemaValidationError> {
        let load_error = |reason: String| SchemaValidationError::DocumentLoadError {
            format: DocumentFormat::Yaml,
            reason,
        };
        let mut yaml: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|e| load_error(format!("invalid YAML: {e}")))?;
        yaml.apply_merge().map_err(|e| load_error(format!("invalid merge key: {e}")))?;
        let value = yaml_into_json(yaml, "").map_err(load_error)?;
        self.validate(&value)?;
        Ok(value)
    }
}

/// Move a YAML tree into the JSON data model.
///
/// `path` is the JSON Pointer of `yaml` inside the document and only feeds
/// error messages and tag diagnostics. Tags are dropped with a `debug!`
/// event. Mapping keys must be strings, numbers or booleans, and numbers
/// must be finite.
fn yaml_into_json(yaml: serde_yaml::Value, path: &str) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    let at = || if path.is_empty() { "(root)" } else { path };
    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n)
            .ok_or_else(|| format!("{}: number {n} has no JSON representation", at()))?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| yaml_into_json(item, &format!("{path}/{i}")))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => {
                        return Err(format!("{}: unsupported mapping key {other:?}", at()));
                    }
                };
                let child = yaml_into_json(item, &format!("{path}/{key}"))?;
                object.insert(key, child);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => {
            let serde_yaml::value::TaggedValue { tag, value } = *tagged;
            tracing::debug!(%tag, path = at(), "dropping YAML tag");
            yaml_into_json(value, path)?
        }
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        Some(Value::from(i))
    } else if let Some(u) = n.as_u64() {
        Some(Value::from(u))
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
    }
}

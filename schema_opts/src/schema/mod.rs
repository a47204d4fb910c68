//! The reflection contract a schema exposes to the option deriver.
//!
//! A [`ModelSchema`] is an ordered list of [`FieldSpec`]s, one per record
//! field: name, declared [`FieldType`], default-or-required marker,
//! description, optional environment variable, and validator callables.
//! Specs are built once, at command-definition time, and never mutated.

mod field_type;
mod scalar;

pub use field_type::{ChoiceSpec, FieldType, SequenceKind};
pub use scalar::ScalarKind;
pub(crate) use scalar::{render_key, render_token};

use serde_json::Value;

/// A validator callable attached to one field.
///
/// Runs against the reconstructed JSON value for the field; an `Err`
/// surfaces to the end user as a usage error carrying the given message.
pub type Validator = fn(&Value) -> Result<(), String>;

/// A single field failure reported by model-level validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// Name of the failing field.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldFailure {
    /// Construct a failure for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Derived metadata for one schema field.
///
/// # Examples
///
/// ```
/// use schema_opts::{FieldSpec, FieldType};
/// use serde_json::json;
///
/// let spec = FieldSpec::new("retries", FieldType::Int)
///     .with_default(json!(3))
///     .describe("How many times to retry");
/// assert_eq!(spec.name(), "retries");
/// assert!(!spec.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    ty: FieldType,
    default: Option<Value>,
    description: Option<String>,
    env: Option<String>,
    validators: Vec<Validator>,
}

impl FieldSpec {
    /// Create a required field with no description.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            description: None,
            env: None,
            validators: Vec::new(),
        }
    }

    /// Attach a default value, making the field optional on the command
    /// line.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Attach a human-readable description, surfaced verbatim as help text.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name an environment variable that supplies the value when the option
    /// is absent from the command line.
    #[must_use]
    pub fn env(mut self, var: impl Into<String>) -> Self {
        self.env = Some(var.into());
        self
    }

    /// Attach a validator run against the reconstructed value.
    #[must_use]
    pub fn check(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// The field's name, unique within its schema.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's declared type.
    #[must_use]
    pub const fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// The declared default value, if any.
    #[must_use]
    pub const fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The field's description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The environment variable backing this field, if any.
    #[must_use]
    pub fn env_var(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// The validators attached to this field.
    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Whether the field must be supplied on the command line.
    ///
    /// Optional-wrapped fields and fields with a default are never
    /// required; neither are flags, sequences, or mappings, which fall back
    /// to `false`/empty containers.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !matches!(self.ty, FieldType::Optional(_))
    }
}

/// An ordered collection of field specs describing one record schema.
#[derive(Debug, Clone, Default)]
pub struct ModelSchema {
    fields: Vec<FieldSpec>,
}

impl ModelSchema {
    /// Create a schema from field specs in declaration order.
    #[must_use]
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The field specs, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

//! Error types produced by option derivation and value reconstruction.

use std::{error::Error, fmt};

use thiserror::Error;

/// Errors that can occur while deriving options or rebuilding a schema value.
///
/// Derivation-time variants ([`Self::UnsupportedType`],
/// [`Self::NestedComposite`], [`Self::UnionArityMismatch`],
/// [`Self::DuplicateField`]) describe configuration mistakes made by the
/// developer wiring the command. They surface when the command object is
/// built, before any arguments are parsed. The remaining variants surface at
/// invocation time and are rendered as user-facing usage errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaOptsError {
    /// A field's declared type has no option shape.
    #[error("field '{field}' has unsupported type {ty}")]
    UnsupportedType {
        /// Field whose type could not be classified.
        field: String,
        /// Rendered form of the offending type.
        ty: String,
    },

    /// A composite slot contained something other than a scalar or choice.
    #[error("field '{field}' nests composite type {slot} inside a composite")]
    NestedComposite {
        /// Field whose declaration was rejected.
        field: String,
        /// Rendered form of the offending slot type.
        slot: String,
    },

    /// Union members resolve to option shapes of differing arity.
    #[error("field '{field}' unites members of differing arity ({arities})")]
    UnionArityMismatch {
        /// Field whose union was rejected.
        field: String,
        /// Comma-separated arity list in member declaration order.
        arities: String,
    },

    /// Two fields in the schema share a name.
    #[error("duplicate field name '{name}' in schema")]
    DuplicateField {
        /// The repeated field name.
        name: String,
    },

    /// Error parsing command-line arguments.
    #[error("failed to parse command-line arguments: {0}")]
    CliParsing(#[from] Box<clap::Error>),

    /// No union candidate accepted the supplied value.
    #[error("value '{tokens}' for '--{option}' matches no union member")]
    UnionNoMatch {
        /// Long option name the tokens were supplied for.
        option: String,
        /// Space-joined raw tokens that every candidate rejected.
        tokens: String,
    },

    /// A raw token inside a composite shape failed scalar conversion.
    #[error("invalid value '{token}' for '--{option}': expected {expected}")]
    InvalidToken {
        /// Long option name the token was supplied for.
        option: String,
        /// Token that failed conversion.
        token: String,
        /// Description of the accepted form.
        expected: String,
    },

    /// A field validator rejected the reconstructed value.
    #[error("invalid value for '{field}': {message}")]
    Validation {
        /// Field that failed validation.
        field: String,
        /// Human-readable explanation from the validator.
        message: String,
    },

    /// The assembled field map failed the schema's construction path.
    #[error("failed to construct schema instance: {0}")]
    Construction(#[from] Box<serde_json::Error>),

    /// Multiple errors occurred while rebuilding a schema instance.
    #[error("multiple errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}

impl SchemaOptsError {
    /// Construct a validation error for `field`.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Tries to build an error from an iterator of errors.
    ///
    /// Returns `None` when no errors are supplied, the sole error when given
    /// exactly one, and [`Self::Aggregate`] combining every error otherwise.
    #[must_use]
    pub fn try_aggregate<I>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut collected: Vec<Self> = errors.into_iter().collect();
        match collected.len() {
            0 => None,
            1 => collected.pop(),
            _ => Some(Self::Aggregate(Box::new(AggregatedErrors::new(collected)))),
        }
    }

    /// Whether this error describes a schema-definition mistake detected at
    /// derivation time rather than a bad invocation.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType { .. }
                | Self::NestedComposite { .. }
                | Self::UnionArityMismatch { .. }
                | Self::DuplicateField { .. }
        )
    }
}

impl From<clap::Error> for SchemaOptsError {
    fn from(err: clap::Error) -> Self {
        Self::CliParsing(Box::new(err))
    }
}

impl From<serde_json::Error> for SchemaOptsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Construction(Box::new(err))
    }
}

/// Collection of [`SchemaOptsError`]s produced during a single invocation.
///
/// # Examples
///
/// ```
/// use schema_opts::SchemaOptsError;
/// let err = SchemaOptsError::try_aggregate(vec![
///     SchemaOptsError::validation("port", "must be positive"),
///     SchemaOptsError::validation("name", "must not be empty"),
/// ]);
/// if let Some(SchemaOptsError::Aggregate(agg)) = err {
///     assert_eq!(agg.len(), 2);
/// }
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors(Vec<SchemaOptsError>);

impl AggregatedErrors {
    /// Create a new aggregation from a vector of errors.
    #[must_use]
    pub const fn new(errors: Vec<SchemaOptsError>) -> Self {
        Self(errors)
    }

    /// Iterate over the contained errors.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> impl Iterator<Item = &SchemaOptsError> {
        self.0.iter()
    }

    /// Number of errors in the aggregation.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the aggregation holds no errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {e}", i + 1)?;
        }
        Ok(())
    }
}

impl Error for AggregatedErrors {}

impl IntoIterator for AggregatedErrors {
    type Item = SchemaOptsError;
    type IntoIter = std::vec::IntoIter<SchemaOptsError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

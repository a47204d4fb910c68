//! Scalar token conversion shared by derivation and reconstruction.

use serde_json::Value;

/// The scalar converter attached to a single value slot.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ScalarKind {
    /// Pass the token through as a string.
    Str,
    /// Parse the token as a signed 64-bit integer.
    Int,
    /// Parse the token as a finite 64-bit float.
    Float,
    /// Parse the token with the boolish alphabet clap uses
    /// (`y`/`yes`/`t`/`true`/`on`/`1` and their negatives).
    Bool,
}

impl ScalarKind {
    /// Placeholder name shown in usage lines for this slot.
    #[must_use]
    pub const fn value_name(self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Bool => "BOOL",
        }
    }

    /// Human-readable description of the accepted token form.
    #[must_use]
    pub const fn expected(self) -> &'static str {
        match self {
            Self::Str => "a string",
            Self::Int => "an integer",
            Self::Float => "a decimal number",
            Self::Bool => "a boolean",
        }
    }

    /// Convert one raw token into its JSON value, or `None` when the token
    /// does not parse as this scalar.
    #[must_use]
    pub fn convert(self, token: &str) -> Option<Value> {
        match self {
            Self::Str => Some(Value::String(token.to_owned())),
            Self::Int => token.parse::<i64>().ok().map(Value::from),
            Self::Float => token
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            Self::Bool => parse_boolish(token).map(Value::Bool),
        }
    }
}

/// Parse a token with the same alphabet as clap's `BoolishValueParser`.
fn parse_boolish(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Render a scalar JSON value as the single token clap would accept for it.
///
/// Returns `None` for non-scalar values, which have no one-token rendering.
#[must_use]
pub(crate) fn render_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Render a scalar JSON value as a mapping key.
///
/// JSON objects key on strings, so integer, float, and boolean keys take
/// their canonical token spelling; serde folds them back into the declared
/// key type during construction.
#[must_use]
pub(crate) fn render_key(value: &Value) -> Option<String> {
    render_token(value)
}

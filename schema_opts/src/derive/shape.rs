//! The option shapes a field classifies into.

use crate::schema::{ChoiceSpec, ScalarKind, SequenceKind};
use serde_json::Value;
use std::fmt;

/// The derived command-line representation of one field.
///
/// Exactly one shape is chosen per field, deterministically, from its
/// declared type. The shape decides the option's arity, its converters,
/// and how raw parsed values fold back into the field's JSON value.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum OptionShape {
    /// Boolean on/off pair (`--blocked` / `--no-blocked`).
    Flag,
    /// Single value constrained to an enumerated literal set.
    Choice(ChoiceMatcher),
    /// One scalar value.
    Single(ScalarKind),
    /// Exactly N values per invocation, each with its own converter.
    FixedTuple(Vec<SlotConverter>),
    /// Repeatable option, one scalar per repetition.
    Multiple(SequenceKind, SlotConverter),
    /// Repeatable option, one key/value pair per repetition; the last
    /// occurrence of an equal key wins.
    MultiplePair(SlotConverter, SlotConverter),
    /// Union of same-arity members; raw values are captured at the shared
    /// arity and resolved against candidates at reconstruction time.
    UnionDispatch(UnionDispatch),
}

impl OptionShape {
    /// The number of values one occurrence of this option consumes.
    #[must_use]
    pub fn arity(&self) -> ShapeArity {
        match self {
            Self::Flag | Self::Choice(_) | Self::Single(_) => ShapeArity::Once(1),
            Self::FixedTuple(slots) => ShapeArity::Once(slots.len()),
            Self::Multiple(..) => ShapeArity::PerRepetition(1),
            Self::MultiplePair(..) => ShapeArity::PerRepetition(2),
            Self::UnionDispatch(dispatch) => dispatch.arity,
        }
    }

    /// Whether the option repeats across the command line.
    #[must_use]
    pub fn is_repeatable(&self) -> bool {
        matches!(self.arity(), ShapeArity::PerRepetition(_))
    }
}

/// How many values an option consumes, and whether it repeats.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShapeArity {
    /// The option occurs at most once and consumes exactly N values.
    Once(usize),
    /// The option may repeat; each repetition consumes exactly N values.
    PerRepetition(usize),
}

impl fmt::Display for ShapeArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once(n) => write!(f, "{n}"),
            Self::PerRepetition(n) => write!(f, "{n} per repetition"),
        }
    }
}

/// A union captured at its members' shared arity.
#[derive(Debug, Clone)]
pub struct UnionDispatch {
    pub(crate) arity: ShapeArity,
    pub(crate) candidates: Vec<OptionShape>,
}

impl UnionDispatch {
    /// The shared arity every member resolved to.
    #[must_use]
    pub const fn arity(&self) -> ShapeArity {
        self.arity
    }

    /// Candidate shapes in union declaration order.
    #[must_use]
    pub fn candidates(&self) -> &[OptionShape] {
        &self.candidates
    }
}

/// Converter for one value slot inside a composite shape.
#[derive(Debug, Clone)]
pub enum SlotConverter {
    /// Plain scalar conversion.
    Scalar(ScalarKind),
    /// Conversion to a canonical choice literal.
    Choice(ChoiceMatcher),
}

impl SlotConverter {
    /// Placeholder name shown in usage lines for this slot.
    #[must_use]
    pub const fn value_name(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => kind.value_name(),
            Self::Choice(_) => "CHOICE",
        }
    }

    /// Human-readable description of the accepted token form.
    #[must_use]
    pub fn expected(&self) -> String {
        match self {
            Self::Scalar(kind) => String::from(kind.expected()),
            Self::Choice(matcher) => format!("one of {}", matcher.literals().join(", ")),
        }
    }

    /// Convert one raw token, or `None` when the token is rejected.
    #[must_use]
    pub fn convert(&self, token: &str) -> Option<Value> {
        match self {
            Self::Scalar(kind) => kind.convert(token),
            Self::Choice(matcher) => matcher
                .canonical(token)
                .map(|literal| Value::String(literal.to_owned())),
        }
    }
}

/// Matches raw tokens against an enumerated literal set.
///
/// Matching is case-insensitive unless two literals collide under
/// lowercasing (then the set stays case-sensitive to keep them apart) or
/// case sensitivity is forced by [`crate::DeriveSettings`]. Matching maps
/// an accepted token back to its canonical literal spelling.
#[derive(Debug, Clone)]
pub struct ChoiceMatcher {
    literals: Vec<String>,
    case_sensitive: bool,
}

impl ChoiceMatcher {
    pub(crate) fn from_spec(spec: &ChoiceSpec, force_case_sensitive: bool) -> Self {
        let literals: Vec<String> = spec.literals().to_vec();
        let case_sensitive = force_case_sensitive || has_case_collision(&literals);
        Self {
            literals,
            case_sensitive,
        }
    }

    /// The accepted literal values, in declaration order.
    #[must_use]
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// Whether tokens must match literal case exactly.
    #[must_use]
    pub const fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Map a token to its canonical literal, or `None` when it matches no
    /// literal.
    #[must_use]
    pub fn canonical(&self, token: &str) -> Option<&str> {
        let matched = if self.case_sensitive {
            self.literals
                .iter()
                .find(|literal| literal.as_str() == token)
        } else {
            let lowered = token.to_lowercase();
            self.literals
                .iter()
                .find(|literal| literal.to_lowercase() == lowered)
        };
        matched.map(String::as_str)
    }
}

fn has_case_collision(literals: &[String]) -> bool {
    let mut seen: Vec<String> = Vec::with_capacity(literals.len());
    for literal in literals {
        let lowered = literal.to_lowercase();
        if seen.contains(&lowered) {
            return true;
        }
        seen.push(lowered);
    }
    false
}

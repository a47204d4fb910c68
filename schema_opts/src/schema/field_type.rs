//! Declared field types understood by the option deriver.

use std::fmt;

/// The declared type of one schema field.
///
/// This is the input alphabet of the classification rules in
/// [`crate::derive`]: scalars, enumerated choices, optional wrappers,
/// fixed-arity tuples, variable-length sequences, mappings, and unions.
/// A string is always a scalar, never a sequence of characters.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FieldType {
    /// UTF-8 string scalar.
    Str,
    /// Signed integer scalar.
    Int,
    /// Floating-point scalar.
    Float,
    /// Boolean scalar.
    Bool,
    /// One literal out of an enumerated set.
    Choice(ChoiceSpec),
    /// Optional wrapper around another type; the option becomes
    /// non-required and reconstructs to `null` when absent.
    Optional(Box<FieldType>),
    /// Fixed-arity tuple; every slot must be a scalar or a choice.
    Tuple(Vec<FieldType>),
    /// Variable-length sequence of a scalar or choice element type.
    Sequence(SequenceKind, Box<FieldType>),
    /// Mapping from a scalar-or-choice key type to a scalar-or-choice
    /// value type.
    Map(Box<FieldType>, Box<FieldType>),
    /// Union of member types; valid only when every member resolves to an
    /// option shape of identical arity.
    Union(Vec<FieldType>),
}

impl FieldType {
    /// Convenience constructor for a list sequence.
    #[must_use]
    pub fn list(element: FieldType) -> Self {
        Self::Sequence(SequenceKind::List, Box::new(element))
    }

    /// Convenience constructor for a set sequence.
    #[must_use]
    pub fn set(element: FieldType) -> Self {
        Self::Sequence(SequenceKind::Set, Box::new(element))
    }

    /// Convenience constructor for an optional wrapper.
    #[must_use]
    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Convenience constructor for a mapping.
    #[must_use]
    pub fn map(key: FieldType, value: FieldType) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => f.write_str("str"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Choice(spec) => write!(f, "choice[{}]", spec.literals().join("|")),
            Self::Optional(inner) => write!(f, "optional[{inner}]"),
            Self::Tuple(slots) => {
                f.write_str("tuple[")?;
                for (i, slot) in slots.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{slot}")?;
                }
                f.write_str("]")
            }
            Self::Sequence(SequenceKind::List, element) => write!(f, "list[{element}]"),
            Self::Sequence(SequenceKind::Set, element) => write!(f, "set[{element}]"),
            Self::Map(key, value) => write!(f, "map[{key}, {value}]"),
            Self::Union(members) => {
                f.write_str("union[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Which container a sequence field reconstructs into.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SequenceKind {
    /// Ordered container keeping every supplied element.
    List,
    /// Set-like container; duplicate elements collapse, first occurrence
    /// wins.
    Set,
}

/// The literal values an enumerated field accepts.
///
/// Literals are the member *values* of the source enumeration, in
/// declaration order; they double as the canonical spelling stored back
/// into the reconstructed instance.
///
/// # Examples
///
/// ```
/// use schema_opts::ChoiceSpec;
/// let spec = ChoiceSpec::new(["plain", "admin"]);
/// assert_eq!(spec.literals().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSpec {
    literals: Vec<String>,
}

impl ChoiceSpec {
    /// Create a choice specification from literal values in declaration
    /// order.
    #[must_use]
    pub fn new<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            literals: literals.into_iter().map(Into::into).collect(),
        }
    }

    /// The accepted literal values, in declaration order.
    #[must_use]
    pub fn literals(&self) -> &[String] {
        &self.literals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_types() {
        let ty = FieldType::map(
            FieldType::Str,
            FieldType::list(FieldType::Int),
        );
        assert_eq!(ty.to_string(), "map[str, list[int]]");
    }

    #[test]
    fn renders_unions_and_choices() {
        let ty = FieldType::Union(vec![
            FieldType::Choice(ChoiceSpec::new(["a", "b"])),
            FieldType::Int,
        ]);
        assert_eq!(ty.to_string(), "union[choice[a|b] | int]");
    }
}

//! The option deriver: walks a schema's field declarations and produces
//! one option descriptor per field.
//!
//! Classification is a pure function of the declared [`FieldType`]; every
//! configuration mistake (unsupported types, composites nested inside
//! composites, unions of mismatched arity, duplicate names) is caught here,
//! when the command object is built, before any arguments are parsed.

mod register;
mod shape;

pub use shape::{ChoiceMatcher, OptionShape, ShapeArity, SlotConverter, UnionDispatch};

use std::collections::BTreeSet;

use crate::error::SchemaOptsError;
use crate::schema::{FieldSpec, FieldType, ModelSchema, ScalarKind};

/// Knobs controlling how a schema turns into options.
///
/// # Examples
///
/// ```
/// use schema_opts::DeriveSettings;
///
/// let settings = DeriveSettings::default()
///     .exclude(["internal_id"])
///     .bool_as_flag(false);
/// assert!(!settings.selects("internal_id"));
/// ```
#[derive(Debug, Clone)]
pub struct DeriveSettings {
    include: Option<BTreeSet<String>>,
    exclude: BTreeSet<String>,
    bool_as_flag: bool,
    apply_env_vars: bool,
    case_sensitive_choices: bool,
}

impl Default for DeriveSettings {
    fn default() -> Self {
        Self {
            include: None,
            exclude: BTreeSet::new(),
            bool_as_flag: true,
            apply_env_vars: true,
            case_sensitive_choices: false,
        }
    }
}

impl DeriveSettings {
    /// Restrict derivation to the named fields.
    #[must_use]
    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Skip the named fields. Exclusion wins over inclusion.
    #[must_use]
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether `bool` fields derive as `--x`/`--no-x` flag pairs rather
    /// than boolish single-value options. Defaults to `true`.
    #[must_use]
    pub const fn bool_as_flag(mut self, enabled: bool) -> Self {
        self.bool_as_flag = enabled;
        self
    }

    /// Whether fields naming an environment variable fall back to it when
    /// the option is absent. Defaults to `true`.
    #[must_use]
    pub const fn apply_env_vars(mut self, enabled: bool) -> Self {
        self.apply_env_vars = enabled;
        self
    }

    /// Force case-sensitive choice matching. Defaults to `false`; colliding
    /// literals force sensitivity for their field either way.
    #[must_use]
    pub const fn case_sensitive_choices(mut self, enabled: bool) -> Self {
        self.case_sensitive_choices = enabled;
        self
    }

    /// Whether derivation covers the named field.
    #[must_use]
    pub fn selects(&self, name: &str) -> bool {
        if self.exclude.contains(name) {
            return false;
        }
        self.include
            .as_ref()
            .is_none_or(|included| included.contains(name))
    }
}

/// One field's derived option: its spec, shape, and registration details.
#[derive(Debug, Clone)]
pub struct DerivedOption {
    spec: FieldSpec,
    shape: OptionShape,
    long: String,
    env: Option<String>,
    required: bool,
}

impl DerivedOption {
    /// The field spec this option was derived from.
    #[must_use]
    pub const fn field(&self) -> &FieldSpec {
        &self.spec
    }

    /// The shape chosen for the field.
    #[must_use]
    pub const fn shape(&self) -> &OptionShape {
        &self.shape
    }

    /// The long option name (kebab-cased field name).
    #[must_use]
    pub fn long(&self) -> &str {
        &self.long
    }

    /// Whether the option is mandatory on the command line.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Environment variable backing the option, when enabled.
    #[must_use]
    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// clap arg id for the option (the field name).
    pub(crate) fn id(&self) -> &str {
        self.spec.name()
    }

    /// clap arg id for the negated half of a flag pair.
    pub(crate) fn negated_id(&self) -> String {
        format!("no_{}", self.spec.name())
    }

    /// Long name for the negated half of a flag pair.
    pub(crate) fn negated_long(&self) -> String {
        format!("no-{}", self.long)
    }
}

/// The full set of options derived from one schema, in field-declaration
/// order.
#[derive(Debug, Clone, Default)]
pub struct DerivedOptions {
    options: Vec<DerivedOption>,
}

impl DerivedOptions {
    /// Iterate over the derived options in declaration order.
    #[must_use = "iterators should be consumed"]
    pub fn iter(&self) -> impl Iterator<Item = &DerivedOption> {
        self.options.iter()
    }

    /// Number of derived options.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether derivation produced no options.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub(crate) fn options(&self) -> &[DerivedOption] {
        &self.options
    }
}

/// Derive the option set for `schema` under `settings`.
///
/// # Errors
///
/// Returns a configuration [`SchemaOptsError`] when a field's declared type
/// has no shape, a composite nests another composite, a union's members
/// resolve to differing arities, or two fields share a name.
pub fn derive_options(
    schema: &ModelSchema,
    settings: &DeriveSettings,
) -> Result<DerivedOptions, SchemaOptsError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for spec in schema.fields() {
        if !seen.insert(spec.name()) {
            return Err(SchemaOptsError::DuplicateField {
                name: spec.name().to_owned(),
            });
        }
    }

    let mut options = Vec::new();
    for spec in schema.fields() {
        if !settings.selects(spec.name()) {
            continue;
        }
        let shape = classify(spec, settings)?;
        let required = is_cli_required(spec, &shape);
        let env = settings
            .apply_env_vars
            .then(|| spec.env_var().map(str::to_owned))
            .flatten();
        options.push(DerivedOption {
            long: long_name(spec.name()),
            shape,
            env,
            required,
            spec: spec.clone(),
        });
    }
    tracing::debug!(
        fields = schema.fields().len(),
        options = options.len(),
        "derived command-line options"
    );
    Ok(DerivedOptions { options })
}

/// Kebab-cased long option name for a field.
fn long_name(field: &str) -> String {
    field.to_ascii_lowercase().replace('_', "-")
}

/// Flags, sequences, and mappings fall back to `false`/empty containers,
/// so only once-shaped options with no default are mandatory.
fn is_cli_required(spec: &FieldSpec, shape: &OptionShape) -> bool {
    spec.is_required()
        && !matches!(shape, OptionShape::Flag)
        && matches!(shape.arity(), ShapeArity::Once(_))
}

/// Classify one field's declared type into its option shape.
fn classify(spec: &FieldSpec, settings: &DeriveSettings) -> Result<OptionShape, SchemaOptsError> {
    let declared = strip_optional(spec.ty());
    match declared {
        FieldType::Bool if settings.bool_as_flag => Ok(OptionShape::Flag),
        FieldType::Union(members) => union_shape(spec, members, settings),
        other => member_shape(spec, other, settings),
    }
}

/// Classification shared by top-level non-flag fields and union members.
///
/// `bool` resolves to a boolish scalar here; the flag pair only exists for
/// a field whose declared type is `bool` itself.
fn member_shape(
    spec: &FieldSpec,
    ty: &FieldType,
    settings: &DeriveSettings,
) -> Result<OptionShape, SchemaOptsError> {
    match ty {
        FieldType::Str => Ok(OptionShape::Single(ScalarKind::Str)),
        FieldType::Int => Ok(OptionShape::Single(ScalarKind::Int)),
        FieldType::Float => Ok(OptionShape::Single(ScalarKind::Float)),
        FieldType::Bool => Ok(OptionShape::Single(ScalarKind::Bool)),
        FieldType::Choice(choice) => {
            if choice.literals().is_empty() {
                return Err(unsupported(spec, ty));
            }
            Ok(OptionShape::Choice(ChoiceMatcher::from_spec(
                choice,
                settings.case_sensitive_choices,
            )))
        }
        FieldType::Tuple(slots) => {
            if slots.is_empty() {
                return Err(unsupported(spec, ty));
            }
            let converters = slots
                .iter()
                .map(|slot| slot_converter(spec, slot, settings))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(OptionShape::FixedTuple(converters))
        }
        FieldType::Sequence(kind, element) => Ok(OptionShape::Multiple(
            *kind,
            slot_converter(spec, element.as_ref(), settings)?,
        )),
        FieldType::Map(key, value) => Ok(OptionShape::MultiplePair(
            slot_converter(spec, key.as_ref(), settings)?,
            slot_converter(spec, value.as_ref(), settings)?,
        )),
        FieldType::Optional(_) | FieldType::Union(_) => Err(SchemaOptsError::NestedComposite {
            field: spec.name().to_owned(),
            slot: ty.to_string(),
        }),
    }
}

/// Resolve a composite slot to its converter; anything beyond a scalar or
/// choice is a configuration error.
fn slot_converter(
    spec: &FieldSpec,
    ty: &FieldType,
    settings: &DeriveSettings,
) -> Result<SlotConverter, SchemaOptsError> {
    match ty {
        FieldType::Str => Ok(SlotConverter::Scalar(ScalarKind::Str)),
        FieldType::Int => Ok(SlotConverter::Scalar(ScalarKind::Int)),
        FieldType::Float => Ok(SlotConverter::Scalar(ScalarKind::Float)),
        FieldType::Bool => Ok(SlotConverter::Scalar(ScalarKind::Bool)),
        FieldType::Choice(choice) => {
            if choice.literals().is_empty() {
                return Err(unsupported(spec, ty));
            }
            Ok(SlotConverter::Choice(ChoiceMatcher::from_spec(
                choice,
                settings.case_sensitive_choices,
            )))
        }
        _ => Err(SchemaOptsError::NestedComposite {
            field: spec.name().to_owned(),
            slot: ty.to_string(),
        }),
    }
}

/// Resolve a union: every member must produce a shape of identical arity.
///
/// A single-member union collapses to that member's own shape, mirroring
/// the collapse the source type system performs upstream.
fn union_shape(
    spec: &FieldSpec,
    members: &[FieldType],
    settings: &DeriveSettings,
) -> Result<OptionShape, SchemaOptsError> {
    let candidates = members
        .iter()
        .map(|member| member_shape(spec, member, settings))
        .collect::<Result<Vec<_>, _>>()?;

    let mut shapes = candidates.into_iter();
    let Some(first) = shapes.next() else {
        return Err(unsupported(spec, &FieldType::Union(Vec::new())));
    };
    let rest: Vec<OptionShape> = shapes.collect();
    if rest.is_empty() {
        return Ok(first);
    }

    let arity = first.arity();
    if rest.iter().any(|shape| shape.arity() != arity) {
        let arities: Vec<String> = std::iter::once(&first)
            .chain(rest.iter())
            .map(|shape| shape.arity().to_string())
            .collect();
        return Err(SchemaOptsError::UnionArityMismatch {
            field: spec.name().to_owned(),
            arities: arities.join(", "),
        });
    }

    let mut all = Vec::with_capacity(rest.len() + 1);
    all.push(first);
    all.extend(rest);
    Ok(OptionShape::UnionDispatch(UnionDispatch {
        arity,
        candidates: all,
    }))
}

fn unsupported(spec: &FieldSpec, ty: &FieldType) -> SchemaOptsError {
    SchemaOptsError::UnsupportedType {
        field: spec.name().to_owned(),
        ty: ty.to_string(),
    }
}

/// Peel optional wrappers; requiredness is tracked on the field spec.
fn strip_optional(ty: &FieldType) -> &FieldType {
    let mut current = ty;
    while let FieldType::Optional(inner) = current {
        current = inner.as_ref();
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ChoiceSpec;
    use serde_json::json;

    fn derive_single(spec: FieldSpec) -> Result<DerivedOptions, SchemaOptsError> {
        derive_options(&ModelSchema::new(vec![spec]), &DeriveSettings::default())
    }

    #[test]
    fn bool_fields_become_flags() {
        let derived = derive_single(FieldSpec::new("blocked", FieldType::Bool).with_default(json!(true)))
            .map(|opts| opts.options().first().map(|o| o.shape().clone()));
        assert!(matches!(derived, Ok(Some(OptionShape::Flag))));
    }

    #[test]
    fn bool_as_flag_can_be_disabled() {
        let schema = ModelSchema::new(vec![FieldSpec::new("blocked", FieldType::Bool)]);
        let settings = DeriveSettings::default().bool_as_flag(false);
        let derived = derive_options(&schema, &settings)
            .map(|opts| opts.options().first().map(|o| o.shape().clone()));
        assert!(matches!(
            derived,
            Ok(Some(OptionShape::Single(ScalarKind::Bool)))
        ));
    }

    #[test]
    fn nested_composite_is_a_configuration_error() {
        let spec = FieldSpec::new(
            "pairs",
            FieldType::list(FieldType::list(FieldType::Int)),
        );
        assert!(matches!(
            derive_single(spec),
            Err(SchemaOptsError::NestedComposite { .. })
        ));
    }

    #[test]
    fn union_of_mismatched_arity_is_rejected() {
        let spec = FieldSpec::new(
            "target",
            FieldType::Union(vec![
                FieldType::Tuple(vec![FieldType::Str, FieldType::Int]),
                FieldType::Str,
            ]),
        );
        assert!(matches!(
            derive_single(spec),
            Err(SchemaOptsError::UnionArityMismatch { .. })
        ));
    }

    #[test]
    fn single_member_union_collapses() {
        let spec = FieldSpec::new("value", FieldType::Union(vec![FieldType::Int]));
        let derived = derive_single(spec)
            .map(|opts| opts.options().first().map(|o| o.shape().clone()));
        assert!(matches!(
            derived,
            Ok(Some(OptionShape::Single(ScalarKind::Int)))
        ));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let schema = ModelSchema::new(vec![
            FieldSpec::new("name", FieldType::Str),
            FieldSpec::new("name", FieldType::Int),
        ]);
        assert!(matches!(
            derive_options(&schema, &DeriveSettings::default()),
            Err(SchemaOptsError::DuplicateField { .. })
        ));
    }

    #[test]
    fn excluded_fields_are_skipped_before_classification() {
        let schema = ModelSchema::new(vec![
            FieldSpec::new("name", FieldType::Str),
            // Would be rejected if it were classified.
            FieldSpec::new("bad", FieldType::list(FieldType::list(FieldType::Int))),
        ]);
        let settings = DeriveSettings::default().exclude(["bad"]);
        let derived = derive_options(&schema, &settings);
        assert!(derived.is_ok_and(|opts| opts.len() == 1));
    }

    #[test]
    fn long_names_are_kebab_cased() {
        let derived = derive_single(FieldSpec::new("max_retries", FieldType::Int));
        assert!(
            derived.is_ok_and(|opts| opts.options().first().is_some_and(|o| o.long() == "max-retries"))
        );
    }
}

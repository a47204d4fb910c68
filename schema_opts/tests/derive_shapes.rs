//! Classification of declared types into option shapes, and the
//! derivation-time configuration errors.

use anyhow::{Result, ensure};
use rstest::rstest;
use schema_opts::{
    ChoiceSpec, DeriveSettings, FieldSpec, FieldType, ModelSchema, OptionShape, ScalarKind,
    SchemaOptsError, derive_options,
};
use serde_json::json;

fn shape_of(ty: FieldType) -> Result<OptionShape, SchemaOptsError> {
    let schema = ModelSchema::new(vec![FieldSpec::new("field", ty).with_default(json!(null))]);
    let derived = derive_options(&schema, &DeriveSettings::default())?;
    derived
        .iter()
        .next()
        .map(|option| option.shape().clone())
        .ok_or_else(|| SchemaOptsError::validation("field", "no option derived"))
}

#[rstest]
fn scalars_become_single_options() -> Result<()> {
    ensure!(matches!(shape_of(FieldType::Str)?, OptionShape::Single(ScalarKind::Str)));
    ensure!(matches!(shape_of(FieldType::Int)?, OptionShape::Single(ScalarKind::Int)));
    ensure!(matches!(shape_of(FieldType::Float)?, OptionShape::Single(ScalarKind::Float)));
    Ok(())
}

#[rstest]
fn bool_becomes_a_flag_pair() -> Result<()> {
    ensure!(matches!(shape_of(FieldType::Bool)?, OptionShape::Flag));
    Ok(())
}

#[rstest]
fn enums_become_choices() -> Result<()> {
    let shape = shape_of(FieldType::Choice(ChoiceSpec::new(["a", "b"])))?;
    ensure!(matches!(shape, OptionShape::Choice(_)));
    Ok(())
}

#[rstest]
fn optional_wrappers_classify_as_their_inner_type() -> Result<()> {
    let shape = shape_of(FieldType::optional(FieldType::Int))?;
    ensure!(matches!(shape, OptionShape::Single(ScalarKind::Int)));
    Ok(())
}

#[rstest]
fn composites_map_to_their_shapes() -> Result<()> {
    let tuple = shape_of(FieldType::Tuple(vec![FieldType::Str, FieldType::Int]))?;
    ensure!(matches!(tuple, OptionShape::FixedTuple(ref slots) if slots.len() == 2));

    let sequence = shape_of(FieldType::list(FieldType::Str))?;
    ensure!(matches!(sequence, OptionShape::Multiple(..)));

    let mapping = shape_of(FieldType::map(FieldType::Str, FieldType::Int))?;
    ensure!(matches!(mapping, OptionShape::MultiplePair(..)));
    Ok(())
}

#[rstest]
#[case::tuple_in_tuple(FieldType::Tuple(vec![
    FieldType::Str,
    FieldType::Tuple(vec![FieldType::Int, FieldType::Int]),
]))]
#[case::list_in_list(FieldType::list(FieldType::list(FieldType::Int)))]
#[case::map_value_composite(FieldType::map(FieldType::Str, FieldType::list(FieldType::Int)))]
#[case::optional_slot(FieldType::Tuple(vec![FieldType::optional(FieldType::Int)]))]
#[case::union_in_union(FieldType::Union(vec![
    FieldType::Union(vec![FieldType::Int, FieldType::Str]),
    FieldType::Int,
]))]
fn nested_composites_are_configuration_errors(#[case] ty: FieldType) -> Result<()> {
    let outcome = shape_of(ty);
    ensure!(
        matches!(outcome, Err(SchemaOptsError::NestedComposite { .. })),
        "expected a nested-composite error, got {outcome:?}"
    );
    Ok(())
}

#[rstest]
fn include_and_exclude_select_fields() -> Result<()> {
    let schema = ModelSchema::new(vec![
        FieldSpec::new("kept", FieldType::Str),
        FieldSpec::new("dropped", FieldType::Str),
        FieldSpec::new("also_dropped", FieldType::Str),
    ]);
    let settings = DeriveSettings::default()
        .include(["kept", "dropped"])
        .exclude(["dropped"]);
    let derived = derive_options(&schema, &settings)?;
    let names: Vec<&str> = derived.iter().map(|option| option.field().name()).collect();
    ensure!(names == vec!["kept"], "unexpected selection: {names:?}");
    Ok(())
}

#[rstest]
fn derivation_preserves_declaration_order() -> Result<()> {
    let schema = ModelSchema::new(vec![
        FieldSpec::new("zeta", FieldType::Str),
        FieldSpec::new("alpha", FieldType::Str),
    ]);
    let derived = derive_options(&schema, &DeriveSettings::default())?;
    let names: Vec<&str> = derived.iter().map(|option| option.field().name()).collect();
    ensure!(names == vec!["zeta", "alpha"], "order not preserved: {names:?}");
    Ok(())
}

#[rstest]
fn required_marker_follows_defaults_and_shape() -> Result<()> {
    let schema = ModelSchema::new(vec![
        FieldSpec::new("needed", FieldType::Str),
        FieldSpec::new("defaulted", FieldType::Str).with_default(json!("x")),
        FieldSpec::new("listed", FieldType::list(FieldType::Str)),
        FieldSpec::new("flagged", FieldType::Bool),
    ]);
    let derived = derive_options(&schema, &DeriveSettings::default())?;
    let required: Vec<(&str, bool)> = derived
        .iter()
        .map(|option| (option.field().name(), option.is_required()))
        .collect();
    ensure!(
        required
            == vec![
                ("needed", true),
                ("defaulted", false),
                ("listed", false),
                ("flagged", false),
            ],
        "unexpected requiredness: {required:?}"
    );
    Ok(())
}

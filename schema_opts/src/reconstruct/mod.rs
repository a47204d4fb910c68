//! The value reconstructor: folds clap's parsed values back into one JSON
//! value per field, ready for the schema's construction path.
//!
//! Flags and typed scalars pass through; tuples repackage their slots;
//! sequences rebuild the declared container; mapping pairs fold with
//! last-key-wins; unions try each candidate in declaration order and keep
//! the first that converts. Field validators run against the final value,
//! and every failing field is reported, not just the first.

use clap::ArgMatches;
use serde_json::{Map, Value};

use crate::derive::{
    ChoiceMatcher, DerivedOption, DerivedOptions, OptionShape, ShapeArity, SlotConverter,
    UnionDispatch,
};
use crate::error::SchemaOptsError;
use crate::schema::{FieldType, ScalarKind, SequenceKind, render_key};

impl DerivedOptions {
    /// Rebuild the field map from parsed matches.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaOptsError`] (aggregated across fields where more
    /// than one fails) when a composite token fails conversion, no union
    /// candidate accepts a value, or a field validator rejects the
    /// reconstructed value.
    pub fn reconstruct(&self, matches: &ArgMatches) -> Result<Map<String, Value>, SchemaOptsError> {
        let mut fields = Map::new();
        let mut failures = Vec::new();
        for option in self.options() {
            match field_value(option, matches) {
                Ok(value) => {
                    for validator in option.field().validators() {
                        if let Err(message) = validator(&value) {
                            failures
                                .push(SchemaOptsError::validation(option.field().name(), message));
                        }
                    }
                    tracing::trace!(field = option.field().name(), "reconstructed field value");
                    fields.insert(option.field().name().to_owned(), value);
                }
                Err(err) => failures.push(err),
            }
        }
        SchemaOptsError::try_aggregate(failures).map_or(Ok(fields), Err)
    }
}

fn field_value(option: &DerivedOption, matches: &ArgMatches) -> Result<Value, SchemaOptsError> {
    match option.shape() {
        OptionShape::Flag => Ok(flag_value(option, matches)),
        OptionShape::Choice(matcher) => choice_value(option, matcher, matches),
        OptionShape::Single(kind) => single_value(option, *kind, matches),
        OptionShape::FixedTuple(slots) => tuple_value(option, slots, matches),
        OptionShape::Multiple(kind, converter) => multiple_value(option, *kind, converter, matches),
        OptionShape::MultiplePair(key, value) => pair_value(option, key, value, matches),
        OptionShape::UnionDispatch(dispatch) => union_value(option, dispatch, matches),
    }
}

/// The negated half of the pair wins when both flags appear; clap's
/// `overrides_with` keeps only the last occurrence either way.
fn flag_value(option: &DerivedOption, matches: &ArgMatches) -> Value {
    if matches.get_flag(&option.negated_id()) {
        return Value::Bool(false);
    }
    if matches.get_flag(option.id()) {
        return Value::Bool(true);
    }
    option.field().default().cloned().unwrap_or_else(|| {
        if matches!(option.field().ty(), FieldType::Optional(_)) {
            Value::Null
        } else {
            Value::Bool(false)
        }
    })
}

fn choice_value(
    option: &DerivedOption,
    matcher: &ChoiceMatcher,
    matches: &ArgMatches,
) -> Result<Value, SchemaOptsError> {
    matches.get_one::<String>(option.id()).map_or_else(
        || absent_value(option),
        |token| canonical_literal(option, matcher, token),
    )
}

fn canonical_literal(
    option: &DerivedOption,
    matcher: &ChoiceMatcher,
    token: &str,
) -> Result<Value, SchemaOptsError> {
    matcher
        .canonical(token)
        .map(|literal| Value::String(literal.to_owned()))
        .ok_or_else(|| {
            invalid_token(
                option,
                token,
                format!("one of {}", matcher.literals().join(", ")),
            )
        })
}

fn single_value(
    option: &DerivedOption,
    kind: ScalarKind,
    matches: &ArgMatches,
) -> Result<Value, SchemaOptsError> {
    let id = option.id();
    let extracted = match kind {
        ScalarKind::Str => matches
            .get_one::<String>(id)
            .map(|s| Ok(Value::String(s.clone()))),
        ScalarKind::Int => matches.get_one::<i64>(id).map(|i| Ok(Value::from(*i))),
        ScalarKind::Bool => matches.get_one::<bool>(id).map(|b| Ok(Value::Bool(*b))),
        ScalarKind::Float => matches.get_one::<f64>(id).map(|f| float_value(option, *f)),
    };
    extracted.map_or_else(|| absent_value(option), |value| value)
}

/// Non-finite floats have no JSON representation.
fn float_value(option: &DerivedOption, parsed: f64) -> Result<Value, SchemaOptsError> {
    serde_json::Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| {
            invalid_token(
                option,
                &parsed.to_string(),
                String::from("a finite decimal number"),
            )
        })
}

fn tuple_value(
    option: &DerivedOption,
    slots: &[SlotConverter],
    matches: &ArgMatches,
) -> Result<Value, SchemaOptsError> {
    match matches.get_many::<String>(option.id()) {
        Some(values) => {
            let tokens: Vec<String> = values.cloned().collect();
            convert_slots(option, slots, &tokens)
        }
        None => absent_value(option),
    }
}

fn convert_slots(
    option: &DerivedOption,
    slots: &[SlotConverter],
    tokens: &[String],
) -> Result<Value, SchemaOptsError> {
    if tokens.len() != slots.len() {
        return Err(invalid_token(
            option,
            &tokens.join(" "),
            format!("exactly {} values", slots.len()),
        ));
    }
    let mut converted = Vec::with_capacity(slots.len());
    for (slot, token) in slots.iter().zip(tokens) {
        let value = slot
            .convert(token)
            .ok_or_else(|| invalid_token(option, token, slot.expected()))?;
        converted.push(value);
    }
    Ok(Value::Array(converted))
}

fn multiple_value(
    option: &DerivedOption,
    kind: SequenceKind,
    converter: &SlotConverter,
    matches: &ArgMatches,
) -> Result<Value, SchemaOptsError> {
    let id = option.id();
    let collected: Option<Result<Vec<Value>, SchemaOptsError>> = match converter {
        SlotConverter::Scalar(ScalarKind::Str) => matches
            .get_many::<String>(id)
            .map(|values| Ok(values.map(|s| Value::String(s.clone())).collect())),
        SlotConverter::Scalar(ScalarKind::Int) => matches
            .get_many::<i64>(id)
            .map(|values| Ok(values.map(|i| Value::from(*i)).collect())),
        SlotConverter::Scalar(ScalarKind::Bool) => matches
            .get_many::<bool>(id)
            .map(|values| Ok(values.map(|b| Value::Bool(*b)).collect())),
        SlotConverter::Scalar(ScalarKind::Float) => matches
            .get_many::<f64>(id)
            .map(|values| values.map(|f| float_value(option, *f)).collect()),
        SlotConverter::Choice(matcher) => matches.get_many::<String>(id).map(|values| {
            values
                .map(|token| canonical_literal(option, matcher, token))
                .collect()
        }),
    };
    match collected {
        Some(result) => result.map(|elements| sequence_value(kind, elements)),
        None => Ok(absent_container(option, Value::Array(Vec::new()))),
    }
}

fn sequence_value(kind: SequenceKind, elements: Vec<Value>) -> Value {
    match kind {
        SequenceKind::List => Value::Array(elements),
        SequenceKind::Set => Value::Array(dedup_first_wins(elements)),
    }
}

fn dedup_first_wins(elements: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(elements.len());
    for element in elements {
        if !unique.contains(&element) {
            unique.push(element);
        }
    }
    unique
}

fn pair_value(
    option: &DerivedOption,
    key_converter: &SlotConverter,
    value_converter: &SlotConverter,
    matches: &ArgMatches,
) -> Result<Value, SchemaOptsError> {
    match matches.get_occurrences::<String>(option.id()) {
        Some(occurrences) => {
            let pairs: Vec<Vec<String>> = occurrences
                .map(|occurrence| occurrence.cloned().collect())
                .collect();
            fold_pairs(option, key_converter, value_converter, &pairs)
        }
        None => Ok(absent_container(option, Value::Object(Map::new()))),
    }
}

/// Fold key/value occurrences in parse order; later occurrences of an
/// equal key overwrite earlier ones.
fn fold_pairs(
    option: &DerivedOption,
    key_converter: &SlotConverter,
    value_converter: &SlotConverter,
    pairs: &[Vec<String>],
) -> Result<Value, SchemaOptsError> {
    let mut folded = Map::new();
    for pair in pairs {
        let mut tokens = pair.iter();
        let (Some(key_token), Some(value_token), None) =
            (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(invalid_token(
                option,
                &pair.join(" "),
                String::from("a KEY VALUE pair"),
            ));
        };
        let key = key_converter
            .convert(key_token)
            .ok_or_else(|| invalid_token(option, key_token, key_converter.expected()))?;
        let value = value_converter
            .convert(value_token)
            .ok_or_else(|| invalid_token(option, value_token, value_converter.expected()))?;
        let key_string = render_key(&key)
            .ok_or_else(|| invalid_token(option, key_token, key_converter.expected()))?;
        folded.insert(key_string, value);
    }
    Ok(Value::Object(folded))
}

/// First candidate to convert the captured tokens wins, in declaration
/// order; ambiguous values deliberately resolve to the earlier member.
fn union_value(
    option: &DerivedOption,
    dispatch: &UnionDispatch,
    matches: &ArgMatches,
) -> Result<Value, SchemaOptsError> {
    match dispatch.arity() {
        ShapeArity::Once(_) => match matches.get_many::<String>(option.id()) {
            Some(values) => {
                let tokens: Vec<String> = values.cloned().collect();
                dispatch
                    .candidates()
                    .iter()
                    .find_map(|candidate| convert_once(option, candidate, &tokens).ok())
                    .ok_or_else(|| union_no_match(option, &tokens))
            }
            None => absent_value(option),
        },
        ShapeArity::PerRepetition(_) => match matches.get_occurrences::<String>(option.id()) {
            Some(occurrences) => {
                let groups: Vec<Vec<String>> = occurrences
                    .map(|occurrence| occurrence.cloned().collect())
                    .collect();
                dispatch
                    .candidates()
                    .iter()
                    .find_map(|candidate| convert_repeated(option, candidate, &groups).ok())
                    .ok_or_else(|| {
                        let flat: Vec<String> = groups.iter().flatten().cloned().collect();
                        union_no_match(option, &flat)
                    })
            }
            None => Ok(absent_repeatable(option, dispatch)),
        },
    }
}

/// Token-level conversion for a once-shaped union candidate.
fn convert_once(
    option: &DerivedOption,
    candidate: &OptionShape,
    tokens: &[String],
) -> Result<Value, SchemaOptsError> {
    match candidate {
        OptionShape::Single(kind) => {
            let token = single_token(option, tokens)?;
            kind.convert(token)
                .ok_or_else(|| invalid_token(option, token, String::from(kind.expected())))
        }
        OptionShape::Choice(matcher) => {
            let token = single_token(option, tokens)?;
            canonical_literal(option, matcher, token)
        }
        OptionShape::FixedTuple(slots) => convert_slots(option, slots, tokens),
        _ => Err(union_no_match(option, tokens)),
    }
}

/// Whole-container conversion for a repeatable union candidate.
fn convert_repeated(
    option: &DerivedOption,
    candidate: &OptionShape,
    groups: &[Vec<String>],
) -> Result<Value, SchemaOptsError> {
    match candidate {
        OptionShape::Multiple(kind, converter) => {
            let mut elements = Vec::with_capacity(groups.len());
            for group in groups {
                let token = single_token(option, group)?;
                let value = converter
                    .convert(token)
                    .ok_or_else(|| invalid_token(option, token, converter.expected()))?;
                elements.push(value);
            }
            Ok(sequence_value(*kind, elements))
        }
        OptionShape::MultiplePair(key, value) => fold_pairs(option, key, value, groups),
        _ => {
            let flat: Vec<String> = groups.iter().flatten().cloned().collect();
            Err(union_no_match(option, &flat))
        }
    }
}

fn single_token<'a>(
    option: &DerivedOption,
    tokens: &'a [String],
) -> Result<&'a str, SchemaOptsError> {
    let mut iter = tokens.iter();
    match (iter.next(), iter.next()) {
        (Some(token), None) => Ok(token),
        _ => Err(invalid_token(
            option,
            &tokens.join(" "),
            String::from("exactly one value"),
        )),
    }
}

/// Resolution for an absent once-shaped option: declared default, then
/// `null` for optional fields.
fn absent_value(option: &DerivedOption) -> Result<Value, SchemaOptsError> {
    if let Some(default) = option.field().default() {
        return Ok(default.clone());
    }
    if matches!(option.field().ty(), FieldType::Optional(_)) {
        return Ok(Value::Null);
    }
    // clap enforces required options before reconstruction runs.
    Err(SchemaOptsError::validation(
        option.field().name(),
        "a value is required",
    ))
}

/// An absent sequence or mapping reconstructs its default, or an empty
/// container.
fn absent_container(option: &DerivedOption, empty: Value) -> Value {
    option.field().default().cloned().unwrap_or(empty)
}

fn absent_repeatable(option: &DerivedOption, dispatch: &UnionDispatch) -> Value {
    let empty = match dispatch.candidates().first() {
        Some(OptionShape::MultiplePair(..)) => Value::Object(Map::new()),
        _ => Value::Array(Vec::new()),
    };
    absent_container(option, empty)
}

fn invalid_token(option: &DerivedOption, token: &str, expected: String) -> SchemaOptsError {
    SchemaOptsError::InvalidToken {
        option: option.long().to_owned(),
        token: token.to_owned(),
        expected,
    }
}

fn union_no_match(option: &DerivedOption, tokens: &[String]) -> SchemaOptsError {
    SchemaOptsError::UnionNoMatch {
        option: option.long().to_owned(),
        tokens: tokens.join(" "),
    }
}

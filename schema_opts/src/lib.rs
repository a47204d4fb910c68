//! Derive clap command-line options from a declarative record schema.
//!
//! A schema describes its fields once (name, declared type, default,
//! description, validators) through the [`ModelSchema`] reflection
//! contract. This crate walks those declarations and registers one option
//! per field on a [`clap::Command`] (the option deriver), then folds the
//! parsed values back into a typed, validated instance via serde (the
//! value reconstructor). The schema never has to be hand-duplicated as
//! option declarations.
//!
//! # Example
//!
//! ```rust
//! use schema_opts::{
//!     ChoiceSpec, FieldSpec, FieldType, ModelSchema, OptSchema, SchemaCommand,
//! };
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct AddUser {
//!     name: String,
//!     role: String,
//!     blocked: bool,
//! }
//!
//! impl OptSchema for AddUser {
//!     fn model() -> ModelSchema {
//!         ModelSchema::new(vec![
//!             FieldSpec::new("name", FieldType::Str).describe("Account name"),
//!             FieldSpec::new("role", FieldType::Choice(ChoiceSpec::new(["plain", "admin"])))
//!                 .with_default(json!("plain")),
//!             FieldSpec::new("blocked", FieldType::Bool).with_default(json!(true)),
//!         ])
//!     }
//! }
//!
//! # fn main() -> Result<(), schema_opts::SchemaOptsError> {
//! let command = SchemaCommand::<AddUser>::new("add-user")?;
//! let user = command.try_parse_from([
//!     "add-user", "--name", "Pancake", "--role", "admin", "--no-blocked",
//! ])?;
//! assert_eq!(
//!     user,
//!     AddUser {
//!         name: String::from("Pancake"),
//!         role: String::from("admin"),
//!         blocked: false,
//!     }
//! );
//! # Ok(())
//! # }
//! ```

mod command;
mod derive;
mod error;
mod reconstruct;
mod schema;

pub use command::SchemaCommand;
pub use derive::{
    ChoiceMatcher, DeriveSettings, DerivedOption, DerivedOptions, OptionShape, ShapeArity,
    SlotConverter, UnionDispatch, derive_options,
};
pub use error::{AggregatedErrors, SchemaOptsError};
pub use schema::{
    ChoiceSpec, FieldFailure, FieldSpec, FieldType, ModelSchema, ScalarKind, SequenceKind,
    Validator,
};

/// Trait implemented by record types that can be parsed from the command
/// line.
///
/// [`Self::model`] is the reflection contract: an ordered description of
/// the type's fields. Construction goes through serde (the reconstructed
/// field map is deserialised into `Self`), and [`Self::validate`] then
/// applies whole-model validation, reporting one failure per offending
/// field.
pub trait OptSchema: serde::de::DeserializeOwned {
    /// The field declarations for this record type, in declaration order.
    fn model() -> ModelSchema;

    /// Validate a constructed instance.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldFailure`] per rejected field; each surfaces to
    /// the end user as a usage error carrying the validator's message.
    fn validate(&self) -> Result<(), Vec<FieldFailure>> {
        Ok(())
    }
}

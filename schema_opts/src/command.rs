//! The command wrapper tying derivation, parsing, and reconstruction
//! together.
//!
//! Derivation runs once, when the command object is built; configuration
//! errors abort there. Each invocation then parses fresh arguments,
//! reconstructs a fresh field map, and hands it to the schema's
//! construction path.

use std::ffi::OsString;
use std::marker::PhantomData;

use clap::error::ErrorKind;
use serde_json::Value;

use crate::OptSchema;
use crate::derive::{DeriveSettings, DerivedOptions, derive_options};
use crate::error::SchemaOptsError;

/// A clap command derived from a schema `S`.
///
/// # Examples
///
/// ```
/// use schema_opts::{FieldSpec, FieldType, ModelSchema, OptSchema, SchemaCommand};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Greet {
///     name: String,
/// }
///
/// impl OptSchema for Greet {
///     fn model() -> ModelSchema {
///         ModelSchema::new(vec![FieldSpec::new("name", FieldType::Str)])
///     }
/// }
///
/// # fn main() -> Result<(), schema_opts::SchemaOptsError> {
/// let command = SchemaCommand::<Greet>::new("greet")?;
/// let greet = command.try_parse_from(["greet", "--name", "Pancake"])?;
/// assert_eq!(greet.name, "Pancake");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SchemaCommand<S: OptSchema> {
    command: clap::Command,
    options: DerivedOptions,
    _schema: PhantomData<S>,
}

impl<S: OptSchema> SchemaCommand<S> {
    /// Derive the command under default settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration [`SchemaOptsError`] when the schema cannot
    /// be mapped to options; see [`derive_options`].
    pub fn new(name: impl Into<String>) -> Result<Self, SchemaOptsError> {
        Self::with_settings(name, &DeriveSettings::default())
    }

    /// Derive the command under explicit settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration [`SchemaOptsError`] when the schema cannot
    /// be mapped to options; see [`derive_options`].
    pub fn with_settings(
        name: impl Into<String>,
        settings: &DeriveSettings,
    ) -> Result<Self, SchemaOptsError> {
        let options = derive_options(&S::model(), settings)?;
        let command = options.register(clap::Command::new(name.into()));
        Ok(Self {
            command,
            options,
            _schema: PhantomData,
        })
    }

    /// The underlying clap command, for help rendering or further tuning.
    #[must_use]
    pub const fn command(&self) -> &clap::Command {
        &self.command
    }

    /// The derived option set backing this command.
    #[must_use]
    pub const fn options(&self) -> &DerivedOptions {
        &self.options
    }

    /// Parse `argv`, reconstruct the field map, and construct a validated
    /// schema instance.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaOptsError::CliParsing`] for usage errors (including
    /// help and version requests), a reconstruction error when no union
    /// candidate matches or a composite token fails conversion, and a
    /// validation or construction error when the assembled instance is
    /// rejected.
    pub fn try_parse_from<I, T>(&self, argv: I) -> Result<S, SchemaOptsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.clone().try_get_matches_from(argv)?;
        let fields = self.options.reconstruct(&matches)?;
        let instance: S = serde_json::from_value(Value::Object(fields))?;
        let failures = match instance.validate() {
            Ok(()) => Vec::new(),
            Err(failures) => failures,
        };
        let errors = failures
            .into_iter()
            .map(|failure| SchemaOptsError::validation(failure.field, failure.message));
        match SchemaOptsError::try_aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(instance),
        }
    }

    /// Parse `argv`, rendering any failure through clap and exiting.
    ///
    /// Help and version requests exit 0; usage, reconstruction, and
    /// validation failures are written to standard error with a nonzero
    /// exit code.
    pub fn parse_from<I, T>(&self, argv: I) -> S
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match self.try_parse_from(argv) {
            Ok(instance) => instance,
            Err(err) => self.render_failure(err),
        }
    }

    /// Parse the process arguments; see [`Self::parse_from`].
    pub fn parse(&self) -> S {
        self.parse_from(std::env::args_os())
    }

    fn render_failure(&self, err: SchemaOptsError) -> ! {
        match err {
            SchemaOptsError::CliParsing(cli) => cli.exit(),
            other => clap::Error::raw(ErrorKind::ValueValidation, format!("{other}\n"))
                .with_cmd(&self.command)
                .exit(),
        }
    }
}

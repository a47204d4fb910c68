//! Registration of derived options onto a clap command.
//!
//! Shapes whose every token shares one converter (Single, Choice,
//! Multiple) register typed clap value parsers, so malformed scalars are
//! rejected by clap itself. Token-heterogeneous shapes (FixedTuple,
//! MultiplePair, UnionDispatch) capture raw string tokens at the declared
//! arity; their per-slot conversion happens during reconstruction.

use clap::builder::{BoolishValueParser, PossibleValuesParser};
use clap::{Arg, ArgAction, Command};

use super::{DerivedOption, DerivedOptions, OptionShape, ShapeArity, SlotConverter};
use crate::schema::{ScalarKind, render_token};

impl DerivedOptions {
    /// Register every derived option onto `command`, in field-declaration
    /// order.
    #[must_use]
    pub fn register(&self, command: Command) -> Command {
        self.options()
            .iter()
            .fold(command, |cmd, option| option.register(cmd))
    }
}

impl DerivedOption {
    fn register(&self, command: Command) -> Command {
        let mut arg = Arg::new(self.id().to_owned()).long(self.long().to_owned());
        if let Some(description) = self.field().description() {
            arg = arg.help(description.to_owned());
        }
        if let Some(env) = self.env() {
            arg = arg.env(env.to_owned());
        }

        match self.shape() {
            OptionShape::Flag => {
                let negated = Arg::new(self.negated_id())
                    .long(self.negated_long())
                    .action(ArgAction::SetTrue)
                    .overrides_with(self.id().to_owned());
                arg = arg
                    .action(ArgAction::SetTrue)
                    .overrides_with(self.negated_id());
                command.arg(arg).arg(negated)
            }
            OptionShape::Choice(matcher) => {
                arg = arg
                    .value_parser(PossibleValuesParser::new(matcher.literals().to_vec()))
                    .ignore_case(!matcher.is_case_sensitive());
                command.arg(self.finish_once(arg))
            }
            OptionShape::Single(kind) => {
                arg = scalar_parser(arg, *kind).value_name(kind.value_name());
                command.arg(self.finish_once(arg))
            }
            OptionShape::FixedTuple(slots) => {
                let names: Vec<&'static str> =
                    slots.iter().map(SlotConverter::value_name).collect();
                arg = arg
                    .action(ArgAction::Set)
                    .num_args(slots.len())
                    .value_names(names);
                if self.is_required() {
                    arg = arg.required(true);
                }
                command.arg(arg)
            }
            OptionShape::Multiple(_, converter) => {
                arg = arg.action(ArgAction::Append);
                arg = match converter {
                    SlotConverter::Scalar(kind) => {
                        scalar_parser(arg, *kind).value_name(kind.value_name())
                    }
                    SlotConverter::Choice(matcher) => arg
                        .value_parser(PossibleValuesParser::new(matcher.literals().to_vec()))
                        .ignore_case(!matcher.is_case_sensitive()),
                };
                command.arg(arg)
            }
            OptionShape::MultiplePair(..) => {
                arg = arg
                    .action(ArgAction::Append)
                    .num_args(2)
                    .value_names(["KEY", "VALUE"]);
                command.arg(arg)
            }
            OptionShape::UnionDispatch(dispatch) => {
                arg = match dispatch.arity() {
                    ShapeArity::Once(n) => {
                        arg = arg.num_args(n);
                        if self.is_required() {
                            arg = arg.required(true);
                        }
                        arg
                    }
                    ShapeArity::PerRepetition(n) => arg.action(ArgAction::Append).num_args(n),
                };
                command.arg(arg)
            }
        }
    }

    /// Requiredness and help-visible defaults for once-shaped scalar
    /// options.
    fn finish_once(&self, arg: Arg) -> Arg {
        if self.is_required() {
            return arg.required(true);
        }
        if let Some(token) = self.field().default().and_then(render_token) {
            return arg.default_value(token);
        }
        arg
    }
}

fn scalar_parser(arg: Arg, kind: ScalarKind) -> Arg {
    match kind {
        ScalarKind::Str => arg,
        ScalarKind::Int => arg.value_parser(clap::value_parser!(i64)),
        ScalarKind::Float => arg.value_parser(clap::value_parser!(f64)),
        ScalarKind::Bool => arg.value_parser(BoolishValueParser::new()),
    }
}

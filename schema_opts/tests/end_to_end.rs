//! End-to-end parsing through a derived command.
//!
//! Covers the full pipeline: option derivation, clap parsing, value
//! reconstruction, serde construction, and validator reporting.

mod common;

use anyhow::{Result, ensure};
use common::{AddUser, Role, add_user_command};
use rstest::rstest;
use schema_opts::SchemaOptsError;

#[rstest]
fn full_invocation_reconstructs_every_field() -> Result<()> {
    let command = add_user_command()?;
    let user = command.try_parse_from([
        "add-user",
        "--name",
        "Pancake",
        "--role",
        "admin",
        "--no-blocked",
    ])?;
    ensure!(
        user == AddUser {
            name: String::from("Pancake"),
            role: Role::Admin,
            blocked: false,
        },
        "unexpected reconstruction: {user:?}"
    );
    Ok(())
}

#[rstest]
fn defaults_apply_when_options_are_absent() -> Result<()> {
    let command = add_user_command()?;
    let user = command.try_parse_from(["add-user", "--name", "Pancake"])?;
    ensure!(user.role == Role::Plain, "expected default role, got {:?}", user.role);
    ensure!(user.blocked, "expected blocked default of true");
    Ok(())
}

#[rstest]
#[case::positive(&["add-user", "--name", "n", "--blocked"], true)]
#[case::negative(&["add-user", "--name", "n", "--no-blocked"], false)]
#[case::negative_wins_last(&["add-user", "--name", "n", "--blocked", "--no-blocked"], false)]
fn flag_pair_toggles_the_boolean(#[case] argv: &[&str], #[case] expected: bool) -> Result<()> {
    let command = add_user_command()?;
    let user = command.try_parse_from(argv.iter().copied())?;
    ensure!(
        user.blocked == expected,
        "expected blocked {expected}, got {}",
        user.blocked
    );
    Ok(())
}

#[rstest]
fn missing_required_option_is_a_parse_error() -> Result<()> {
    let command = add_user_command()?;
    let outcome = command.try_parse_from(["add-user", "--role", "admin"]);
    ensure!(
        matches!(outcome, Err(SchemaOptsError::CliParsing(_))),
        "expected a parse error, got {outcome:?}"
    );
    Ok(())
}

#[rstest]
fn out_of_set_choice_is_a_parse_error() -> Result<()> {
    let command = add_user_command()?;
    let outcome = command.try_parse_from(["add-user", "--name", "n", "--role", "root"]);
    ensure!(
        matches!(outcome, Err(SchemaOptsError::CliParsing(_))),
        "expected a parse error, got {outcome:?}"
    );
    Ok(())
}

#[rstest]
fn choice_matching_is_case_insensitive_and_canonicalises() -> Result<()> {
    let command = add_user_command()?;
    let user = command.try_parse_from(["add-user", "--name", "n", "--role", "ADMIN"])?;
    ensure!(user.role == Role::Admin, "expected admin, got {:?}", user.role);
    Ok(())
}

#[rstest]
fn help_lists_derived_options_with_defaults() -> Result<()> {
    let command = add_user_command()?;
    let mut clap_command = command.command().clone();
    let help = clap_command.render_long_help().to_string();
    ensure!(help.contains("--name"), "help missing --name:\n{help}");
    ensure!(help.contains("--no-blocked"), "help missing --no-blocked:\n{help}");
    ensure!(help.contains("Account name"), "help missing description:\n{help}");
    ensure!(
        help.contains("[default: plain]"),
        "help missing choice default:\n{help}"
    );
    Ok(())
}

#[rstest]
fn help_request_surfaces_as_a_cli_parsing_error() -> Result<()> {
    let command = add_user_command()?;
    let outcome = command.try_parse_from(["add-user", "--help"]);
    match outcome {
        Err(SchemaOptsError::CliParsing(err)) => {
            ensure!(
                err.kind() == clap::error::ErrorKind::DisplayHelp,
                "expected DisplayHelp, got {:?}",
                err.kind()
            );
            Ok(())
        }
        other => anyhow::bail!("expected a help request, got {other:?}"),
    }
}

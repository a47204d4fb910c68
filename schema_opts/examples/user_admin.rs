//! Example CLI deriving its options from a user-administration schema.

use std::collections::BTreeMap;
use std::io::{self, Write};

use schema_opts::{ChoiceSpec, FieldSpec, FieldType, ModelSchema, OptSchema, SchemaCommand};
use serde::Deserialize;
use serde_json::json;

/// Request to provision one user account.
#[derive(Debug, Deserialize, PartialEq)]
struct AddUser {
    name: String,
    role: Role,
    blocked: bool,
    groups: Vec<String>,
    quota: BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum Role {
    Plain,
    Admin,
}

impl OptSchema for AddUser {
    fn model() -> ModelSchema {
        ModelSchema::new(vec![
            FieldSpec::new("name", FieldType::Str)
                .describe("Account name")
                .env("USER_ADMIN_NAME"),
            FieldSpec::new("role", FieldType::Choice(ChoiceSpec::new(["plain", "admin"])))
                .with_default(json!("plain"))
                .describe("Access level granted to the account"),
            FieldSpec::new("blocked", FieldType::Bool)
                .with_default(json!(true))
                .describe("Whether sign-in starts out blocked"),
            FieldSpec::new("groups", FieldType::list(FieldType::Str))
                .describe("Groups the account joins; repeat to add more"),
            FieldSpec::new("quota", FieldType::map(FieldType::Str, FieldType::Int))
                .describe("Per-resource quota overrides as KEY VALUE pairs"),
        ])
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = SchemaCommand::<AddUser>::new("user-admin")?;
    let user = command.parse();

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Adding user {} with role {:?} (blocked: {})",
        user.name, user.role, user.blocked
    )?;
    for group in &user.groups {
        writeln!(stdout, "  joins group {group}")?;
    }
    for (resource, limit) in &user.quota {
        writeln!(stdout, "  quota {resource} = {limit}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, ensure};

    #[test]
    fn parses_a_full_invocation() -> Result<()> {
        let command = SchemaCommand::<AddUser>::new("user-admin")?;
        let user = command.try_parse_from([
            "user-admin",
            "--name",
            "Pancake",
            "--role",
            "admin",
            "--no-blocked",
            "--groups",
            "ops",
            "--quota",
            "jobs",
            "10",
        ])?;
        ensure!(user.role == Role::Admin, "expected admin, got {:?}", user.role);
        ensure!(!user.blocked, "expected unblocked");
        ensure!(user.groups == vec![String::from("ops")]);
        ensure!(user.quota.get("jobs") == Some(&10));
        Ok(())
    }
}

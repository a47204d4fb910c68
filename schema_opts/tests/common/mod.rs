//! Shared fixtures for integration tests.

use schema_opts::{ChoiceSpec, FieldSpec, FieldType, ModelSchema, OptSchema, SchemaCommand};
use serde::Deserialize;
use serde_json::json;

/// The canonical three-field schema: a required string, a defaulted
/// choice, and a defaulted flag.
#[derive(Debug, Deserialize, PartialEq)]
pub struct AddUser {
    pub name: String,
    pub role: Role,
    pub blocked: bool,
}

/// Access level for [`AddUser`].
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Plain,
    Admin,
}

impl OptSchema for AddUser {
    fn model() -> ModelSchema {
        ModelSchema::new(vec![
            FieldSpec::new("name", FieldType::Str).describe("Account name"),
            FieldSpec::new("role", FieldType::Choice(ChoiceSpec::new(["plain", "admin"])))
                .with_default(json!("plain"))
                .describe("Access level"),
            FieldSpec::new("blocked", FieldType::Bool)
                .with_default(json!(true))
                .describe("Whether sign-in is blocked"),
        ])
    }
}

/// Build the derived command for [`AddUser`].
pub fn add_user_command() -> anyhow::Result<SchemaCommand<AddUser>> {
    Ok(SchemaCommand::<AddUser>::new("add-user")?)
}

//! DDL templates for the release control table.
//!
//! One template per dialect is embedded via `include_str!`; a project may
//! point `branching.ddl_template` at its own file instead. Templates use
//! `${schema_name}`, `${table_name}` and `${default_release}` placeholders,
//! replaced literally.

use crate::error::{BranchError, BranchResult};
use bw_core::DbType;
use std::path::Path;

pub const SCHEMA_NAME: &str = "schema_name";
pub const TABLE_NAME: &str = "table_name";
pub const DEFAULT_RELEASE: &str = "default_release";

const DUCKDB_TEMPLATE: &str = include_str!("duckdb_release_table.sql");
const SQLITE_TEMPLATE: &str = include_str!("sqlite_release_table.sql");

/// Embedded template for a dialect
pub fn embedded_template(dialect: DbType) -> &'static str {
    match dialect {
        DbType::DuckDb => DUCKDB_TEMPLATE,
        DbType::Sqlite => SQLITE_TEMPLATE,
    }
}

/// Read an external template file
pub fn load_template(path: &Path) -> BranchResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        BranchError::Configuration(format!(
            "cannot read DDL template {}: {e}",
            path.display()
        ))
    })
}

/// Substitute every `${name}` in `template` with its value.
///
/// A placeholder without a value, or one that is never closed, is an error.
pub fn render(template: &str, values: &[(&str, &str)]) -> BranchResult<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(BranchError::Configuration(format!(
                "unterminated placeholder in DDL template: '{}'",
                rest[start..].lines().next().unwrap_or_default()
            )));
        };

        let name = &after[..end];
        let value = values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| {
                BranchError::Configuration(format!(
                    "unresolved placeholder ${{{name}}} in DDL template"
                ))
            })?;
        rendered.push_str(value);
        rest = &after[end + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod tests;

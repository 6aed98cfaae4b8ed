//! Migrator configuration

use crate::error::ConstructionError;
use crate::reporter::Reporter;

/// Name of the tracker table when none is configured
pub const DEFAULT_TABLE_NAME: &str = "migrations";

/// Characters allowed in the tracker table name
const ALLOWED_IDENTIFIER_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// Keywords that cannot be used as a bare table name
static SQL_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "JOIN", "UNION", "DROP", "CREATE",
    "ALTER", "TABLE", "INDEX", "GRANT", "REVOKE", "TRUNCATE", "ORDER", "GROUP", "USER",
];

/// Configuration for a [`Migrator`](crate::Migrator)
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Table used to record applied migration ids
    pub table_name: String,
    /// Where progress lines are sent
    pub reporter: Reporter,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            reporter: Reporter::default(),
        }
    }
}

impl MigratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Check that the table name can be spliced into SQL unquoted
    pub fn validate(&self) -> Result<(), ConstructionError> {
        validate_table_name(&self.table_name)
    }
}

pub(crate) fn validate_table_name(name: &str) -> Result<(), ConstructionError> {
    let invalid = |reason: String| ConstructionError::InvalidTableName {
        name: name.to_string(),
        reason,
    };

    let Some(first) = name.chars().next() else {
        return Err(invalid("name cannot be empty".to_string()));
    };

    // PostgreSQL truncates identifiers past 63 bytes
    if name.len() > 63 {
        return Err(invalid("name is longer than 63 characters".to_string()));
    }

    if let Some(c) = name.chars().find(|c| !ALLOWED_IDENTIFIER_CHARS.contains(*c)) {
        return Err(invalid(format!("contains invalid character '{}'", c)));
    }

    if first.is_ascii_digit() {
        return Err(invalid("name cannot start with a number".to_string()));
    }

    if SQL_KEYWORDS.contains(&name.to_uppercase().as_str()) {
        return Err(invalid("name is a reserved SQL keyword".to_string()));
    }

    Ok(())
}

//! SQL dialect hint
//!
//! The migrator talks to the database through the sqlx `Any` driver, so the
//! SQL it issues for bookkeeping has to be shaped for the backend on the other
//! end. The dialect decides the bind placeholder style and the column type of
//! the tracker's id.

use std::fmt;
use std::str::FromStr;

/// Database dialects the tracker knows how to address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Bind placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
        }
    }

    /// Column type used for the tracker's primary key
    pub fn id_column_type(&self) -> &'static str {
        match self {
            // MySQL cannot index an unbounded TEXT column
            Dialect::MySql => "VARCHAR(255)",
            Dialect::Postgres | Dialect::Sqlite => "TEXT",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a dialect name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sql dialect: {0}")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgx" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(1), "$1");
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::Sqlite.placeholder(2), "?");
        assert_eq!(Dialect::MySql.placeholder(1), "?");
    }

    #[test]
    fn test_parse_driver_names() {
        assert_eq!("sqlite3".parse::<Dialect>(), Ok(Dialect::Sqlite));
        assert_eq!("Postgres".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("pgx".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!(" mysql ".parse::<Dialect>(), Ok(Dialect::MySql));
        assert_eq!(
            "oracle".parse::<Dialect>(),
            Err(UnknownDialect("oracle".to_string()))
        );
    }

    #[test]
    fn test_id_column_type() {
        assert_eq!(Dialect::MySql.id_column_type(), "VARCHAR(255)");
        assert_eq!(Dialect::Sqlite.id_column_type(), "TEXT");
    }
}

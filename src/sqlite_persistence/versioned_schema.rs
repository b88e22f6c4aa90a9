use anyhow::{bail, Result};
use rusqlite::{params, Connection};

/// Offset added to schema versions stored in `PRAGMA user_version`, so that
/// databases created by other writers (version 0) are told apart from ours.
pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }

    /// Maps a declared column type to its SQLite affinity.
    fn from_declared(declared: &str) -> Option<Self> {
        let declared = declared.to_ascii_uppercase();
        if declared.contains("INT") {
            Some(SqlType::Integer)
        } else if declared.contains("CHAR") || declared.contains("TEXT") {
            Some(SqlType::Text)
        } else if declared.contains("REAL")
            || declared.contains("FLOA")
            || declared.contains("DOUB")
        {
            Some(SqlType::Real)
        } else {
            None
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
                if column.is_primary_key {
                    sql.push_str(" PRIMARY KEY");
                }
                if column.non_null {
                    sql.push_str(" NOT NULL");
                }
                sql
            })
            .collect();
        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, columns.join(", ")),
            params![],
        )?;
        Ok(())
    }

    pub fn exists(&self, conn: &Connection) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            params![self.name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Checks that every expected column is present with a compatible type.
    /// Extra columns are tolerated, since the table may be shared with
    /// other writers.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual: Vec<(String, String)> = stmt
            .query_map(params![], |row| Ok((row.get(1)?, row.get(2)?)))?
            .collect::<Result<_, _>>()?;

        if actual.is_empty() {
            bail!("Table {} does not exist", self.name);
        }

        for expected in self.columns {
            let Some((_, declared)) = actual.iter().find(|(name, _)| name == expected.name)
            else {
                bail!("Table {} is missing column {}", self.name, expected.name);
            };
            match SqlType::from_declared(declared) {
                Some(sql_type) if sql_type == *expected.sql_type => {}
                _ => bail!(
                    "Table {} Column {} type mismatch: expected {:?}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    declared
                ),
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        self.stamp(conn)
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }

    /// Records this schema's version in the database header.
    pub fn stamp(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }
}

/// Reads the schema version stored by [`VersionedSchema::stamp`].
/// Returns `None` for databases never stamped by this crate.
pub fn read_schema_version(conn: &Connection) -> Result<Option<usize>> {
    let raw: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if raw == 0 {
        return Ok(None);
    }
    let version = raw - BASE_DB_VERSION as i64;
    if version < 1 {
        bail!("Database version {} is invalid (expected >= 1)", version);
    }
    Ok(Some(version as usize))
}

//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!

/// Migration metadata
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// Which database a migration set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationSet {
    Staging,
    Warehouse,
}

impl MigrationSet {
    /// All embedded migrations of this set, in order
    pub fn migrations(&self) -> Vec<Migration> {
        match self {
            MigrationSet::Staging => vec![Migration {
                id: "001_staging_rows",
                sql: include_str!("../../migrations/staging/001_staging_rows.sql"),
            }],
            MigrationSet::Warehouse => vec![Migration {
                id: "001_warehouse_schema",
                sql: include_str!("../../migrations/warehouse/001_warehouse_schema.sql"),
            }],
        }
    }
}

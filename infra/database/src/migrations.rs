use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

/// A versioned `SurrealQL` script owned by a feature slice.
///
/// Slices expose their migrations as constants, usually with `include_str!`:
///
/// ```rust,ignore
/// pub const MIGRATIONS: &[Migration] =
///     &[Migration::new("shipments", "0001_init", include_str!("../migrations/0001_init.surql"))];
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    /// Hex SHA-256 of the script with line endings normalised.
    #[must_use]
    pub fn checksum(&self) -> String {
        let normalized = self.script.replace("\r\n", "\n");
        hex::encode(Sha256::digest(normalized.trim().as_bytes()))
    }

    fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }
}

/// Outcome of a migration run, as `slice:version` keys.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AppliedMigration {
    slice: String,
    version: String,
    checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    /// Applies every migration not yet recorded, in the given order.
    pub(crate) async fn run(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        let recorded = self.recorded().await?;
        let mut report = MigrationReport::default();

        for migration in migrations {
            let checksum = migration.checksum();
            match recorded.get(&migration.key()) {
                Some(existing) if *existing == checksum => report.skipped.push(migration.key()),
                Some(existing) => {
                    return Err(DatabaseError::Migration {
                        message: format!(
                            "{} was applied with checksum {existing}, script now hashes to {checksum}",
                            migration.key()
                        )
                        .into(),
                        context: Some("Applied migrations must not be edited".into()),
                    });
                }
                None => {
                    self.apply(migration, &checksum).await?;
                    report.applied.push(migration.key());
                }
            }
        }

        Ok(report)
    }

    async fn apply(&self, migration: &Migration, checksum: &str) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE type::thing('migration', [$slice, $version]) CONTENT {{
                slice: $slice,
                version: $version,
                checksum: $checksum,
                applied_at: time::now()
            }};
            COMMIT TRANSACTION;",
            migration.script
        );

        self.db
            .query(query)
            .bind(("slice", migration.slice))
            .bind(("version", migration.version))
            .bind(("checksum", checksum.to_owned()))
            .await
            .and_then(surrealdb::Response::check)
            .context(format!("Applying migration {}", migration.key()))?;
        Ok(())
    }

    async fn recorded(&self) -> Result<FxHashMap<String, String>, DatabaseError> {
        let entries: Vec<AppliedMigration> = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take(0)
            .context("Parsing applied migrations")?;

        Ok(entries
            .into_iter()
            .map(|m| (format!("{}:{}", m.slice, m.version), m.checksum))
            .collect())
    }
}

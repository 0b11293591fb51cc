//! # Database
//!
//! Connection management for the shipment document store ([SurrealDB](https://surrealdb.com)).
//!
//! * `mem://`, `rocksdb://`, `ws://` and `http://` endpoints through the `any` engine.
//! * Health checks with exponential back-off while the engine starts.
//! * Versioned, checksummed migrations contributed by the feature slices.
//!
//! ```rust
//! use tport_database::{Database, DatabaseError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), DatabaseError> {
//! let db = Database::builder().url("mem://").session("tport", "core").init().await?;
//! db.health().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use migrations::{Migration, MigrationReport};

use migrations::MigrationRunner;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{debug, info, instrument, warn};

const HEALTH_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug)]
struct DatabaseInner {
    instance: Surreal<Any>,
    namespace: String,
    database: String,
}

/// Shared handle to an established session. Derefs to the `SurrealDB` client.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.database
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    namespace: Option<String>,
    database: Option<String>,
    credentials: Option<(String, String)>,
    migrations: Vec<Migration>,
}

impl DatabaseBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self.database = Some(database.into());
        self
    }

    /// Root credentials for remote engines.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Appends migrations; they run in the order they were added.
    pub fn migrations(mut self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    /// Connects, waits for the engine to report healthy, signs in, selects the session and
    /// applies pending migrations.
    ///
    /// # Errors
    ///
    /// * [`DatabaseError::Validation`] when the URL or session is missing.
    /// * [`DatabaseError::Connection`] when the engine cannot start or stays unhealthy.
    /// * [`DatabaseError::Auth`] when the root credentials are rejected.
    /// * [`DatabaseError::Migration`] / [`DatabaseError::Surreal`] when migrating fails.
    #[instrument(skip_all, fields(url = self.url, ns = self.namespace, db = self.database))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let (Some(url), Some(namespace), Some(database)) = (self.url, self.namespace, self.database)
        else {
            return Err(DatabaseError::Validation {
                message: "url, namespace and database are required".into(),
                context: None,
            });
        };

        let instance = connect(url.as_str()).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Starting engine".into()),
        })?;

        wait_until_healthy(&instance, &url).await?;

        if let Some((username, password)) = self.credentials {
            instance
                .signin(Root { username: &username, password: &password })
                .await
                .map_err(|e| DatabaseError::Auth {
                    message: e.to_string().into(),
                    context: Some(url.clone().into()),
                })?;
        }

        instance.use_ns(&namespace).use_db(&database).await.context("Selecting session")?;

        let version = instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(%namespace, %database, %version, "SurrealDB connection established");

        let report = MigrationRunner::new(&instance).run(&self.migrations).await?;
        for key in &report.skipped {
            debug!(migration = %key, "Migration already applied");
        }
        for key in &report.applied {
            info!(migration = %key, "Migration applied");
        }

        Ok(Database { inner: Arc::new(DatabaseInner { instance, namespace, database }) })
    }
}

async fn wait_until_healthy(instance: &Surreal<Any>, url: &str) -> Result<(), DatabaseError> {
    let mut delay = INITIAL_BACKOFF;
    for attempt in 1..=HEALTH_ATTEMPTS {
        match instance.health().await {
            Ok(()) => return Ok(()),
            Err(err) if attempt == HEALTH_ATTEMPTS => {
                return Err(DatabaseError::Connection {
                    message: err.to_string().into(),
                    context: Some(format!("{url} unhealthy after {HEALTH_ATTEMPTS} attempts").into()),
                });
            }
            Err(err) => {
                warn!(attempt, ?delay, error = %err, "Database not ready, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
    Ok(())
}

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fmt, fs, io};

use log::info;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension};

use crate::error::StockError;
use crate::schema::{CREATE_SCHEMA_SQL, SCHEMA_VERSION};

pub const DB_FILENAME: &str = "phonestock.db";

pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Handle to the pooled SQLite database.
///
/// Cloning is cheap and shares the underlying pool. A connection is acquired
/// per operation with [`Database::get_connection`] and goes back to the pool
/// when the guard is dropped, whichever way the caller exits.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("pool", &self.pool.state())
            .finish()
    }
}

impl Database {
    /// Opens (creating if needed) `phonestock.db` inside `db_dir`.
    pub fn open_in(db_dir: &Path, pool_size: u32) -> Result<Self, StockError> {
        if !db_dir.exists() {
            fs::create_dir_all(db_dir)?;
        }

        if !db_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!(
                    "Database folder '{}' is not a directory",
                    db_dir.display()
                ),
            )
            .into());
        }

        Self::open(&db_dir.join(DB_FILENAME), pool_size)
    }

    pub fn open(db_path: &Path, pool_size: u32) -> Result<Self, StockError> {
        let manager = SqliteConnectionManager::file(db_path)
            .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));

        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_timeout(Duration::from_secs(10))
            .build(manager)?;

        let db = Database {
            pool,
            path: db_path.to_owned(),
        };

        let conn = db.get_connection()?;
        Self::ensure_schema(&conn)?;

        info!("Database opened at: {}", db_path.display());

        Ok(db)
    }

    pub fn get_connection(&self) -> Result<PooledConn, StockError> {
        Ok(self.pool.get()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_schema_version(&self) -> Result<String, StockError> {
        let conn = self.get_connection()?;
        Self::stored_schema_version(&conn)?
            .ok_or_else(|| StockError::Error("Schema version missing".to_string()))
    }

    fn stored_schema_version(conn: &Connection) -> Result<Option<String>, StockError> {
        let version = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(version)
    }

    fn ensure_schema(conn: &Connection) -> Result<(), StockError> {
        let table_exists: bool = conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get::<_, i32>(0),
        )? > 0;

        if !table_exists {
            info!("Creating database schema version {}", SCHEMA_VERSION);
            conn.execute_batch(CREATE_SCHEMA_SQL)?;
            return Ok(());
        }

        match Self::stored_schema_version(conn)?.as_deref() {
            Some(SCHEMA_VERSION) => Ok(()), // Schema is up to date
            Some(other) => Err(StockError::Error(format!(
                "Schema version mismatch: database is version {}, expected {}",
                other, SCHEMA_VERSION
            ))),
            None => Err(StockError::Error("Schema version missing".to_string())),
        }
    }
}

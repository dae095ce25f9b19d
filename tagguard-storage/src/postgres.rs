//! PostgreSQL-backed binding store.
//!
//! The tag uniqueness constraint lives in the database (`UNIQUE (tag)`),
//! so two concurrent registrations racing for one tag resolve to exactly
//! one winner even across process instances sharing the pool's database.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};

use tagguard_core::{AccountId, IdentityBinding, IdentityTag, StoreError, StoreResult};

use crate::store::{BindingStore, CreateOutcome, DeleteOutcome, UpdateOutcome};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "tagguard".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("TAGGUARD_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TAGGUARD_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("TAGGUARD_DB_NAME").unwrap_or_else(|_| "tagguard".to_string()),
            user: std::env::var("TAGGUARD_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("TAGGUARD_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("TAGGUARD_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("TAGGUARD_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> StoreResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| unavailable(format!("failed to create pool: {e}")))
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Table and index bootstrap, applied once at startup by the embedding
/// process via [`PgBindingStore::ensure_schema`].
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS identity_bindings (
    account_id BIGINT PRIMARY KEY,
    tag        TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT identity_bindings_tag_key UNIQUE (tag)
);
CREATE INDEX IF NOT EXISTS identity_bindings_created_idx
    ON identity_bindings (created_at DESC);
"#;

const BINDING_COLUMNS: &str = "account_id, tag, created_at, updated_at";

// ============================================================================
// STORE IMPLEMENTATION
// ============================================================================

/// Binding store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgBindingStore {
    pool: Pool,
}

impl PgBindingStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a store straight from configuration.
    pub fn from_config(config: &DbConfig) -> StoreResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    /// Apply the schema bootstrap. Idempotent.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let client = self.client().await?;
        client.batch_execute(SCHEMA).await.map_err(unavailable)
    }

    /// Current pool status, for health reporting.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    async fn client(&self) -> StoreResult<deadpool_postgres::Client> {
        self.pool.get().await.map_err(unavailable)
    }
}

fn unavailable(e: impl Display) -> StoreError {
    StoreError::Unavailable {
        reason: e.to_string(),
    }
}

/// Constraint name when `e` is a unique violation, else `None`.
fn unique_violation(e: &tokio_postgres::Error) -> Option<String> {
    let db = e.as_db_error()?;
    if db.code() == &SqlState::UNIQUE_VIOLATION {
        Some(db.constraint().unwrap_or_default().to_string())
    } else {
        None
    }
}

fn row_to_binding(row: &Row) -> StoreResult<IdentityBinding> {
    let raw_tag: String = row.get("tag");
    let tag = IdentityTag::parse(&raw_tag)
        .map_err(|_| unavailable(format!("malformed tag in store: {raw_tag:?}")))?;
    Ok(IdentityBinding {
        account_id: AccountId::new(row.get("account_id")),
        tag,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl BindingStore for PgBindingStore {
    async fn create_if_absent(
        &self,
        account_id: AccountId,
        tag: IdentityTag,
    ) -> StoreResult<CreateOutcome> {
        let client = self.client().await?;
        let stmt = format!(
            "INSERT INTO identity_bindings (account_id, tag) VALUES ($1, $2) \
             RETURNING {BINDING_COLUMNS}"
        );
        match client
            .query_one(stmt.as_str(), &[&account_id.as_i64(), &tag.as_str()])
            .await
        {
            Ok(row) => Ok(CreateOutcome::Created(row_to_binding(&row)?)),
            Err(e) => match unique_violation(&e) {
                Some(constraint) if constraint == "identity_bindings_tag_key" => {
                    Ok(CreateOutcome::TagTaken)
                }
                Some(_) => Ok(CreateOutcome::AccountExists),
                None => Err(unavailable(e)),
            },
        }
    }

    async fn update_tag(
        &self,
        account_id: AccountId,
        new_tag: IdentityTag,
    ) -> StoreResult<UpdateOutcome> {
        let client = self.client().await?;
        let stmt = format!(
            "UPDATE identity_bindings SET tag = $2, updated_at = now() \
             WHERE account_id = $1 RETURNING {BINDING_COLUMNS}"
        );
        match client
            .query_opt(stmt.as_str(), &[&account_id.as_i64(), &new_tag.as_str()])
            .await
        {
            Ok(Some(row)) => Ok(UpdateOutcome::Updated(row_to_binding(&row)?)),
            Ok(None) => Ok(UpdateOutcome::NotFound),
            Err(e) if unique_violation(&e).is_some() => Ok(UpdateOutcome::TagTaken),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn delete(&self, account_id: AccountId) -> StoreResult<DeleteOutcome> {
        let client = self.client().await?;
        let rows = client
            .execute(
                "DELETE FROM identity_bindings WHERE account_id = $1",
                &[&account_id.as_i64()],
            )
            .await
            .map_err(unavailable)?;
        Ok(if rows > 0 {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        })
    }

    async fn get_by_account(
        &self,
        account_id: AccountId,
    ) -> StoreResult<Option<IdentityBinding>> {
        let client = self.client().await?;
        let stmt = format!(
            "SELECT {BINDING_COLUMNS} FROM identity_bindings WHERE account_id = $1"
        );
        let row = client
            .query_opt(stmt.as_str(), &[&account_id.as_i64()])
            .await
            .map_err(unavailable)?;
        row.as_ref().map(row_to_binding).transpose()
    }

    async fn get_by_tag(&self, tag: &IdentityTag) -> StoreResult<Option<IdentityBinding>> {
        let client = self.client().await?;
        let stmt = format!("SELECT {BINDING_COLUMNS} FROM identity_bindings WHERE tag = $1");
        let row = client
            .query_opt(stmt.as_str(), &[&tag.as_str()])
            .await
            .map_err(unavailable)?;
        row.as_ref().map(row_to_binding).transpose()
    }

    async fn exists_by_tag(&self, tag: &IdentityTag) -> StoreResult<bool> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM identity_bindings WHERE tag = $1)",
                &[&tag.as_str()],
            )
            .await
            .map_err(unavailable)?;
        Ok(row.get(0))
    }

    async fn list_ordered_by_creation(
        &self,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<IdentityBinding>> {
        let client = self.client().await?;
        let stmt = format!(
            "SELECT {BINDING_COLUMNS} FROM identity_bindings \
             ORDER BY created_at DESC, account_id DESC LIMIT $1 OFFSET $2"
        );
        let rows = client
            .query(stmt.as_str(), &[&(limit as i64), &(offset as i64)])
            .await
            .map_err(unavailable)?;
        rows.iter().map(row_to_binding).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

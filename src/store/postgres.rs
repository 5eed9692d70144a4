use super::{StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use sqlx::{postgres::PgDatabaseError, PgPool, Row};
use tracing::{info_span, Instrument};

// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed credential store.
///
/// The primary key on `users.id` is the uniqueness source of truth; a
/// duplicate insert surfaces as [`StoreError::AlreadyExists`] straight from
/// the constraint, so concurrent creates of one id cannot race.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL cannot be executed.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let query = "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            profile JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )";

        sqlx::query(query).execute(&self.pool).await?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &UserRecord) -> Result<(), StoreError> {
        let query = "INSERT INTO users (id, password_hash, profile) VALUES ($1, $2, $3)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        let result = sqlx::query(query)
            .bind(&user.id)
            .bind(&user.password_hash)
            .bind(&user.profile)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err
                    .as_error()
                    .downcast_ref::<PgDatabaseError>()
                    .map(PgDatabaseError::code)
                    == Some(UNIQUE_VIOLATION) =>
            {
                Err(StoreError::AlreadyExists(user.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: &str) -> Result<UserRecord, StoreError> {
        let query = "SELECT password_hash, profile FROM users WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        let Some(row) = row else {
            return Err(StoreError::NotFound(id.to_string()));
        };

        Ok(UserRecord {
            id: id.to_string(),
            password_hash: row.try_get("password_hash")?,
            profile: row.try_get("profile")?,
        })
    }
}

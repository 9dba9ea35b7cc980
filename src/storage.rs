use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::users::repo_types::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("login '{0}' already exists")]
    DuplicateLogin(String),
    #[error("user {0} not found")]
    NotFound(i64),
    #[error("value rejected by the database: {0}")]
    InvalidData(String),
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Persistence contract for user records. Every call is a single round-trip, no retries.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, login: &str, password: &str) -> Result<User, StoreError>;
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<User, StoreError>;
    async fn update(&self, id: i64, login: &str, password: &str) -> Result<User, StoreError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;
}

/// Postgres-backed store. Each statement checks a connection out of the pool
/// and hands it back when the borrow ends, error paths included.
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn classify(err: sqlx::Error, login: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateLogin(login.to_string());
        }
        // SQLSTATE class 22: data exception, e.g. NUL bytes in text
        if db_err.code().is_some_and(|code| code.starts_with("22")) {
            return StoreError::InvalidData(db_err.message().to_string());
        }
    }
    StoreError::Backend(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, login: &str, password: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password)
            VALUES ($1, $2)
            RETURNING id, login, password
            "#,
        )
        .bind(login)
        .bind(password)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, login))?;
        debug!(user_id = user.id, "user row inserted");
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, login: &str, password: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET login = $2, password = $3
            WHERE id = $1
            RETURNING id, login, password
            "#,
        )
        .bind(id)
        .bind(login)
        .bind(password)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| classify(e, login))?
        .ok_or(StoreError::NotFound(id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryUserStore;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::debug;

use crate::auth::repo_types::{LoginRecord, NewAccount, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email already registered")]
    Duplicate,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

fn map_unique(e: sqlx::Error) -> RepoError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => RepoError::Duplicate,
        _ => RepoError::Database(e),
    }
}

/// Access to the `login` and `users` tables.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the login row and the user row atomically.
    async fn create_account(&self, account: NewAccount) -> Result<UserRecord, RepoError>;

    async fn find_password_hash(&self, email: &str) -> Result<Option<String>, RepoError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    /// Adds one to `entries` and returns the new value, or `None` for an unknown id.
    async fn increment_entries(&self, user_id: i64) -> Result<Option<i64>, RepoError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn insert_login_tx(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password_hash: &str,
) -> Result<String, RepoError> {
    let email: String = sqlx::query_scalar(
        r#"
        INSERT INTO login (email, password_hash)
        VALUES ($1, $2)
        RETURNING email
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut **tx)
    .await
    .map_err(map_unique)?;
    Ok(email)
}

async fn insert_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    email: &str,
    joined: time::OffsetDateTime,
) -> Result<UserRecord, RepoError> {
    let user = sqlx::query_as::<_, UserRecord>(
        r#"
        INSERT INTO users (name, email, joined)
        VALUES ($1, $2, $3)
        RETURNING id, name, email, entries, joined
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(joined)
    .fetch_one(&mut **tx)
    .await
    .map_err(map_unique)?;
    Ok(user)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_account(&self, account: NewAccount) -> Result<UserRecord, RepoError> {
        let mut tx = self.db.begin().await?;

        let inserted = async {
            let email = insert_login_tx(&mut tx, &account.email, &account.password_hash).await?;
            insert_user_tx(&mut tx, &account.name, &email, account.joined).await
        }
        .await;

        match inserted {
            Ok(user) => {
                tx.commit().await?;
                debug!(user_id = user.id, "account created");
                Ok(user)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    async fn find_password_hash(&self, email: &str) -> Result<Option<String>, RepoError> {
        let login = sqlx::query_as::<_, LoginRecord>(
            r#"
            SELECT email, password_hash
            FROM login
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(login.map(|l| l.password_hash))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, entries, joined
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn increment_entries(&self, user_id: i64) -> Result<Option<i64>, RepoError> {
        let entries: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
               SET entries = entries + 1
             WHERE id = $1
            RETURNING entries
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(entries)
    }
}

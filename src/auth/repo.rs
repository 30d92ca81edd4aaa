use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, created_at";

/// `email` is expected lower-cased.
pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Account>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1");
    sqlx::query_as::<_, Account>(&sql)
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find account by email")
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Account>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, Account>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find account by id")
}

/// Returns `None` when the email is already registered.
pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> anyhow::Result<Option<Account>> {
    let sql = format!(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        ON CONFLICT (email) DO NOTHING
        RETURNING {ACCOUNT_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Account>(&sql)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(db)
        .await
        .context("insert account")
}

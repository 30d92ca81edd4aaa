use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

/// Outcome of touching a session on an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    /// Idle past the timeout; the session has been revoked.
    Expired,
    /// Unknown, revoked, or owned by another user.
    Invalid,
}

/// Server-side session bookkeeping behind every issued token pair.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user_id: Uuid) -> anyhow::Result<Uuid>;
    /// Marks the session as used now, unless it has been idle for longer than `idle`.
    async fn touch(&self, session_id: Uuid, user_id: Uuid, idle: Duration)
        -> anyhow::Result<SessionStatus>;
    async fn revoke(&self, session_id: Uuid) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, user_id: Uuid) -> anyhow::Result<Uuid> {
        let (id,): (Uuid,) =
            sqlx::query_as(r#"INSERT INTO sessions (user_id) VALUES ($1) RETURNING id"#)
                .bind(user_id)
                .fetch_one(&self.db)
                .await
                .context("insert session")?;
        Ok(id)
    }

    async fn touch(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        idle: Duration,
    ) -> anyhow::Result<SessionStatus> {
        let now = OffsetDateTime::now_utc();
        let row: Option<(OffsetDateTime, Option<OffsetDateTime>)> = sqlx::query_as(
            r#"
            SELECT last_seen_at, revoked_at
              FROM sessions
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("load session")?;

        let Some((last_seen_at, revoked_at)) = row else {
            return Ok(SessionStatus::Invalid);
        };
        if revoked_at.is_some() {
            return Ok(SessionStatus::Invalid);
        }
        if now - last_seen_at > idle {
            debug!(%session_id, "session idle timeout");
            self.revoke(session_id).await?;
            return Ok(SessionStatus::Expired);
        }

        sqlx::query(r#"UPDATE sessions SET last_seen_at = $2 WHERE id = $1"#)
            .bind(session_id)
            .bind(now)
            .execute(&self.db)
            .await
            .context("touch session")?;
        Ok(SessionStatus::Active)
    }

    async fn revoke(&self, session_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE sessions SET revoked_at = now() WHERE id = $1 AND revoked_at IS NULL"#,
        )
        .bind(session_id)
        .execute(&self.db)
        .await
        .context("revoke session")?;
        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    struct Entry {
        user_id: Uuid,
        last_seen_at: OffsetDateTime,
        revoked: bool,
    }

    /// In-process store used by router tests.
    #[derive(Default)]
    pub struct MemorySessionStore {
        inner: Mutex<HashMap<Uuid, Entry>>,
    }

    impl MemorySessionStore {
        pub async fn backdate(&self, session_id: Uuid, by: Duration) {
            if let Some(entry) = self.inner.lock().await.get_mut(&session_id) {
                entry.last_seen_at -= by;
            }
        }
    }

    #[async_trait]
    impl SessionStore for MemorySessionStore {
        async fn create(&self, user_id: Uuid) -> anyhow::Result<Uuid> {
            let id = Uuid::new_v4();
            self.inner.lock().await.insert(
                id,
                Entry {
                    user_id,
                    last_seen_at: OffsetDateTime::now_utc(),
                    revoked: false,
                },
            );
            Ok(id)
        }

        async fn touch(
            &self,
            session_id: Uuid,
            user_id: Uuid,
            idle: Duration,
        ) -> anyhow::Result<SessionStatus> {
            let mut guard = self.inner.lock().await;
            let Some(entry) = guard.get_mut(&session_id) else {
                return Ok(SessionStatus::Invalid);
            };
            if entry.revoked || entry.user_id != user_id {
                return Ok(SessionStatus::Invalid);
            }
            let now = OffsetDateTime::now_utc();
            if now - entry.last_seen_at > idle {
                entry.revoked = true;
                return Ok(SessionStatus::Expired);
            }
            entry.last_seen_at = now;
            Ok(SessionStatus::Active)
        }

        async fn revoke(&self, session_id: Uuid) -> anyhow::Result<()> {
            if let Some(entry) = self.inner.lock().await.get_mut(&session_id) {
                entry.revoked = true;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn idle_session_expires_and_stays_revoked() {
        let store = MemorySessionStore::default();
        let user = Uuid::new_v4();
        let sid = store.create(user).await.unwrap();
        let idle = Duration::minutes(30);

        assert_eq!(store.touch(sid, user, idle).await.unwrap(), SessionStatus::Active);
        store.backdate(sid, Duration::minutes(31)).await;
        assert_eq!(store.touch(sid, user, idle).await.unwrap(), SessionStatus::Expired);
        assert_eq!(store.touch(sid, user, idle).await.unwrap(), SessionStatus::Invalid);
    }

    #[tokio::test]
    async fn session_is_bound_to_its_user() {
        let store = MemorySessionStore::default();
        let sid = store.create(Uuid::new_v4()).await.unwrap();
        let status = store
            .touch(sid, Uuid::new_v4(), Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(status, SessionStatus::Invalid);
    }
}

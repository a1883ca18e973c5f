use sqlx::PgPool;
use thiserror::Error;

use crate::auth::Claims;
use crate::database::models::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User resolution failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves external identities to local user records.
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the user for an external identity, creating it on first sight.
    /// A single upsert keyed on the identity provider's user id; profile
    /// fields are refreshed from the current session claims.
    pub async fn resolve_or_create(&self, claims: &Claims) -> Result<User, UserError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (provider_id, email, name, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (provider_id) DO UPDATE
                SET email = COALESCE(EXCLUDED.email, users.email),
                    name = COALESCE(EXCLUDED.name, users.name),
                    avatar_url = COALESCE(EXCLUDED.avatar_url, users.avatar_url),
                    updated_at = now()
            RETURNING id, provider_id, email, name, avatar_url, created_at, updated_at
            "#,
        )
        .bind(&claims.sub)
        .bind(&claims.email)
        .bind(&claims.name)
        .bind(&claims.avatar_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

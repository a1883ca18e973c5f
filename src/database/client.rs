use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use crate::auth::Claims;

#[derive(Debug, Error)]
pub enum DataClientError {
    #[error("Failed to encode session claims: {0}")]
    ClaimsEncoding(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A database client scoped to one of three roles.
///
/// `Admin` runs directly on the service-role pool and bypasses row-level
/// authorization; callers using it must filter by user id themselves.
/// `Anonymous` assumes the `anon` role, and `UserScoped` assumes the
/// `authenticated` role while publishing the session claims through
/// `request.jwt.claims`, so row-level policies in the database do the
/// per-user filtering for both.
#[derive(Clone)]
pub enum DataClient {
    Admin(PgPool),
    Anonymous(PgPool),
    UserScoped { pool: PgPool, claims: Claims },
}

impl DataClient {
    pub fn admin(pool: PgPool) -> Self {
        DataClient::Admin(pool)
    }

    pub fn anonymous(pool: PgPool) -> Self {
        DataClient::Anonymous(pool)
    }

    pub fn user_scoped(pool: PgPool, claims: Claims) -> Self {
        DataClient::UserScoped { pool, claims }
    }

    pub fn is_user_scoped(&self) -> bool {
        matches!(self, DataClient::UserScoped { .. })
    }

    /// Identity-provider subject the client is scoped to, if any.
    pub fn subject(&self) -> Option<&str> {
        match self {
            DataClient::UserScoped { claims, .. } => Some(&claims.sub),
            _ => None,
        }
    }

    pub fn pool(&self) -> &PgPool {
        match self {
            DataClient::Admin(pool) => pool,
            DataClient::Anonymous(pool) => pool,
            DataClient::UserScoped { pool, .. } => pool,
        }
    }

    /// Begin a transaction with the client's authorization context applied.
    /// Queries run on the returned transaction are subject to row-level
    /// policies for the anonymous and user-scoped variants.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DataClientError> {
        match self {
            DataClient::Admin(pool) => Ok(pool.begin().await?),
            DataClient::Anonymous(pool) => {
                let mut tx = pool.begin().await?;
                sqlx::query("SET LOCAL ROLE anon").execute(&mut *tx).await?;
                Ok(tx)
            }
            DataClient::UserScoped { pool, claims } => {
                let claims_json = serde_json::to_string(claims)
                    .map_err(|e| DataClientError::ClaimsEncoding(e.to_string()))?;

                let mut tx = pool.begin().await?;
                sqlx::query("SET LOCAL ROLE authenticated")
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("SELECT set_config('request.jwt.claims', $1, true)")
                    .bind(claims_json)
                    .execute(&mut *tx)
                    .await?;
                Ok(tx)
            }
        }
    }
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataClient::Admin(_) => f.write_str("DataClient::Admin"),
            DataClient::Anonymous(_) => f.write_str("DataClient::Anonymous"),
            DataClient::UserScoped { claims, .. } => f
                .debug_struct("DataClient::UserScoped")
                .field("sub", &claims.sub)
                .finish(),
        }
    }
}

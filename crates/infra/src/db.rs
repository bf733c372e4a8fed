//! Postgres pool lifecycle.
//!
//! The pool is built once at start-up and handed to whatever needs it; there
//! is no process-wide handle.

use std::str::FromStr;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub connection_string: String,
    /// Schema every connection resolves unqualified names against.
    pub schema_name: String,
    pub max_connections: u32,
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid schema name '{0}'")]
    InvalidSchema(String),

    #[error("failed to connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),
}

/// Plain identifiers only; the name ends up in a connection option.
fn is_valid_schema(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= 63
}

/// Open a pool whose connections use `settings.schema_name` as `search_path`.
pub async fn connect(settings: &PostgresSettings) -> Result<PgPool, DbError> {
    if !is_valid_schema(&settings.schema_name) {
        return Err(DbError::InvalidSchema(settings.schema_name.clone()));
    }

    let options = PgConnectOptions::from_str(&settings.connection_string)?
        .options([("search_path", settings.schema_name.as_str())]);

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        schema = %settings.schema_name,
        max_connections = settings.max_connections,
        "connected to Postgres"
    );
    Ok(pool)
}

/// Close the pool, waiting for checked-out connections to be returned.
pub async fn disconnect(pool: PgPool) {
    pool.close().await;
    tracing::info!("disconnected from Postgres");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_are_plain_identifiers() {
        for ok in ["public", "carts", "_tmp", "shop_2"] {
            assert!(is_valid_schema(ok), "{ok}");
        }
        for bad in ["", "2shop", "a-b", "a;drop", "with space", &"x".repeat(64)] {
            assert!(!is_valid_schema(bad), "{bad}");
        }
    }

    #[tokio::test]
    async fn connect_rejects_bad_schema_before_dialing() {
        let settings = PostgresSettings {
            connection_string: "postgres://localhost/none".to_string(),
            schema_name: "no;pe".to_string(),
            max_connections: 1,
        };

        let err = connect(&settings).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidSchema(name) if name == "no;pe"));
    }
}

//! PostgreSQL-backed storage.
//!
//! The store is an opaque collaborator from the dispatch core's point of
//! view: a single shared client whose calls run inside worker tasks under a
//! per-call deadline. The client is safe to share across workers; queries
//! are pipelined over one connection whose driver runs as a background task.

pub mod repository;

use anyhow::Context;

use self::repository::StudentRepository;
use super::config::ServerConfig;

/// Idempotent schema bootstrap, applied on startup.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS students (
    id         BIGSERIAL PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    email      TEXT NOT NULL UNIQUE,
    age        INT NOT NULL,
    grade      DOUBLE PRECISION NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_students_email ON students (email);
";

/// Connects to PostgreSQL, spawns the connection driver, and ensures the
/// schema exists.
pub async fn connect(config: &ServerConfig) -> anyhow::Result<StudentRepository> {
    let (client, connection) =
        tokio_postgres::connect(&config.store_dsn(), tokio_postgres::NoTls)
            .await
            .context("failed to connect to PostgreSQL")?;

    // The driver owns the socket; it resolves once the connection closes.
    // After that, every query fails with a closed-connection error, which
    // the error taxonomy classifies as transient.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Database connection error: {e}");
        }
    });

    client
        .batch_execute(SCHEMA)
        .await
        .context("failed to initialize database schema")?;
    tracing::info!("Database schema initialized");

    Ok(StudentRepository::new(client))
}

use anyhow::bail;
use clap::Parser;
use core::time::Duration;

/// Runtime configuration for the `roster-server` binary.
///
/// These settings control the concurrency, backpressure, and deadline
/// behavior of the student records service, plus the PostgreSQL connection.
/// All values are parsed from CLI arguments or environment variables, with
/// defaults suitable for local development.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "roster-server",
    version,
    about = "An HTTP service for student records, backed by a worker pool"
)]
pub struct CliArgs {
    /// Address the HTTP listener binds to.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Number of worker tasks executing store operations concurrently.
    ///
    /// Workers are started once at boot and live for the process lifetime;
    /// the pool is never resized.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = 50)]
    pub num_workers: usize,

    /// Capacity of the dispatch queue between request handlers and workers.
    ///
    /// This is the service's sole admission-control knob: once the queue is
    /// full, handlers wait for a slot instead of growing memory.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 100)]
    pub queue_capacity: usize,

    /// End-to-end deadline, in milliseconds, a handler waits for its result.
    ///
    /// When it elapses the client receives 504; the in-flight store call is
    /// not cancelled and runs to completion unobserved.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_MS`
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 15_000)]
    pub request_timeout_ms: u64,

    /// Per-call deadline, in milliseconds, for a single store operation.
    ///
    /// Must be strictly shorter than `REQUEST_TIMEOUT_MS`, so a slow query
    /// cannot occupy a worker long past the point its client gave up.
    ///
    /// Environment variable: `STORE_TIMEOUT_MS`
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 10_000)]
    pub store_timeout_ms: u64,

    /// PostgreSQL host.
    ///
    /// Environment variable: `DB_HOST`
    #[arg(long, env = "DB_HOST", default_value_t = String::from("localhost"))]
    pub db_host: String,

    /// PostgreSQL port.
    ///
    /// Environment variable: `DB_PORT`
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// PostgreSQL user.
    ///
    /// Environment variable: `DB_USER`
    #[arg(long, env = "DB_USER", default_value_t = String::from("postgres"))]
    pub db_user: String,

    /// PostgreSQL password.
    ///
    /// Environment variable: `DB_PASSWORD`
    #[arg(long, env = "DB_PASSWORD", default_value_t = String::new())]
    pub db_password: String,

    /// Database name. The database must already exist; the schema is
    /// bootstrapped on startup.
    ///
    /// Environment variable: `DB_NAME`
    #[arg(long, env = "DB_NAME", default_value_t = String::from("roster"))]
    pub db_name: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub num_workers: usize,
    pub queue_capacity: usize,
    pub request_timeout: Duration,
    pub store_timeout: Duration,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
}

impl ServerConfig {
    /// Connection string for the PostgreSQL client.
    pub fn store_dsn(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            self.db_host, self.db_port, self.db_user, self.db_password, self.db_name
        )
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.queue_capacity == 0 {
            bail!("QUEUE_CAPACITY must be greater than 0");
        }

        if args.store_timeout_ms >= args.request_timeout_ms {
            bail!(
                "STORE_TIMEOUT_MS ({}) must be strictly shorter than REQUEST_TIMEOUT_MS ({})",
                args.store_timeout_ms,
                args.request_timeout_ms
            );
        }

        Ok(Self {
            server_addr: args.server_addr,
            num_workers: args.num_workers,
            queue_capacity: args.queue_capacity,
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            store_timeout: Duration::from_millis(args.store_timeout_ms),
            db_host: args.db_host,
            db_port: args.db_port,
            db_user: args.db_user,
            db_password: args.db_password,
            db_name: args.db_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            server_addr: "0.0.0.0:8080".into(),
            num_workers: 50,
            queue_capacity: 100,
            request_timeout_ms: 15_000,
            store_timeout_ms: 10_000,
            db_host: "localhost".into(),
            db_port: 5432,
            db_user: "postgres".into(),
            db_password: String::new(),
            db_name: "roster".into(),
        }
    }

    #[test]
    fn defaults_validate() {
        let config = ServerConfig::try_from(args()).expect("defaults are valid");
        assert_eq!(config.num_workers, 50);
        assert_eq!(config.queue_capacity, 100);
        assert!(config.store_timeout < config.request_timeout);
    }

    #[test]
    fn rejects_zero_workers() {
        let mut args = args();
        args.num_workers = 0;
        assert!(ServerConfig::try_from(args).is_err());
    }

    #[test]
    fn rejects_zero_queue_capacity() {
        let mut args = args();
        args.queue_capacity = 0;
        assert!(ServerConfig::try_from(args).is_err());
    }

    #[test]
    fn rejects_store_deadline_not_shorter_than_request_deadline() {
        let mut args = args();
        args.store_timeout_ms = args.request_timeout_ms;
        assert!(ServerConfig::try_from(args).is_err());
    }

    #[test]
    fn builds_a_postgres_dsn() {
        let config = ServerConfig::try_from(args()).expect("defaults are valid");
        let dsn = config.store_dsn();
        assert!(dsn.contains("host=localhost"));
        assert!(dsn.contains("dbname=roster"));
    }
}

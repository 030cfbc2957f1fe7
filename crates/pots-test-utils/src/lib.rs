//! Throwaway garden databases for integration tests.
//!
//! All tests in one binary share a single PostgreSQL server and each test
//! creates its own database on it. The server is `POTS_TEST_PG_URL` when set
//! (for example a CI service container); otherwise a `postgres` container is
//! started through testcontainers on first use and lives as long as the
//! test binary.

pub mod fixtures;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use pots_db::pool;

/// Environment variable naming an existing server to test against.
const PG_URL_VAR: &str = "POTS_TEST_PG_URL";

const PG_IMAGE_TAG: &str = "16-alpine";

/// Prefix of every temporary database name.
const DB_PREFIX: &str = "pots_test_";

enum Server {
    External(String),
    // The container is stopped when dropped, so it is kept here.
    Container {
        url: String,
        _handle: ContainerAsync<Postgres>,
    },
}

impl Server {
    fn url(&self) -> &str {
        match self {
            Self::External(url) | Self::Container { url, .. } => url,
        }
    }
}

static SERVER: OnceCell<Server> = OnceCell::const_new();

async fn start_server() -> Server {
    if let Ok(url) = std::env::var(PG_URL_VAR) {
        return Server::External(url.trim_end_matches('/').to_owned());
    }

    let handle = Postgres::default()
        .with_tag(PG_IMAGE_TAG)
        .start()
        .await
        .expect("PostgreSQL container should start");
    let host = handle.get_host().await.expect("container host");
    let port = handle
        .get_host_port_ipv4(5432)
        .await
        .expect("container port 5432 should be mapped");

    Server::Container {
        url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _handle: handle,
    }
}

/// Server URL without a database name, starting the server if needed.
pub async fn pg_url() -> &'static str {
    SERVER.get_or_init(start_server).await.url()
}

async fn connect(database: &str, max_connections: u32) -> PgPool {
    let url = format!("{}/{database}", pg_url().await);
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .unwrap_or_else(|e| panic!("cannot connect to {database}: {e}"))
}

/// Create a fresh, migrated database and return a pool on it with its name.
///
/// Pass the name to [`drop_test_db`] once the test is done with the pool.
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!("{DB_PREFIX}{}", Uuid::new_v4().simple());

    let admin = connect("postgres", 1).await;
    admin
        .execute(format!("CREATE DATABASE {db_name}").as_str())
        .await
        .unwrap_or_else(|e| panic!("cannot create {db_name}: {e}"));
    admin.close().await;

    let db = connect(&db_name, 5).await;
    pool::run_migrations(&db)
        .await
        .unwrap_or_else(|e| panic!("cannot migrate {db_name}: {e:#}"));

    (db, db_name)
}

/// Drop a database made by [`create_test_db`], disconnecting any stragglers.
///
/// Failures are ignored so a test's own assertion failure stays the one
/// reported.
pub async fn drop_test_db(db_name: &str) {
    let admin = connect("postgres", 1).await;
    let _ = admin
        .execute(format!("DROP DATABASE IF EXISTS {db_name} WITH (FORCE)").as_str())
        .await;
    admin.close().await;
}

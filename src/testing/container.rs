use crate::*;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::{Duration, Instant};
use testcontainers::{
    ContainerAsync, ContainerRequest, GenericImage, ImageExt,
    core::{IntoContainerPort as _, WaitFor, logs::LogFrame},
    runners::AsyncRunner as _,
};
use tokio::sync::OnceCell;

const PG_USER: &str = "postgres";
const PG_PASS: &str = "postgres";
const START_ATTEMPTS: u8 = 3;

/// Postgres server shared by every integration test in the run. Tests get
/// their own database inside it (see `IsolatedIntegrationTest`).
pub struct TestPostgres {
    container: ContainerAsync<GenericImage>,
}

impl TestPostgres {
    pub async fn shared() -> &'static TestPostgres {
        static SERVER: OnceCell<TestPostgres> = OnceCell::const_new();
        SERVER
            .get_or_init(|| async {
                let mut last_error = None;
                for attempt in 1..=START_ATTEMPTS {
                    match Self::start().await {
                        Ok(server) => return server,
                        Err(e) => {
                            warn!("Container start {attempt}/{START_ATTEMPTS} failed: {e}");
                            last_error = Some(e);
                        }
                    }
                }
                panic!("test Postgres never started: {last_error:?}")
            })
            .await
    }

    async fn start() -> Result<Self> {
        let started = Instant::now();
        let container = image()
            .start()
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        debug!("Test Postgres ready in {:#.2?}", started.elapsed());
        Ok(Self { container })
    }

    pub async fn url(&self, database: &str) -> Result<String> {
        let host = self
            .container
            .get_host()
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        let port = self
            .container
            .get_host_port_ipv4(5432)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(format!("postgres://{PG_USER}:{PG_PASS}@{host}:{port}/{database}"))
    }
}

/// Pool on `database` inside the shared server.
pub(super) async fn pool(database: &str) -> PgPool {
    let url = TestPostgres::shared()
        .await
        .url(database)
        .await
        .expect("test Postgres address");
    PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("test pool connection")
}

fn image() -> ContainerRequest<GenericImage> {
    const INIT_SQL: &[u8] = b"
        ALTER SYSTEM SET fsync = off;
        ALTER SYSTEM SET synchronous_commit = off;
        ALTER SYSTEM SET full_page_writes = off;";

    let mut image = GenericImage::new("postgres", "16-alpine")
        .with_exposed_port(5432.tcp())
        // The init server only listens on a socket; the final one logs this.
        .with_wait_for(WaitFor::message_on_stderr("listening on IPv6 address"))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_copy_to("/docker-entrypoint-initdb.d/init.sql", INIT_SQL.to_vec())
        .with_env_var("POSTGRES_USER", PG_USER)
        .with_env_var("POSTGRES_PASSWORD", PG_PASS)
        .with_env_var("POSTGRES_DB", "postgres");

    if config().container_logs {
        image = image.with_log_consumer(|line: &LogFrame| trace!("[postgres] {line:?}"));
    }
    if config().container_ramdisked {
        image = image
            .with_env_var("PGDATA", "/dev/shm/pgdata")
            .with_shm_size(512 * 1024 * 1024);
    }

    image.with_startup_timeout(Duration::from_secs(60))
}

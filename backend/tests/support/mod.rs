//! Shared embedded PostgreSQL harness for the Diesel adapter suites.
//!
//! Each suite starts its own cluster, creates a named database, applies the
//! embedded migrations and hands out a pool. Setup failures panic unless
//! `SKIP_TEST_CLUSTER` is truthy, in which case the test is skipped.

pub mod pg_embed;

use std::future::Future;

use chrono::Utc;
use conduit::domain::ports::UserRepository;
use conduit::domain::{AccountRecord, PasswordVerifier, User, UserId};
use conduit::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;

/// A migrated database on a running cluster, with a runtime to drive the
/// async adapters from synchronous tests.
pub struct PgContext {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub database_url: String,
    _cluster: TestCluster,
}

impl PgContext {
    /// Start a cluster and prepare `database` on it.
    pub fn start(database: &str) -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = pg_embed::test_cluster()?;
        let connection = cluster.connection();

        let mut admin = Client::connect(&connection.database_url("postgres"), NoTls)
            .map_err(|err| format_postgres_error(&err))?;
        admin
            .batch_execute(&format!("CREATE DATABASE \"{database}\""))
            .map_err(|err| format_postgres_error(&err))?;

        let database_url = connection.database_url(database);
        runtime
            .block_on(run_pending_migrations(&database_url))
            .map_err(|err| err.to_string())?;

        let config = PoolConfig::new(database_url.as_str())
            .with_max_size(4)
            .with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            runtime,
            pool,
            database_url,
            _cluster: cluster,
        })
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Insert an account named `username` and return its id.
    pub fn seed_user(&self, username: &str) -> UserId {
        let now = Utc::now();
        let record = AccountRecord {
            user: User {
                id: UserId::random(),
                username: username.to_owned(),
                email: format!("{username}@example.com"),
                bio: None,
                image: None,
                created_at: now,
                updated_at: now,
            },
            verifier: PasswordVerifier::new("hash", "salt"),
        };
        let users = DieselUserRepository::new(self.pool.clone());
        self.block_on(users.create(&record)).expect("seed user");
        record.user.id
    }

    /// Run a `SELECT COUNT(*)` statement over a plain client.
    pub fn count(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> i64 {
        let mut client = Client::connect(&self.database_url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)));
        client
            .query_one(sql, params)
            .unwrap_or_else(|err| panic!("count: {}", format_postgres_error(&err)))
            .get(0)
    }
}

/// Start a context, honouring the `SKIP_TEST_CLUSTER` opt-out.
pub fn pg_context(database: &str) -> Option<PgContext> {
    match PgContext::start(database) {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when `SKIP_TEST_CLUSTER` is truthy; otherwise fail loudly so CI
/// breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// `postgres::Error`'s `Display` collapses to "db error"; surface the
/// SQLSTATE and message instead.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db) => format!("postgres error {:?}: {}", db.code(), db.message()),
        None => error.to_string(),
    }
}

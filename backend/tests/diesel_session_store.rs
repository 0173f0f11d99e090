//! Integration tests for `DieselSessionStore` against embedded PostgreSQL.
//!
//! The `tokens_user_id_key` constraint keeps one session per user; a second
//! insert for the same user replaces the first through the upsert.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use conduit::domain::ports::{SessionStore, SessionStoreError};
use conduit::domain::session_lifetime;
use conduit::outbound::persistence::DieselSessionStore;
use conduit::test_support::MutableClock;
use rstest::{fixture, rstest};

#[allow(dead_code, reason = "shared harness exposes helpers other suites use")]
mod support;

use support::PgContext;

fn login_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0)
        .single()
        .expect("valid fixed instant")
}

struct SessionContext {
    db: PgContext,
    clock: Arc<MutableClock>,
    store: DieselSessionStore,
}

#[fixture]
fn sessions_db() -> Option<SessionContext> {
    let db = support::pg_context("diesel_session_store_test")?;
    let clock = Arc::new(MutableClock::new(login_instant()));
    let store = DieselSessionStore::new(db.pool.clone(), clock.clone());
    Some(SessionContext { db, clock, store })
}

#[rstest]
fn second_login_replaces_the_session_row(sessions_db: Option<SessionContext>) {
    let Some(ctx) = sessions_db else {
        eprintln!("SKIP-TEST-CLUSTER: second_login_replaces_the_session_row skipped");
        return;
    };
    let user = ctx.db.seed_user("alice1");

    ctx.db
        .block_on(ctx.store.insert("t1", &user))
        .expect("first session");
    ctx.clock.advance(TimeDelta::days(1));
    let replaced = ctx
        .db
        .block_on(ctx.store.insert("t2", &user))
        .expect("second session");

    assert_eq!(
        ctx.db.count(
            "SELECT COUNT(*) FROM tokens WHERE user_id = $1",
            &[user.as_uuid()]
        ),
        1
    );
    let current = ctx.db.block_on(ctx.store.by_user(&user)).expect("by user");
    assert_eq!(current.token, "t2");
    assert_eq!(current, replaced);
    assert_eq!(
        current.end_date,
        login_instant() + TimeDelta::days(1) + session_lifetime()
    );
    assert_eq!(
        ctx.db.block_on(ctx.store.by_token("t1")),
        Err(SessionStoreError::NotFound)
    );
}

#[rstest]
fn deleted_session_is_gone(sessions_db: Option<SessionContext>) {
    let Some(ctx) = sessions_db else {
        eprintln!("SKIP-TEST-CLUSTER: deleted_session_is_gone skipped");
        return;
    };
    let user = ctx.db.seed_user("bob12");
    ctx.db
        .block_on(ctx.store.insert("t1", &user))
        .expect("session");

    ctx.db.block_on(ctx.store.delete("t1")).expect("delete");

    assert_eq!(
        ctx.db.block_on(ctx.store.delete("t1")),
        Err(SessionStoreError::NotFound)
    );
    assert_eq!(
        ctx.db.block_on(ctx.store.by_user(&user)),
        Err(SessionStoreError::NoResult)
    );
}

#[rstest]
fn empty_token_is_rejected_before_touching_the_database(sessions_db: Option<SessionContext>) {
    let Some(ctx) = sessions_db else {
        eprintln!("SKIP-TEST-CLUSTER: empty_token_is_rejected_before_touching_the_database skipped");
        return;
    };
    let user = ctx.db.seed_user("carol");

    assert_eq!(
        ctx.db.block_on(ctx.store.insert("", &user)),
        Err(SessionStoreError::EmptyInput)
    );
    assert_eq!(
        ctx.db.count("SELECT COUNT(*) FROM tokens", &[]),
        0
    );
}

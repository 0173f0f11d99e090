//! Token engine behaviour: round trips, key separation and expiry.

use super::*;
use crate::test_support::MutableClock;
use chrono::TimeDelta;
use rstest::{fixture, rstest};

const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";
const OTHER_KEY: &[u8] = b"fedcba9876543210fedcba9876543210";

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-06T12:00:00Z")
        .expect("fixture timestamp")
        .with_timezone(&Utc)
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(start()))
}

fn engine_with(key: &[u8], clock: Arc<MutableClock>) -> TokenEngine {
    TokenEngine::new(TokenKey::from_bytes(key).expect("valid key"), clock)
}

#[rstest]
fn minted_token_decodes_to_the_same_user(clock: Arc<MutableClock>) {
    let engine = engine_with(KEY, clock);
    let user = UserId::random();
    let token = engine.mint(&user).expect("mint");

    assert!(token.starts_with("v2.local."));
    assert!(token.ends_with(".IA"));
    assert_eq!(engine.decode(&token).expect("decode"), user);
}

#[rstest]
fn two_mints_for_one_user_differ(clock: Arc<MutableClock>) {
    let engine = engine_with(KEY, clock);
    let user = UserId::random();
    assert_ne!(engine.mint(&user).expect("mint"), engine.mint(&user).expect("mint"));
}

#[rstest]
fn token_from_another_key_fails_verification(clock: Arc<MutableClock>) {
    let issuer = engine_with(OTHER_KEY, clock.clone());
    let verifier = engine_with(KEY, clock);
    let token = issuer.mint(&UserId::random()).expect("mint");

    assert_eq!(verifier.decode(&token), Err(TokenError::CryptographicFailure));
}

#[rstest]
#[case(TimeDelta::days(7) - TimeDelta::seconds(1), true)]
#[case(TimeDelta::days(7), true)]
#[case(TimeDelta::days(7) + TimeDelta::seconds(1), false)]
fn expiry_is_seven_days_after_minting(
    clock: Arc<MutableClock>,
    #[case] elapsed: TimeDelta,
    #[case] valid: bool,
) {
    let engine = engine_with(KEY, clock.clone());
    let token = engine.mint(&UserId::random()).expect("mint");
    clock.set(start() + elapsed);

    let decoded = engine.decode(&token);
    if valid {
        assert!(decoded.is_ok(), "expected valid token, got {decoded:?}");
    } else {
        assert_eq!(decoded, Err(TokenError::Expired));
    }
}

#[rstest]
#[case("")]
#[case("Bearer something")]
#[case("v2.public.AAAA.IA")]
#[case("v2.local.%%%.IA")]
fn garbage_is_malformed(clock: Arc<MutableClock>, #[case] token: &str) {
    let engine = engine_with(KEY, clock);
    assert_eq!(engine.decode(token), Err(TokenError::Malformed));
}

#[rstest]
fn non_uuid_uid_claim_is_invalid(clock: Arc<MutableClock>) {
    let engine = engine_with(KEY, clock);
    let now = start();
    let token = engine.seal_claims(&Claims {
        aud: AUDIENCE.to_owned(),
        iss: ISSUER.to_owned(),
        jti: "00".to_owned(),
        sub: SUBJECT.to_owned(),
        exp: now + TimeDelta::days(1),
        iat: now,
        nbf: now,
        uid: "not-a-user".to_owned(),
    });

    assert_eq!(engine.decode(&token), Err(TokenError::InvalidClaims));
}

#[rstest]
fn claims_serialise_times_at_second_precision() {
    let now = start() + TimeDelta::milliseconds(250);
    let claims = Claims {
        aud: AUDIENCE.to_owned(),
        iss: ISSUER.to_owned(),
        jti: "ab".to_owned(),
        sub: SUBJECT.to_owned(),
        exp: now,
        iat: now,
        nbf: now,
        uid: UserId::random().to_string(),
    };
    let value = serde_json::to_value(&claims).expect("serialise");
    assert_eq!(value["exp"], "2025-01-06T12:00:00Z");
    assert_eq!(value["iss"], "test_service");
    assert_eq!(value["aud"], "test");
}

#[rstest]
fn claims_accept_offset_timestamps() {
    let json = serde_json::json!({
        "aud": "test",
        "iss": "test_service",
        "jti": "ab",
        "sub": "test_subject",
        "exp": "2025-01-06T15:00:00+03:00",
        "iat": "2025-01-06T15:00:00+03:00",
        "nbf": "2025-01-06T15:00:00+03:00",
        "uid": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
    });
    let claims: Claims = serde_json::from_value(json).expect("deserialise");
    assert_eq!(claims.exp, start());
}

#[rstest]
#[case(0)]
#[case(31)]
#[case(33)]
fn key_length_must_be_exact(#[case] len: usize) {
    let bytes = vec![0_u8; len];
    assert_eq!(
        TokenKey::from_bytes(&bytes).expect_err("wrong length"),
        TokenKeyError::InvalidLength { actual: len }
    );
}

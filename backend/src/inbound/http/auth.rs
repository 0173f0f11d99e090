//! Bearer-token authentication gate.
//!
//! Protected handlers take an [`AuthenticatedUser`] argument; Actix runs the
//! extractor before the handler body, so a handler cannot execute without a
//! validated session.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{Error, UserId};
use crate::inbound::http::state::HttpState;

pub(crate) const HEADER_REQUIRED: &str = "Authorization header is required";
pub(crate) const BEARER_REQUIRED: &str = "Authorization header must use the Bearer scheme";

/// Identity of the caller, established from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
    token: String,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The raw token the caller presented.
    pub fn token(&self) -> &str {
        self.token.as_str()
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively and must be followed by exactly
/// one space and a non-empty token.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized(HEADER_REQUIRED))?;
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized(BEARER_REQUIRED))?;
    let (scheme, token) = raw
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized(BEARER_REQUIRED))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(Error::unauthorized(BEARER_REQUIRED));
    }
    Ok(token.to_owned())
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req.headers());
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token.inspect_err(|err| debug!(reason = err.message(), "gate rejected"))?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let user_id = state.accounts.authenticate(&token).await?;
            Ok(Self { user_id, token })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;
    use rstest::rstest;

    fn headers(value: Option<&[u8]>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(raw) = value {
            map.insert(
                AUTHORIZATION,
                HeaderValue::from_bytes(raw).expect("header value"),
            );
        }
        map
    }

    #[rstest]
    #[case(b"Bearer abc".as_slice(), "abc")]
    #[case(b"bearer abc".as_slice(), "abc")]
    #[case(b"BEARER v2.local.x.IA".as_slice(), "v2.local.x.IA")]
    fn accepts_bearer_scheme_in_any_case(#[case] raw: &[u8], #[case] expected: &str) {
        assert_eq!(bearer_token(&headers(Some(raw))).expect("token"), expected);
    }

    #[rstest]
    fn missing_header_is_reported() {
        let err = bearer_token(&headers(None)).expect_err("missing header");
        assert_eq!(err.message(), HEADER_REQUIRED);
    }

    #[rstest]
    #[case(b"Token abc".as_slice())]
    #[case(b"Bearer".as_slice())]
    #[case(b"Bearer ".as_slice())]
    #[case(b"Bearer  abc".as_slice())]
    #[case(b"Basic dXNlcjpwYXNz".as_slice())]
    #[case(b"Bearer \xffabc".as_slice())]
    fn other_schemes_are_rejected(#[case] raw: &[u8]) {
        let err = bearer_token(&headers(Some(raw))).expect_err("bad scheme");
        assert_eq!(err.message(), BEARER_REQUIRED);
    }
}

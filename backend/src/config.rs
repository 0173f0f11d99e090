//! Process configuration read from the environment.
//!
//! Reads go through [`mockable::Env`] so parsing and validation can be tested
//! without touching the real process environment.

use std::net::SocketAddr;

use mockable::Env;
use zeroize::Zeroizing;

use crate::domain::TokenKey;

const JWT_SECRET_ENV: &str = "JWT_SECRET";
const DB_URL_ENV: &str = "DB_URL";
const BIND_ADDR_ENV: &str = "BIND_ADDR";
const DB_POOL_MAX_SIZE_ENV: &str = "DB_POOL_MAX_SIZE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while validating configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The token secret is not exactly [`TokenKey::LEN`] bytes.
    #[error("{name} must be exactly {expected} bytes, got {actual}", expected = TokenKey::LEN)]
    InvalidSecretLength { name: &'static str, actual: usize },
}

/// Settings needed to start the server.
#[derive(Debug)]
pub struct AppConfig {
    pub token_key: TokenKey,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_max_size: u32,
}

impl AppConfig {
    /// Read and validate every setting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conduit::config::AppConfig;
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "JWT_SECRET" => Some("0123456789abcdef0123456789abcdef".to_owned()),
    ///     "DB_URL" => Some("postgres://localhost/conduit".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let config = AppConfig::from_env(&env).expect("valid configuration");
    /// assert_eq!(config.bind_addr.port(), 8080);
    /// assert_eq!(config.pool_max_size, 10);
    /// ```
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        Ok(Self {
            token_key: token_key_from_env(env)?,
            database_url: required(env, DB_URL_ENV)?,
            bind_addr: bind_addr_from_env(env)?,
            pool_max_size: pool_size_from_env(env)?,
        })
    }
}

fn required<E: Env>(env: &E, name: &'static str) -> Result<String, ConfigError> {
    env.string(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingEnv { name })
}

fn token_key_from_env<E: Env>(env: &E) -> Result<TokenKey, ConfigError> {
    let secret = Zeroizing::new(required(env, JWT_SECRET_ENV)?);
    TokenKey::from_bytes(secret.as_bytes()).map_err(|_| ConfigError::InvalidSecretLength {
        name: JWT_SECRET_ENV,
        actual: secret.len(),
    })
}

fn bind_addr_from_env<E: Env>(env: &E) -> Result<SocketAddr, ConfigError> {
    let value = env
        .string(BIND_ADDR_ENV)
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        name: BIND_ADDR_ENV,
        value,
        expected: "host:port socket address",
    })
}

fn pool_size_from_env<E: Env>(env: &E) -> Result<u32, ConfigError> {
    let Some(value) = env.string(DB_POOL_MAX_SIZE_ENV) else {
        return Ok(DEFAULT_POOL_MAX_SIZE);
    };
    match value.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidEnv {
            name: DB_POOL_MAX_SIZE_ENV,
            value,
            expected: "positive integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn env_with(vars: &[(&'static str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    #[rstest]
    fn defaults_apply_when_optional_settings_are_absent() {
        let env = env_with(&[(JWT_SECRET_ENV, SECRET), (DB_URL_ENV, "postgres://db/conduit")]);

        let config = AppConfig::from_env(&env).expect("config");

        assert_eq!(config.database_url, "postgres://db/conduit");
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(config.pool_max_size, DEFAULT_POOL_MAX_SIZE);
    }

    #[rstest]
    fn optional_settings_are_honoured() {
        let env = env_with(&[
            (JWT_SECRET_ENV, SECRET),
            (DB_URL_ENV, "postgres://db/conduit"),
            (BIND_ADDR_ENV, "127.0.0.1:3000"),
            (DB_POOL_MAX_SIZE_ENV, "4"),
        ]);

        let config = AppConfig::from_env(&env).expect("config");

        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().expect("addr"));
        assert_eq!(config.pool_max_size, 4);
    }

    #[rstest]
    #[case(&[(DB_URL_ENV, "postgres://db")], JWT_SECRET_ENV)]
    #[case(&[(JWT_SECRET_ENV, SECRET)], DB_URL_ENV)]
    #[case(&[(JWT_SECRET_ENV, SECRET), (DB_URL_ENV, "  ")], DB_URL_ENV)]
    fn missing_required_settings_are_reported(
        #[case] vars: &[(&'static str, &str)],
        #[case] name: &'static str,
    ) {
        let err = AppConfig::from_env(&env_with(vars)).expect_err("missing");
        assert_eq!(err, ConfigError::MissingEnv { name });
    }

    #[rstest]
    #[case("too-short")]
    #[case("0123456789abcdef0123456789abcdef!")]
    fn secrets_of_the_wrong_length_abort(#[case] secret: &str) {
        let env = env_with(&[(JWT_SECRET_ENV, secret), (DB_URL_ENV, "postgres://db")]);

        let err = AppConfig::from_env(&env).expect_err("bad secret");

        assert_eq!(
            err,
            ConfigError::InvalidSecretLength {
                name: JWT_SECRET_ENV,
                actual: secret.len(),
            }
        );
    }

    #[rstest]
    #[case(BIND_ADDR_ENV, "localhost")]
    #[case(DB_POOL_MAX_SIZE_ENV, "zero")]
    #[case(DB_POOL_MAX_SIZE_ENV, "0")]
    fn malformed_optional_settings_are_rejected(#[case] name: &'static str, #[case] value: &str) {
        let env = env_with(&[
            (JWT_SECRET_ENV, SECRET),
            (DB_URL_ENV, "postgres://db"),
            (name, value),
        ]);

        let err = AppConfig::from_env(&env).expect_err("invalid");

        assert!(matches!(err, ConfigError::InvalidEnv { name: n, .. } if n == name));
    }
}

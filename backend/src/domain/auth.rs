//! Account credentials and profile updates.
//!
//! Inbound adapters build these values through the validating constructors
//! before calling [`crate::domain::AccountService`], so the service never
//! sees a short password or a malformed email.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

/// Minimum length, in characters, of usernames and passwords.
pub const MIN_CREDENTIAL_LEN: usize = 5;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialValidationError {
    UsernameTooShort,
    EmailRequired,
    InvalidEmail,
    PasswordTooShort,
}

impl CredentialValidationError {
    /// Payload field the error refers to.
    pub fn field(self) -> &'static str {
        match self {
            Self::UsernameTooShort => "username",
            Self::EmailRequired | Self::InvalidEmail => "email",
            Self::PasswordTooShort => "password",
        }
    }

    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::UsernameTooShort | Self::PasswordTooShort => "too_short",
            Self::EmailRequired => "missing_field",
            Self::InvalidEmail => "invalid_email",
        }
    }
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernameTooShort => write!(
                f,
                "username must be at least {MIN_CREDENTIAL_LEN} characters"
            ),
            Self::EmailRequired => write!(f, "email is required"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::PasswordTooShort => write!(
                f,
                "password must be at least {MIN_CREDENTIAL_LEN} characters"
            ),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is not verified.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn validate_email(raw: &str) -> Result<String, CredentialValidationError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(CredentialValidationError::EmailRequired);
    }
    if !email_regex().is_match(email) {
        return Err(CredentialValidationError::InvalidEmail);
    }
    Ok(email.to_owned())
}

fn validate_password(raw: &str) -> Result<Zeroizing<String>, CredentialValidationError> {
    if raw.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(CredentialValidationError::PasswordTooShort);
    }
    Ok(Zeroizing::new(raw.to_owned()))
}

/// Validated sign-up request.
///
/// ## Invariants
/// - `username` is trimmed and at least [`MIN_CREDENTIAL_LEN`] characters.
/// - `email` is trimmed and shaped like `local@domain.tld`.
/// - `password` is at least [`MIN_CREDENTIAL_LEN`] characters and kept as
///   supplied.
///
/// # Examples
/// ```
/// use conduit::domain::Registration;
///
/// let registration = Registration::try_from_parts("alice1", "a@x.io", "secret1").unwrap();
/// assert_eq!(registration.username(), "alice1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: String,
    email: String,
    password: Zeroizing<String>,
}

impl Registration {
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let username = username.trim();
        if username.chars().count() < MIN_CREDENTIAL_LEN {
            return Err(CredentialValidationError::UsernameTooShort);
        }
        let email = validate_email(email)?;
        let password = validate_password(password)?;
        Ok(Self {
            username: username.to_owned(),
            email,
            password,
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            email: validate_email(email)?,
            password: validate_password(password)?,
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl UserUpdate {
    /// Build an update where empty strings count as "not supplied".
    pub fn try_from_parts(
        email: Option<&str>,
        username: Option<&str>,
        bio: Option<&str>,
        image: Option<&str>,
    ) -> Result<Self, CredentialValidationError> {
        let supplied = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_owned);
        let email = match supplied(email) {
            Some(raw) => Some(validate_email(&raw)?),
            None => None,
        };
        Ok(Self {
            email,
            username: supplied(username),
            bio: supplied(bio),
            image: supplied(image),
        })
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none() && self.bio.is_none() && self.image.is_none()
    }
}

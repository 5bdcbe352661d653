//! Error types for the identity/auth/REST layer.

use std::fmt;

/// Auth/Identity + API + Argument error kinds (spec.md §7).
///
/// Flat on purpose, same as [`sm_crypto::Error`]: callers match on the
/// variant, never on an inheritance chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Access token string failed to parse.
    InvalidToken,
    /// Access token carried a leading version component other than `0`.
    UnsupportedTokenVersion,
    /// Identity endpoint rejected the client credentials (400/401).
    UnauthorisedToken,
    /// Identity response was malformed in any way — envelope, MAC,
    /// padding, or JSON shape. A single kind on purpose: the access-token
    /// holder cannot usefully distinguish these causes.
    InvalidIdentityResponse,
    /// State file was unreadable/corrupt. Never returned from a public
    /// API — callers fall back to a fresh identity request.
    InvalidStateFile,
    /// REST call returned 401.
    Unauthorised,
    /// REST call returned 404.
    NotFound,
    /// REST call returned 429.
    RateLimited,
    /// REST call returned a non-2xx status not covered above.
    ApiError { status: u16, body: String },
    /// Transport-level failure (connect, timeout, TLS, DNS).
    SendRequestError(String),
    /// A caller-supplied argument violated its documented shape.
    InvalidArgument(String),
    /// A returned secret's `key`/`value` field failed to decrypt or
    /// decode as UTF-8.
    SecretParseError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid access token format"),
            Self::UnsupportedTokenVersion => write!(f, "unsupported access token version"),
            Self::UnauthorisedToken => write!(f, "access token was rejected by the identity endpoint"),
            Self::InvalidIdentityResponse => write!(f, "identity endpoint returned an invalid response"),
            Self::InvalidStateFile => write!(f, "state file is missing or corrupt"),
            Self::Unauthorised => write!(f, "unauthorised"),
            Self::NotFound => write!(f, "not found"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::ApiError { status, body } => write!(f, "api error {}: {}", status, body),
            Self::SendRequestError(msg) => write!(f, "failed to send request: {}", msg),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::SecretParseError => write!(f, "failed to decode secret key or value"),
        }
    }
}

impl std::error::Error for Error {}

/// Every crypto failure on the identity path narrows to a single kind,
/// per spec.md §7 — the underlying variant is never leaked across this
/// boundary.
impl From<sm_crypto::Error> for Error {
    fn from(_: sm_crypto::Error) -> Self {
        Self::InvalidIdentityResponse
    }
}

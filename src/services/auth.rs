//! Subscriber authentication against the remote user directory.
//!
//! Stateless: the directory is fetched on every call, so revoking or
//! expiring a user takes effect on the next request.

use chrono::{DateTime, Utc};

use crate::error::UpstreamError;
use crate::models::{AuthResult, UserDirectory, UserRecord};
use crate::services::upstream::UpstreamClient;

/// Compare a stored password with the supplied one.
///
/// Plain-text equality. Swap this for a salted-hash check when the directory
/// stores hashes.
pub fn password_matches(stored: &str, supplied: &str) -> bool {
    stored == supplied
}

/// First record (in directory order) matching both username and password
pub fn find_user<'a>(
    directory: &'a UserDirectory,
    username: &str,
    password: &str,
) -> Option<&'a UserRecord> {
    directory
        .users
        .iter()
        .find(|u| u.username == username && password_matches(&u.password, password))
}

/// Decide the outcome of a credential check at instant `now`
pub fn check_credentials(
    directory: &UserDirectory,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
) -> AuthResult {
    let Some(user) = find_user(directory, username, password) else {
        return AuthResult::Rejected;
    };

    if user.expire_date.is_some() && user.expiry().is_none() {
        tracing::warn!(username, "Unreadable expire_date, treating account as unlimited");
    }

    match user.expiry() {
        Some(expiry) if expiry < now => AuthResult::Expired { expiry },
        expiry => AuthResult::Granted { expiry },
    }
}

/// Fetch the directory and check the supplied credentials.
///
/// A directory fetch failure is an error, never a rejection.
pub async fn authenticate(
    upstream: &UpstreamClient,
    username: &str,
    password: &str,
) -> Result<AuthResult, UpstreamError> {
    let directory = upstream.fetch_user_directory().await?;
    let result = check_credentials(&directory, username, password, Utc::now());

    tracing::info!(
        username,
        status = result.status_code().as_u16(),
        "Authentication checked"
    );

    Ok(result)
}

//! Authorization Policy
//! Mission: Derive roles from authenticated identities and gate privileged operations

use crate::auth::{jwt::JwtHandler, models::User, user_store::UserStore};
use tracing::{debug, warn};

/// Authorization failures.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthzError {
    /// Missing, invalid or expired token, or a subject that no longer
    /// resolves to a user.
    Unauthenticated,
    /// Authenticated but lacking the administrator role.
    Forbidden,
}

impl std::fmt::Display for AuthzError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthzError::Unauthenticated => write!(f, "Authentication required"),
            AuthzError::Forbidden => write!(f, "Admin privileges required"),
        }
    }
}

impl std::error::Error for AuthzError {}

/// Resolve a bearer token to a live user record.
///
/// Token validation and the credential-store lookup both happen here, so a
/// token whose subject has since disappeared is rejected the same way as a
/// forged one.
pub fn require_authenticated(
    jwt: &JwtHandler,
    users: &UserStore,
    token: &str,
) -> Result<User, AuthzError> {
    let claims = jwt.verify(token).map_err(|_| AuthzError::Unauthenticated)?;

    let user_id: i64 = claims.sub.parse().map_err(|_| {
        debug!("Token carried a non-numeric subject: {}", claims.sub);
        AuthzError::Unauthenticated
    })?;

    match users.find_by_id(user_id) {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            debug!("Token subject {} no longer exists", user_id);
            Err(AuthzError::Unauthenticated)
        }
        Err(e) => {
            warn!("User lookup failed during authentication: {}", e);
            Err(AuthzError::Unauthenticated)
        }
    }
}

/// Gate a privileged operation on the administrator flag.
pub fn require_admin(user: &User) -> Result<(), AuthzError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

//! Admin authentication slice.
//!
//! One configured admin account logs in with username and password and receives an HS256 JWT,
//! both in the response body and as the `token` cookie. [`AdminSession`] and [`require_admin`]
//! guard the admin API.

mod credentials;
mod error;
mod routes;
mod session;
mod token;

pub use credentials::AdminCredentials;
pub use error::{IdentityError, IdentityErrorExt};
pub use routes::{CheckAuthResponse, LoginRequest, LoginResponse, SessionUser, router};
pub use session::{AdminSession, require_admin};
pub use token::{Claims, IssuedToken, TokenService};

use tport_kernel::domain::config::AuthConfig;
use tport_kernel::domain::registry::InitializedSlice;
use tracing::{info, warn};

/// Identity feature state
#[tport_derive::tport_slice]
pub struct Identity {
    pub tokens: TokenService,
    pub credentials: AdminCredentials,
    pub cookie_secure: bool,
}

/// Initialize the identity feature.
///
/// # Errors
///
/// [`IdentityError::Config`] when the token settings are unusable.
pub fn init(config: &AuthConfig) -> Result<InitializedSlice, IdentityError> {
    let credentials = AdminCredentials::from_config(config);
    if !credentials.is_enabled() {
        warn!("No admin password configured; admin login is disabled");
    }

    let slice = Identity::new(IdentityInner {
        tokens: TokenService::from_config(config)?,
        credentials,
        cookie_secure: config.cookie_secure,
    });

    info!(admin = %config.admin_username, "Identity slice initialized");
    Ok(InitializedSlice::new(slice))
}

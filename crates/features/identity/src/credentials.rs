use sha2::{Digest, Sha256};
use tport_domain::config::AuthConfig;

type Digest256 = [u8; 32];

/// The single configured admin account, kept as SHA-256 digests.
#[derive(Clone)]
pub struct AdminCredentials {
    username: Digest256,
    password: Option<Digest256>,
}

impl AdminCredentials {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: digest(username),
            password: (!password.is_empty()).then(|| digest(password)),
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.admin_username, &config.admin_password)
    }

    /// `false` while no admin password is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    /// Compares both fields in constant time; both comparisons always run.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(expected_password) = &self.password else {
            return false;
        };
        let user_ok = constant_time_eq(&self.username, &digest(username));
        let pass_ok = constant_time_eq(expected_password, &digest(password));
        user_ok & pass_ok
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials").field("enabled", &self.is_enabled()).finish_non_exhaustive()
    }
}

fn digest(value: &str) -> Digest256 {
    Sha256::digest(value.as_bytes()).into()
}

fn constant_time_eq(a: &Digest256, b: &Digest256) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

use crate::recipients::RecipientSet;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Every configuration section of the service.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub mail: MailConfig,
    pub tracking: TrackingConfig,
    pub notifications: NotificationsConfig,
}

/// Arc-wrapped configuration, cheap to clone into slices.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 3009, ssl: None }
    }
}

/// PEM certificate and key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials; not needed for `mem://`.
    pub credentials: Option<DatabaseCredentials>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "tport".to_owned(),
            database: "core".to_owned(),
            credentials: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

/// Single admin account and session token settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub admin_username: String,
    /// Login is refused while this is empty.
    pub admin_password: String,
    pub jwt_secret: String,
    pub issuer: String,
    pub token_ttl_seconds: u64,
    /// Adds `Secure` to the session cookie; enable behind HTTPS.
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "Transportify-admin".to_owned(),
            admin_password: String::new(),
            jwt_secret: "dev-only-change-me".to_owned(),
            issuer: "tport".to_owned(),
            token_ttl_seconds: 24 * 60 * 60,
            cookie_secure: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the admin API with credentials.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        let origins = [
            "http://localhost:3000",
            "http://localhost:5173",
            "http://127.0.0.1:3000",
            "http://127.0.0.1:5173",
            "https://transportifyy.netlify.app",
        ];
        Self { allowed_origins: origins.into_iter().map(str::to_owned).collect() }
    }
}

/// Fixed-window request limit per client IP.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
    /// Upper bound on tracked client addresses.
    pub capacity: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 100, window_seconds: 15 * 60, capacity: 10_000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp: Option<SmtpConfig>,
    pub mailersend: Option<MailerSendConfig>,
    /// Sender address for SMTP and preview messages.
    pub default_from: String,
    /// How many messages the preview sink keeps in memory.
    pub preview_capacity: usize,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp: None,
            mailersend: None,
            default_from: "no-reply@transportify.com".to_owned(),
            preview_capacity: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise.
    pub secure: bool,
    pub username: String,
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            secure: false,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl SmtpConfig {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailerSendConfig {
    pub api_key: String,
    pub endpoint: String,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: String,
    pub timeout_seconds: u64,
}

impl Default for MailerSendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.mailersend.com/v1/email".to_owned(),
            from_email: "noreply@test.mailersend.net".to_owned(),
            from_name: crate::constants::PRODUCT_NAME.to_owned(),
            reply_to: "support@transportify.com".to_owned(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Public page that renders a shipment; the tracking ID is appended as a path segment.
    pub base_url: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { base_url: "https://transportifyy.netlify.app/track".to_owned() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub notify: RecipientSet,
    pub queue_capacity: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true, notify: RecipientSet::default(), queue_capacity: 256 }
    }
}

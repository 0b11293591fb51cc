use serde_json::json;
use tport_domain::config::{ApiConfig, AuthConfig, DatabaseConfig, MailerSendConfig, ServerConfig};
use tport_domain::recipients::RecipientSet;

#[test]
fn defaults_match_the_service_contract() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 3009);
    assert!(server.ssl.is_none());

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "tport");
    assert!(db.credentials.is_none());

    let auth = AuthConfig::default();
    assert_eq!(auth.admin_username, "Transportify-admin");
    assert!(auth.admin_password.is_empty());
    assert_eq!(auth.token_ttl_seconds, 86_400);

    let mailersend = MailerSendConfig::default();
    assert_eq!(mailersend.endpoint, "https://api.mailersend.com/v1/email");
    assert_eq!(mailersend.from_name, "Transportify");

    let config = ApiConfig::default();
    assert_eq!(config.security.rate_limit.max_requests, 100);
    assert_eq!(config.security.rate_limit.window_seconds, 900);
    assert_eq!(config.notifications.notify, RecipientSet::RECEIVER);
    assert_eq!(config.notifications.queue_capacity, 256);
    assert!(config.mail.smtp.is_none());
}

#[test]
fn partial_documents_fill_in_defaults() {
    let raw = json!({
        "server": { "address": "127.0.0.1", "port": 8080 },
        "security": { "auth": { "admin_password": "s3cret", "cookie_secure": true } },
        "mail": { "smtp": { "host": "smtp.example.com", "username": "u", "password": "p" } },
        "tracking": { "base_url": "https://track.example.com/t" },
        "notifications": { "notify": ["receiver", "sender"] }
    });

    let config: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.security.auth.admin_password, "s3cret");
    assert_eq!(config.security.auth.admin_username, "Transportify-admin");
    assert!(config.security.auth.cookie_secure);
    assert_eq!(config.database.database, "core");

    let smtp = config.mail.smtp.as_ref().expect("smtp section");
    assert_eq!(smtp.port, 587);
    assert!(smtp.is_complete());
    assert_eq!(config.tracking.base_url, "https://track.example.com/t");
    assert_eq!(config.notifications.notify, RecipientSet::ALL);
}

#[test]
fn deref_mut_copies_on_write() {
    let original = ApiConfig::default();
    let mut changed = original.clone();
    changed.server.port = 9000;

    assert_eq!(original.server.port, 3009);
    assert_eq!(changed.server.port, 9000);
}

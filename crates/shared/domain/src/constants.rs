//! Wire-level names shared between slices.

/// Product name used in email sender names and the `OpenAPI` title.
pub const PRODUCT_NAME: &str = "Transportify";

/// Database table holding shipment documents.
pub const SHIPMENT_TABLE: &str = "shipment";

/// Prefix of every generated tracking ID.
pub const TRACKING_ID_PREFIX: &str = "TRANS";

/// Name of the cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "token";

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "TPORT";

pub const TAG_SYSTEM: &str = "System";
pub const TAG_AUTH: &str = "Auth";
pub const TAG_SHIPMENTS: &str = "Shipments";
pub const TAG_TRACKING: &str = "Tracking";
pub const TAG_NOTIFICATIONS: &str = "Notifications";

mod rate_limit;
mod resource;

pub use rate_limit::{RateLimiter, client_ip, rate_limit};
pub use resource::{ResourceGuard, ResourceGuardError};

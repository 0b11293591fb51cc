//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it re-exports ergonomic helpers for IDs, config loading, the API
//! state and the HTTP plumbing every slice speaks.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous document keys:
//! ```rust
//! # use tport_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! Tracking IDs follow their own shape, see [`tracking`]:
//! ```rust
//! let id = tport_kernel::tracking::generate_tracking_id();
//! assert!(id.starts_with("TRANS"));
//! ```
//!
//! ## Config loading
//! ```rust,ignore
//! use tport_kernel::config::load_config;
//! let cfg: tport_kernel::domain::config::ApiConfig = load_config(Some("server")).unwrap();
//! ```
pub mod config;
pub mod prelude;
pub mod security;
pub mod server;
pub mod tracking;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use nanoid::nanoid;
pub use tport_domain as domain;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}

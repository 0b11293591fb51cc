mod admin;
mod public;

pub use admin::admin_router;
pub use public::public_router;

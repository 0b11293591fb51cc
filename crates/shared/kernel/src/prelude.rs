//! Imports most slices need for their handlers.

pub use crate::safe_nanoid;
pub use crate::security::ResourceGuard;
pub use crate::server::{ApiError, ApiErrorExt, ApiJson, ApiPath, ApiQuery, ApiResponse, ApiState, MessageResponse, Slice};
pub use tport_derive::{api_handler, api_model};

mod error;
mod extract;
mod health;
mod layers;
mod response;
mod router;
mod state;

pub use error::{ApiError, ApiErrorExt};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use layers::{admin_cors, public_cors, security_headers};
pub use response::{ApiResponse, MessageResponse};
pub use router::{route_not_found, system_router};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner, Slice};

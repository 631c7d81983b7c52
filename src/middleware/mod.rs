pub mod auth;
pub mod gate;
pub mod response;
pub mod session;

pub use auth::authenticate_middleware;
pub use gate::route_gate_middleware;
pub use response::{ApiResponse, ApiResult};
pub use session::effective_session_middleware;

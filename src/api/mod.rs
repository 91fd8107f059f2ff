pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod stripe_handlers;

pub use error::{ApiError, ApiResult};
pub use routes::configure_routes;
pub use state::ApiState;

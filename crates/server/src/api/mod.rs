pub mod attachments;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod tickets;
pub mod transfer;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;

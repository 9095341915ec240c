mod auth;
mod client_key;
mod error_handler;
mod rate_limit;
mod request_id;

pub use auth::{API_KEY_HEADER, ApiKeyAuth, CallerId, USER_ID_HEADER, auth_middleware};
pub use client_key::{FORWARDED_FOR_HEADER, resolve_client_key};
pub use error_handler::log_errors;
pub use rate_limit::{Admission, rate_limit};
pub use request_id::{REQUEST_ID_HEADER, request_id};

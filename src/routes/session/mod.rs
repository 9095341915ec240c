mod handler;
pub mod model;

pub(crate) use handler::session_id;
pub use handler::{create_session, delete_session, get_session, list_sessions, update_session};
pub use model::{SessionResponse, SessionService};

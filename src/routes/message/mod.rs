mod handler;
pub mod model;

pub use handler::{add_message, list_messages};
pub use model::{MessageResponse, MessageService};

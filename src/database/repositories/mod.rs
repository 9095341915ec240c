mod message;
mod session;

pub use message::{MessageRepository, NewMessage, PgMessageRepository};
pub use session::{PgSessionRepository, SessionChanges, SessionRepository};

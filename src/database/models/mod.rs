pub mod message;
pub mod session;

pub use message::MessageEntity;
pub use session::SessionEntity;

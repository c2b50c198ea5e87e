pub mod errors;
pub mod id;
pub mod types;

pub use errors::{ConfigError, LumenError};
pub use id::{new_id, SessionId};
pub use types::{Attachment, Configuration, History, Message, Personality, Role};

pub type Result<T> = std::result::Result<T, LumenError>;

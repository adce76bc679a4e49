pub mod messages;
pub mod types;

pub use messages::{Notification, RouterRequest};
pub use types::*;

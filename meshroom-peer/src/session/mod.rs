mod session;
mod session_config;

pub use session::*;
pub use session_config::*;

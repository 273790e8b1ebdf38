mod outbox;
mod presence_controller;

pub use outbox::*;
pub use presence_controller::*;

mod connection;
mod connection_driver;
mod connection_event;
mod connection_wrapper;
mod media;
mod relay_client;
mod signaling_transport;
mod transport_config;

pub use connection::*;
pub use connection_driver::*;
pub use connection_event::*;
pub use connection_wrapper::*;
pub use media::*;
pub use relay_client::*;
pub use signaling_transport::*;
pub use transport_config::*;

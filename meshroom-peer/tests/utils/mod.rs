pub mod mock_transport;

pub use mock_connection::*;
pub use mock_observer::*;
pub use mock_transport::*;
pub use test_peer::*;

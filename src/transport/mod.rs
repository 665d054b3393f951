//! Transport module - the TCP connection under the session.

mod tcp;

pub use tcp::{RecvError, TcpConnectError, TcpTransport};

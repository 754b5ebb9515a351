//! Reply socket transport and port pre-flight checks.
//!
//! The serving loop owns a single [`ReplySocket`]; nothing else touches it.

mod errors;
mod port_guard;
mod socket;

pub use self::errors::TransportError;
pub use self::port_guard::{
    LsofPortReleaser, NoopPortReleaser, PortReleaser, is_bound, wait_until_free,
};
pub use self::socket::ReplySocket;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::TcpListener;

    use gridwire_config::Endpoint;

    /// Loopback endpoint on a port the OS just reported free.
    pub(crate) fn free_tcp_endpoint() -> Endpoint {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("reserve ephemeral port");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);
        Endpoint::tcp("127.0.0.1", port)
    }
}

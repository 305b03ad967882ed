//! TCP listener helpers.
//!
//! # Responsibilities
//! - Check that the configured port can be bound, before anything else starts
//! - Bind the listener the HTTP server accepts on
//!
//! # Design Decisions
//! - The probe binds and releases immediately; the real bind happens later
//!   on the server task, so a lost race surfaces as a serve error

use std::io;
use std::net::{SocketAddr, TcpListener as StdTcpListener, ToSocketAddrs};

use tokio::net::TcpListener;

/// Resolve `address` to the first socket address it names.
pub fn resolve(address: &str) -> io::Result<SocketAddr> {
    address.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{address} does not resolve to any address"),
        )
    })
}

/// Bind `address` and release it straight away.
pub fn probe(address: &str) -> io::Result<()> {
    let addr = resolve(address)?;
    let listener = StdTcpListener::bind(addr)?;
    drop(listener);
    Ok(())
}

/// Bind the listener that will accept HTTP connections.
pub async fn bind(address: &str) -> io::Result<TcpListener> {
    let addr = resolve(address)?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_succeeds_on_free_port() {
        assert!(probe("127.0.0.1:0").is_ok());
    }

    #[test]
    fn probe_fails_on_taken_port() {
        let taken = StdTcpListener::bind("127.0.0.1:0").unwrap();
        let address = taken.local_addr().unwrap().to_string();

        let err = probe(&address).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }

    #[test]
    fn unresolvable_address_is_invalid_input() {
        let err = probe("not an address").unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::AddrInUse);
    }

    #[tokio::test]
    async fn bind_returns_usable_listener() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}

//! SocketFactory (C3, §4.2): resolves `host:port` to IPv4 and returns a
//! connected (or connecting) non-blocking TCP socket.

use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpStream;

use crate::error::{Error, Result};

/// Resolves `host:port`, restricted to IPv4 (§1 non-goals: "supports only
/// IPv4 address resolution"), and connects to the first candidate address
/// that succeeds.
///
/// `tokio::net::TcpStream::connect` already has "try each resolved address
/// in order, keep the first that connects" built into its `ToSocketAddrs`
/// handling; the IPv4 filter on top of that is this function's only real
/// job, matching the source's `AF_INET`-only `getaddrinfo` hint.
pub async fn open(host: &str, port: u16) -> Result<TcpStream> {
    let candidates = tokio::net::lookup_host((host, port))
        .await
        .map_err(Error::connect)?;

    let mut v4_candidates: Vec<SocketAddr> = candidates
        .filter(|addr| matches!(addr.ip(), IpAddr::V4(_)))
        .collect();

    if v4_candidates.is_empty() {
        return Err(Error::connect(format!(
            "no IPv4 address found for {host}:{port}"
        )));
    }

    let mut last_err = None;
    for addr in v4_candidates.drain(..) {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                let _ = stream.set_nodelay(true);
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(Error::connect(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "connect failed")
    })))
}

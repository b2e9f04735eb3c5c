//! TlsAdapter (C4, §4.3): wraps a connected socket in a TLS session.
//!
//! Grounded in the teacher crate's `rustls`-tls stack, which carries the
//! `dangerous_configuration` feature specifically so peer verification can
//! be disabled — matching §1's "does not validate TLS peer certificates by
//! default" non-goal and §4.3's "Peer verification is disabled by default".
//!
//! `tokio_rustls::TlsConnector::connect` performs the handshake as part of
//! establishing the session, so `TLS_HANDSHAKE` (§4.4) is a single awaited
//! future here rather than a hand-polled want_read/want_write loop — see
//! DESIGN.md Open Question resolution #3.

use std::sync::Arc;
use std::time::SystemTime;

use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, ClientConfig, Error as RustlsError, ServerName};
use tokio::net::TcpStream;
use tokio_rustls::{client::TlsStream, TlsConnector};

use crate::error::{Error, Result};

/// Accepts any certificate chain and any server name, unconditionally.
struct NoCertificateVerification;

impl ServerCertVerifier for NoCertificateVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> std::result::Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }
}

/// Builds the single, process-wide TLS client configuration. Grounded in
/// §9's "Global TLS init" note: lifted to one `Engine`-owned construction
/// (this function, called once from `Engine::new`) rather than relying on
/// a module-load side effect.
pub fn build_client_config() -> Arc<ClientConfig> {
    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(NoCertificateVerification))
        .with_no_client_auth();
    Arc::new(config)
}

/// Establishes a TLS session over `stream`, using `sni_host` for SNI.
pub async fn connect(
    tls_config: Arc<ClientConfig>,
    stream: TcpStream,
    sni_host: &str,
) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(sni_host)
        .map_err(|e| Error::tls(format!("invalid SNI host '{sni_host}': {e}")))?;
    let connector = TlsConnector::from(tls_config);
    connector
        .connect(server_name, stream)
        .await
        .map_err(Error::tls)
}

//! WebSocket endpoint connection.
//!
//! TVs serve the secure socket with a self-signed certificate issued for no
//! particular hostname, so certificate and hostname validation are disabled
//! for `wss` endpoints.

// ============================================================================
// Imports
// ============================================================================

use tokio::net::TcpStream;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::Security;

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream to a TV, plain or TLS.
pub type SocketStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// Functions
// ============================================================================

/// Opens the remote-control socket.
///
/// # Errors
///
/// Returns [`Error::Connection`] if the TLS connector cannot be built or the
/// WebSocket upgrade fails.
pub async fn open_socket(url: &Url, security: Security) -> Result<SocketStream> {
    let connector = match security {
        Security::Tls => Some(lenient_tls_connector()?),
        Security::Plain => None,
    };

    debug!(host = url.host_str().unwrap_or_default(), tls = security.is_tls(), "Opening socket");

    let (stream, response) = connect_async_tls_with_config(url.as_str(), None, true, connector)
        .await
        .map_err(|e| {
            Error::connection(format!(
                "Failed to open socket to {}: {e}",
                url.host_str().unwrap_or_default()
            ))
        })?;

    info!(status = %response.status(), "Socket opened");
    Ok(stream)
}

/// Builds a TLS connector that accepts self-signed certificates.
fn lenient_tls_connector() -> Result<Connector> {
    let tls = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| Error::connection(format!("Failed to build TLS connector: {e}")))?;

    Ok(Connector::NativeTls(tls))
}

// ============================================================================
// Tests
// ============================================================================

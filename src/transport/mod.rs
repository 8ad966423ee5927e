//! Transport layer: endpoint construction, raw codec, connection pool.

mod codec;
mod pool;

pub use codec::RawCodec;
pub use pool::{ChannelConnector, Connect, ConnectionPool};

use std::fs;
use std::path::Path;

use tonic::transport::{Certificate, ClientTlsConfig, Endpoint, Identity};
use tracing::warn;

use crate::config::Target;
use crate::error::ConnectError;

fn read_pem(path: &Path) -> Result<Vec<u8>, ConnectError> {
    fs::read(path).map_err(|source| ConnectError::TlsMaterial {
        path: path.display().to_string(),
        source,
    })
}

/// Build a tonic endpoint for `target`, wiring TLS material when
/// configured. TLS setup failures surface as [`ConnectError`] with their
/// cause preserved.
pub fn build_endpoint(target: &Target) -> Result<Endpoint, ConnectError> {
    let scheme = if target.tls.is_some() { "https" } else { "http" };
    let uri = format!("{}://{}", scheme, target.authority);
    let mut endpoint =
        Endpoint::from_shared(uri).map_err(|e| ConnectError::InvalidEndpoint {
            endpoint: target.authority.clone(),
            reason: e.to_string(),
        })?;
    endpoint = endpoint
        .connect_timeout(target.connect_timeout)
        .tcp_nodelay(true);

    if let Some(tls) = &target.tls {
        let mut tls_config = ClientTlsConfig::new();
        match &tls.ca_file {
            Some(ca) => {
                let pem = read_pem(ca)?;
                tls_config = tls_config.ca_certificate(Certificate::from_pem(pem));
            }
            None => {
                if tls.insecure_skip_verify {
                    // rustls offers no verification bypass; the closest
                    // supported relaxation is trusting platform roots.
                    warn!("insecure_skip_verify set: falling back to platform trust roots");
                }
                tls_config = tls_config.with_native_roots();
            }
        }
        if let (Some(cert), Some(key)) = (&tls.cert_file, &tls.key_file) {
            let cert_pem = read_pem(cert)?;
            let key_pem = read_pem(key)?;
            tls_config = tls_config.identity(Identity::from_pem(cert_pem, key_pem));
        }
        if let Some(domain) = &tls.domain_override {
            tls_config = tls_config.domain_name(domain.clone());
        }
        endpoint = endpoint
            .tls_config(tls_config)
            .map_err(|source| ConnectError::TlsConfig { source })?;
    }

    Ok(endpoint)
}

//! TLS material for the HTTPS listener.
//!
//! Either loads a PEM certificate/key pair from disk or generates a
//! self-signed certificate for `localhost` / `127.0.0.1`. Without one of
//! the two the proxy cannot start.

use crate::config::{ProxyConfig, TlsFiles};
use crate::error::{ProxyError, Result};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tracing::info;
use zeroize::Zeroizing;

/// Names the generated certificate is valid for.
const SELF_SIGNED_NAMES: &[&str] = &["localhost", "127.0.0.1"];

/// Certificate chain and private key, both PEM encoded.
pub struct TlsMaterial {
    cert_pem: String,
    key_pem: Zeroizing<String>,
    generated: bool,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("generated", &self.generated)
            .finish_non_exhaustive()
    }
}

impl TlsMaterial {
    /// Load the configured files, or generate a self-signed certificate.
    pub fn obtain(config: &ProxyConfig) -> Result<Self> {
        match &config.tls {
            Some(files) => Self::load(files),
            None => Self::self_signed(),
        }
    }

    /// Read a PEM certificate chain and private key from disk.
    pub fn load(files: &TlsFiles) -> Result<Self> {
        let cert_pem = std::fs::read_to_string(&files.cert).map_err(|e| {
            ProxyError::Tls(format!("cannot read certificate {}: {}", files.cert.display(), e))
        })?;
        let key_pem = Zeroizing::new(std::fs::read_to_string(&files.key).map_err(|e| {
            ProxyError::Tls(format!("cannot read private key {}: {}", files.key.display(), e))
        })?);

        info!("Loaded TLS certificate from {}", files.cert.display());
        Ok(Self {
            cert_pem,
            key_pem,
            generated: false,
        })
    }

    /// Generate a self-signed certificate for `localhost`.
    pub fn self_signed() -> Result<Self> {
        let names: Vec<String> = SELF_SIGNED_NAMES.iter().map(|s| s.to_string()).collect();
        let mut params = CertificateParams::new(names)
            .map_err(|e| ProxyError::Tls(format!("certificate parameters: {}", e)))?;
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "localhost");
        params.distinguished_name = dn;

        let key_pair =
            KeyPair::generate().map_err(|e| ProxyError::Tls(format!("key generation: {}", e)))?;
        let cert = params
            .self_signed(&key_pair)
            .map_err(|e| ProxyError::Tls(format!("self-signing: {}", e)))?;

        info!("Generated self-signed HTTPS certificate for localhost");
        Ok(Self {
            cert_pem: cert.pem(),
            key_pem: Zeroizing::new(key_pair.serialize_pem()),
            generated: true,
        })
    }

    /// Whether this certificate was generated at start-up.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// The certificate chain, PEM encoded.
    #[must_use]
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    /// Build the TLS acceptor for the listener (HTTP/1.1 only).
    pub fn acceptor(&self) -> Result<TlsAcceptor> {
        let mut cert_reader = self.cert_pem.as_bytes();
        let certs = rustls_pemfile::certs(&mut cert_reader)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ProxyError::Tls(format!("invalid certificate PEM: {}", e)))?;
        if certs.is_empty() {
            return Err(ProxyError::Tls("no certificate found in PEM".to_string()));
        }

        let mut key_reader = self.key_pem.as_bytes();
        let key = rustls_pemfile::private_key(&mut key_reader)
            .map_err(|e| ProxyError::Tls(format!("invalid private key PEM: {}", e)))?
            .ok_or_else(|| ProxyError::Tls("no private key found in PEM".to_string()))?;

        let mut config = rustls::ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .map_err(|e| ProxyError::Tls(format!("TLS config error: {}", e)))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ProxyError::Tls(format!("certificate/key mismatch: {}", e)))?;
        config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(TlsAcceptor::from(Arc::new(config)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_self_signed_builds_acceptor() {
        let material = TlsMaterial::self_signed().unwrap();
        assert!(material.is_generated());
        assert!(material.cert_pem().starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(material.acceptor().is_ok());
    }

    #[test]
    fn test_obtain_without_files_generates() {
        let material = TlsMaterial::obtain(&ProxyConfig::default()).unwrap();
        assert!(material.is_generated());
    }

    #[test]
    fn test_load_from_files() {
        let generated = TlsMaterial::self_signed().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");
        std::fs::write(&cert, generated.cert_pem()).unwrap();
        std::fs::write(&key, generated.key_pem.as_str()).unwrap();

        let loaded = TlsMaterial::load(&TlsFiles { cert, key }).unwrap();
        assert!(!loaded.is_generated());
        assert!(loaded.acceptor().is_ok());
    }

    #[test]
    fn test_load_missing_files() {
        let files = TlsFiles {
            cert: PathBuf::from("/nonexistent/cert.pem"),
            key: PathBuf::from("/nonexistent/key.pem"),
        };
        assert!(matches!(TlsMaterial::load(&files), Err(ProxyError::Tls(_))));
    }

    #[test]
    fn test_acceptor_rejects_empty_pem() {
        let material = TlsMaterial {
            cert_pem: String::new(),
            key_pem: Zeroizing::new(String::new()),
            generated: false,
        };
        assert!(matches!(material.acceptor(), Err(ProxyError::Tls(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let material = TlsMaterial::self_signed().unwrap();
        assert!(!format!("{:?}", material).contains("PRIVATE KEY"));
    }
}

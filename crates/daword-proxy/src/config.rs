//! Proxy configuration types.
//!
//! Defines the listener, the internal origin, where static assets live and
//! which TLS material to present.

use crate::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

/// Default HTTPS port.
pub const DEFAULT_PORT: u16 = 8444;

/// Default internal origin (docassemble on plain HTTP).
pub const DEFAULT_ORIGIN: &str = "http://localhost";

/// Configuration for the edge proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Bind address (default: all interfaces)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,

    /// HTTPS port (0 = OS-assigned ephemeral port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the internal HTTP origin.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Directory holding `manifest.xml` and `word.js`.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Certificate and key to present. When absent a self-signed
    /// certificate for `localhost` is generated at start-up.
    #[serde(default)]
    pub tls: Option<TlsFiles>,

    /// Maximum concurrent connections (0 = unlimited).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            origin: default_origin(),
            assets_dir: default_assets_dir(),
            tls: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_bind_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_max_connections() -> usize {
    256
}

/// PEM files for the HTTPS listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsFiles {
    /// Certificate chain (PEM)
    pub cert: PathBuf,
    /// Private key (PEM, PKCS#8, PKCS#1 or SEC1)
    pub key: PathBuf,
}

/// The parsed internal origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Host to connect to
    pub host: String,
    /// Port to connect to
    pub port: u16,
    /// Value for the forwarded `Host` header
    pub host_header: String,
}

impl ProxyConfig {
    /// Load a configuration file (JSON). Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProxyError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| ProxyError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Parse and validate the internal origin URL.
    pub fn origin(&self) -> Result<Origin> {
        let parsed = url::Url::parse(&self.origin).map_err(|e| {
            ProxyError::Config(format!("invalid origin URL '{}': {}", self.origin, e))
        })?;

        if parsed.scheme() != "http" {
            return Err(ProxyError::Config(format!(
                "origin must be a plain http URL: {}",
                self.origin
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ProxyError::Config(format!("missing host in origin: {}", self.origin)))?
            .to_string();

        let (port, host_header) = match parsed.port() {
            Some(port) => (port, format!("{}:{}", host, port)),
            None => (80, host.clone()),
        };

        Ok(Origin {
            host,
            port,
            host_header,
        })
    }

    /// Public URL of the proxy, as shown on the status page.
    #[must_use]
    pub fn public_url(&self) -> String {
        format!("https://localhost:{}", self.port)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.bind_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 8444);
        assert_eq!(config.origin, "http://localhost");
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert!(config.tls.is_none());
    }

    #[test]
    fn test_default_origin() {
        let origin = ProxyConfig::default().origin().unwrap();
        assert_eq!(
            origin,
            Origin {
                host: "localhost".to_string(),
                port: 80,
                host_header: "localhost".to_string(),
            }
        );
    }

    #[test]
    fn test_origin_with_port() {
        let config = ProxyConfig {
            origin: "http://127.0.0.1:8080".to_string(),
            ..Default::default()
        };
        let origin = config.origin().unwrap();
        assert_eq!(origin.port, 8080);
        assert_eq!(origin.host_header, "127.0.0.1:8080");
    }

    #[test]
    fn test_origin_rejects_https_and_garbage() {
        for origin in ["https://localhost", "not a url", "ftp://localhost"] {
            let config = ProxyConfig {
                origin: origin.to_string(),
                ..Default::default()
            };
            assert!(config.origin().is_err(), "accepted {}", origin);
        }
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"port": 9443, "tls": {{"cert": "c.pem", "key": "k.pem"}}}}"#
        )
        .unwrap();

        let config = ProxyConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 9443);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.tls.unwrap().cert, PathBuf::from("c.pem"));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "port = 1").unwrap();
        assert!(matches!(
            ProxyConfig::load(file.path()),
            Err(ProxyError::Config(_))
        ));
    }

    #[test]
    fn test_public_url() {
        assert_eq!(ProxyConfig::default().public_url(), "https://localhost:8444");
    }
}

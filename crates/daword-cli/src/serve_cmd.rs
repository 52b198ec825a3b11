//! `serve` subcommand: run the edge proxy until interrupted.

use crate::cli::ServeArgs;
use crate::error::{CliError, Result};
use crate::output;
use daword_proxy::config::TlsFiles;
use daword_proxy::ProxyConfig;
use tracing::info;

/// Merge the optional config file with command-line flags.
///
/// Flags win over the file; the port (`--port` or `PORT`) is applied last.
fn build_config(args: &ServeArgs) -> Result<ProxyConfig> {
    let mut config = match &args.config {
        Some(path) => ProxyConfig::load(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(origin) = &args.origin {
        config.origin.clone_from(origin);
    }
    if let Some(dir) = &args.assets_dir {
        config.assets_dir.clone_from(dir);
    }
    if let (Some(cert), Some(key)) = (&args.cert, &args.key) {
        config.tls = Some(TlsFiles {
            cert: cert.clone(),
            key: key.clone(),
        });
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    Ok(config)
}

pub fn run_serve(args: ServeArgs, silent: bool) -> Result<()> {
    let config = build_config(&args)?;
    let origin = config.origin.clone();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    rt.block_on(async {
        let handle = daword_proxy::start(config).await?;
        output::print_proxy_ready(&handle, &origin, silent);

        let signal = shutdown_signal().await?;
        info!("Received {}, stopping proxy", signal);
        handle.shutdown();
        Ok(())
    })
}

/// Wait for Ctrl+C or, on Unix, SIGTERM. Returns the signal's name.
async fn shutdown_signal() -> Result<&'static str> {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| CliError::Runtime(format!("cannot listen for Ctrl+C: {}", e)))
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())
            .map_err(|e| CliError::Runtime(format!("cannot listen for SIGTERM: {}", e)))?;
        tokio::select! {
            result = ctrl_c => result.map(|()| "Ctrl+C"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.map(|()| "Ctrl+C")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn args() -> ServeArgs {
        ServeArgs {
            config: None,
            port: None,
            origin: None,
            assets_dir: None,
            cert: None,
            key: None,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let config = build_config(&args()).unwrap();
        assert_eq!(config.port, daword_proxy::config::DEFAULT_PORT);
        assert_eq!(config.origin, daword_proxy::config::DEFAULT_ORIGIN);
        assert!(config.tls.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("proxy.json");
        std::fs::write(
            &path,
            r#"{"port": 9000, "origin": "http://from-file", "assets_dir": "file-assets"}"#,
        )
        .unwrap();

        let config = build_config(&ServeArgs {
            config: Some(path),
            port: Some(9443),
            origin: Some("http://from-flag".to_string()),
            ..args()
        })
        .unwrap();
        assert_eq!(config.port, 9443);
        assert_eq!(config.origin, "http://from-flag");
        assert_eq!(config.assets_dir, PathBuf::from("file-assets"));
    }

    #[test]
    fn test_cert_and_key_set_tls() {
        let config = build_config(&ServeArgs {
            cert: Some(PathBuf::from("c.pem")),
            key: Some(PathBuf::from("k.pem")),
            ..args()
        })
        .unwrap();
        let tls = config.tls.unwrap();
        assert_eq!(tls.cert, PathBuf::from("c.pem"));
        assert_eq!(tls.key, PathBuf::from("k.pem"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sigterm_ends_wait() {
        let waiter = tokio::spawn(shutdown_signal());
        // Give the handler time to register before signalling ourselves.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let pid = std::process::id().to_string();
        let status = std::process::Command::new("kill")
            .args(["-TERM", &pid])
            .status()
            .unwrap();
        assert!(status.success());

        let signal = tokio::time::timeout(std::time::Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(signal, "SIGTERM");
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let result = build_config(&ServeArgs {
            config: Some(dir.path().join("absent.json")),
            ..args()
        });
        assert!(matches!(result, Err(CliError::Proxy(_))));
    }
}

//! Proxy server: TLS listener, request dispatch, and lifecycle.
//!
//! Start-up obtains TLS material, loads the static assets and validates the
//! origin before binding; any failure there is fatal. Each accepted
//! connection completes a TLS handshake, then one request is read, routed
//! and answered, and the connection is closed.
//!
//! OPTIONS                -> bare 200 with CORS headers
//! Static override paths  -> local content
//! Forward prefixes       -> [`forward`] handler

use crate::assets::{self, StaticAssets};
use crate::audit;
use crate::config::{Origin, ProxyConfig};
use crate::error::{ProxyError, Result};
use crate::forward;
use crate::headers::{self, parse_header_block, HeaderList};
use crate::route::{request_path, Route};
use crate::tls::TlsMaterial;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn};

/// Maximum total size of HTTP headers (64 KiB).
pub(crate) const MAX_HEADER_SIZE: usize = 64 * 1024;

/// Handle returned when the proxy server starts.
///
/// Drop the handle or call [`ProxyHandle::shutdown`] to stop the proxy.
pub struct ProxyHandle {
    /// The actual port the proxy is listening on
    pub port: u16,
    /// Certificate presented to clients (PEM)
    pub certificate_pem: String,
    /// Whether the certificate was generated at start-up
    pub self_signed: bool,
    shutdown_tx: watch::Sender<bool>,
}

impl ProxyHandle {
    /// Signal the proxy to shut down gracefully.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// A parsed request line and header block.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: HeaderList,
}

/// Shared state for the proxy server.
pub(crate) struct ProxyState {
    config: ProxyConfig,
    origin: Origin,
    assets: StaticAssets,
    status_page: String,
    /// Active connection count for connection limiting.
    active_connections: AtomicUsize,
}

impl ProxyState {
    pub(crate) fn new(config: ProxyConfig, assets: StaticAssets) -> Result<Self> {
        let origin = config.origin()?;
        let status_page = assets::status_page(&config);
        Ok(Self {
            config,
            origin,
            assets,
            status_page,
            active_connections: AtomicUsize::new(0),
        })
    }
}

/// Start the proxy server.
///
/// Binds to `config.bind_addr:config.port` (port 0 = OS-assigned) and
/// begins accepting connections. The server runs until the handle is
/// dropped or `shutdown()` is called.
pub async fn start(config: ProxyConfig) -> Result<ProxyHandle> {
    let tls = TlsMaterial::obtain(&config)?;
    let acceptor = tls.acceptor()?;
    let assets = StaticAssets::load(&config.assets_dir)?;

    let bind_addr = SocketAddr::new(config.bind_addr, config.port);
    let state = Arc::new(ProxyState::new(config, assets)?);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| ProxyError::Bind {
            addr: bind_addr.to_string(),
            source: e,
        })?;
    let local_addr = listener.local_addr().map_err(|e| ProxyError::Bind {
        addr: bind_addr.to_string(),
        source: e,
    })?;

    info!(
        "Edge proxy listening on https://{}, forwarding to {}",
        local_addr, state.config.origin
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(accept_loop(listener, acceptor, state, shutdown_rx));

    Ok(ProxyHandle {
        port: local_addr.port(),
        certificate_pem: tls.cert_pem().to_string(),
        self_signed: tls.is_generated(),
        shutdown_tx,
    })
}

/// Accept loop: listen for connections until shutdown.
async fn accept_loop(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    state: Arc<ProxyState>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        let max = state.config.max_connections;
                        if max > 0 {
                            let current = state.active_connections.load(Ordering::Relaxed);
                            if current >= max {
                                warn!("Connection limit reached ({}/{}), rejecting {}", current, max, addr);
                                drop(stream);
                                continue;
                            }
                        }
                        state.active_connections.fetch_add(1, Ordering::Relaxed);

                        debug!("Accepted connection from {}", addr);
                        let state = Arc::clone(&state);
                        let acceptor = acceptor.clone();
                        tokio::spawn(async move {
                            match acceptor.accept(stream).await {
                                Ok(tls_stream) => {
                                    if let Err(e) = handle_connection(tls_stream, &state).await {
                                        debug!("Connection handler error: {}", e);
                                    }
                                }
                                Err(e) => debug!("TLS handshake with {} failed: {}", addr, e),
                            }
                            state.active_connections.fetch_sub(1, Ordering::Relaxed);
                        });
                    }
                    Err(e) => {
                        warn!("Accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    info!("Edge proxy shutting down");
                    return;
                }
            }
        }
    }
}

/// Handle a single decrypted client connection.
///
/// The write side is always shut down afterwards so a TLS client sees
/// close_notify rather than a truncated stream.
pub(crate) async fn handle_connection<S>(mut stream: S, state: &ProxyState) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = respond(&mut stream, state).await;
    if let Err(e) = stream.shutdown().await {
        debug!("Shutdown after response failed: {}", e);
    }
    result
}

/// Read one request and write its response.
async fn respond<S>(stream: &mut S, state: &ProxyState) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Keep the BufReader alive until the whole head is read; it may read
    // ahead into the body.
    let mut buf_reader = BufReader::new(&mut *stream);
    let mut first_line = String::new();
    headers::read_head_line(&mut buf_reader, &mut first_line).await?;

    if first_line.is_empty() {
        return Ok(()); // Client disconnected
    }

    let mut header_raw = String::new();
    loop {
        let mut line = String::new();
        let n = headers::read_head_line(&mut buf_reader, &mut line).await?;
        if n == 0 || line.trim().is_empty() {
            break;
        }
        header_raw.push_str(&line);
        if header_raw.len() > MAX_HEADER_SIZE {
            drop(buf_reader);
            headers::send_response(
                stream,
                431,
                "Request Header Fields Too Large",
                None,
                b"",
                true,
            )
            .await?;
            return Ok(());
        }
    }

    let buffered = buf_reader.buffer().to_vec();
    drop(buf_reader);

    let request = match parse_request_line(first_line.trim_end()) {
        Ok((method, target, version)) => RequestHead {
            method,
            target,
            version,
            headers: parse_header_block(&header_raw),
        },
        Err(e) => {
            debug!("{}", e);
            headers::send_response(stream, 400, "Bad Request", None, b"", true).await?;
            return Ok(());
        }
    };

    let route = Route::resolve(&request.method, &request.target);
    let include_body = request.method != "HEAD";
    let path = request_path(&request.target);

    let (status, reason, content_type, body): (u16, &str, Option<&str>, &[u8]) = match route {
        Route::Forward => {
            return forward::handle_forward(stream, &request, &state.origin, &buffered).await;
        }
        Route::Preflight => (200, "OK", None, &[]),
        Route::Manifest => (
            200,
            "OK",
            Some("application/xml"),
            state.assets.manifest.as_slice(),
        ),
        Route::TaskPaneScript => (
            200,
            "OK",
            Some("application/javascript"),
            state.assets.task_pane_script.as_slice(),
        ),
        Route::AuthDialog => (
            200,
            "OK",
            Some("text/html; charset=utf-8"),
            assets::AUTH_DIALOG_HTML.as_bytes(),
        ),
        Route::Status => (
            200,
            "OK",
            Some("text/html; charset=utf-8"),
            state.status_page.as_bytes(),
        ),
        Route::NotFound => {
            let body = format!("Cannot {} {}", request.method, path);
            headers::send_response(
                stream,
                404,
                "Not Found",
                Some("text/plain; charset=utf-8"),
                body.as_bytes(),
                include_body,
            )
            .await?;
            audit::log_local(route, &request.method, path, 404);
            return Ok(());
        }
    };

    headers::send_response(stream, status, reason, content_type, body, include_body).await?;
    audit::log_local(route, &request.method, path, status);
    Ok(())
}

/// Parse an HTTP request line into (method, target, version).
fn parse_request_line(line: &str) -> Result<(String, String, String)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 || !parts[2].starts_with("HTTP/") {
        return Err(ProxyError::HttpParse(format!(
            "malformed request line: {}",
            line
        )));
    }
    Ok((
        parts[0].to_string(),
        parts[1].to_string(),
        parts[2].to_string(),
    ))
}

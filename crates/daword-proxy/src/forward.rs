//! Forwarding to the internal origin.
//!
//! The request goes out unchanged apart from `Host`, which names the
//! origin, and `Connection: close`. The response head is parsed so its
//! security headers can be rewritten; the body is then streamed through
//! without buffering.
//!
//! A failure to reach the origin, or an origin that hangs up before
//! answering, becomes a 500 with a plain-text error. Nothing is retried.

use crate::audit;
use crate::config::Origin;
use crate::error::{ProxyError, Result};
use crate::headers::{
    self, apply_edge_headers, parse_header_block, rewrite_response_headers, HeaderList,
};
use crate::route::request_path;
use crate::server::{RequestHead, MAX_HEADER_SIZE};
use tokio::io::{
    AsyncBufRead, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tracing::debug;

/// Maximum request body size (16 MiB).
const MAX_REQUEST_BODY: usize = 16 * 1024 * 1024;

/// Longest accepted chunk-size line, extensions included.
const MAX_CHUNK_LINE: usize = 4096;

/// Request headers that describe the client connection, not the request.
const HOP_BY_HOP: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-connection",
    "content-length",
    "transfer-encoding",
    "expect",
];

/// Origin response headers replaced by the proxy's own.
const RESPONSE_HOP_BY_HOP: &[&str] = &["connection", "keep-alive"];

/// A parsed origin response head.
#[derive(Debug)]
struct ResponseHead {
    status: u16,
    reason: String,
    headers: HeaderList,
}

/// Forward one request to the origin and relay the answer.
///
/// `buffered_body` holds body bytes already read past the request head.
pub async fn handle_forward<S>(
    client: &mut S,
    request: &RequestHead,
    origin: &Origin,
    buffered_body: &[u8],
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let path = request_path(&request.target);
    debug!(
        "Proxying: {} {} -> {}:{}{}",
        request.method, request.target, origin.host, origin.port, request.target
    );

    let chunked = headers::get(&request.headers, "transfer-encoding")
        .is_some_and(|te| te.to_ascii_lowercase().contains("chunked"));

    let content_length = if chunked {
        None
    } else {
        match headers::get(&request.headers, "content-length") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(len) => Some(len),
                Err(_) => {
                    headers::send_response(client, 400, "Bad Request", None, b"", true).await?;
                    return Ok(());
                }
            },
            None => None,
        }
    };

    if content_length.is_some_and(|len| len > MAX_REQUEST_BODY) {
        headers::send_response(client, 413, "Payload Too Large", None, b"", true).await?;
        return Ok(());
    }

    let expects_continue = headers::get(&request.headers, "expect")
        .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"));
    if expects_continue && (chunked || content_length.is_some_and(|len| len > buffered_body.len()))
    {
        client.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await?;
        client.flush().await?;
    }

    let body = if chunked {
        match read_chunked_body(client, buffered_body).await? {
            ChunkedBody::Complete(body) => body,
            ChunkedBody::TooLarge => {
                headers::send_response(client, 413, "Payload Too Large", None, b"", true).await?;
                return Ok(());
            }
            ChunkedBody::Malformed(reason) => {
                debug!("Rejecting chunked body: {}", reason);
                headers::send_response(client, 400, "Bad Request", None, b"", true).await?;
                return Ok(());
            }
        }
    } else {
        read_body(client, content_length, buffered_body).await?
    };
    let framed_length = (chunked || content_length.is_some()).then_some(body.len());
    let outgoing = build_origin_request(request, origin, framed_length);

    let mut upstream = match exchange(origin, &outgoing, &body).await {
        Ok(upstream) => upstream,
        Err(e) => return send_proxy_error(client, request, path, origin, &e).await,
    };

    let head = match read_response_head(&mut upstream).await {
        Ok(head) => head,
        Err(e) => return send_proxy_error(client, request, path, origin, &e).await,
    };

    let mut response_headers = head.headers;
    response_headers.retain(|(name, _)| {
        !RESPONSE_HOP_BY_HOP
            .iter()
            .any(|h| name.eq_ignore_ascii_case(h))
    });
    apply_edge_headers(&mut response_headers);
    rewrite_response_headers(&mut response_headers);
    response_headers.push(("Connection".to_string(), "close".to_string()));

    client
        .write_all(&headers::encode_head(&headers::render_head(
            head.status,
            &head.reason,
            &response_headers,
        )))
        .await?;

    // Origin closes after the response because we asked for Connection: close,
    // so EOF marks the end of the body regardless of its framing.
    if let Err(e) = tokio::io::copy(&mut upstream, client).await {
        debug!("Origin body relay ended early: {}", e);
    }
    client.flush().await?;

    audit::log_forwarded(&request.method, path, &origin.host_header, head.status);
    Ok(())
}

/// Read the request body: buffered bytes first, then the rest from the client.
async fn read_body<S>(
    client: &mut S,
    content_length: Option<usize>,
    buffered_body: &[u8],
) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let Some(len) = content_length else {
        return Ok(Vec::new());
    };

    let mut buf = Vec::with_capacity(len);
    let pre = buffered_body.len().min(len);
    buf.extend_from_slice(&buffered_body[..pre]);
    let remaining = len - pre;
    if remaining > 0 {
        let mut rest = vec![0u8; remaining];
        client.read_exact(&mut rest).await?;
        buf.extend_from_slice(&rest);
    }
    Ok(buf)
}

/// Outcome of decoding a chunked request body.
#[derive(Debug, PartialEq, Eq)]
enum ChunkedBody {
    Complete(Vec<u8>),
    TooLarge,
    Malformed(String),
}

/// Decode a `Transfer-Encoding: chunked` body so it can be re-framed with
/// `Content-Length`. Trailers are read and dropped.
async fn read_chunked_body<S>(client: &mut S, buffered_body: &[u8]) -> Result<ChunkedBody>
where
    S: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(buffered_body.chain(client));
    let mut body = Vec::new();

    loop {
        let mut size_line = String::new();
        if headers::read_head_line(&mut reader, &mut size_line).await? == 0 {
            return Ok(ChunkedBody::Malformed("body ended before the last chunk".to_string()));
        }
        if size_line.len() > MAX_CHUNK_LINE {
            return Ok(ChunkedBody::Malformed("chunk size line too long".to_string()));
        }
        let size_field = size_line
            .split(';')
            .next()
            .unwrap_or("")
            .trim();
        let Ok(size) = usize::from_str_radix(size_field, 16) else {
            return Ok(ChunkedBody::Malformed(format!(
                "invalid chunk size: {:?}",
                size_field
            )));
        };

        if size == 0 {
            break;
        }
        if body.len().saturating_add(size) > MAX_REQUEST_BODY {
            return Ok(ChunkedBody::TooLarge);
        }

        let start = body.len();
        body.resize(start + size, 0);
        reader.read_exact(&mut body[start..]).await?;

        let mut crlf = String::new();
        headers::read_head_line(&mut reader, &mut crlf).await?;
        if !crlf.trim().is_empty() {
            return Ok(ChunkedBody::Malformed("chunk not followed by CRLF".to_string()));
        }
    }

    let mut trailers = 0usize;
    loop {
        let mut line = String::new();
        let n = headers::read_head_line(&mut reader, &mut line).await?;
        if n == 0 || line.trim().is_empty() {
            break;
        }
        trailers += n;
        if trailers > MAX_HEADER_SIZE {
            return Ok(ChunkedBody::Malformed("chunk trailers too large".to_string()));
        }
    }

    Ok(ChunkedBody::Complete(body))
}

/// Build the request head sent to the origin.
fn build_origin_request(
    request: &RequestHead,
    origin: &Origin,
    content_length: Option<usize>,
) -> String {
    let mut out = format!(
        "{} {} {}\r\nHost: {}\r\n",
        request.method, request.target, request.version, origin.host_header
    );

    for (name, value) in &request.headers {
        if HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h)) {
            continue;
        }
        out.push_str(&format!("{}: {}\r\n", name, value));
    }

    if let Some(len) = content_length {
        out.push_str(&format!("Content-Length: {}\r\n", len));
    }
    out.push_str("Connection: close\r\n\r\n");
    out
}

/// Connect to the origin and send the request.
async fn exchange(origin: &Origin, request: &str, body: &[u8]) -> Result<BufReader<TcpStream>> {
    let mut stream = TcpStream::connect((origin.host.as_str(), origin.port))
        .await
        .map_err(|e| ProxyError::UpstreamConnect {
            host: origin.host_header.clone(),
            reason: e.to_string(),
        })?;

    stream.write_all(&headers::encode_head(request)).await?;
    if !body.is_empty() {
        stream.write_all(body).await?;
    }
    stream.flush().await?;
    Ok(BufReader::new(stream))
}

/// Read the status line and headers of the origin response.
async fn read_response_head<R>(reader: &mut R) -> Result<ResponseHead>
where
    R: AsyncBufRead + Unpin,
{
    let mut status_line = String::new();
    if headers::read_head_line(reader, &mut status_line).await? == 0 {
        return Err(ProxyError::HttpParse(
            "origin closed the connection without responding".to_string(),
        ));
    }
    let (status, reason) = parse_status_line(status_line.trim_end())?;

    let mut raw = String::new();
    loop {
        let mut line = String::new();
        let n = headers::read_head_line(reader, &mut line).await?;
        if n == 0 || line.trim().is_empty() {
            break;
        }
        raw.push_str(&line);
        if raw.len() > MAX_HEADER_SIZE {
            return Err(ProxyError::HttpParse(
                "origin response headers too large".to_string(),
            ));
        }
    }

    Ok(ResponseHead {
        status,
        reason,
        headers: parse_header_block(&raw),
    })
}

/// Parse `HTTP/1.1 200 OK` into `(200, "OK")`.
fn parse_status_line(line: &str) -> Result<(u16, String)> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    let code = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") || code.len() != 3 {
        return Err(ProxyError::HttpParse(format!(
            "malformed status line from origin: {}",
            line
        )));
    }
    let status = code
        .parse::<u16>()
        .map_err(|_| ProxyError::HttpParse(format!("invalid status code: {}", code)))?;
    let reason = parts.next().unwrap_or("").to_string();
    Ok((status, reason))
}

async fn send_proxy_error<S>(
    client: &mut S,
    request: &RequestHead,
    path: &str,
    origin: &Origin,
    error: &ProxyError,
) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let message = error.to_string();
    audit::log_proxy_error(&request.method, path, &origin.host_header, &message);
    let body = format!("Proxy Error: {}", message);
    headers::send_response(
        client,
        500,
        "Internal Server Error",
        Some("text/plain; charset=utf-8"),
        body.as_bytes(),
        true,
    )
    .await?;
    Ok(())
}

//! Response header contract.
//!
//! Every response leaving the proxy carries permissive CORS headers and
//! framing headers that let Office web hosts embed the page. Responses from
//! the internal origin get their framing headers overwritten and the legacy
//! CSP variants removed, whatever the origin sent.

use std::fmt::Write as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// `X-Frame-Options` value sent on every response.
pub const X_FRAME_OPTIONS: &str = "ALLOWALL";

/// `Content-Security-Policy` value sent on every response.
pub const FRAME_ANCESTORS_CSP: &str = "frame-ancestors https://*.officeapps.live.com \
https://*.office.com https://*.sharepoint.com https://*.microsoftonline.com \
https://*.office365.com *";

/// Headers set on every response before routing.
pub const EDGE_HEADERS: [(&str, &str); 7] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "Origin, X-Requested-With, Content-Type, Accept, Authorization",
    ),
    (
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, DELETE, OPTIONS",
    ),
    ("X-Frame-Options", X_FRAME_OPTIONS),
    ("Content-Security-Policy", FRAME_ANCESTORS_CSP),
    ("X-Content-Type-Options", "nosniff"),
    ("X-XSS-Protection", "1; mode=block"),
];

/// CSP header variants that must never reach the client.
const LEGACY_CSP_HEADERS: &[&str] = &["x-content-security-policy", "x-webkit-csp"];

/// An ordered list of response headers.
pub type HeaderList = Vec<(String, String)>;

fn remove(headers: &mut HeaderList, name: &str) {
    headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
}

/// Replace any origin values for the edge headers with the edge values.
pub fn apply_edge_headers(headers: &mut HeaderList) {
    for (name, value) in EDGE_HEADERS {
        remove(headers, name);
        headers.push((name.to_string(), value.to_string()));
    }
}

/// Force the framing headers and strip legacy CSP variants.
pub fn rewrite_response_headers(headers: &mut HeaderList) {
    for legacy in LEGACY_CSP_HEADERS {
        remove(headers, legacy);
    }
    remove(headers, "x-frame-options");
    remove(headers, "content-security-policy");
    headers.push(("X-Frame-Options".to_string(), X_FRAME_OPTIONS.to_string()));
    headers.push((
        "Content-Security-Policy".to_string(),
        FRAME_ANCESTORS_CSP.to_string(),
    ));
}

/// Look up a header value (case-insensitive name).
#[must_use]
pub fn get<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Read one head line as raw bytes and append it to `out`.
///
/// Header bytes need not be UTF-8 (obs-text), so each byte maps to the
/// char with the same value; [`encode_head`] reverses this exactly.
/// Returns the number of bytes read, 0 at end of stream.
pub async fn read_head_line<R>(reader: &mut R, out: &mut String) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut buf = Vec::new();
    let n = reader.read_until(b'\n', &mut buf).await?;
    out.extend(buf.iter().map(|&b| char::from(b)));
    Ok(n)
}

/// Turn head text produced by [`read_head_line`] back into wire bytes.
///
/// Chars above U+00FF cannot come from the wire and are sent as `?`.
#[must_use]
pub fn encode_head(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Parse `Name: value` lines. Lines without a colon are skipped.
#[must_use]
pub fn parse_header_block(raw: &str) -> HeaderList {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Render a status line and header block, terminated by a blank line.
#[must_use]
pub fn render_head(status: u16, reason: &str, headers: &[(String, String)]) -> String {
    let mut head = format!("HTTP/1.1 {} {}\r\n", status, reason);
    for (name, value) in headers {
        let _ = write!(head, "{}: {}\r\n", name, value);
    }
    head.push_str("\r\n");
    head
}

/// Write a complete locally generated response with the edge headers.
///
/// With `include_body` false (HEAD requests) only the head is written.
pub async fn send_response<S>(
    stream: &mut S,
    status: u16,
    reason: &str,
    content_type: Option<&str>,
    body: &[u8],
    include_body: bool,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    let mut headers = HeaderList::new();
    apply_edge_headers(&mut headers);
    if let Some(ct) = content_type {
        headers.push(("Content-Type".to_string(), ct.to_string()));
    }
    headers.push(("Content-Length".to_string(), body.len().to_string()));
    headers.push(("Connection".to_string(), "close".to_string()));

    stream
        .write_all(&encode_head(&render_head(status, reason, &headers)))
        .await?;
    if include_body {
        stream.write_all(body).await?;
    }
    stream.flush().await
}

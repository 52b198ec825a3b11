//! Locally served content.
//!
//! `manifest.xml` and `word.js` are read from the assets directory once at
//! start-up; a missing file stops the proxy before it binds. The login
//! dialog is compiled in.

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use std::path::Path;
use tracing::info;

pub const MANIFEST_FILE: &str = "manifest.xml";
pub const TASK_PANE_SCRIPT_FILE: &str = "word.js";

/// Self-contained login page opened through the Office dialog API.
pub const AUTH_DIALOG_HTML: &str = include_str!("../assets/auth-dialog.html");

/// Files loaded from the assets directory.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    pub manifest: Vec<u8>,
    pub task_pane_script: Vec<u8>,
}

impl StaticAssets {
    /// Read every asset from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest = read_asset(dir, MANIFEST_FILE)?;
        let task_pane_script = read_asset(dir, TASK_PANE_SCRIPT_FILE)?;
        info!("Loaded static assets from {}", dir.display());
        Ok(Self {
            manifest,
            task_pane_script,
        })
    }
}

fn read_asset(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let path = dir.join(name);
    std::fs::read(&path).map_err(|source| ProxyError::Asset { path, source })
}

/// Help page served at `/`.
#[must_use]
pub fn status_page(config: &ProxyConfig) -> String {
    let public = config.public_url();
    let origin = &config.origin;
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>DocAssemble Word Add-in HTTPS Proxy</title></head>
<body>
<h1>DocAssemble Word Add-in HTTPS Proxy</h1>
<p>Proxy server running on port {port}</p>
<p>Forwarding requests to: {origin}</p>

<h2>Add-in Files:</h2>
<ul>
  <li><a href="/manifest.xml">Manifest (manifest.xml)</a></li>
  <li><a href="/officetaskpane">Task Pane (proxied from DocAssemble)</a></li>
  <li><a href="/officefunctionfile">Function File (proxied from DocAssemble)</a></li>
  <li><a href="/favicon.ico">Icon (proxied from DocAssemble)</a></li>
</ul>

<h2>Status:</h2>
<ul>
  <li>HTTPS enabled</li>
  <li>CORS headers configured for Office Add-ins</li>
  <li>Proxying to DocAssemble: {origin}</li>
</ul>

<h2>Installation Instructions:</h2>
<ol>
  <li>Open Word Online or Desktop Word</li>
  <li>Go to Insert &rarr; Add-ins &rarr; Upload My Add-in</li>
  <li>Select the manifest.xml file from this server</li>
  <li>The DocAssemble add-in should appear in the Home ribbon</li>
</ol>

<p><strong>Manifest URL:</strong> <code>{public}/manifest.xml</code></p>
</body>
</html>
"#,
        port = config.port,
        origin = origin,
        public = public,
    )
}

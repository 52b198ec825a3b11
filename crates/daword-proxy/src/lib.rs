//! HTTPS edge proxy for the docassemble Word add-in.
//!
//! Office only embeds task panes served over HTTPS from origins that allow
//! framing. The docassemble server speaks plain HTTP and forbids framing,
//! so this proxy sits in front of it:
//!
//! 1. **TLS termination** (`tls`) - a supplied certificate, or a self-signed
//!    one for `localhost` generated at start-up.
//!
//! 2. **Static overrides** (`assets`) - the add-in manifest, the task-pane
//!    script, the login dialog and a status page are served locally.
//!
//! 3. **Forwarding** (`forward`) - allow-listed paths go to the internal
//!    origin unchanged apart from `Host`. Response security headers are
//!    rewritten so Office frames can embed the result.
//!
//! Every response carries the CORS and framing headers from `headers`.

pub mod assets;
pub mod audit;
pub mod config;
pub mod error;
pub mod forward;
pub mod headers;
pub mod route;
pub mod server;
pub mod tls;

pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use server::{start, ProxyHandle};

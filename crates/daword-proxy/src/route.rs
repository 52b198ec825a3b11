//! Request routing.
//!
//! Static overrides are matched first, so the local task-pane script always
//! wins over the `/static` forward prefix.

/// Path prefixes forwarded to the internal origin.
pub const FORWARD_PREFIXES: &[&str] = &[
    "/officetaskpane",
    "/officefunctionfile",
    "/static",
    "/favicon.ico",
    "/user",
    "/config",
    "/utilities",
];

pub const MANIFEST_PATH: &str = "/manifest.xml";
pub const TASK_PANE_SCRIPT_PATH: &str = "/static/office/word.js";
pub const AUTH_DIALOG_PATH: &str = "/office-auth-dialog";
pub const STATUS_PATH: &str = "/";

/// Where a request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// CORS preflight, answered with a bare 200
    Preflight,
    Manifest,
    TaskPaneScript,
    AuthDialog,
    Status,
    /// Pass through to the internal origin
    Forward,
    NotFound,
}

impl Route {
    /// Resolve a request by method and request target (path plus query).
    #[must_use]
    pub fn resolve(method: &str, target: &str) -> Self {
        if method.eq_ignore_ascii_case("OPTIONS") {
            return Route::Preflight;
        }

        let path = request_path(target);
        let is_get = method == "GET" || method == "HEAD";

        if is_get {
            match path {
                MANIFEST_PATH => return Route::Manifest,
                TASK_PANE_SCRIPT_PATH => return Route::TaskPaneScript,
                AUTH_DIALOG_PATH => return Route::AuthDialog,
                STATUS_PATH => return Route::Status,
                _ => {}
            }
        }

        if FORWARD_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
            Route::Forward
        } else {
            Route::NotFound
        }
    }

    /// Name used in audit logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Route::Preflight => "preflight",
            Route::Manifest => "manifest",
            Route::TaskPaneScript => "task_pane_script",
            Route::AuthDialog => "auth_dialog",
            Route::Status => "status",
            Route::Forward => "forward",
            Route::NotFound => "not_found",
        }
    }
}

/// The path portion of a request target, without query or fragment.
#[must_use]
pub fn request_path(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

/// Mount-point matching: `/user` matches `/user` and `/user/sign-in`,
/// not `/username`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_is_preflight_everywhere() {
        assert_eq!(Route::resolve("OPTIONS", "*"), Route::Preflight);
        assert_eq!(Route::resolve("OPTIONS", "/user/sign-in"), Route::Preflight);
        assert_eq!(Route::resolve("OPTIONS", "/nowhere"), Route::Preflight);
    }

    #[test]
    fn test_static_routes() {
        assert_eq!(Route::resolve("GET", "/manifest.xml"), Route::Manifest);
        assert_eq!(Route::resolve("GET", "/office-auth-dialog"), Route::AuthDialog);
        assert_eq!(Route::resolve("GET", "/"), Route::Status);
        assert_eq!(Route::resolve("HEAD", "/manifest.xml"), Route::Manifest);
    }

    #[test]
    fn test_script_override_ignores_query() {
        for target in [
            "/static/office/word.js",
            "/static/office/word.js?foo=1",
            "/static/office/word.js?v=2&x=%20y",
        ] {
            assert_eq!(Route::resolve("GET", target), Route::TaskPaneScript);
        }
    }

    #[test]
    fn test_other_static_paths_forward() {
        assert_eq!(Route::resolve("GET", "/static/office/word.css"), Route::Forward);
        assert_eq!(Route::resolve("GET", "/static/app/bundle.js?v=1"), Route::Forward);
        assert_eq!(Route::resolve("POST", "/static/office/word.js"), Route::Forward);
    }

    #[test]
    fn test_forward_prefixes() {
        assert_eq!(Route::resolve("GET", "/officetaskpane"), Route::Forward);
        assert_eq!(Route::resolve("GET", "/officefunctionfile"), Route::Forward);
        assert_eq!(Route::resolve("GET", "/favicon.ico"), Route::Forward);
        assert_eq!(Route::resolve("POST", "/user/sign-in"), Route::Forward);
        assert_eq!(Route::resolve("GET", "/config/foo?x=1"), Route::Forward);
        assert_eq!(Route::resolve("DELETE", "/utilities/bar"), Route::Forward);
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(Route::resolve("GET", "/username"), Route::NotFound);
        assert_eq!(Route::resolve("GET", "/interview"), Route::NotFound);
        assert_eq!(Route::resolve("POST", "/manifest.xml"), Route::NotFound);
        assert_eq!(Route::resolve("POST", "/"), Route::NotFound);
    }

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("/a/b?c=d"), "/a/b");
        assert_eq!(request_path("/a#frag"), "/a");
        assert_eq!(request_path("/a"), "/a");
    }
}

//! Client-held session marker.
//!
//! The backend owns the real session. The task pane only remembers which
//! server it signed in to, in a `daServer` cookie that lives for 30 days.

use chrono::{DateTime, TimeDelta, Utc};

/// Cookie that holds the signed-in server URL.
pub const SESSION_COOKIE: &str = "daServer";

/// Lifetime of the session cookie in days.
pub const SESSION_LIFETIME_DAYS: i64 = 30;

/// The remembered sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Server URL the user signed in to
    pub server: String,
}

impl SessionRecord {
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
        }
    }

    /// Lifetime applied when the record is stored.
    #[must_use]
    pub fn lifetime() -> TimeDelta {
        TimeDelta::days(SESSION_LIFETIME_DAYS)
    }

    /// Render the cookie assignment for this record, expiring 30 days after `now`.
    #[must_use]
    pub fn set_cookie(&self, now: DateTime<Utc>) -> String {
        let expires = now + Self::lifetime();
        format!(
            "{}={}; expires={}; path=/",
            SESSION_COOKIE,
            urlencoding::encode(&self.server),
            expires.format("%a, %d %b %Y %H:%M:%S GMT")
        )
    }

    /// Cookie assignment that removes the record.
    #[must_use]
    pub fn clear_cookie() -> String {
        format!(
            "{}=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/",
            SESSION_COOKIE
        )
    }

    /// Find the record in a `Cookie` header value.
    #[must_use]
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| {
                let decoded = urlencoding::decode(value).ok()?;
                if decoded.is_empty() {
                    None
                } else {
                    Some(Self::new(decoded.into_owned()))
                }
            })
    }
}

/// Where the task pane keeps its session record.
pub trait SessionStore {
    /// Return the stored record, if any and not expired.
    fn load(&self) -> Option<SessionRecord>;

    /// Store a record until `expires`.
    fn save(&mut self, record: SessionRecord, expires: DateTime<Utc>);

    /// Forget the stored record.
    fn clear(&mut self);
}

/// Store kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entry: Option<(SessionRecord, DateTime<Utc>)>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiry of the stored record.
    #[must_use]
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|(_, expires)| *expires)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<SessionRecord> {
        match &self.entry {
            Some((record, expires)) if *expires > Utc::now() => Some(record.clone()),
            _ => None,
        }
    }

    fn save(&mut self, record: SessionRecord, expires: DateTime<Utc>) {
        self.entry = Some((record, expires));
    }

    fn clear(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_set_cookie_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = SessionRecord::new("https://localhost:8444");
        assert_eq!(
            record.set_cookie(now),
            "daServer=https%3A%2F%2Flocalhost%3A8444; expires=Sun, 31 Mar 2024 12:00:00 GMT; path=/"
        );
    }

    #[test]
    fn test_from_cookie_header() {
        let header = "theme=dark; daServer=https%3A%2F%2Fda.example.org; other=1";
        let record = SessionRecord::from_cookie_header(header).unwrap();
        assert_eq!(record.server, "https://da.example.org");
    }

    #[test]
    fn test_from_cookie_header_missing_or_empty() {
        assert!(SessionRecord::from_cookie_header("theme=dark").is_none());
        assert!(SessionRecord::from_cookie_header("daServer=").is_none());
        assert!(SessionRecord::from_cookie_header("").is_none());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemorySessionStore::new();
        assert!(store.load().is_none());

        let expires = Utc::now() + SessionRecord::lifetime();
        store.save(SessionRecord::new("https://localhost:8444"), expires);
        assert_eq!(store.load().unwrap().server, "https://localhost:8444");
        assert_eq!(store.expires(), Some(expires));

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_memory_store_ignores_expired_record() {
        let mut store = MemorySessionStore::new();
        store.save(
            SessionRecord::new("https://localhost:8444"),
            Utc::now() - TimeDelta::seconds(1),
        );
        assert!(store.load().is_none());
    }
}

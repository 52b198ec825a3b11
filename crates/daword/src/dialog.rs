//! Login dialog protocol.
//!
//! The login page posts a JSON message to its opener through the host's
//! dialog channel. The host also reports dialog events by numeric code.
//! Both are folded into one typed [`DialogEvent`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Host code reported when the user closes the dialog window.
pub const DIALOG_DISMISSED_CODE: i64 = 12006;

/// Message the login page sends to its opener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogMessage {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DialogMessage {
    /// Message for a successful sign-in at `timestamp_ms`.
    #[must_use]
    pub fn succeeded(server: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            success: true,
            server: Some(server.into()),
            session_info: Some(serde_json::json!({
                "authenticated": true,
                "timestamp": timestamp_ms,
            })),
            error: None,
        }
    }

    /// Message for a failed sign-in.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            server: None,
            session_info: None,
            error: Some(error.into()),
        }
    }

    /// Serialize for the dialog channel.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Dialog(e.to_string()))
    }
}

/// Everything the task pane can hear from the login dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// Sign-in succeeded. `server` is absent when the page did not say.
    Succeeded { server: Option<String> },
    /// Sign-in failed with the page's error text.
    Failed { error: Option<String> },
    /// The user closed the dialog.
    Dismissed,
    /// Any other host-reported dialog error.
    HostError { code: i64 },
    /// The message could not be understood.
    Malformed { detail: String },
}

impl DialogEvent {
    /// Parse a message posted by the login page.
    #[must_use]
    pub fn from_message(raw: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(raw).and_then(|value| {
            if value.is_object() {
                serde_json::from_value::<DialogMessage>(value)
            } else {
                Err(serde::de::Error::custom("dialog message is not a JSON object"))
            }
        });
        match parsed {
            Ok(msg) if msg.success => DialogEvent::Succeeded { server: msg.server },
            Ok(msg) => DialogEvent::Failed { error: msg.error },
            Err(e) => DialogEvent::Malformed {
                detail: e.to_string(),
            },
        }
    }

    /// Map a host dialog event code.
    #[must_use]
    pub fn from_host_code(code: i64) -> Self {
        if code == DIALOG_DISMISSED_CODE {
            DialogEvent::Dismissed
        } else {
            DialogEvent::HostError { code }
        }
    }
}

/// Email and password collected by the login page.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Both fields are required; nothing is sent otherwise.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let email = email.into();
        let password = password.into();
        if email.is_empty() || password.is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(Self { email, password })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// `application/x-www-form-urlencoded` body for `/user/sign-in`.
    #[must_use]
    pub fn form_body(&self) -> String {
        format!(
            "email={}&password={}",
            urlencoding::encode(&self.email),
            urlencoding::encode(&self.password)
        )
    }
}

/// How the sign-in endpoint answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    Success,
    InvalidCredentials,
    Failed,
}

impl SignInOutcome {
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => SignInOutcome::Success,
            401 => SignInOutcome::InvalidCredentials,
            _ => SignInOutcome::Failed,
        }
    }

    /// Inline message shown on the login form, if any.
    #[must_use]
    pub fn message(self) -> Option<&'static str> {
        match self {
            SignInOutcome::Success => None,
            SignInOutcome::InvalidCredentials => Some("Invalid credentials"),
            SignInOutcome::Failed => Some("Authentication failed"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_message_round_trip() {
        let json = DialogMessage::succeeded("https://localhost:8444", 1_700_000_000_000)
            .to_json()
            .unwrap();
        assert!(json.contains("\"sessionInfo\""));
        assert_eq!(
            DialogEvent::from_message(&json),
            DialogEvent::Succeeded {
                server: Some("https://localhost:8444".to_string())
            }
        );
    }

    #[test]
    fn test_failure_message() {
        let json = r#"{"success": false, "error": "Invalid credentials"}"#;
        assert_eq!(
            DialogEvent::from_message(json),
            DialogEvent::Failed {
                error: Some("Invalid credentials".to_string())
            }
        );
    }

    #[test]
    fn test_success_without_server() {
        assert_eq!(
            DialogEvent::from_message(r#"{"success": true}"#),
            DialogEvent::Succeeded { server: None }
        );
    }

    #[test]
    fn test_malformed_messages() {
        for raw in ["", "not json", "{}", r#"{"success": "yes"}"#, "[true]"] {
            assert!(
                matches!(DialogEvent::from_message(raw), DialogEvent::Malformed { .. }),
                "expected malformed for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_sequence_is_not_a_message() {
        for raw in ["[true]", "[true, \"https://x\"]", "true", "\"success\""] {
            let event = DialogEvent::from_message(raw);
            assert!(
                !matches!(event, DialogEvent::Succeeded { .. }),
                "{:?} must not sign in",
                raw
            );
            assert!(matches!(event, DialogEvent::Malformed { .. }));
        }
    }

    #[test]
    fn test_host_codes() {
        assert_eq!(DialogEvent::from_host_code(12006), DialogEvent::Dismissed);
        assert_eq!(
            DialogEvent::from_host_code(12002),
            DialogEvent::HostError { code: 12002 }
        );
    }

    #[test]
    fn test_credentials_required() {
        assert!(matches!(
            Credentials::new("", "secret"),
            Err(Error::MissingCredentials)
        ));
        assert!(matches!(
            Credentials::new("a@b.c", ""),
            Err(Error::MissingCredentials)
        ));
    }

    #[test]
    fn test_form_body_is_url_encoded() {
        let creds = Credentials::new("jane+law@example.com", "p&ss word").unwrap();
        assert_eq!(
            creds.form_body(),
            "email=jane%2Blaw%40example.com&password=p%26ss%20word"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.c", "hunter2").unwrap();
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn test_sign_in_outcome() {
        assert_eq!(SignInOutcome::from_status(200), SignInOutcome::Success);
        assert_eq!(SignInOutcome::from_status(302), SignInOutcome::Failed);
        assert_eq!(
            SignInOutcome::from_status(401).message(),
            Some("Invalid credentials")
        );
        assert_eq!(
            SignInOutcome::from_status(500).message(),
            Some("Authentication failed")
        );
    }
}

//! Legal clause library and insertion.

use crate::document::DocumentHost;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{error, info};

/// Key of a built-in clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseKey {
    Liability,
    Confidentiality,
    Termination,
    Dispute,
    Indemnification,
    ForceMajeure,
}

impl ClauseKey {
    /// All keys, in the order the task pane lists them.
    pub const ALL: [ClauseKey; 6] = [
        ClauseKey::Liability,
        ClauseKey::Confidentiality,
        ClauseKey::Termination,
        ClauseKey::Dispute,
        ClauseKey::Indemnification,
        ClauseKey::ForceMajeure,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ClauseKey::Liability => "liability",
            ClauseKey::Confidentiality => "confidentiality",
            ClauseKey::Termination => "termination",
            ClauseKey::Dispute => "dispute",
            ClauseKey::Indemnification => "indemnification",
            ClauseKey::ForceMajeure => "force_majeure",
        }
    }

    /// Label shown in the clause picker.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ClauseKey::Liability => "Liability Limitation",
            ClauseKey::Confidentiality => "Confidentiality",
            ClauseKey::Termination => "Termination",
            ClauseKey::Dispute => "Dispute Resolution",
            ClauseKey::Indemnification => "Indemnification",
            ClauseKey::ForceMajeure => "Force Majeure",
        }
    }

    fn body(self) -> &'static str {
        match self {
            ClauseKey::Liability => "LIMITATION OF LIABILITY: In no event shall either party be liable for any indirect, incidental, special, consequential or punitive damages, including without limitation, loss of profits, data, use, goodwill, or other intangible losses, resulting from the use of this service.",
            ClauseKey::Confidentiality => "CONFIDENTIALITY: Each party acknowledges that it may have access to certain confidential information of the other party. Each party agrees to maintain confidentiality and not disclose such information to third parties without prior written consent.",
            ClauseKey::Termination => "TERMINATION: This agreement may be terminated by either party with thirty (30) days written notice. Upon termination, all rights and obligations shall cease except those that by their nature should survive termination.",
            ClauseKey::Dispute => "DISPUTE RESOLUTION: Any disputes arising under this agreement shall be resolved through binding arbitration in accordance with the rules of the American Arbitration Association in the jurisdiction where this agreement was executed.",
            ClauseKey::Indemnification => "INDEMNIFICATION: Each party shall indemnify, defend and hold harmless the other party from and against any and all claims, damages, losses, costs and expenses arising out of or resulting from their breach of this agreement.",
            ClauseKey::ForceMajeure => "FORCE MAJEURE: Neither party shall be liable for any failure or delay in performance under this agreement which is due to fire, flood, earthquake, elements of nature or acts of God, acts of war, terrorism, riots, civil disorders, rebellions or other similar causes beyond the reasonable control of such party.",
        }
    }
}

impl fmt::Display for ClauseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClauseKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ClauseKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::ClauseNotFound { key: s.to_string() })
    }
}

/// Immutable clause table, built once at start-up.
#[derive(Debug, Clone)]
pub struct ClauseLibrary {
    clauses: BTreeMap<ClauseKey, &'static str>,
}

impl ClauseLibrary {
    /// The built-in legal clauses.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            clauses: ClauseKey::ALL.into_iter().map(|k| (k, k.body())).collect(),
        }
    }

    /// Look up a clause body by its string key.
    pub fn get(&self, key: &str) -> Result<&'static str> {
        let parsed: ClauseKey = key.parse()?;
        self.clauses
            .get(&parsed)
            .copied()
            .ok_or_else(|| Error::ClauseNotFound {
                key: key.to_string(),
            })
    }

    /// Iterate over `(key, body)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ClauseKey, &'static str)> + '_ {
        self.clauses.iter().map(|(k, v)| (*k, *v))
    }
}

impl Default for ClauseLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Insert a clause at the end of the current selection.
///
/// The clause is padded with a blank line on each side and written in one
/// host call. An unknown key fails before the host is touched.
pub fn insert_clause<H: DocumentHost + ?Sized>(
    host: &mut H,
    library: &ClauseLibrary,
    key: &str,
) -> Result<()> {
    let body = match library.get(key) {
        Ok(body) => body,
        Err(e) => {
            error!("Clause not found: {}", key);
            return Err(e);
        }
    };

    info!("Inserting clause: {}", key);
    let text = format!("\n\n{}\n\n", body);
    host.insert_at_selection_end(&text).inspect_err(|e| {
        error!("Error inserting clause: {}", e);
    })
}

//! Task-pane core for the docassemble Word add-in.
//!
//! The add-in runs inside the Office host and offers three things on top of
//! the docassemble task pane:
//!
//! 1. **Sign-in flow** (`taskpane`, `dialog`, `session`) - a login dialog
//!    opened through the host dialog API. A successful sign-in is remembered
//!    in a `daServer` cookie for 30 days.
//!
//! 2. **Template scanner** (`placeholder`, `interview`) - finds
//!    `{{ variable }}` placeholders in the open document and turns them into
//!    an interview question block.
//!
//! 3. **Clause library** (`clause`) - inserts canned legal clauses at the
//!    current selection.
//!
//! Every document access goes through [`DocumentHost`], so the same logic
//! drives a real host binding, the CLI and the tests.

pub mod clause;
pub mod dialog;
pub mod document;
pub mod error;
pub mod interview;
pub mod placeholder;
pub mod session;
pub mod taskpane;

pub use clause::{insert_clause, ClauseKey, ClauseLibrary};
pub use dialog::{Credentials, DialogEvent, DialogMessage, SignInOutcome};
pub use document::{scan_document, DocumentHost, MemoryDocument};
pub use error::{Error, Result};
pub use interview::{create_interview, interview_template, Interview, InterviewOutcome};
pub use placeholder::{question_from_variable, scan_text, Placeholder};
pub use session::{MemorySessionStore, SessionRecord, SessionStore};
pub use taskpane::{Effect, PaneState, TaskPane};

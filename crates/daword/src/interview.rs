//! Interview template generation from document placeholders.

use crate::document::{scan_document, DocumentHost};
use crate::error::Result;
use crate::placeholder::Placeholder;
use std::fmt::Write;
use tracing::{debug, info};

/// Shown when the document has no placeholders to build an interview from.
pub const NO_PLACEHOLDERS_MESSAGE: &str = "No {{ variables }} found in the document.\n\n\
Please add some variables like {{ client_name }} or {{ address }} to your document first.";

/// Result of [`create_interview`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewOutcome {
    /// Nothing to build; carries the guidance message for the user.
    NoPlaceholders(&'static str),
    /// Placeholders were found and a template was generated.
    Created(Interview),
}

/// A generated interview, for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interview {
    pub placeholders: Vec<Placeholder>,
    pub template: String,
}

impl Interview {
    /// Build an interview from a scan result.
    #[must_use]
    pub fn new(placeholders: Vec<Placeholder>) -> Self {
        let template = interview_template(&placeholders);
        Self {
            placeholders,
            template,
        }
    }

    /// Rows for the task pane's results table.
    #[must_use]
    pub fn results_table_html(&self) -> String {
        let mut html = String::from("<tr><th>Variable</th><th>Question</th></tr>");
        for p in &self.placeholders {
            let _ = write!(
                html,
                "<tr><td><code>{{{{ {} }}}}</code></td><td>{}</td></tr>",
                p.name, p.question
            );
        }
        html
    }

    /// Confirmation message listing every variable found.
    #[must_use]
    pub fn summary(&self) -> String {
        let listed: Vec<String> = self
            .placeholders
            .iter()
            .map(|p| format!("\u{2022} {{{{ {} }}}}", p.name))
            .collect();
        format!(
            "Interview template created successfully!\n\nFound {} variables:\n{}\n\n\
             YAML has been generated and can be saved to DocAssemble.",
            self.placeholders.len(),
            listed.join("\n")
        )
    }
}

/// Scan the document and generate an interview template.
///
/// Never writes to the document.
pub fn create_interview<H: DocumentHost + ?Sized>(host: &mut H) -> Result<InterviewOutcome> {
    info!("Creating interview from template");
    let placeholders = scan_document(host)?;
    if placeholders.is_empty() {
        return Ok(InterviewOutcome::NoPlaceholders(NO_PLACEHOLDERS_MESSAGE));
    }

    let interview = Interview::new(placeholders);
    debug!("Generated template:\n{}", interview.template);
    Ok(InterviewOutcome::Created(interview))
}

/// Render the two-block question template for a placeholder list.
#[must_use]
pub fn interview_template(placeholders: &[Placeholder]) -> String {
    let mut out =
        String::from("---\nquestion: Please provide the following information\nfields:\n");
    for p in placeholders {
        let _ = writeln!(out, "  - {}: {}", p.label(), p.name);
    }

    out.push_str(
        "---\nquestion: |\n  Your document has been created with the following information:\n\n",
    );
    for p in placeholders {
        let _ = writeln!(out, "  - **{}**: {{{{ {} }}}}", p.label(), p.name);
    }
    out
}

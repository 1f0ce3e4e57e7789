//! Word template rewriting

pub mod body;
pub mod package;
pub mod rewriter;

use crate::error::Result;
use crate::processing::bullets::RoleBullets;
use body::DocumentBody;
use log::{info, warn};
use package::DocxPackage;
use rewriter::{RoleEdit, SectionRewriter};
use std::path::Path;

/// Outcome of rewriting a template
#[derive(Debug, Clone, Default)]
pub struct RewriteSummary {
    pub edits: Vec<RoleEdit>,
    /// Role headings not found in the template
    pub skipped: Vec<String>,
    /// Plain text of the rewritten document
    pub text: String,
}

/// Open `template`, replace each role's bullets and save the result to
/// `output`. The template itself is never modified.
pub fn rewrite_template(
    template: &Path,
    output: &Path,
    rewriter: &SectionRewriter,
    roles: &[RoleBullets],
) -> Result<RewriteSummary> {
    let mut package = DocxPackage::open(template)?;
    let mut body = DocumentBody::parse(&package.document_xml()?)?;

    let mut summary = RewriteSummary::default();
    for role in roles {
        match rewriter.rewrite(&mut body, &role.heading, &role.bullets) {
            Some(edit) => summary.edits.push(edit),
            None => {
                warn!("Heading '{}' not found in template, skipping", role.heading);
                summary.skipped.push(role.heading.clone());
            }
        }
    }

    package.set_document_xml(body.render());
    package.save(output)?;
    info!(
        "Wrote {} ({} roles rewritten, {} skipped)",
        output.display(),
        summary.edits.len(),
        summary.skipped.len()
    );

    summary.text = body.plain_text();
    Ok(summary)
}

/// Plain text of a Word file
pub fn docx_text(path: &Path) -> Result<String> {
    let package = DocxPackage::open(path)?;
    let body = DocumentBody::parse(&package.document_xml()?)?;
    Ok(body.plain_text())
}

//! Text extraction from various file formats

use crate::document::body::DocumentBody;
use crate::document::package::DocxPackage;
use crate::error::{Result, TailorError};
use pulldown_cmark::{Event, Parser, Tag};
use std::io::Cursor;
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            TailorError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })?;
        Ok(text)
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown_content))
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        let package = DocxPackage::from_reader(Cursor::new(bytes))?;
        let body = DocumentBody::parse(&package.document_xml()?)?;
        Ok(body.plain_text())
    }
}

/// Strip markdown syntax, one line per block element
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::CodeBlock(_) | Tag::TableRow) => {
                text.push('\n')
            }
            Event::End(Tag::TableCell) => text.push(' '),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_text() {
        let md = "# Jane Roe\n\n**Summary.** Data *analyst*\nwith SQL.\n\n- Built `dbt` models\n- Cut costs\n";
        assert_eq!(
            markdown_to_text(md),
            "Jane Roe\nSummary. Data analyst with SQL.\nBuilt dbt models\nCut costs"
        );
    }

    #[tokio::test]
    async fn test_plain_text_extractor_missing_file() {
        let result = PlainTextExtractor.extract(Path::new("no/such/file.txt")).await;
        assert!(matches!(result, Err(TailorError::Io(_))));
    }
}

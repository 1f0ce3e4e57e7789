//! Role section rewriting: replace the bullet list under a role heading

use crate::config::DocumentConfig;
use crate::document::body::{Block, DocumentBody};
use log::debug;
use serde::{Deserialize, Serialize};

/// Block indices of one role section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub heading: usize,
    /// Last metadata line (dates, location); bullets go right after it
    pub anchor: usize,
    /// First block after the section
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEdit {
    pub heading: String,
    pub removed: usize,
    pub inserted: usize,
}

pub struct SectionRewriter {
    headings: Vec<String>,
    terminal_section: String,
    bullet_styles: Vec<String>,
    metadata_lines: usize,
}

impl SectionRewriter {
    /// `headings` are all role headings of the document; each one bounds the
    /// section before it.
    pub fn new(headings: Vec<String>, config: &DocumentConfig) -> Self {
        Self {
            headings,
            terminal_section: config.terminal_section.trim().to_string(),
            bullet_styles: config.bullet_styles.clone(),
            metadata_lines: config.metadata_lines,
        }
    }

    fn default_bullet_style(&self) -> &str {
        self.bullet_styles.first().map(String::as_str).unwrap_or("ListBullet")
    }

    fn is_heading_line(&self, block: &Block) -> bool {
        block.is_paragraph() && !block.is_bullet(&self.bullet_styles)
    }

    /// Terminal marker as a case-insensitive leading word, so `Education &
    /// Certifications` closes the section like `EDUCATION` does
    fn is_terminal(&self, block: &Block) -> bool {
        let marker = &self.terminal_section;
        let text = block.text.trim();
        if marker.is_empty() || !text.get(..marker.len()).is_some_and(|head| head.eq_ignore_ascii_case(marker)) {
            return false;
        }
        !text[marker.len()..].starts_with(|c: char| c.is_alphanumeric())
    }

    /// Find the section of `heading`.
    ///
    /// Candidates are non-bullet paragraphs containing the heading, minus
    /// those that belong to a longer known heading and title/subtitle lines.
    /// A candidate followed by a metadata line and bullets wins over a bare
    /// mention; among those a dated metadata line wins, then an exact text
    /// match, then document order.
    pub fn locate(&self, body: &DocumentBody, heading: &str) -> Option<SectionSpan> {
        let heading = heading.trim();
        if heading.is_empty() {
            return None;
        }
        let blocks = &body.blocks;

        // a paragraph that matches a longer heading belongs to that heading
        let longer: Vec<&str> = self
            .headings
            .iter()
            .map(|h| h.trim())
            .filter(|h| *h != heading && h.contains(heading))
            .collect();

        let mut best: Option<((bool, bool, bool), SectionSpan)> = None;
        for (start, block) in blocks.iter().enumerate() {
            if !self.is_heading_line(block)
                || is_title_style(block)
                || !block.text.contains(heading)
                || longer.iter().any(|h| block.text.contains(h))
            {
                continue;
            }
            let span = self.span_from(blocks, start, heading);
            let structured = span.anchor > span.heading
                && blocks[span.anchor + 1..span.end]
                    .iter()
                    .any(|b| b.is_bullet(&self.bullet_styles));
            let dated = span.anchor > span.heading && blocks[span.anchor].text.chars().any(|c| c.is_ascii_digit());
            let rank = (structured, dated, block.text.trim() == heading);
            if best.as_ref().is_none_or(|(top, _)| rank > *top) {
                best = Some((rank, span));
            }
        }
        best.map(|(_, span)| span)
    }

    /// Section bounds for a heading paragraph at `start`. The section ends at
    /// the terminal marker, a heading-styled paragraph, another role heading,
    /// or the first non-bullet text after the section's bullets.
    fn span_from(&self, blocks: &[Block], start: usize, heading: &str) -> SectionSpan {
        let mut bullets_seen = false;
        let mut end = blocks.len();
        for (i, block) in blocks.iter().enumerate().skip(start + 1) {
            if block.is_bullet(&self.bullet_styles) {
                bullets_seen = true;
                continue;
            }
            if !self.is_heading_line(block) || block.is_blank() {
                continue;
            }
            let other_role = self
                .headings
                .iter()
                .map(|h| h.trim())
                .any(|h| !h.is_empty() && h != heading && block.text.contains(h));
            if bullets_seen || other_role || is_section_style(block) || self.is_terminal(block) {
                end = i;
                break;
            }
        }

        let mut anchor = start;
        let mut seen = 0;
        for (i, block) in blocks.iter().enumerate().take(end).skip(start + 1) {
            if seen >= self.metadata_lines || !block.is_paragraph() || block.is_bullet(&self.bullet_styles) {
                break;
            }
            if block.is_blank() {
                continue;
            }
            anchor = i;
            seen += 1;
        }

        SectionSpan {
            heading: start,
            anchor,
            end,
        }
    }

    /// Replace the bullets under `heading` with `bullets`.
    ///
    /// Every bullet paragraph in the section is removed, as are blank
    /// paragraphs between the metadata line and the last removed bullet. The
    /// new bullets are inserted directly after the metadata line. Returns
    /// `None` when the heading is not in the document.
    pub fn rewrite(&self, body: &mut DocumentBody, heading: &str, bullets: &[String]) -> Option<RoleEdit> {
        let span = self.locate(body, heading)?;

        let range = span.anchor + 1..span.end;
        let bullet_indices: Vec<usize> = range
            .clone()
            .filter(|&i| body.blocks[i].is_bullet(&self.bullet_styles))
            .collect();
        let last_bullet = bullet_indices.last().copied();

        let mut remove = Vec::new();
        let mut content_seen = false;
        for i in range {
            let block = &body.blocks[i];
            if block.is_bullet(&self.bullet_styles) {
                remove.push(i);
            } else if block.is_blank() && !content_seen && last_bullet.is_some_and(|last| i < last) {
                remove.push(i);
            } else {
                content_seen = true;
            }
        }

        let template = bullet_indices.first().map(|&i| body.blocks[i].clone());
        let removed_bullets = bullet_indices.len();
        for &i in remove.iter().rev() {
            body.blocks.remove(i);
        }

        let new_blocks: Vec<Block> = bullets
            .iter()
            .map(|text| Block::bullet_paragraph(text, template.as_ref(), self.default_bullet_style()))
            .collect();
        let inserted = new_blocks.len();
        let at = span.anchor + 1;
        body.blocks.splice(at..at, new_blocks);

        debug!(
            "Rewrote '{}': removed {} bullets ({} blocks), inserted {}",
            heading,
            removed_bullets,
            remove.len(),
            inserted
        );

        Some(RoleEdit {
            heading: heading.to_string(),
            removed: removed_bullets,
            inserted,
        })
    }

    /// Bullet texts currently under `heading`
    pub fn section_bullets<'a>(&self, body: &'a DocumentBody, heading: &str) -> Option<Vec<&'a str>> {
        let span = self.locate(body, heading)?;
        Some(
            body.blocks[span.heading + 1..span.end]
                .iter()
                .filter(|b| b.is_bullet(&self.bullet_styles))
                .map(|b| b.text.as_str())
                .collect(),
        )
    }
}

fn is_title_style(block: &Block) -> bool {
    matches!(block.style.as_deref(), Some("Title" | "Subtitle"))
}

fn is_section_style(block: &Block) -> bool {
    is_title_style(block) || block.style.as_deref().is_some_and(|s| s.starts_with("Heading"))
}

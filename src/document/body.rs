//! Ordered block model of a Word document body (`w:body` children)

use crate::error::{Result, TailorError};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Table,
    SectionProperties,
    Other,
}

impl BlockKind {
    fn from_name(name: &[u8]) -> Self {
        match name {
            b"w:p" => BlockKind::Paragraph,
            b"w:tbl" => BlockKind::Table,
            b"w:sectPr" => BlockKind::SectionProperties,
            _ => BlockKind::Other,
        }
    }
}

/// One top-level body element, kept verbatim together with the facts the
/// rewriter needs
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub xml: String,
    /// Paragraph style id (`w:pStyle`)
    pub style: Option<String>,
    /// Paragraph carries list numbering (`w:numPr`)
    pub numbered: bool,
    pub text: String,
}

impl Block {
    fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            xml: String::new(),
            style: None,
            numbered: false,
            text: String::new(),
        }
    }

    pub fn is_paragraph(&self) -> bool {
        self.kind == BlockKind::Paragraph
    }

    /// Empty paragraph with nothing drawn in it
    pub fn is_blank(&self) -> bool {
        self.is_paragraph()
            && self.text.trim().is_empty()
            && !self.xml.contains("<w:drawing")
            && !self.xml.contains("<w:pict")
    }

    pub fn is_bullet(&self, bullet_styles: &[String]) -> bool {
        if !self.is_paragraph() {
            return false;
        }
        match self.style.as_deref() {
            Some(style) if style.starts_with("Heading") => false,
            Some(style) if bullet_styles.iter().any(|s| s == style) => true,
            _ => self.numbered,
        }
    }

    /// The paragraph's `w:pPr` element, if any
    pub fn paragraph_properties(&self) -> Option<&str> {
        element_span(&self.xml, 0, "w:pPr").map(|(start, end)| &self.xml[start..end])
    }

    /// The `w:rPr` of the first run, if any
    pub fn first_run_properties(&self) -> Option<&str> {
        let after_ppr = element_span(&self.xml, 0, "w:pPr").map(|(_, end)| end).unwrap_or(0);
        let (run_start, run_end) = element_span(&self.xml, after_ppr, "w:r")?;
        let run = &self.xml[run_start..run_end];
        element_span(run, 0, "w:rPr").map(|(start, end)| &run[start..end])
    }

    /// A bullet paragraph holding `text`. Formatting is copied from `template`
    /// when given, otherwise the paragraph gets `default_style`.
    pub fn bullet_paragraph(text: &str, template: Option<&Block>, default_style: &str) -> Block {
        let ppr = template
            .and_then(Block::paragraph_properties)
            .map(str::to_string)
            .unwrap_or_else(|| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, escape(default_style)));
        let rpr = template.and_then(Block::first_run_properties).unwrap_or("");

        let xml = format!(
            r#"<w:p>{}<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            ppr,
            rpr,
            escape(text)
        );

        Block {
            kind: BlockKind::Paragraph,
            xml,
            style: template
                .and_then(|t| t.style.clone())
                .or_else(|| Some(default_style.to_string())),
            numbered: template.map(|t| t.numbered).unwrap_or(false),
            text: text.to_string(),
        }
    }
}

/// Locate `<tag ...>...</tag>` or `<tag .../>` at or after `from`
fn element_span(xml: &str, from: usize, tag: &str) -> Option<(usize, usize)> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut search = from;

    loop {
        let start = search + xml.get(search..)?.find(&open)?;
        let next = xml[start + open.len()..].chars().next()?;
        if matches!(next, '>' | ' ' | '/' | '\t' | '\n' | '\r') {
            let tag_end = start + xml[start..].find('>')?;
            if xml[..tag_end].ends_with('/') {
                return Some((start, tag_end + 1));
            }
            let end = tag_end + xml[tag_end..].find(&close)? + close.len();
            return Some((start, end));
        }
        search = start + open.len();
    }
}

/// `word/document.xml` split into the text before the body content, the
/// top-level blocks and the text after.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentBody {
    prefix: String,
    pub blocks: Vec<Block>,
    suffix: String,
}

fn attribute_value(element: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    match element.try_get_attribute(key)? {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| TailorError::Document(format!("Bad attribute value: {}", e)))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

impl DocumentBody {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut blocks = Vec::new();
        let mut body_start: Option<usize> = None;
        let mut body_end: Option<usize> = None;
        let mut depth = 0usize;
        let mut block_start = 0usize;
        let mut current: Option<Block> = None;
        let mut in_text = false;

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let after = reader.buffer_position() as usize;

            let in_body = body_start.is_some() && body_end.is_none();

            match event {
                Event::Start(e) => {
                    if !in_body {
                        if e.name().as_ref() == b"w:body" && body_start.is_none() {
                            body_start = Some(after);
                        }
                        continue;
                    }
                    if depth == 0 {
                        block_start = before;
                        current = Some(Block::new(BlockKind::from_name(e.name().as_ref())));
                    }
                    if let Some(block) = current.as_mut() {
                        observe_element(block, &e, depth)?;
                    }
                    if e.name().as_ref() == b"w:t" {
                        in_text = true;
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if !in_body {
                        continue;
                    }
                    if depth == 0 {
                        let mut block = Block::new(BlockKind::from_name(e.name().as_ref()));
                        block.xml = xml[before..after].to_string();
                        blocks.push(block);
                    } else if let Some(block) = current.as_mut() {
                        observe_element(block, &e, depth)?;
                        if matches!(e.name().as_ref(), b"w:tab" | b"w:br") && block.is_paragraph() {
                            block.text.push(' ');
                        }
                    }
                }
                Event::End(e) => {
                    if !in_body {
                        continue;
                    }
                    if depth == 0 {
                        if e.name().as_ref() == b"w:body" {
                            body_end = Some(before);
                        }
                        continue;
                    }
                    depth -= 1;
                    if e.name().as_ref() == b"w:t" {
                        in_text = false;
                    }
                    if depth == 0 {
                        if let Some(mut block) = current.take() {
                            block.xml = xml[block_start..after].to_string();
                            blocks.push(block);
                        }
                    }
                }
                Event::Text(t) => {
                    if in_text {
                        if let Some(block) = current.as_mut() {
                            let text = t
                                .unescape()
                                .map_err(|e| TailorError::Document(format!("Bad text content: {}", e)))?;
                            block.text.push_str(&text);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let (start, end) = match (body_start, body_end) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(TailorError::Document("document has no w:body element".to_string())),
        };

        Ok(Self {
            prefix: xml[..start].to_string(),
            blocks,
            suffix: xml[end..].to_string(),
        })
    }

    pub fn render(&self) -> String {
        let mut xml = String::with_capacity(
            self.prefix.len() + self.suffix.len() + self.blocks.iter().map(|b| b.xml.len()).sum::<usize>(),
        );
        xml.push_str(&self.prefix);
        for block in &self.blocks {
            xml.push_str(&block.xml);
        }
        xml.push_str(&self.suffix);
        xml
    }

    /// Paragraph and table text, one block per line
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Paragraph | BlockKind::Table))
            .map(|b| b.text.trim())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Record paragraph style and numbering found directly inside `w:pPr`
fn observe_element(block: &mut Block, element: &BytesStart<'_>, depth: usize) -> Result<()> {
    if block.kind != BlockKind::Paragraph || depth != 2 {
        return Ok(());
    }
    match element.name().as_ref() {
        b"w:pStyle" if block.style.is_none() => {
            block.style = attribute_value(element, "w:val")?;
        }
        b"w:numPr" => block.numbered = true,
        _ => {}
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::{document, paragraph};
    use super::*;

    fn styles() -> Vec<String> {
        vec!["ListBullet".to_string()]
    }

    #[test]
    fn test_parse_blocks_and_render_identity() {
        let xml = document(&[
            paragraph(Some("Heading2"), "Data Analyst"),
            paragraph(None, "2020 - 2022 | Remote"),
            paragraph(Some("ListBullet"), "Built dashboards"),
            paragraph(None, ""),
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>".to_string(),
        ]);

        let body = DocumentBody::parse(&xml).unwrap();
        let kinds: Vec<BlockKind> = body.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::Table,
                BlockKind::SectionProperties
            ]
        );
        assert_eq!(body.blocks[0].style.as_deref(), Some("Heading2"));
        assert_eq!(body.blocks[0].text, "Data Analyst");
        assert!(body.blocks[2].is_bullet(&styles()));
        assert!(!body.blocks[1].is_bullet(&styles()));
        assert!(body.blocks[3].is_blank());
        assert_eq!(body.blocks[4].text, "cell");
        assert_eq!(body.render(), xml);
    }

    #[test]
    fn test_numbered_paragraph_is_bullet() {
        let xml = document(&[
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="3"/></w:numPr></w:pPr><w:r><w:t>Item</w:t></w:r></w:p>"#.to_string(),
        ]);
        let body = DocumentBody::parse(&xml).unwrap();
        assert!(body.blocks[0].numbered);
        assert!(body.blocks[0].is_bullet(&[]));
    }

    #[test]
    fn test_entities_unescaped_in_text() {
        let xml = document(&[paragraph(None, "R&amp;D &lt;team&gt;")]);
        let body = DocumentBody::parse(&xml).unwrap();
        assert_eq!(body.blocks[0].text, "R&D <team>");
        assert_eq!(body.plain_text(), "R&D <team>");
    }

    #[test]
    fn test_missing_body_rejected() {
        assert!(DocumentBody::parse("<w:document></w:document>").is_err());
    }

    #[test]
    fn test_bullet_paragraph_copies_template_formatting() {
        let template_xml = r#"<w:p><w:pPr><w:pStyle w:val="ListBullet"/><w:ind w:left="360"/></w:pPr><w:r><w:rPr><w:sz w:val="20"/></w:rPr><w:t>Old</w:t></w:r></w:p>"#;
        let body = DocumentBody::parse(&document(&[template_xml.to_string()])).unwrap();
        let template = &body.blocks[0];

        let bullet = Block::bullet_paragraph("Grew revenue 10% & more", Some(template), "ListBullet");
        assert!(bullet.xml.contains(r#"<w:ind w:left="360"/>"#));
        assert!(bullet.xml.contains(r#"<w:rPr><w:sz w:val="20"/></w:rPr>"#));
        assert!(bullet.xml.contains("Grew revenue 10% &amp; more"));
        assert_eq!(bullet.style.as_deref(), Some("ListBullet"));

        let plain = Block::bullet_paragraph("Plain", None, "ListBullet");
        assert!(plain.xml.starts_with(r#"<w:p><w:pPr><w:pStyle w:val="ListBullet"/></w:pPr><w:r><w:t"#));
    }
}

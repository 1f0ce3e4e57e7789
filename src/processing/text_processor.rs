//! Text sanitizing and tokenization

use regex::Regex;
use std::collections::HashSet;

/// Words ignored when building term sets
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "to", "of", "in", "for", "on", "at", "as", "by",
    "from", "with", "is", "are", "was", "were", "be", "been", "being", "this", "that", "those",
    "these", "it", "its", "into", "within", "over", "under", "between", "across", "per",
];

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    punctuation_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let punctuation_regex = Regex::new(r"[^a-z0-9\s\-]+").expect("Invalid punctuation regex");

        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            punctuation_regex,
        }
    }

    /// Lower-case, strip punctuation, split on whitespace and drop stop words.
    /// Hyphenated words stay whole; tokens without any letter or digit are dropped.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let stripped = self.punctuation_regex.replace_all(&lowered, " ");

        stripped
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(token))
            .filter(|token| token.chars().any(|c| c.is_ascii_alphanumeric()))
            .map(str::to_string)
            .collect()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}

/// Adjacent token pairs joined by a single space
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])).collect()
}

/// Make text safe for ASCII-only outputs: typographic punctuation becomes its
/// ASCII counterpart, other non-ASCII characters are dropped and runs of spaces
/// or tabs collapse to one space.
pub fn sanitize_text(text: &str) -> String {
    let mut ascii = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2014}' | '\u{2013}' => ascii.push('-'),
            '\u{201C}' | '\u{201D}' => ascii.push('"'),
            '\u{2018}' | '\u{2019}' => ascii.push('\''),
            '\u{2022}' => ascii.push('*'),
            c if c.is_ascii() => ascii.push(c),
            _ => {}
        }
    }

    let mut collapsed = String::with_capacity(ascii.len());
    let mut in_blank = false;
    for c in ascii.chars() {
        if c == ' ' || c == '\t' {
            if !in_blank {
                collapsed.push(' ');
            }
            in_blank = true;
        } else {
            collapsed.push(c);
            in_blank = false;
        }
    }

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation_and_stop_words() {
        let processor = TextProcessor::new();
        let tokens = processor.tokenize("Looking for a Data Analyst with SQL and Power BI skills!");
        assert_eq!(tokens, vec!["looking", "data", "analyst", "sql", "power", "bi", "skills"]);
    }

    #[test]
    fn test_tokenize_keeps_hyphenated_words() {
        let processor = TextProcessor::new();
        let tokens = processor.tokenize("Full-time role - cross-functional (A/B testing)");
        assert_eq!(tokens, vec!["full-time", "role", "cross-functional", "b", "testing"]);
    }

    #[test]
    fn test_bigrams() {
        let tokens: Vec<String> = ["power", "bi", "reporting"].iter().map(|s| s.to_string()).collect();
        assert_eq!(bigrams(&tokens), vec!["power bi", "bi reporting"]);
        assert!(bigrams(&tokens[..1]).is_empty());
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("Led \u{201C}growth\u{201D} \u{2014} 20%"), "Led \"growth\" - 20%");
        assert_eq!(sanitize_text("  caf\u{e9}\t\tbar  "), "caf bar");
        assert_eq!(sanitize_text("\u{2022} it\u{2019}s done"), "* it's done");
    }
}

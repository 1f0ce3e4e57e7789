//! Console and JSON presentation of coverage reports and generated bullets

use crate::error::Result;
use crate::processing::bullets::{BulletOrigin, RoleBullets};
use crate::processing::coverage::CoverageReport;
use colored::{Color, Colorize};
use unicode_segmentation::UnicodeSegmentation;

pub struct ConsoleFormatter {
    use_colors: bool,
    /// Width of one printed term line
    line_width: usize,
}

pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            line_width: 100,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn score_color(percent: f64) -> Color {
        match percent {
            p if p >= 70.0 => Color::Green,
            p if p >= 40.0 => Color::Yellow,
            _ => Color::Red,
        }
    }

    fn term_line(&self, label: &str, terms: &[String], color: Color) -> String {
        let joined = if terms.is_empty() {
            "(none)".to_string()
        } else {
            terms.join(", ")
        };
        format!(
            "{} {}",
            self.colorize(label, color),
            truncate_graphemes(&joined, self.line_width)
        )
    }

    pub fn format_coverage(&self, report: &CoverageReport) -> String {
        let mut out = String::new();
        let score = format!("{:.1}%", report.coverage_percent);
        out.push_str(&format!(
            "📊 Keyword coverage: {} of {} terms\n",
            self.colorize(&score, Self::score_color(report.coverage_percent)),
            report.evaluated_terms
        ));
        out.push_str(&self.term_line("  ✅ Present:", &report.present_terms, Color::Green));
        out.push('\n');
        out.push_str(&self.term_line("  ❌ Missing:", &report.missing_terms, Color::Red));
        out.push('\n');
        out
    }

    pub fn format_roles(&self, roles: &[RoleBullets]) -> String {
        let mut out = String::new();
        for role in roles {
            let (label, color) = match role.origin {
                BulletOrigin::Generated => ("generated", Color::Green),
                BulletOrigin::Baseline => ("baseline", Color::Yellow),
                BulletOrigin::Filler => ("filler", Color::Red),
            };
            out.push_str(&format!(
                "  • {} ({} bullets, {})\n",
                role.heading,
                role.bullets.len(),
                self.colorize(label, color)
            ));
        }
        out
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn format_coverage(&self, report: &CoverageReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }
}

/// Cut `text` to at most `max` grapheme clusters, marking the cut with `...`
pub fn truncate_graphemes(text: &str, max: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    format!("{}...", graphemes[..keep].concat())
}

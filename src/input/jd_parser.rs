//! Job description parsing: `Key: value` header lines followed by free-form text

use crate::error::Result;
use crate::processing::text_processor::sanitize_text;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobHeader {
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub closing_date: Option<String>,
    pub url: Option<String>,
    /// Any other header keys, normalized
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub path: PathBuf,
    pub header: JobHeader,
    pub body: String,
    pub raw: String,
}

impl JobHeader {
    fn insert(&mut self, key: &str, value: String) {
        match key {
            "company" | "company_name" | "employer" => self.company = Some(value),
            "job_title" | "title" | "role" | "position" => self.job_title = Some(value),
            "closing_date" | "deadline" | "closes" => self.closing_date = Some(value),
            "url" | "link" | "jd_url" => self.url = Some(value),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }
}

/// Split `content` into its header block and body.
///
/// Front matter (`---` first line) ends at the next `---` line. Otherwise the
/// header runs until the first `---` line or blank line.
pub fn split_header(content: &str) -> (&str, &str) {
    let front_matter = content.trim_start().starts_with("---");
    let mut lines = content.split_inclusive('\n').peekable();
    let mut offset = 0;

    if front_matter {
        // leading blank lines and the opening delimiter
        for line in lines.by_ref() {
            offset += line.len();
            if line.trim_start().starts_with("---") {
                break;
            }
        }
    } else {
        while let Some(line) = lines.next_if(|l| l.trim().is_empty()) {
            offset += line.len();
        }
    }

    let header_start = offset;
    for line in lines {
        let trimmed = line.trim();
        if trimmed == "---" || (!front_matter && trimmed.is_empty()) {
            return (&content[header_start..offset], &content[offset + line.len()..]);
        }
        offset += line.len();
    }

    // no terminator: the whole remainder is header
    (&content[header_start..], "")
}

/// Parse header lines into a `JobHeader`. Keys are lower-cased with spaces
/// replaced by `_`; lines without a colon and empty values are ignored.
pub fn parse_header(header: &str) -> JobHeader {
    let mut parsed = JobHeader::default();
    for line in header.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase().replace(' ', "_");
        let value = sanitize_text(value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        parsed.insert(&key, value);
    }
    parsed
}

impl JobDescription {
    pub fn parse(path: &Path, content: String) -> Self {
        let (header, body) = split_header(&content);
        let header = parse_header(header);
        let body = body.trim().to_string();
        Self {
            path: path.to_path_buf(),
            header,
            body,
            raw: content,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(path, content))
    }

    /// Text used for keyword scoring. Header metadata is left out when a
    /// recognized header was found; otherwise the whole file is scored.
    pub fn scoring_text(&self) -> &str {
        let h = &self.header;
        let has_header = h.company.is_some() || h.job_title.is_some() || h.closing_date.is_some() || h.url.is_some();
        if !has_header || self.body.is_empty() {
            &self.raw
        } else {
            &self.body
        }
    }

    /// Company from the header, else from the run folder name
    /// (`<date>_<Company>_<Role>` two levels above the JD file).
    pub fn company(&self) -> String {
        if let Some(company) = &self.header.company {
            return company.clone();
        }
        let folder = self
            .path
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if let Some((_, rest)) = folder.split_once('_') {
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
        if folder.is_empty() {
            "Unknown".to_string()
        } else {
            folder
        }
    }

    pub fn job_title(&self) -> String {
        self.header
            .job_title
            .clone()
            .unwrap_or_else(|| self.company().replace('_', " "))
    }

    pub fn closing_date(&self) -> String {
        self.header
            .closing_date
            .clone()
            .unwrap_or_else(|| "TBD Closing Date".to_string())
    }

    pub fn url(&self) -> String {
        self.header.url.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_JD: &str = "Company: Initech\nJob Title: Data Analyst\nClosing Date: 2026-11-01\nURL: https://jobs.example.com/123\n\nWe are looking for a Data Analyst.\nRequirements: SQL, Power BI.\n";

    const FRONT_MATTER_JD: &str = "---\ncompany: Globex\nrole: BI Developer\nteam: Finance\n---\nBody text: with a colon.\n";

    #[test]
    fn test_plain_header_until_blank_line() {
        let jd = JobDescription::parse(Path::new("jd.md"), PLAIN_JD.to_string());
        assert_eq!(jd.header.company.as_deref(), Some("Initech"));
        assert_eq!(jd.header.job_title.as_deref(), Some("Data Analyst"));
        assert_eq!(jd.header.closing_date.as_deref(), Some("2026-11-01"));
        assert_eq!(jd.header.url.as_deref(), Some("https://jobs.example.com/123"));
        assert!(jd.body.starts_with("We are looking"));
        assert!(jd.header.extra.is_empty());
    }

    #[test]
    fn test_front_matter() {
        let jd = JobDescription::parse(Path::new("jd.md"), FRONT_MATTER_JD.to_string());
        assert_eq!(jd.header.company.as_deref(), Some("Globex"));
        assert_eq!(jd.header.job_title.as_deref(), Some("BI Developer"));
        assert_eq!(jd.header.extra.get("team").map(String::as_str), Some("Finance"));
        assert_eq!(jd.body, "Body text: with a colon.");
        assert_eq!(jd.closing_date(), "TBD Closing Date");
    }

    #[test]
    fn test_dash_delimiter_without_front_matter() {
        let (header, body) = split_header("Company: A\nTitle: B\n---\nBody\n");
        assert_eq!(header, "Company: A\nTitle: B\n");
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_header_only_file() {
        let (header, body) = split_header("Company: A");
        assert_eq!(header, "Company: A");
        assert_eq!(body, "");
    }

    #[test]
    fn test_empty_values_ignored_and_sanitized() {
        let header = parse_header("Company:\nJob Title: Analyst \u{2014} Reporting\nno colon here");
        assert!(header.company.is_none());
        assert_eq!(header.job_title.as_deref(), Some("Analyst - Reporting"));
    }

    #[test]
    fn test_fallbacks_from_run_folder() {
        let path = Path::new("runs/2026-10-01_Initech_Data_Analyst/inputs/jd.md");
        let jd = JobDescription::parse(path, "Just a body line\n".to_string());
        assert_eq!(jd.company(), "Initech_Data_Analyst");
        assert_eq!(jd.job_title(), "Initech Data Analyst");
        assert_eq!(jd.url(), "");
    }
}

//! Run summary persisted as `result.json`

use crate::error::{Result, TailorError};
use crate::processing::text_processor::sanitize_text;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const RESULT_FILE: &str = "result.json";

/// Coverage percentage, or a label such as `fallback` when no score exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AtsScore {
    Percent(f64),
    Label(String),
}

impl fmt::Display for AtsScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtsScore::Percent(p) => write!(f, "{}", p),
            AtsScore::Label(l) => f.write_str(l),
        }
    }
}

impl Default for AtsScore {
    fn default() -> Self {
        AtsScore::Label(String::new())
    }
}

/// Field order matches the tracking sheet's columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(alias = "Date", default)]
    pub date: String,
    #[serde(alias = "Company", default)]
    pub company: String,
    #[serde(alias = "Job_Title", default)]
    pub job_title: String,
    #[serde(alias = "JD_Path", default)]
    pub jd_path: String,
    #[serde(alias = "Closing_Date", default)]
    pub closing_date: String,
    #[serde(alias = "JD_URL", default)]
    pub jd_url: String,
    #[serde(alias = "ATS_Score", default)]
    pub ats_score: AtsScore,
    /// Older result files carry a status; anything but `success` is not logged
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
}

impl ResultRecord {
    /// Build a record with every text field sanitized
    pub fn new(
        company: &str,
        job_title: &str,
        jd_path: &Path,
        closing_date: &str,
        jd_url: &str,
        ats_score: AtsScore,
    ) -> Self {
        Self {
            date: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
            company: sanitize_text(company),
            job_title: sanitize_text(job_title),
            jd_path: sanitize_text(&jd_path.to_string_lossy()),
            closing_date: sanitize_text(closing_date),
            jd_url: sanitize_text(jd_url),
            ats_score,
            status: None,
        }
    }

    pub fn is_loggable(&self) -> bool {
        self.status.as_deref().map_or(true, |s| s.eq_ignore_ascii_case("success"))
    }

    /// The spreadsheet row, in column order
    pub fn to_row(&self) -> Vec<serde_json::Value> {
        let score = match &self.ats_score {
            AtsScore::Percent(p) => serde_json::json!(p),
            AtsScore::Label(l) => serde_json::json!(l),
        };
        vec![
            self.date.clone().into(),
            self.company.clone().into(),
            self.job_title.clone().into(),
            self.jd_path.clone().into(),
            self.closing_date.clone().into(),
            self.jd_url.clone().into(),
            score,
        ]
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Pretty, ASCII-only JSON written through a temp file in the same directory
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = ascii_json(&serde_json::to_string_pretty(self)?);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.persist(path).map_err(|e| TailorError::Io(e.error))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Escape non-ASCII characters as `\uXXXX` (surrogate pairs above the BMP)
fn ascii_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

/// Most recent `runs/*/outputs/result.json`, ordered by run folder name and
/// then modification time
pub fn latest_result(runs_dir: &Path) -> Result<Option<PathBuf>> {
    if !runs_dir.is_dir() {
        warn!("Runs directory {} does not exist", runs_dir.display());
        return Ok(None);
    }

    let mut candidates: Vec<(String, SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(runs_dir)? {
        let entry = entry?;
        let candidate = entry.path().join("outputs").join(RESULT_FILE);
        if !candidate.is_file() {
            continue;
        }
        let modified = candidate.metadata()?.modified()?;
        candidates.push((entry.file_name().to_string_lossy().to_string(), modified, candidate));
    }

    Ok(candidates.into_iter().max_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1))).map(|(_, _, path)| path))
}

//! Configuration management for the job tailor

use crate::error::{Result, TailorError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub llm: LlmConfig,
    pub bullets: BulletConfig,
    pub scoring: ScoringConfig,
    pub document: DocumentConfig,
    pub sheets: SheetsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Static baseline resume content (JSON)
    pub baselines: PathBuf,
    pub runs_dir: PathBuf,
    pub run_template: PathBuf,
    /// Word template whose role sections get rewritten
    pub resume_template: Option<PathBuf>,
    /// Domain name to overlay markdown used by `pack`
    pub overlays: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub min_bullets: usize,
    pub max_bullets: usize,
    pub max_chars: usize,
    pub filler: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub max_terms: usize,
    pub min_unigram_len: usize,
    pub report_terms: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Paragraph style ids treated as bullets
    pub bullet_styles: Vec<String>,
    /// Section title that closes the last role section
    pub terminal_section: String,
    /// Non-bullet lines under a heading before bullets start (dates, location)
    pub metadata_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub enabled: bool,
    pub range: String,
    pub value_input_option: String,
    pub timeout_secs: u64,
    pub sheet_id_env: String,
    pub credentials_env: String,
    pub access_token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    /// Resume file names are `<prefix>_<Company>.<ext>`
    pub file_prefix: String,
    pub banned_chars: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Markdown,
    Docx,
    Both,
}

impl OutputFormat {
    pub fn wants_markdown(&self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    pub fn wants_docx(&self) -> bool {
        matches!(self, OutputFormat::Docx | OutputFormat::Both)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            baselines: PathBuf::from("baselines.json"),
            runs_dir: PathBuf::from("runs"),
            run_template: PathBuf::from("runs").join("_run_template"),
            resume_template: None,
            overlays: ["cpg", "retail", "healthcare", "logistics", "fintech", "saas"]
                .into_iter()
                .map(|domain| {
                    let path = PathBuf::from("includes").join("overlays").join(format!("{}.md", domain));
                    (domain.to_string(), path)
                })
                .collect(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-5-sonnet-20240620".to_string(),
            max_tokens: 400,
            timeout_secs: 60,
            max_retries: 1,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            min_bullets: 4,
            max_bullets: 6,
            max_chars: 350,
            filler: "Delivered analysis and reporting that supported business decisions.".to_string(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_terms: 200,
            min_unigram_len: 1,
            report_terms: 50,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            bullet_styles: vec!["ListBullet".to_string(), "ListParagraph".to_string()],
            terminal_section: "EDUCATION".to_string(),
            metadata_lines: 1,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            range: "Sheet1!A:G".to_string(),
            value_input_option: "RAW".to_string(),
            timeout_secs: 30,
            sheet_id_env: "SHEET_ID".to_string(),
            credentials_env: "GOOGLE_SHEETS_CREDENTIALS".to_string(),
            access_token_env: "GOOGLE_SHEETS_ACCESS_TOKEN".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            color_output: true,
            file_prefix: "Resume".to_string(),
            banned_chars: vec!["\u{2014}".to_string()],
        }
    }
}

impl Config {
    /// Load from `path`, or the per-user location when none is given.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TailorError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("job-tailor")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.bullets.min_bullets == 0 || self.bullets.min_bullets > self.bullets.max_bullets {
            return Err(TailorError::Configuration(format!(
                "bullets.min_bullets ({}) must be between 1 and bullets.max_bullets ({})",
                self.bullets.min_bullets, self.bullets.max_bullets
            )));
        }
        if self.scoring.max_terms == 0 {
            return Err(TailorError::Configuration("scoring.max_terms must be positive".to_string()));
        }
        Ok(())
    }
}

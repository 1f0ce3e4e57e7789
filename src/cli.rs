//! CLI interface for the job tailor

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "job-tailor")]
#[command(about = "Tailor resumes to job descriptions and track applications")]
#[command(long_about = "Generate tailored resumes (Markdown or Word) from a job description, score keyword coverage and log each application to a Google Sheet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a tailored resume for a job description
    Generate {
        /// Path to job description file (TXT, MD)
        jd: PathBuf,

        /// Word template to rewrite (overrides paths.resume_template)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output format: markdown, docx, both
        #[arg(short, long, value_parser = parse_output_format)]
        format: Option<OutputFormat>,

        /// Use baseline bullets only
        #[arg(long)]
        no_llm: bool,

        /// Do not append the result to the tracking sheet
        #[arg(long)]
        no_sheet: bool,

        /// Output directory (default: the run's outputs/ folder)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Score keyword coverage of a resume against a job description
    Score {
        /// Path to job description file (TXT, MD)
        jd: PathBuf,

        /// Path to resume file (TXT, MD, PDF, DOCX)
        resume: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Also score a comma-separated skill list
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
    },

    /// Append a result.json to the tracking sheet
    Sheet {
        /// Result file (default: latest runs/*/outputs/result.json)
        result: Option<PathBuf>,
    },

    /// Create a new run folder from the run template
    NewRun {
        /// Company name
        #[arg(long)]
        company: String,

        /// Role title
        #[arg(long)]
        role: String,

        /// YYYY-MM-DD, defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<String>,
    },

    /// Write a domain starter pack into a run folder's outputs
    Pack {
        /// Run folder (runs/YYYY-MM-DD_Company_Role)
        run: PathBuf,

        /// Domain overlay to use (cpg, retail, healthcare, ...)
        #[arg(long)]
        domain: String,
    },

    /// Scan files for banned characters
    CheckChars {
        /// File or directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "docx" | "word" => Ok(OutputFormat::Docx),
        "both" => Ok(OutputFormat::Both),
        _ => Err(format!("Invalid output format: {}. Supported: markdown, docx, both", format)),
    }
}

fn parse_date(date: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("Invalid date: {}. Expected YYYY-MM-DD", date))
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "job-tailor", "generate", "runs/x/inputs/jd.md", "--format", "both", "--no-llm", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate { jd, format, no_llm, no_sheet, .. } => {
                assert_eq!(jd, PathBuf::from("runs/x/inputs/jd.md"));
                assert_eq!(format, Some(OutputFormat::Both));
                assert!(no_llm);
                assert!(!no_sheet);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_pack() {
        let cli = Cli::try_parse_from(["job-tailor", "pack", "runs/2026-10-17_Acme_Analyst", "--domain", "retail"]).unwrap();
        match cli.command {
            Commands::Pack { run, domain } => {
                assert_eq!(run, PathBuf::from("runs/2026-10-17_Acme_Analyst"));
                assert_eq!(domain, "retail");
            }
            _ => panic!("expected pack"),
        }
        assert!(Cli::try_parse_from(["job-tailor", "pack", "runs/x"]).is_err());
    }

    #[test]
    fn test_parse_score_skills() {
        let cli = Cli::try_parse_from(["job-tailor", "score", "jd.md", "cv.pdf", "--skills", "SQL,Power BI"]).unwrap();
        match cli.command {
            Commands::Score { skills, json, .. } => {
                assert_eq!(skills, vec!["SQL".to_string(), "Power BI".to_string()]);
                assert!(!json);
            }
            _ => panic!("expected score"),
        }
    }

    #[test]
    fn test_new_run_rejects_bad_date() {
        assert!(Cli::try_parse_from(["job-tailor", "new-run", "--company", "A", "--role", "B", "--date", "17/10/2026"]).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.DOCX"), &["docx", "pdf"]).is_ok());
        assert!(validate_file_extension(Path::new("cv.rtf"), &["docx"]).is_err());
        assert!(validate_file_extension(Path::new("cv"), &["docx"]).is_err());
    }
}

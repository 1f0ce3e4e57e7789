//! The `generate` flow: job description in, tailored resume and result record out

use crate::config::{Config, OutputFormat};
use crate::document::rewriter::SectionRewriter;
use crate::document::rewrite_template;
use crate::error::{Result, TailorError};
use crate::input::jd_parser::JobDescription;
use crate::input::text_extractor::markdown_to_text;
use crate::llm::client::LlmClient;
use crate::output::markdown::{resume_file_name, ResumeRenderer};
use crate::output::result::{AtsScore, ResultRecord, RESULT_FILE};
use crate::output::sheets::SheetsClient;
use crate::processing::baseline::Baselines;
use crate::processing::bullets::{BulletGenerator, BulletPolicy, BulletRequest, BulletSource, RoleBullets};
use crate::processing::coverage::{CoverageReport, CoverageScorer};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub jd_path: PathBuf,
    /// Overrides `paths.resume_template`
    pub template: Option<PathBuf>,
    pub format: OutputFormat,
    pub use_llm: bool,
    pub update_sheet: bool,
    pub out_dir: Option<PathBuf>,
    pub show_progress: bool,
}

impl GenerateOptions {
    pub fn new(jd_path: PathBuf, config: &Config) -> Self {
        Self {
            jd_path,
            template: None,
            format: config.output.format,
            use_llm: config.llm.enabled,
            update_sheet: config.sheets.enabled,
            out_dir: None,
            show_progress: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub output_dir: PathBuf,
    pub markdown_path: Option<PathBuf>,
    pub docx_path: Option<PathBuf>,
    pub result_path: PathBuf,
    pub record: ResultRecord,
    pub roles: Vec<RoleBullets>,
    pub coverage: CoverageReport,
    /// Role headings missing from the Word template
    pub skipped_headings: Vec<String>,
    pub sheet_updated: bool,
}

/// `<run>/outputs` for a JD under `<run>/inputs`, else `outputs/` next to the JD
pub fn output_dir_for(jd_path: &Path, out_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = out_dir {
        return dir.to_path_buf();
    }
    let parent = jd_path.parent().unwrap_or_else(|| Path::new(""));
    let run_dir = match parent.file_name() {
        Some(name) if name == "inputs" => parent.parent().unwrap_or_else(|| Path::new("")),
        _ => parent,
    };
    run_dir.join("outputs")
}

/// Run with an LLM client from the environment when generation is enabled
pub async fn generate(config: &Config, options: &GenerateOptions) -> Result<GenerateOutcome> {
    let client = if options.use_llm {
        LlmClient::from_env(&config.llm)?
            .map(|c| c.with_bullet_range(config.bullets.min_bullets, config.bullets.max_bullets))
    } else {
        info!("LLM generation skipped; using baseline bullets");
        None
    };
    generate_with(config, options, client).await
}

pub async fn generate_with<G: BulletGenerator>(
    config: &Config,
    options: &GenerateOptions,
    generator: Option<G>,
) -> Result<GenerateOutcome> {
    let jd = JobDescription::load(&options.jd_path).map_err(|e| {
        TailorError::InvalidInput(format!("Cannot read job description {}: {}", options.jd_path.display(), e))
    })?;
    let baselines = Baselines::load(&config.paths.baselines)?;

    // resolve the template before spending time on generation
    let template = if options.format.wants_docx() {
        let template = options
            .template
            .clone()
            .or_else(|| config.paths.resume_template.clone())
            .ok_or_else(|| TailorError::Configuration("No resume template configured".to_string()))?;
        if !template.exists() {
            return Err(TailorError::Configuration(format!(
                "Resume template not found: {}",
                template.display()
            )));
        }
        Some(template)
    } else {
        None
    };

    let company = jd.company();
    let job_title = jd.job_title();
    info!("Generating resume for '{}' at '{}'", job_title, company);

    let roles = collect_bullets(config, options, &baselines, &company, &job_title, generator).await;

    let output_dir = output_dir_for(&options.jd_path, options.out_dir.as_deref());
    std::fs::create_dir_all(&output_dir)?;
    let prefix = &config.output.file_prefix;

    let mut resume_text = String::new();
    let mut markdown_path = None;
    if options.format.wants_markdown() {
        let markdown = ResumeRenderer::new(&baselines, config.bullets.max_bullets).render(&roles);
        let path = output_dir.join(resume_file_name(prefix, &company, "md"));
        std::fs::write(&path, &markdown)?;
        info!("Wrote resume: {}", path.display());
        resume_text = markdown_to_text(&markdown);
        markdown_path = Some(path);
    }

    let mut docx_path = None;
    let mut skipped_headings = Vec::new();
    if let Some(template) = template {
        let rewriter = SectionRewriter::new(baselines.headings(), &config.document);
        let path = output_dir.join(resume_file_name(prefix, &company, "docx"));
        let summary = rewrite_template(&template, &path, &rewriter, &roles)?;
        skipped_headings = summary.skipped;
        // Word text takes precedence over the markdown text
        resume_text = summary.text;
        docx_path = Some(path);
    }

    let coverage = CoverageScorer::new(&config.scoring).score(jd.scoring_text(), &resume_text);
    info!("Keyword coverage: {:.1}%", coverage.coverage_percent);

    let record = ResultRecord::new(
        &company,
        &job_title,
        &options.jd_path,
        &jd.closing_date(),
        &jd.url(),
        AtsScore::Percent(coverage.coverage_percent),
    );
    let result_path = output_dir.join(RESULT_FILE);
    record.save(&result_path)?;

    let sheet_updated = if options.update_sheet {
        append_to_sheet(config, &record).await
    } else {
        false
    };

    Ok(GenerateOutcome {
        output_dir,
        markdown_path,
        docx_path,
        result_path,
        record,
        roles,
        coverage,
        skipped_headings,
        sheet_updated,
    })
}

async fn collect_bullets<G: BulletGenerator>(
    config: &Config,
    options: &GenerateOptions,
    baselines: &Baselines,
    company: &str,
    job_title: &str,
    generator: Option<G>,
) -> Vec<RoleBullets> {
    let source = BulletSource::new(generator, BulletPolicy::from(&config.bullets));

    let progress = if options.show_progress && source.has_generator() {
        let bar = ProgressBar::new(baselines.experience.len() as u64);
        let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut roles = Vec::with_capacity(baselines.experience.len());
    for role in &baselines.experience {
        progress.set_message(role.heading.clone());
        let request = BulletRequest {
            role,
            job_title,
            company,
        };
        roles.push(source.bullets_for(&request).await);
        progress.inc(1);
    }
    progress.finish_and_clear();
    roles
}

/// Sheet failures are logged; they never fail the run
pub async fn append_to_sheet(config: &Config, record: &ResultRecord) -> bool {
    let client = match SheetsClient::from_env(&config.sheets) {
        Ok(client) => client,
        Err(e) => {
            warn!("Skipping sheet update: {}", e);
            return false;
        }
    };
    match client.append(record).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to update Google Sheet: {}", e);
            false
        }
    }
}

//! Job tailor: tailored resumes, keyword coverage and application tracking

use anyhow::{bail, Context};
use clap::Parser;
use colored::Colorize;
use job_tailor::cli::{validate_file_extension, Cli, Commands, ConfigAction};
use job_tailor::config::Config;
use job_tailor::input::jd_parser::JobDescription;
use job_tailor::input::manager::InputManager;
use job_tailor::output::formatter::{ConsoleFormatter, JsonFormatter};
use job_tailor::output::result::{latest_result, ResultRecord};
use job_tailor::output::sheets::SheetsClient;
use job_tailor::pipeline::{generate, GenerateOptions};
use job_tailor::processing::banned_chars::BannedCharScanner;
use job_tailor::processing::coverage::{skill_list_score, CoverageScorer};
use job_tailor::runs::{write_pack, RunScaffold};
use log::{error, info, warn};
use std::path::Path;
use std::process;

const JD_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];
const RESUME_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "pdf", "docx"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load(Some(config_path.as_path())) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            jd,
            template,
            format,
            no_llm,
            no_sheet,
            out_dir,
        } => {
            validate_file_extension(&jd, JD_EXTENSIONS).map_err(anyhow::Error::msg)?;

            let mut options = GenerateOptions::new(jd.clone(), &config);
            options.template = template;
            options.out_dir = out_dir;
            if let Some(format) = format {
                options.format = format;
            }
            options.use_llm &= !no_llm;
            options.update_sheet &= !no_sheet;

            println!("🚀 Tailoring resume");
            println!("💼 Job Description: {}", jd.display());
            println!("🔧 Output Format: {:?}", options.format);
            if !options.use_llm {
                println!("⚠️  LLM generation disabled");
            }

            let outcome = generate(&config, &options)
                .await
                .with_context(|| format!("Failed to generate resume for {}", jd.display()))?;

            let formatter = ConsoleFormatter::new(config.output.color_output);
            println!("\n📄 Roles:");
            print!("{}", formatter.format_roles(&outcome.roles));
            for heading in &outcome.skipped_headings {
                println!("  {} '{}' not found in template", "⚠️".yellow(), heading);
            }
            println!();
            print!("{}", formatter.format_coverage(&outcome.coverage.truncated(config.scoring.report_terms)));

            println!();
            if let Some(path) = &outcome.markdown_path {
                println!("📝 Markdown: {}", path.display());
            }
            if let Some(path) = &outcome.docx_path {
                println!("📝 Word: {}", path.display());
            }
            println!("💾 Result: {}", outcome.result_path.display());
            if outcome.sheet_updated {
                println!("✅ Tracking sheet updated");
            } else if options.update_sheet {
                println!("⚠️  Tracking sheet not updated (see log)");
            }
        }

        Commands::Score {
            jd,
            resume,
            json,
            skills,
        } => {
            validate_file_extension(&jd, JD_EXTENSIONS).map_err(anyhow::Error::msg)?;
            validate_file_extension(&resume, RESUME_EXTENSIONS).map_err(anyhow::Error::msg)?;

            let job = JobDescription::load(&jd).with_context(|| format!("Cannot read {}", jd.display()))?;
            let mut input_manager = InputManager::new();
            let resume_text = input_manager.extract_text(&resume).await?;

            let report = CoverageScorer::new(&config.scoring)
                .score(job.scoring_text(), &resume_text)
                .truncated(config.scoring.report_terms);
            let skill_score = (!skills.is_empty()).then(|| skill_list_score(job.scoring_text(), &skills));

            if json {
                println!("{}", JsonFormatter::new(true).format_coverage(&report)?);
            } else {
                print!("{}", ConsoleFormatter::new(config.output.color_output).format_coverage(&report));
            }
            if let Some(score) = skill_score {
                if json {
                    println!("{}", serde_json::json!({ "skills_score": score }));
                } else {
                    println!("🎯 Skill list coverage: {:.2}%", score);
                }
            }
        }

        Commands::Sheet { result } => {
            let path = match result {
                Some(path) => path,
                None => latest_result(&config.paths.runs_dir)?
                    .with_context(|| format!("No result.json found under {}", config.paths.runs_dir.display()))?,
            };
            info!("Reading results from {}", path.display());
            let record = ResultRecord::load(&path).with_context(|| format!("Could not load {}", path.display()))?;

            if !record.is_loggable() {
                warn!(
                    "Skipping Google Sheet update because status={}",
                    record.status.as_deref().unwrap_or_default()
                );
                return Ok(());
            }

            let client = SheetsClient::from_env(&config.sheets)?;
            client.append(&record).await.context("Failed to update Google Sheet")?;
            println!("✅ Appended {} / {} to tracking sheet", record.company, record.job_title);
        }

        Commands::NewRun { company, role, date } => {
            let scaffold = RunScaffold {
                runs_dir: &config.paths.runs_dir,
                template: &config.paths.run_template,
            };
            let run = scaffold.create(&company, &role, date.as_deref())?;
            println!("{}", run.display());
        }

        Commands::Pack { run, domain } => {
            let pack = write_pack(&run, &domain, &config.paths.overlays)?;
            println!("{}", pack.display());
        }

        Commands::CheckChars { path } => {
            let scanner = BannedCharScanner::new(&config.output.banned_chars)?;
            let hits = scanner.scan_path(&path)?;
            if hits.is_empty() {
                println!("No banned characters found.");
            } else {
                for hit in &hits {
                    println!(
                        "{} {}: contains forbidden character {:?} ({}x)",
                        "[ban]".red(),
                        hit.path.display(),
                        hit.character,
                        hit.count
                    );
                }
                bail!("{} file(s) contain banned characters", hits.len());
            }
        }

        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => {
                println!("📁 {}", config_path.display());
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Reset => {
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset: {}", config_path.display());
            }
            ConfigAction::Path => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

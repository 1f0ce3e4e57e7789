//! Run folders: `runs/<date>_<company>_<role>/` with `inputs/` and `outputs/`

use crate::error::{Result, TailorError};
use crate::processing::text_processor::sanitize_text;
use log::{debug, info};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const SLUG_MAX_CHARS: usize = 80;
const NOTES_FILE: &str = "notes.md";
const PACK_FILE: &str = "mto_pack.md";
const PACK_CORE_SKILLS: usize = 10;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("Invalid slug regex"));

/// Runs of non-alphanumerics become `_`, trimmed, at most 80 characters
pub fn slug(text: &str) -> String {
    let replaced = SEPARATORS.replace_all(text, "_");
    replaced.trim_matches('_').chars().take(SLUG_MAX_CHARS).collect()
}

pub fn run_folder_name(date: &str, company: &str, role: &str) -> String {
    format!("{}_{}_{}", date, slug(company), slug(role))
}

pub struct RunScaffold<'a> {
    pub runs_dir: &'a Path,
    pub template: &'a Path,
}

impl RunScaffold<'_> {
    /// Copy the run template to a new dated run folder and fill in the notes.
    /// `date` defaults to today (`YYYY-MM-DD`).
    pub fn create(&self, company: &str, role: &str, date: Option<&str>) -> Result<PathBuf> {
        if !self.template.is_dir() {
            return Err(TailorError::Configuration(format!(
                "Run template folder missing: {}",
                self.template.display()
            )));
        }

        let date = match date {
            Some(d) => d.to_string(),
            None => chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
        };
        let destination = self.runs_dir.join(run_folder_name(&date, company, role));
        if destination.exists() {
            return Err(TailorError::InvalidInput(format!(
                "Destination already exists: {}",
                destination.display()
            )));
        }

        copy_dir(self.template, &destination)?;
        fill_notes(&destination.join("inputs").join(NOTES_FILE), company, role)?;

        info!("Created run folder {}", destination.display());
        Ok(destination)
    }
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn fill_notes(notes: &Path, company: &str, role: &str) -> Result<()> {
    if !notes.is_file() {
        debug!("No {} in run template", NOTES_FILE);
        return Ok(());
    }
    let text = std::fs::read_to_string(notes)?
        .replace("Company, ", &format!("Company, {}", company))
        .replace("Role, ", &format!("Role, {}", role));
    std::fs::write(notes, text)?;
    Ok(())
}

/// Headline, summary and core-skill suggestions for one industry domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOverlay {
    pub headlines: Vec<String>,
    pub summary: Vec<String>,
    pub core_skills: Vec<String>,
}

static OVERLAY_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+(.+?)\s*$").expect("Invalid overlay section regex"));

impl DomainOverlay {
    /// Parse overlay markdown. `## Headline options` and `## Summary starters`
    /// hold `- ` lists; `## Core Skills` is one comma-separated line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: BTreeMap<String, &str> = BTreeMap::new();
        let headings: Vec<_> = OVERLAY_SECTION.captures_iter(text).collect();
        for (i, caps) in headings.iter().enumerate() {
            let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let end = headings
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());
            sections.insert(title.as_str().to_lowercase(), &text[whole.end()..end]);
        }

        let section = |name: &str| {
            sections
                .get(name)
                .copied()
                .ok_or_else(|| TailorError::InvalidInput(format!("Overlay has no '## {}' section", name)))
        };
        let list = |name: &str| -> Result<Vec<String>> {
            let items: Vec<String> = section(name)?
                .lines()
                .map(str::trim)
                .skip_while(|line| line.is_empty())
                .take_while(|line| line.starts_with("- "))
                .map(|line| sanitize_text(&line[2..]))
                .filter(|line| !line.is_empty())
                .collect();
            if items.is_empty() {
                return Err(TailorError::InvalidInput(format!("Overlay section '{}' is empty", name)));
            }
            Ok(items)
        };

        let core_skills: Vec<String> = section("core skills")?
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .split(',')
            .map(sanitize_text)
            .filter(|skill| !skill.is_empty())
            .collect();

        Ok(Self {
            headlines: list("headline options")?,
            summary: list("summary starters")?,
            core_skills,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TailorError::Configuration(format!("Cannot read overlay {}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// Markdown starter pack for `domain`
    pub fn render_pack(&self, domain: &str) -> String {
        let mut lines = vec![format!("# MTO pack, {}", domain), String::new()];
        lines.push("## Headline".to_string());
        lines.extend(self.headlines.first().cloned());
        lines.push(String::new());

        lines.push("## Summary".to_string());
        lines.extend(self.summary.iter().map(|s| format!("- {}", s)));
        lines.push(String::new());

        lines.push("## Three bullets".to_string());
        lines.push("- Increased <metric> by <x> using <method>, which improved <KPI>.".to_string());
        lines.push("- Reduced <time or cost> by <x> with <tool>, enabling <benefit>.".to_string());
        lines.push("- Built <artifact> for <stakeholder> that <action>, resulting in <impact>.".to_string());
        lines.push(String::new());

        lines.push("## Core Skills".to_string());
        let core: Vec<&str> = self.core_skills.iter().take(PACK_CORE_SKILLS).map(String::as_str).collect();
        lines.push(core.join(", "));
        lines.push(String::new());

        lines.push("## Next".to_string());
        lines.push("- Paste two must have JD terms into the Summary.".to_string());
        lines.push("- Swap nouns to match the JD.".to_string());
        lines.push("- Export and submit.".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Write `<run>/outputs/mto_pack.md` from the overlay configured for `domain`
pub fn write_pack(run: &Path, domain: &str, overlays: &BTreeMap<String, PathBuf>) -> Result<PathBuf> {
    let overlay_path = overlays.get(domain).ok_or_else(|| {
        let known: Vec<&str> = overlays.keys().map(String::as_str).collect();
        TailorError::InvalidInput(format!("Unknown domain '{}', expected one of: {}", domain, known.join(", ")))
    })?;
    if !run.is_dir() {
        return Err(TailorError::InvalidInput(format!("Run folder not found: {}", run.display())));
    }

    let overlay = DomainOverlay::load(overlay_path)?;
    let outputs = run.join("outputs");
    std::fs::create_dir_all(&outputs)?;
    let destination = outputs.join(PACK_FILE);
    std::fs::write(&destination, overlay.render_pack(domain))?;

    info!("Wrote {} pack to {}", domain, destination.display());
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Acme Corp."), "Acme_Corp");
        assert_eq!(slug("  Data / BI Analyst (Contract) "), "Data_BI_Analyst_Contract");
        assert_eq!(slug(&"x".repeat(100)).len(), 80);
        assert_eq!(slug("***"), "");
    }

    fn template(root: &Path) -> PathBuf {
        let template = root.join("runs").join("_run_template");
        std::fs::create_dir_all(template.join("inputs")).unwrap();
        std::fs::create_dir_all(template.join("outputs")).unwrap();
        std::fs::write(template.join("inputs").join(NOTES_FILE), "Company, \nRole, \nStatus, applied\n").unwrap();
        std::fs::write(template.join("inputs").join("jd.md"), "Company: \n").unwrap();
        template
    }

    #[test]
    fn test_create_run() {
        let temp_dir = TempDir::new().unwrap();
        let template = template(temp_dir.path());
        let runs_dir = temp_dir.path().join("runs");
        let scaffold = RunScaffold {
            runs_dir: &runs_dir,
            template: &template,
        };

        let run = scaffold.create("Acme Corp", "Data Analyst", Some("2026-10-17")).unwrap();
        assert_eq!(run, runs_dir.join("2026-10-17_Acme_Corp_Data_Analyst"));
        assert!(run.join("outputs").is_dir());
        assert!(run.join("inputs").join("jd.md").is_file());

        let notes = std::fs::read_to_string(run.join("inputs").join(NOTES_FILE)).unwrap();
        assert_eq!(notes, "Company, Acme Corp\nRole, Data Analyst\nStatus, applied\n");

        let again = scaffold.create("Acme Corp", "Data Analyst", Some("2026-10-17"));
        assert!(matches!(again, Err(TailorError::InvalidInput(_))));
    }

    const RETAIL_OVERLAY: &str = "# Retail overlay\n\n\
        ## Headline options\n\
        - Retail Data Analyst | Merchandising and Pricing\n\
        - Retail Insights Analyst\n\n\
        ## Summary starters\n\
        - Analyst who turns POS data into margin wins.\n\
        - Built weekly trading dashboards.\n\n\
        ## Core Skills\n\
        SQL, Power BI, Excel, Python, Forecasting, Pricing, Assortment, Inventory, A/B testing, Tableau, dbt, Looker\n";

    #[test]
    fn test_parse_overlay() {
        let overlay = DomainOverlay::parse(RETAIL_OVERLAY).unwrap();
        assert_eq!(overlay.headlines.len(), 2);
        assert_eq!(overlay.headlines[0], "Retail Data Analyst | Merchandising and Pricing");
        assert_eq!(overlay.summary[1], "Built weekly trading dashboards.");
        assert_eq!(overlay.core_skills.len(), 12);
        assert_eq!(overlay.core_skills[1], "Power BI");

        let missing = DomainOverlay::parse("## Headline options\n- One\n");
        assert!(matches!(missing, Err(TailorError::InvalidInput(_))));
    }

    #[test]
    fn test_write_pack() {
        let temp_dir = TempDir::new().unwrap();
        let overlay_path = temp_dir.path().join("retail.md");
        std::fs::write(&overlay_path, RETAIL_OVERLAY).unwrap();
        let overlays = BTreeMap::from([("retail".to_string(), overlay_path)]);
        let run = temp_dir.path().join("2026-10-17_Acme_Data_Analyst");
        std::fs::create_dir_all(&run).unwrap();

        let pack = write_pack(&run, "retail", &overlays).unwrap();
        assert_eq!(pack, run.join("outputs").join(PACK_FILE));

        let text = std::fs::read_to_string(&pack).unwrap();
        assert!(text.starts_with("# MTO pack, retail\n\n## Headline\nRetail Data Analyst | Merchandising and Pricing\n\n"));
        assert!(text.contains("## Summary\n- Analyst who turns POS data into margin wins.\n- Built weekly trading dashboards.\n"));
        assert!(text.contains("## Three bullets\n- Increased <metric>"));
        assert!(text.contains(
            "## Core Skills\nSQL, Power BI, Excel, Python, Forecasting, Pricing, Assortment, Inventory, A/B testing, Tableau\n"
        ));
        assert!(text.ends_with("- Export and submit.\n"));
    }

    #[test]
    fn test_write_pack_rejects_unknown_domain_and_missing_run() {
        let temp_dir = TempDir::new().unwrap();
        let overlays = BTreeMap::from([("retail".to_string(), temp_dir.path().join("retail.md"))]);

        let unknown = write_pack(temp_dir.path(), "mining", &overlays);
        assert!(matches!(unknown, Err(TailorError::InvalidInput(msg)) if msg.contains("retail")));

        let missing = write_pack(&temp_dir.path().join("nope"), "retail", &overlays);
        assert!(matches!(missing, Err(TailorError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_template() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let scaffold = RunScaffold {
            runs_dir: temp_dir.path(),
            template: &missing,
        };
        assert!(matches!(
            scaffold.create("A", "B", None),
            Err(TailorError::Configuration(_))
        ));
    }
}

//! Prompt templates for bullet generation

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub role_bullets: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            role_bullets: ROLE_BULLETS_TEMPLATE.to_string(),
        }
    }
}

/// Parameters for prompt template substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletPromptParams {
    pub role: String,
    pub job_title: String,
    pub company: String,
    pub min_bullets: usize,
    pub max_bullets: usize,
    pub baseline_bullets: Vec<String>,
}

impl PromptTemplates {
    pub fn render_role_bullets(&self, params: &BulletPromptParams) -> String {
        let reference = if params.baseline_bullets.is_empty() {
            "(none)".to_string()
        } else {
            params
                .baseline_bullets
                .iter()
                .map(|b| format!("- {}", b))
                .collect::<Vec<_>>()
                .join("\n")
        };

        self.role_bullets
            .replace("{min}", &params.min_bullets.to_string())
            .replace("{max}", &params.max_bullets.to_string())
            .replace("{role}", &params.role)
            .replace("{job_title}", &params.job_title)
            .replace("{company}", &params.company)
            .replace("{reference}", &reference)
    }
}

const ROLE_BULLETS_TEMPLATE: &str = r#"Generate {min}-{max} strong resume bullet points for the role '{role}' that align with the job title '{job_title}' at {company}.

Each bullet must begin with a strong action verb, be specific, and highlight measurable impact where possible.
Stay truthful to the existing accomplishments below; rephrase and re-emphasize them, do not invent employers or tools.

EXISTING BULLETS:
{reference}

Return only the bullets, one per line, with no heading or commentary."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_role_bullets() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_role_bullets(&BulletPromptParams {
            role: "Senior Data Analyst".to_string(),
            job_title: "BI Developer".to_string(),
            company: "Initech".to_string(),
            min_bullets: 4,
            max_bullets: 6,
            baseline_bullets: vec!["Built dashboards.".to_string()],
        });

        assert!(prompt.starts_with("Generate 4-6 strong resume bullet points"));
        assert!(prompt.contains("'Senior Data Analyst'"));
        assert!(prompt.contains("'BI Developer' at Initech"));
        assert!(prompt.contains("- Built dashboards."));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_render_without_reference_bullets() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_role_bullets(&BulletPromptParams {
            role: "Analyst".to_string(),
            job_title: "Analyst".to_string(),
            company: "Acme".to_string(),
            min_bullets: 4,
            max_bullets: 6,
            baseline_bullets: Vec::new(),
        });
        assert!(prompt.contains("(none)"));
    }
}

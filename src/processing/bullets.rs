//! Bullet source: generated bullets when available, baseline bullets otherwise

use crate::config::BulletConfig;
use crate::error::Result;
use crate::processing::baseline::RoleBaseline;
use crate::processing::text_processor::sanitize_text;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const LAST_RESORT_FILLER: &str = "Contributed to team deliverables.";

static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*\u{2022}]+\s*|\d{1,2}[.)]\s+)").expect("Invalid bullet marker regex"));

/// Produces raw bullet text for one role
pub trait BulletGenerator {
    fn generate(
        &self,
        request: &BulletRequest<'_>,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone)]
pub struct BulletRequest<'a> {
    pub role: &'a RoleBaseline,
    pub job_title: &'a str,
    pub company: &'a str,
}

#[derive(Debug, Clone)]
pub struct BulletPolicy {
    pub min: usize,
    pub max: usize,
    pub max_chars: usize,
    pub filler: String,
}

impl Default for BulletPolicy {
    fn default() -> Self {
        Self::from(&BulletConfig::default())
    }
}

impl From<&BulletConfig> for BulletPolicy {
    fn from(config: &BulletConfig) -> Self {
        Self {
            min: config.min_bullets,
            max: config.max_bullets.max(config.min_bullets),
            max_chars: config.max_chars,
            filler: config.filler.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOrigin {
    Generated,
    Baseline,
    Filler,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleBullets {
    pub heading: String,
    pub bullets: Vec<String>,
    pub origin: BulletOrigin,
}

/// Split a model response into bullets. Returns `None` when the response is
/// malformed: nothing usable survives, or a line is longer than `max_chars`.
pub fn parse_generated(text: &str, max_chars: usize) -> Option<Vec<String>> {
    let bullets: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| sanitize_text(&BULLET_MARKER.replace(line, "")))
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .collect();

    if bullets.is_empty() || bullets.iter().any(|b| b.len() > max_chars) {
        return None;
    }
    Some(bullets)
}

/// Bring a bullet list into the `[policy.min, policy.max]` range.
///
/// Empty input falls back to the baseline, then to the filler. Long lists are
/// truncated. Short lists are padded with baseline bullets they do not already
/// contain, then by cycling the baseline (or the list itself when there is no
/// baseline).
pub fn normalize_bullets(candidates: &[String], baseline: &[String], policy: &BulletPolicy) -> Vec<String> {
    let clean = |items: &[String]| -> Vec<String> {
        items
            .iter()
            .map(|b| sanitize_text(b))
            .filter(|b| !b.is_empty())
            .collect()
    };

    let baseline = clean(baseline);
    let mut bullets = clean(candidates);

    if bullets.is_empty() {
        bullets = baseline.clone();
    }
    if bullets.is_empty() {
        bullets.push(filler_text(policy));
    }

    bullets.truncate(policy.max);

    if bullets.len() < policy.min {
        for bullet in &baseline {
            if bullets.len() >= policy.min {
                break;
            }
            if !bullets.contains(bullet) {
                bullets.push(bullet.clone());
            }
        }

        let pad_source = if baseline.is_empty() { bullets.clone() } else { baseline };
        let mut cycle = pad_source.iter().cycle();
        while bullets.len() < policy.min {
            match cycle.next() {
                Some(bullet) => bullets.push(bullet.clone()),
                None => break,
            }
        }
    }

    bullets
}

fn filler_text(policy: &BulletPolicy) -> String {
    let filler = sanitize_text(&policy.filler);
    if filler.is_empty() {
        LAST_RESORT_FILLER.to_string()
    } else {
        filler
    }
}

/// Picks bullets per role. A failing or malformed generation never fails the
/// run; the role falls back to its baseline bullets.
pub struct BulletSource<G> {
    generator: Option<G>,
    policy: BulletPolicy,
}

impl<G: BulletGenerator> BulletSource<G> {
    pub fn new(generator: Option<G>, policy: BulletPolicy) -> Self {
        Self { generator, policy }
    }

    pub fn policy(&self) -> &BulletPolicy {
        &self.policy
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn bullets_for(&self, request: &BulletRequest<'_>) -> RoleBullets {
        let heading = request.role.heading.clone();
        let baseline = &request.role.bullets;

        if let Some(generator) = &self.generator {
            match generator.generate(request).await {
                Ok(text) => match parse_generated(&text, self.policy.max_chars) {
                    Some(generated) => {
                        debug!("Generated {} bullets for '{}'", generated.len(), heading);
                        return RoleBullets {
                            bullets: normalize_bullets(&generated, baseline, &self.policy),
                            heading,
                            origin: BulletOrigin::Generated,
                        };
                    }
                    None => warn!("Malformed bullet response for '{}', using baseline", heading),
                },
                Err(e) => warn!("Bullet generation failed for '{}': {}; using baseline", heading, e),
            }
        }

        let origin = if baseline.iter().any(|b| !sanitize_text(b).is_empty()) {
            BulletOrigin::Baseline
        } else {
            warn!("No baseline bullets for '{}', using filler", heading);
            BulletOrigin::Filler
        };

        RoleBullets {
            bullets: normalize_bullets(&[], baseline, &self.policy),
            heading,
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TailorError;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn role(bullets: &[&str]) -> RoleBaseline {
        RoleBaseline {
            heading: "Data Analyst".to_string(),
            title: None,
            employer: "Acme".to_string(),
            dates: "2020 - 2022".to_string(),
            location: "Remote".to_string(),
            bullets: strings(bullets),
        }
    }

    struct CannedGenerator(std::result::Result<String, String>);

    impl BulletGenerator for CannedGenerator {
        async fn generate(&self, _request: &BulletRequest<'_>) -> Result<String> {
            self.0.clone().map_err(TailorError::Llm)
        }
    }

    #[test]
    fn test_normalize_length_always_in_range() {
        let policy = BulletPolicy::default();
        let baselines = [strings(&[]), strings(&["b1"]), strings(&["b1", "b2", "b3", "b4", "b5", "b6", "b7"])];

        for len in 1..=10 {
            let candidates: Vec<String> = (0..len).map(|i| format!("Generated bullet {}", i)).collect();
            for baseline in &baselines {
                let bullets = normalize_bullets(&candidates, baseline, &policy);
                assert!(
                    (4..=6).contains(&bullets.len()),
                    "len {} with baseline {:?} gave {}",
                    len,
                    baseline,
                    bullets.len()
                );
            }
        }
    }

    #[test]
    fn test_normalize_truncates_to_max() {
        let policy = BulletPolicy::default();
        let candidates = strings(&["1", "2", "3", "4", "5", "6", "7", "8"]);
        assert_eq!(normalize_bullets(&candidates, &[], &policy), strings(&["1", "2", "3", "4", "5", "6"]));
    }

    #[test]
    fn test_normalize_pads_with_unused_baseline_first() {
        let policy = BulletPolicy::default();
        let candidates = strings(&["New one", "Base A"]);
        let baseline = strings(&["Base A", "Base B", "Base C"]);

        let bullets = normalize_bullets(&candidates, &baseline, &policy);
        assert_eq!(bullets, strings(&["New one", "Base A", "Base B", "Base C"]));
    }

    #[test]
    fn test_normalize_cycles_short_baseline() {
        let policy = BulletPolicy::default();
        let bullets = normalize_bullets(&strings(&["Only"]), &strings(&["Base"]), &policy);
        assert_eq!(bullets, strings(&["Only", "Base", "Base", "Base"]));
    }

    #[test]
    fn test_normalize_empty_everything_uses_filler() {
        let policy = BulletPolicy::default();
        let bullets = normalize_bullets(&[], &[], &policy);
        assert_eq!(bullets.len(), 4);
        assert!(bullets.iter().all(|b| b == &policy.filler));
    }

    #[test]
    fn test_parse_generated_strips_markers_and_preamble() {
        let text = "Here are your bullets:\n\n- Led migration to dbt\n* Cut refresh time by 40%\n\u{2022} Built KPI suite\n2. Mentored two analysts\n";
        let bullets = parse_generated(text, 350).unwrap();
        assert_eq!(
            bullets,
            strings(&[
                "Led migration to dbt",
                "Cut refresh time by 40%",
                "Built KPI suite",
                "Mentored two analysts"
            ])
        );
    }

    #[test]
    fn test_parse_generated_rejects_malformed() {
        assert!(parse_generated("", 350).is_none());
        assert!(parse_generated("   \n - \n", 350).is_none());
        assert!(parse_generated(&"x".repeat(400), 350).is_none());
    }

    #[tokio::test]
    async fn test_source_prefers_generated() {
        let generator = CannedGenerator(Ok("- One\n- Two\n- Three\n- Four\n- Five".to_string()));
        let source = BulletSource::new(Some(generator), BulletPolicy::default());
        let role = role(&["Base"]);

        let result = source
            .bullets_for(&BulletRequest { role: &role, job_title: "Analyst", company: "Acme" })
            .await;

        assert_eq!(result.origin, BulletOrigin::Generated);
        assert_eq!(result.bullets, strings(&["One", "Two", "Three", "Four", "Five"]));
    }

    #[tokio::test]
    async fn test_source_falls_back_on_error() {
        let source = BulletSource::new(Some(CannedGenerator(Err("timeout".to_string()))), BulletPolicy::default());
        let role = role(&["A", "B", "C", "D"]);

        let result = source
            .bullets_for(&BulletRequest { role: &role, job_title: "Analyst", company: "Acme" })
            .await;

        assert_eq!(result.origin, BulletOrigin::Baseline);
        assert_eq!(result.bullets, strings(&["A", "B", "C", "D"]));
    }

    #[tokio::test]
    async fn test_source_falls_back_on_empty_response() {
        let source = BulletSource::new(Some(CannedGenerator(Ok("\n\n".to_string()))), BulletPolicy::default());
        let role = role(&["A", "B"]);

        let result = source
            .bullets_for(&BulletRequest { role: &role, job_title: "Analyst", company: "Acme" })
            .await;

        assert_eq!(result.origin, BulletOrigin::Baseline);
        assert_eq!(result.bullets.len(), 4);
    }

    #[tokio::test]
    async fn test_source_without_generator_or_baseline() {
        let source: BulletSource<CannedGenerator> = BulletSource::new(None, BulletPolicy::default());
        let role = role(&[]);

        let result = source
            .bullets_for(&BulletRequest { role: &role, job_title: "Analyst", company: "Acme" })
            .await;

        assert_eq!(result.origin, BulletOrigin::Filler);
        assert_eq!(result.bullets.len(), 4);
    }
}

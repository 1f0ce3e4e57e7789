//! Keyword coverage scoring: what share of job-description terms a resume mentions

use crate::config::ScoringConfig;
use crate::processing::text_processor::{bigrams, TextProcessor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Unigram and bigram sets of a text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermSets {
    pub unigrams: BTreeSet<String>,
    pub bigrams: BTreeSet<String>,
}

impl TermSets {
    pub fn contains(&self, term: &str) -> bool {
        self.unigrams.contains(term) || self.bigrams.contains(term)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// 0.0..=100.0, one decimal
    pub coverage_percent: f64,
    pub evaluated_terms: usize,
    pub present_terms: Vec<String>,
    pub missing_terms: Vec<String>,
}

impl CoverageReport {
    /// Copy with both term lists cut to `limit` entries
    pub fn truncated(&self, limit: usize) -> Self {
        Self {
            coverage_percent: self.coverage_percent,
            evaluated_terms: self.evaluated_terms,
            present_terms: self.present_terms.iter().take(limit).cloned().collect(),
            missing_terms: self.missing_terms.iter().take(limit).cloned().collect(),
        }
    }
}

pub struct CoverageScorer {
    processor: TextProcessor,
    max_terms: usize,
    min_unigram_len: usize,
}

impl Default for CoverageScorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl CoverageScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            processor: TextProcessor::new(),
            max_terms: config.max_terms.max(1),
            min_unigram_len: config.min_unigram_len,
        }
    }

    /// Terms the job description asks for. Unigrams shorter than the
    /// configured minimum are left out; bigrams are always kept.
    pub fn job_terms(&self, jd_text: &str) -> TermSets {
        let tokens = self.processor.tokenize(jd_text);
        TermSets {
            unigrams: tokens
                .iter()
                .filter(|t| t.chars().count() >= self.min_unigram_len)
                .cloned()
                .collect(),
            bigrams: bigrams(&tokens).into_iter().collect(),
        }
    }

    /// Every unigram and bigram of the text, unfiltered
    pub fn text_terms(&self, text: &str) -> TermSets {
        let tokens = self.processor.tokenize(text);
        TermSets {
            bigrams: bigrams(&tokens).into_iter().collect(),
            unigrams: tokens.into_iter().collect(),
        }
    }

    /// Score `resume_text` against the job description terms.
    ///
    /// The union of JD unigrams and bigrams is sorted and capped at
    /// `max_terms`; a term is present when it appears among the resume's
    /// unigrams or bigrams.
    pub fn score(&self, jd_text: &str, resume_text: &str) -> CoverageReport {
        let job = self.job_terms(jd_text);
        let resume = self.text_terms(resume_text);

        let target: Vec<String> = job
            .unigrams
            .union(&job.bigrams)
            .take(self.max_terms)
            .cloned()
            .collect();

        let (present_terms, missing_terms): (Vec<String>, Vec<String>) =
            target.iter().cloned().partition(|term| resume.contains(term));

        let coverage_percent = round_to(
            100.0 * present_terms.len() as f64 / target.len().max(1) as f64,
            1,
        );

        CoverageReport {
            coverage_percent,
            evaluated_terms: target.len(),
            present_terms,
            missing_terms,
        }
    }
}

/// Share of a skills list that appears among the JD's tokens, as a percentage
/// rounded to two decimals. Skills are matched whole and lower-cased, so only
/// single-word skills can match.
pub fn skill_list_score(jd_text: &str, skills: &[String]) -> f64 {
    let skills: Vec<String> = skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        return 0.0;
    }

    let jd_tokens: HashSet<String> = jd_text
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    let matched = skills.iter().filter(|s| jd_tokens.contains(s.as_str())).count();
    round_to(matched as f64 / skills.len() as f64 * 100.0, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

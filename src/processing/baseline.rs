//! Static baseline resume content

use crate::error::{Result, TailorError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Baselines {
    pub contact: Contact,
    pub summary: Vec<String>,
    pub experience: Vec<RoleBaseline>,
    pub education: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            name: "Your Name".to_string(),
            location: String::new(),
            email: String::new(),
            phone: "Phone: Provided on request".to_string(),
            linkedin: None,
            portfolio: None,
        }
    }
}

/// One role in the experience section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleBaseline {
    /// Text that identifies the role's heading in the Word template
    pub heading: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub employer: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

impl RoleBaseline {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.heading)
    }
}

impl Baselines {
    /// Missing or unreadable baselines abort the run
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TailorError::Configuration(format!(
                "Baseline file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let baselines: Baselines = serde_json::from_str(content)?;
        Ok(baselines)
    }

    pub fn role(&self, heading: &str) -> Option<&RoleBaseline> {
        self.experience.iter().find(|r| r.heading == heading)
    }

    /// Fallback bullets for a role heading; empty for unknown headings
    pub fn bullets_for(&self, heading: &str) -> &[String] {
        self.role(heading).map(|r| r.bullets.as_slice()).unwrap_or(&[])
    }

    pub fn headings(&self) -> Vec<String> {
        self.experience.iter().map(|r| r.heading.clone()).collect()
    }
}

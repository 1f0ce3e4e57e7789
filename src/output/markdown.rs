//! Markdown rendering of the tailored resume

use crate::processing::baseline::Baselines;
use crate::processing::bullets::RoleBullets;
use crate::processing::text_processor::sanitize_text;

pub struct ResumeRenderer<'a> {
    baselines: &'a Baselines,
    max_bullets: usize,
}

impl<'a> ResumeRenderer<'a> {
    pub fn new(baselines: &'a Baselines, max_bullets: usize) -> Self {
        Self { baselines, max_bullets }
    }

    /// Render the resume. Roles without an entry in `roles` keep their
    /// baseline bullets.
    pub fn render(&self, roles: &[RoleBullets]) -> String {
        let mut lines: Vec<String> = Vec::new();
        let contact = &self.baselines.contact;

        lines.push(format!("# {}", sanitize_text(&contact.name)));
        let contact_line: Vec<String> = [&contact.location, &contact.email, &contact.phone]
            .into_iter()
            .map(|s| sanitize_text(s))
            .filter(|s| !s.is_empty())
            .collect();
        lines.push(contact_line.join(" | "));

        let links: Vec<String> = [("LinkedIn", &contact.linkedin), ("Portfolio", &contact.portfolio)]
            .into_iter()
            .filter_map(|(label, url)| {
                url.as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(|u| format!("[{}]({})", label, u))
            })
            .collect();
        if !links.is_empty() {
            lines.push(links.join(" | "));
        }
        lines.push(String::new());

        if !self.baselines.summary.is_empty() {
            lines.push("## Summary".to_string());
            push_list(&mut lines, &self.baselines.summary);
            lines.push(String::new());
        }

        lines.push("## Professional Experience".to_string());
        for role in &self.baselines.experience {
            lines.push(format!(
                "### {} | {}",
                sanitize_text(role.display_title()),
                sanitize_text(&role.employer)
            ));
            lines.push(format!("{} | {}", sanitize_text(&role.dates), sanitize_text(&role.location)));

            let bullets = roles
                .iter()
                .find(|r| r.heading == role.heading)
                .map(|r| r.bullets.as_slice())
                .unwrap_or(role.bullets.as_slice());
            let bullets: Vec<String> = bullets
                .iter()
                .map(|b| sanitize_text(b))
                .filter(|b| !b.is_empty())
                .take(self.max_bullets)
                .collect();
            push_list(&mut lines, &bullets);
            lines.push(String::new());
        }

        lines.push("## Education".to_string());
        push_list(&mut lines, &self.baselines.education);
        lines.push(String::new());

        lines.push("## Skills".to_string());
        push_list(&mut lines, &self.baselines.skills);
        lines.push(String::new());

        lines.join("\n")
    }
}

fn push_list(lines: &mut Vec<String>, items: &[String]) {
    lines.extend(
        items
            .iter()
            .map(|item| sanitize_text(item))
            .filter(|item| !item.is_empty())
            .map(|item| format!("- {}", item)),
    );
}

/// `<prefix>_<Company>.<ext>` with spaces and path separators replaced
pub fn resume_file_name(prefix: &str, company: &str, extension: &str) -> String {
    let company: String = sanitize_text(company)
        .chars()
        .map(|c| if c == ' ' || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_{}.{}", prefix, company, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::bullets::BulletOrigin;

    const BASELINES: &str = r#"{
        "contact": {
            "name": "Jane Roe",
            "location": "Toronto, ON",
            "email": "jane@example.com",
            "linkedin": "https://linkedin.com/in/janeroe"
        },
        "summary": ["Analyst — eight years"],
        "experience": [
            {
                "heading": "Data Analyst",
                "employer": "Globex",
                "dates": "2018 - 2021",
                "location": "Remote",
                "bullets": ["Baseline one", "Baseline two"]
            },
            {
                "heading": "Team Lead",
                "title": "Analytics Team Lead",
                "employer": "Initech",
                "dates": "2021 - Present",
                "location": "Toronto, ON",
                "bullets": ["Lead one"]
            }
        ],
        "education": ["BSc Statistics"],
        "skills": ["SQL, Power BI"]
    }"#;

    #[test]
    fn test_render_layout() {
        let baselines = Baselines::from_json(BASELINES).unwrap();
        let roles = vec![RoleBullets {
            heading: "Data Analyst".to_string(),
            bullets: vec!["Built \u{201c}dashboards\u{201d}".to_string(), "Cut costs".to_string()],
            origin: BulletOrigin::Generated,
        }];

        let md = ResumeRenderer::new(&baselines, 6).render(&roles);
        let expected = "# Jane Roe\n\
            Toronto, ON | jane@example.com | Phone: Provided on request\n\
            [LinkedIn](https://linkedin.com/in/janeroe)\n\
            \n\
            ## Summary\n\
            - Analyst - eight years\n\
            \n\
            ## Professional Experience\n\
            ### Data Analyst | Globex\n\
            2018 - 2021 | Remote\n\
            - Built \"dashboards\"\n\
            - Cut costs\n\
            \n\
            ### Analytics Team Lead | Initech\n\
            2021 - Present | Toronto, ON\n\
            - Lead one\n\
            \n\
            ## Education\n\
            - BSc Statistics\n\
            \n\
            ## Skills\n\
            - SQL, Power BI\n";
        assert_eq!(md, expected);
        assert!(md.is_ascii());
    }

    #[test]
    fn test_bullets_capped() {
        let baselines = Baselines::from_json(BASELINES).unwrap();
        let roles = vec![RoleBullets {
            heading: "Team Lead".to_string(),
            bullets: (1..=8).map(|i| format!("Bullet {}", i)).collect(),
            origin: BulletOrigin::Generated,
        }];
        let md = ResumeRenderer::new(&baselines, 6).render(&roles);
        assert!(md.contains("- Bullet 6"));
        assert!(!md.contains("- Bullet 7"));
    }

    #[test]
    fn test_resume_file_name() {
        assert_eq!(resume_file_name("Resume", "Acme Corp", "md"), "Resume_Acme_Corp.md");
        assert_eq!(resume_file_name("Resume", "A/B", "docx"), "Resume_A_B.docx");
    }
}

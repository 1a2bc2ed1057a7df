use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// Structured resume document as produced by the generation service, plus a
// renderer that turns it into a Markdown file. Rendering is side-effect
// only; whoever calls it owns the failure.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeDoc {
    pub meta: ResumeMeta,
    pub header: ResumeHeader,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationSection>,
    pub projects: Vec<ProjectEntry>,
    pub extras: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeMeta {
    pub target_role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeHeader {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationSection {
    pub degree: String,
    pub institution: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub name: String,
    pub bullets: Vec<String>,
}

const WRAP_WIDTH: usize = 80;

fn push_bullets(out: &mut String, bullets: &[String]) {
    for bullet in bullets {
        let bullet = bullet.trim();
        if bullet.is_empty() {
            continue;
        }
        let wrapped = textwrap::fill(
            bullet,
            textwrap::Options::new(WRAP_WIDTH)
                .initial_indent("- ")
                .subsequent_indent("  "),
        );
        out.push_str(&wrapped);
        out.push('\n');
    }
}

pub fn render_markdown(doc: &ResumeDoc) -> String {
    let mut out = String::new();

    let name = if doc.header.name.trim().is_empty() {
        "Your Name"
    } else {
        doc.header.name.trim()
    };
    out.push_str(&format!("# {}\n\n", name));

    let contact: Vec<&str> = [
        doc.header.email.as_str(),
        doc.header.phone.as_str(),
        doc.header.linkedin.as_str(),
        doc.header.github.as_str(),
        doc.header.location.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.trim().is_empty())
    .collect();
    if !contact.is_empty() {
        out.push_str(&contact.join(" | "));
        out.push_str("\n\n");
    }

    if !doc.meta.target_role.trim().is_empty() {
        out.push_str(&format!("*{}*\n\n", doc.meta.target_role.trim()));
    }

    if !doc.summary.trim().is_empty() {
        out.push_str("## Summary\n\n");
        out.push_str(&textwrap::fill(doc.summary.trim(), WRAP_WIDTH));
        out.push_str("\n\n");
    }

    let skills: Vec<&str> = doc
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !skills.is_empty() {
        out.push_str("## Skills\n\n");
        for skill in skills {
            out.push_str(&format!("- {}\n", skill));
        }
        out.push('\n');
    }

    if !doc.experience.is_empty() {
        out.push_str("## Experience\n\n");
        for exp in &doc.experience {
            let heading: Vec<&str> = [exp.title.as_str(), exp.company.as_str()]
                .into_iter()
                .filter(|part| !part.trim().is_empty())
                .collect();
            if !heading.is_empty() {
                out.push_str(&format!("### {}\n\n", heading.join(" – ")));
            }

            let mut sub = Vec::new();
            if !exp.location.trim().is_empty() {
                sub.push(exp.location.trim().to_string());
            }
            if !exp.start.trim().is_empty() || !exp.end.trim().is_empty() {
                sub.push(format!("{} – {}", exp.start.trim(), exp.end.trim()));
            }
            if !sub.is_empty() {
                out.push_str(&format!("{}\n\n", sub.join(" | ")));
            }

            push_bullets(&mut out, &exp.bullets);
            out.push('\n');
        }
    }

    if !doc.education.is_empty() {
        out.push_str("## Education\n\n");
        for edu in &doc.education {
            let line: Vec<&str> = [edu.degree.as_str(), edu.institution.as_str()]
                .into_iter()
                .filter(|part| !part.trim().is_empty())
                .collect();
            if !line.is_empty() {
                out.push_str(&format!("{}\n\n", line.join(" – ")));
            }
            push_bullets(&mut out, &edu.bullets);
            out.push('\n');
        }
    }

    if !doc.projects.is_empty() {
        out.push_str("## Projects\n\n");
        for project in &doc.projects {
            if !project.name.trim().is_empty() {
                out.push_str(&format!("**{}**\n\n", project.name.trim()));
            }
            push_bullets(&mut out, &project.bullets);
            out.push('\n');
        }
    }

    let extras: Vec<&str> = doc
        .extras
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect();
    if !extras.is_empty() {
        out.push_str("## Additional\n\n");
        for extra in extras {
            out.push_str(&format!("- {}\n", extra));
        }
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

pub fn write_markdown(doc: &ResumeDoc, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, render_markdown(doc))
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> ResumeDoc {
        ResumeDoc {
            meta: ResumeMeta {
                target_role: "Backend Engineer".to_string(),
            },
            header: ResumeHeader {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "012-3456789".to_string(),
                ..ResumeHeader::default()
            },
            summary: "Engineer with five years of backend experience.".to_string(),
            skills: vec!["Rust".to_string(), " ".to_string(), "SQL".to_string()],
            experience: vec![ExperienceEntry {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                start: "2021".to_string(),
                end: "2025".to_string(),
                bullets: vec!["Built the billing pipeline".to_string(), "".to_string()],
                ..ExperienceEntry::default()
            }],
            education: vec![EducationSection {
                degree: "BSc Computer Science".to_string(),
                institution: "Uni".to_string(),
                bullets: vec![],
            }],
            projects: vec![],
            extras: vec!["Driving licence".to_string()],
        }
    }

    #[test]
    fn test_render_markdown_sections() {
        let md = render_markdown(&sample_doc());

        assert!(md.starts_with("# Jane Doe\n"));
        assert!(md.contains("jane@example.com | 012-3456789"));
        assert!(md.contains("*Backend Engineer*"));
        assert!(md.contains("## Summary"));
        assert!(md.contains("## Skills\n\n- Rust\n- SQL\n"));
        assert!(md.contains("### Engineer – Acme"));
        assert!(md.contains("2021 – 2025"));
        assert!(md.contains("- Built the billing pipeline"));
        assert!(md.contains("BSc Computer Science – Uni"));
        assert!(md.contains("## Additional\n\n- Driving licence"));
    }

    #[test]
    fn test_render_markdown_empty_doc_still_has_a_name() {
        let md = render_markdown(&ResumeDoc::default());
        assert!(md.starts_with("# Your Name"));
        assert!(!md.contains("## Summary"));
    }

    #[test]
    fn test_render_markdown_wraps_long_bullets() {
        let mut doc = ResumeDoc::default();
        doc.experience.push(ExperienceEntry {
            title: "Engineer".to_string(),
            bullets: vec!["word ".repeat(40).trim().to_string()],
            ..ExperienceEntry::default()
        });

        let md = render_markdown(&doc);
        assert!(md.lines().all(|line| line.len() <= WRAP_WIDTH));
        assert!(md.contains("\n  word"));
    }

    #[test]
    fn test_write_markdown_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resumes").join("h1.md");

        write_markdown(&sample_doc(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Jane Doe"));
    }

    #[test]
    fn test_resume_doc_tolerates_partial_json() {
        let doc: ResumeDoc = serde_json::from_str(
            r#"{"header": {"name": "Jane"}, "skills": ["Rust"], "meta": {"targetRole": "SRE"}}"#,
        )
        .unwrap();
        assert_eq!(doc.header.name, "Jane");
        assert_eq!(doc.meta.target_role, "SRE");
        assert!(doc.experience.is_empty());
    }
}

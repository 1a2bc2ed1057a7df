use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::EmailDraft;

/// Where generated artifacts live, keyed by hunt id. The hunt-table
/// projection asks this for its Resume/Email presence flags; the generation
/// flows write through it.
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.to_path_buf(),
        }
    }

    pub fn resume_path(&self, hunt_id: &str) -> PathBuf {
        self.root.join("resumes").join(format!("{hunt_id}.md"))
    }

    pub fn email_draft_path(&self, hunt_id: &str) -> PathBuf {
        self.root.join("emails").join(format!("{hunt_id}.json"))
    }

    pub fn has_resume(&self, hunt_id: &str) -> bool {
        !hunt_id.is_empty() && self.resume_path(hunt_id).exists()
    }

    pub fn has_email_draft(&self, hunt_id: &str) -> bool {
        !hunt_id.is_empty() && self.email_draft_path(hunt_id).exists()
    }

    pub fn save_email_draft(&self, hunt_id: &str, draft: &EmailDraft) -> Result<PathBuf> {
        let path = self.email_draft_path(hunt_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(draft)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn load_email_draft(&self, hunt_id: &str) -> Result<Option<EmailDraft>> {
        let path = self.email_draft_path(hunt_id);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let draft = serde_json::from_str(&text)
            .with_context(|| format!("Malformed email draft {}", path.display()))?;
        Ok(Some(draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_flags_follow_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(dir.path());

        assert!(!artifacts.has_resume("h1"));
        assert!(!artifacts.has_email_draft("h1"));
        assert!(!artifacts.has_resume(""));

        let resume_path = artifacts.resume_path("h1");
        fs::create_dir_all(resume_path.parent().unwrap()).unwrap();
        fs::write(&resume_path, "# Resume").unwrap();
        assert!(artifacts.has_resume("h1"));
    }

    #[test]
    fn test_email_draft_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(dir.path());

        let draft = EmailDraft {
            subject: "Application for Engineer".to_string(),
            body: "Dear hiring team,\n...".to_string(),
        };
        artifacts.save_email_draft("h1", &draft).unwrap();

        let loaded = artifacts.load_email_draft("h1").unwrap().unwrap();
        assert_eq!(loaded, draft);
        assert!(artifacts.has_email_draft("h1"));
        assert_eq!(artifacts.load_email_draft("h2").unwrap(), None);
    }
}

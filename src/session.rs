use anyhow::{Context, Result, anyhow};

use crate::models::{Company, Hunt, PersonalDetails, Progress, Reminder};
use crate::store::{RecordKind, Store};

/// The central session object: owns the in-memory collections for every
/// record kind plus the store they came from. Editor surfaces receive a
/// reference to it; they work on private projections and merge edits back
/// through the reconciler, never mutating these collections mid-edit.
pub struct Session {
    store: Store,
    pub hunts: Vec<Hunt>,
    pub companies: Vec<Company>,
    pub reminders: Vec<Reminder>,
    pub progress: Vec<Progress>,
    pub personal: PersonalDetails,
}

impl Session {
    /// Load every collection from the store. Missing files come back as
    /// empty collections, so a first run needs no setup step.
    pub fn load(store: Store) -> Result<Self> {
        let hunts = store
            .load(RecordKind::Hunt)?
            .iter()
            .map(|row| Hunt::from_row(row))
            .collect();
        let companies = store
            .load(RecordKind::Company)?
            .iter()
            .map(|row| Company::from_row(row))
            .collect();
        let reminders = store
            .load(RecordKind::Reminder)?
            .iter()
            .map(|row| Reminder::from_row(row))
            .collect();
        let progress = store
            .load(RecordKind::Progress)?
            .iter()
            .map(|row| Progress::from_row(row))
            .collect();
        let personal = store.load_personal();

        Ok(Self {
            store,
            hunts,
            companies,
            reminders,
            progress,
            personal,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // --- Persistence (whole-file overwrite per kind) ---

    pub fn save_hunts(&self) -> Result<()> {
        let rows: Vec<_> = self.hunts.iter().map(Hunt::to_row).collect();
        self.store.save(RecordKind::Hunt, &rows)
    }

    pub fn save_companies(&self) -> Result<()> {
        let rows: Vec<_> = self.companies.iter().map(Company::to_row).collect();
        self.store.save(RecordKind::Company, &rows)
    }

    pub fn save_reminders(&self) -> Result<()> {
        let rows: Vec<_> = self.reminders.iter().map(Reminder::to_row).collect();
        self.store.save(RecordKind::Reminder, &rows)
    }

    pub fn save_progress(&self) -> Result<()> {
        let rows: Vec<_> = self.progress.iter().map(Progress::to_row).collect();
        self.store.save(RecordKind::Progress, &rows)
    }

    pub fn save_personal(&self) -> Result<()> {
        self.store.save_personal(&self.personal)
    }

    pub fn save_all(&self) -> Result<()> {
        self.save_hunts()
            .and_then(|_| self.save_companies())
            .and_then(|_| self.save_reminders())
            .and_then(|_| self.save_progress())
            .and_then(|_| self.save_personal())
            .context("Failed to save session")
    }

    // --- Relationship resolver ---

    /// First case-sensitive exact name match, scanning insertion order.
    pub fn find_company_by_name(&self, name: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.name == name)
    }

    pub fn company_by_id(&self, company_id: &str) -> Option<&Company> {
        if company_id.is_empty() {
            return None;
        }
        self.companies.iter().find(|c| c.id == company_id)
    }

    pub fn hunt_by_id(&self, hunt_id: &str) -> Option<&Hunt> {
        if hunt_id.is_empty() {
            return None;
        }
        self.hunts.iter().find(|h| h.id == hunt_id)
    }

    /// True iff at least one hunt still references this company id. The
    /// guard consulted before any company deletion.
    pub fn is_company_referenced(&self, company_id: &str) -> bool {
        if company_id.is_empty() {
            return false;
        }
        self.hunts.iter().any(|h| h.company_id == company_id)
    }

    /// Reminders for one hunt, in stored order. Rows with a dangling huntId
    /// are tolerated at rest but never show up in a hunt-scoped view.
    pub fn reminders_for_hunt(&self, hunt_id: &str) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.hunt_id == hunt_id)
            .collect()
    }

    pub fn progress_for_hunt(&self, hunt_id: &str) -> Vec<&Progress> {
        self.progress
            .iter()
            .filter(|p| p.hunt_id == hunt_id)
            .collect()
    }

    /// Display label for a hunt: "<jobTitle> @ <companyName>", or just the
    /// title while no company is assigned.
    pub fn hunt_label(&self, hunt_id: &str) -> String {
        let Some(hunt) = self.hunt_by_id(hunt_id) else {
            return String::new();
        };
        let company_name = self
            .company_by_id(&hunt.company_id)
            .map(|c| c.name.as_str())
            .unwrap_or("");
        if company_name.is_empty() {
            hunt.job_title.clone()
        } else {
            format!("{} @ {}", hunt.job_title, company_name)
        }
    }

    /// (label, huntId) pairs for cross-hunt selection controls, in stored
    /// order.
    pub fn hunt_choices(&self) -> Vec<(String, String)> {
        self.hunts
            .iter()
            .map(|h| (self.hunt_label(&h.id), h.id.clone()))
            .collect()
    }

    /// Resolve a user-supplied hunt reference: full id, unique id prefix
    /// (4+ chars), or exact label. On a miss, the error suggests the
    /// closest-looking label.
    pub fn resolve_hunt(&self, reference: &str) -> Result<&Hunt> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(anyhow!("No hunt given"));
        }

        if let Some(hunt) = self.hunt_by_id(reference) {
            return Ok(hunt);
        }

        if reference.len() >= 4 {
            let mut matches = self.hunts.iter().filter(|h| h.id.starts_with(reference));
            if let Some(hunt) = matches.next() {
                if matches.next().is_none() {
                    return Ok(hunt);
                }
                return Err(anyhow!("Hunt id prefix '{}' is ambiguous", reference));
            }
        }

        if let Some((_, id)) = self
            .hunt_choices()
            .into_iter()
            .find(|(label, _)| label == reference)
        {
            // hunt_choices only yields ids present in hunts
            if let Some(hunt) = self.hunt_by_id(&id) {
                return Ok(hunt);
            }
        }

        let labels: Vec<String> = self.hunt_choices().into_iter().map(|(l, _)| l).collect();
        match closest_match(reference, &labels) {
            Some(suggestion) => Err(anyhow!(
                "No hunt matches '{}'. Did you mean '{}'?",
                reference,
                suggestion
            )),
            None => Err(anyhow!("No hunt matches '{}'", reference)),
        }
    }
}

/// Closest candidate by normalized Levenshtein similarity, if any is close
/// enough to be a plausible typo.
pub fn closest_match<'a>(target: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (strsim::normalized_levenshtein(target, c), c.as_str()))
        .filter(|(score, _)| *score > 0.5)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn session_with(
        hunts: Vec<Hunt>,
        companies: Vec<Company>,
        reminders: Vec<Reminder>,
        progress: Vec<Progress>,
    ) -> Session {
        Session {
            store: Store::at("unused"),
            hunts,
            companies,
            reminders,
            progress,
            personal: PersonalDetails::default(),
        }
    }

    fn company(id: &str, name: &str) -> Company {
        Company {
            id: id.to_string(),
            name: name.to_string(),
            ..Company::default()
        }
    }

    fn hunt(id: &str, title: &str, company_id: &str) -> Hunt {
        Hunt {
            id: id.to_string(),
            job_title: title.to_string(),
            company_id: company_id.to_string(),
            ..Hunt::default()
        }
    }

    #[test]
    fn test_find_company_by_name_is_case_sensitive_first_match() {
        let session = session_with(
            vec![],
            vec![
                company("c1", "acme"),
                company("c2", "Acme"),
                company("c3", "Acme"),
            ],
            vec![],
            vec![],
        );

        let found = session.find_company_by_name("Acme").unwrap();
        assert_eq!(found.id, "c2");
        assert!(session.find_company_by_name("ACME").is_none());
    }

    #[test]
    fn test_is_company_referenced() {
        let session = session_with(
            vec![hunt("h1", "Engineer", "c1"), hunt("h2", "Analyst", "")],
            vec![company("c1", "Acme"), company("c2", "Globex")],
            vec![],
            vec![],
        );

        assert!(session.is_company_referenced("c1"));
        assert!(!session.is_company_referenced("c2"));
        assert!(!session.is_company_referenced(""));
    }

    #[test]
    fn test_reminders_for_hunt_preserves_stored_order_and_skips_orphans() {
        let reminder = |id: &str, hunt_id: &str| Reminder {
            id: id.to_string(),
            hunt_id: hunt_id.to_string(),
            ..Reminder::default()
        };
        let session = session_with(
            vec![hunt("h1", "Engineer", "")],
            vec![],
            vec![
                reminder("r1", "h1"),
                reminder("r2", "gone"),
                reminder("r3", "h1"),
            ],
            vec![],
        );

        let scoped: Vec<&str> = session
            .reminders_for_hunt("h1")
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(scoped, vec!["r1", "r3"]);
    }

    #[test]
    fn test_hunt_label_and_choices() {
        let session = session_with(
            vec![hunt("h1", "Engineer", "c1"), hunt("h2", "Analyst", "")],
            vec![company("c1", "Acme")],
            vec![],
            vec![],
        );

        assert_eq!(session.hunt_label("h1"), "Engineer @ Acme");
        assert_eq!(session.hunt_label("h2"), "Analyst");
        assert_eq!(
            session.hunt_choices(),
            vec![
                ("Engineer @ Acme".to_string(), "h1".to_string()),
                ("Analyst".to_string(), "h2".to_string()),
            ]
        );
    }

    #[test]
    fn test_resolve_hunt_by_id_prefix_and_label() {
        let session = session_with(
            vec![
                hunt("aaaa1111bbbb", "Engineer", "c1"),
                hunt("aaaa2222cccc", "Analyst", ""),
            ],
            vec![company("c1", "Acme")],
            vec![],
            vec![],
        );

        assert_eq!(session.resolve_hunt("aaaa1111bbbb").unwrap().job_title, "Engineer");
        assert_eq!(session.resolve_hunt("aaaa2222").unwrap().job_title, "Analyst");
        assert!(session.resolve_hunt("aaaa").is_err()); // ambiguous prefix
        assert_eq!(
            session.resolve_hunt("Engineer @ Acme").unwrap().id,
            "aaaa1111bbbb"
        );

        let err = session.resolve_hunt("Enginer @ Acme").unwrap_err().to_string();
        assert!(err.contains("Did you mean 'Engineer @ Acme'"), "{err}");
    }
}

use anyhow::{Result, anyhow, bail};
use std::collections::{HashMap, HashSet};

use crate::ids::new_id;
use crate::models::{
    COMPANY_WIDTH, Company, Hunt, PROGRESS_WIDTH, Progress, REMINDER_WIDTH, Reminder, is_yes,
    yes_no,
};
use crate::project::{HUNT_TABLE_ID_COL, HUNT_TABLE_WIDTH};
use crate::session::{Session, closest_match};
use crate::store::normalize_row;

// Counterpart of the projector: merges an edited display snapshot back into
// the normalized collections. Ids are minted by creation flows before a row
// ever enters an editable set; the reconciler itself never invents one.

/// Merge an edited hunt-table snapshot into the hunt collection.
///
/// Per edited row: a non-empty id matching a current hunt replaces exactly
/// the editable columns (Job Title through Has Health Insurance); id,
/// companyId and the computed columns are never written back. Rows with an
/// empty or unknown id are ignored. Current hunts absent from the edited
/// set are deleted. The edited set's row order becomes the stored order.
pub fn reconcile_hunts(edited: &[Vec<String>], current: &[Hunt]) -> Vec<Hunt> {
    let by_id: HashMap<&str, &Hunt> = current.iter().map(|h| (h.id.as_str(), h)).collect();

    let mut out = Vec::new();
    for cells in edited {
        let cells = normalize_row(cells.clone(), HUNT_TABLE_WIDTH);
        let id = cells[HUNT_TABLE_ID_COL].trim();
        if id.is_empty() {
            continue;
        }
        let Some(existing) = by_id.get(id) else {
            continue;
        };

        let mut hunt = (*existing).clone();
        hunt.job_title = cells[3].clone();
        hunt.job_description = cells[4].clone();
        hunt.job_source = cells[5].clone();
        hunt.salary_base_min = cells[6].clone();
        hunt.salary_base_max = cells[7].clone();
        hunt.salary_industry_avg = cells[8].clone();
        hunt.salary_expecting = cells[9].clone();
        hunt.currency = cells[10].clone();
        hunt.ot_rate_ratio = cells[11].clone();
        hunt.work_arrangement = cells[12].clone();
        hunt.has_health_insurance = yes_no(is_yes(&cells[13])).to_string();
        out.push(hunt);
    }
    out
}

/// Merge an edited company snapshot into the company collection.
///
/// All columns but id are editable. A deletion of a company still
/// referenced by a hunt is rejected: the row is restored at its original
/// index and its name is returned so the caller can surface a blocking
/// warning. Never silent, never cascaded.
pub fn reconcile_companies(
    edited: &[Vec<String>],
    current: &[Company],
    hunts: &[Hunt],
) -> (Vec<Company>, Vec<String>) {
    let by_id: HashMap<&str, &Company> = current.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut out = Vec::new();
    let mut kept_ids: HashSet<String> = HashSet::new();
    for cells in edited {
        let cells = normalize_row(cells.clone(), COMPANY_WIDTH);
        let id = cells[0].trim();
        if id.is_empty() || !by_id.contains_key(id) {
            continue;
        }

        let mut company = Company::from_row(&cells);
        company.id = id.to_string();
        company.is_mnc = yes_no(is_yes(&company.is_mnc)).to_string();
        kept_ids.insert(company.id.clone());
        out.push(company);
    }

    let mut rejected = Vec::new();
    for (idx, company) in current.iter().enumerate() {
        if kept_ids.contains(&company.id) {
            continue;
        }
        let referenced = hunts.iter().any(|h| h.company_id == company.id);
        if referenced {
            let at = idx.min(out.len());
            out.insert(at, company.clone());
            rejected.push(company.name.clone());
        }
    }

    (out, rejected)
}

/// Merge an edited reminder snapshot ([id, hunt label, dateTime, status,
/// description] rows) into the reminder collection. With a hunt scope, rows
/// belonging to other hunts are untouched; without one, the whole
/// collection is subject. huntId and the derived label are never written
/// back. Stored order is preserved.
pub fn reconcile_reminders(
    edited: &[Vec<String>],
    current: &[Reminder],
    scope: Option<&str>,
) -> Vec<Reminder> {
    let edited_by_id: HashMap<String, Vec<String>> = edited
        .iter()
        .map(|cells| normalize_row(cells.clone(), REMINDER_WIDTH))
        .filter(|cells| !cells[0].trim().is_empty())
        .map(|cells| (cells[0].trim().to_string(), cells))
        .collect();

    current
        .iter()
        .filter_map(|r| {
            let in_scope = scope.is_none_or(|hunt_id| r.hunt_id == hunt_id);
            if !in_scope {
                return Some(r.clone());
            }
            edited_by_id.get(&r.id).map(|cells| {
                let mut updated = r.clone();
                updated.date_time = cells[2].clone();
                updated.status = cells[3].clone();
                updated.description = cells[4].clone();
                updated
            })
        })
        .collect()
}

/// Same merge for progress entries.
pub fn reconcile_progress(
    edited: &[Vec<String>],
    current: &[Progress],
    scope: Option<&str>,
) -> Vec<Progress> {
    let edited_by_id: HashMap<String, Vec<String>> = edited
        .iter()
        .map(|cells| normalize_row(cells.clone(), PROGRESS_WIDTH))
        .filter(|cells| !cells[0].trim().is_empty())
        .map(|cells| (cells[0].trim().to_string(), cells))
        .collect();

    current
        .iter()
        .filter_map(|p| {
            let in_scope = scope.is_none_or(|hunt_id| p.hunt_id == hunt_id);
            if !in_scope {
                return Some(p.clone());
            }
            edited_by_id.get(&p.id).map(|cells| {
                let mut updated = p.clone();
                updated.date_time = cells[2].clone();
                updated.status = cells[3].clone();
                updated.description = cells[4].clone();
                updated
            })
        })
        .collect()
}

// --- Creation flows ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyMode {
    New,
    Existing,
}

/// Company fields entered alongside a new hunt or an edit-current-company
/// form. Name travels separately because it doubles as the lookup key.
#[derive(Debug, Clone, Default)]
pub struct CompanyFields {
    pub industry: String,
    pub description: String,
    pub is_mnc: String,
    pub address: String,
    pub website: String,
    pub reputation: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewHuntInput {
    pub job_title: String,
    pub job_description: String,
    pub job_source: String,
    pub salary_base_min: String,
    pub salary_base_max: String,
    pub salary_industry_avg: String,
    pub salary_expecting: String,
    pub currency: String,
    pub ot_rate_ratio: String,
    pub work_arrangement: String,
    pub has_health_insurance: String,
    pub company_name: String,
}

fn company_from_fields(id: String, name: String, fields: &CompanyFields) -> Company {
    Company {
        id,
        name,
        industry: fields.industry.clone(),
        description: fields.description.clone(),
        is_mnc: yes_no(is_yes(&fields.is_mnc)).to_string(),
        address: fields.address.clone(),
        website: fields.website.clone(),
        reputation: fields.reputation.clone(),
        phone: fields.phone.clone(),
        email: fields.email.clone(),
    }
}

fn suggest_company(session: &Session, name: &str) -> Option<String> {
    let names: Vec<String> = session.companies.iter().map(|c| c.name.clone()).collect();
    closest_match(name, &names).map(str::to_string)
}

/// Create a hunt, minting every id before anything becomes editable.
///
/// New mode: an empty company name leaves the hunt unassigned; a name that
/// exactly matches an existing company reuses its id and overwrites its
/// fields with the entered ones; otherwise a fresh company row is inserted.
/// Existing mode: the name must resolve, or the action aborts untouched.
pub fn create_hunt(
    session: &mut Session,
    input: &NewHuntInput,
    mode: CompanyMode,
    company_fields: &CompanyFields,
) -> Result<String> {
    let company_name = input.company_name.trim();

    let company_id = match mode {
        CompanyMode::Existing => {
            if company_name.is_empty() {
                bail!("Company name is required when using an existing company");
            }
            match session.find_company_by_name(company_name) {
                Some(company) => company.id.clone(),
                None => {
                    return Err(match suggest_company(session, company_name) {
                        Some(s) => anyhow!(
                            "No company named '{company_name}'. Did you mean '{s}'?"
                        ),
                        None => anyhow!("No company named '{company_name}'"),
                    });
                }
            }
        }
        CompanyMode::New => {
            if company_name.is_empty() {
                String::new()
            } else if let Some(existing) = session.find_company_by_name(company_name) {
                let id = existing.id.clone();
                let updated = company_from_fields(id.clone(), company_name.to_string(), company_fields);
                if let Some(slot) = session.companies.iter_mut().find(|c| c.id == id) {
                    *slot = updated;
                }
                id
            } else {
                let id = new_id();
                session.companies.push(company_from_fields(
                    id.clone(),
                    company_name.to_string(),
                    company_fields,
                ));
                id
            }
        }
    };

    let hunt_id = new_id();
    session.hunts.push(Hunt {
        id: hunt_id.clone(),
        job_title: input.job_title.clone(),
        job_description: input.job_description.clone(),
        job_source: input.job_source.clone(),
        salary_base_min: input.salary_base_min.clone(),
        salary_base_max: input.salary_base_max.clone(),
        salary_industry_avg: input.salary_industry_avg.clone(),
        salary_expecting: input.salary_expecting.clone(),
        currency: input.currency.clone(),
        ot_rate_ratio: input.ot_rate_ratio.clone(),
        work_arrangement: input.work_arrangement.clone(),
        has_health_insurance: yes_no(is_yes(&input.has_health_insurance)).to_string(),
        company_id,
    });
    Ok(hunt_id)
}

/// Rebind a hunt to another existing company by name. Only the hunt's
/// companyId cell changes; the company collection is untouched.
pub fn switch_company(session: &mut Session, hunt_id: &str, company_name: &str) -> Result<()> {
    let company_name = company_name.trim();
    if company_name.is_empty() {
        bail!("Company name cannot be empty");
    }

    let company_id = match session.find_company_by_name(company_name) {
        Some(company) => {
            if company.id.is_empty() {
                bail!("Company '{company_name}' has no valid id");
            }
            company.id.clone()
        }
        None => {
            return Err(match suggest_company(session, company_name) {
                Some(s) => anyhow!("No company named '{company_name}'. Did you mean '{s}'?"),
                None => anyhow!("No company named '{company_name}'"),
            });
        }
    };

    let hunt = session
        .hunts
        .iter_mut()
        .find(|h| h.id == hunt_id)
        .ok_or_else(|| anyhow!("Unknown hunt '{hunt_id}'"))?;
    hunt.company_id = company_id;
    Ok(())
}

/// Edit the company currently bound to a hunt: upsert the Company row keyed
/// by the hunt's companyId, minting one (and binding the hunt) when the
/// hunt has no company yet.
pub fn edit_company_for_hunt(
    session: &mut Session,
    hunt_id: &str,
    company_name: &str,
    fields: &CompanyFields,
) -> Result<()> {
    let company_name = company_name.trim();
    if company_name.is_empty() {
        bail!("Company name cannot be empty");
    }

    let hunt = session
        .hunts
        .iter_mut()
        .find(|h| h.id == hunt_id)
        .ok_or_else(|| anyhow!("Unknown hunt '{hunt_id}'"))?;

    let company_id = if hunt.company_id.is_empty() {
        let id = new_id();
        hunt.company_id = id.clone();
        id
    } else {
        hunt.company_id.clone()
    };

    let updated = company_from_fields(company_id.clone(), company_name.to_string(), fields);
    match session.companies.iter_mut().find(|c| c.id == company_id) {
        Some(slot) => *slot = updated,
        None => session.companies.push(updated),
    }
    Ok(())
}

/// Delete a company by id, guarded by the referential-integrity check.
pub fn delete_company(session: &mut Session, company_id: &str) -> Result<()> {
    let Some(idx) = session.companies.iter().position(|c| c.id == company_id) else {
        bail!("No company with id '{company_id}'");
    };
    if session.is_company_referenced(company_id) {
        bail!(
            "Company '{}' is still linked to at least one hunt. \
             Reassign or delete those hunts first.",
            session.companies[idx].name
        );
    }
    session.companies.remove(idx);
    Ok(())
}

/// Add a reminder for a hunt. New reminders always start as "Pending".
pub fn add_reminder(
    session: &mut Session,
    hunt_id: &str,
    date_time: &str,
    description: &str,
) -> Result<String> {
    if session.hunt_by_id(hunt_id).is_none() {
        bail!("Unknown hunt '{hunt_id}'");
    }
    let id = new_id();
    session.reminders.push(Reminder {
        id: id.clone(),
        hunt_id: hunt_id.to_string(),
        date_time: date_time.to_string(),
        status: "Pending".to_string(),
        description: description.to_string(),
    });
    Ok(id)
}

pub fn mark_reminder_done(session: &mut Session, reminder_id: &str) -> Result<()> {
    let reminder = session
        .reminders
        .iter_mut()
        .find(|r| r.id == reminder_id)
        .ok_or_else(|| anyhow!("No reminder with id '{reminder_id}'"))?;
    reminder.status = "Done".to_string();
    Ok(())
}

pub fn add_progress(
    session: &mut Session,
    hunt_id: &str,
    date_time: &str,
    status: &str,
    description: &str,
) -> Result<String> {
    if session.hunt_by_id(hunt_id).is_none() {
        bail!("Unknown hunt '{hunt_id}'");
    }
    let id = new_id();
    session.progress.push(Progress {
        id: id.clone(),
        hunt_id: hunt_id.to_string(),
        date_time: date_time.to_string(),
        status: status.to_string(),
        description: description.to_string(),
    });
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Artifacts;
    use crate::project::{parse_date_time, project_hunt_table, reminder_table};
    use crate::store::Store;

    fn empty_session() -> Session {
        Session::load(Store::at("unused")).unwrap()
    }

    fn session_with(hunts: Vec<Hunt>, companies: Vec<Company>) -> Session {
        let mut session = empty_session();
        session.hunts = hunts;
        session.companies = companies;
        session
    }

    fn hunt(id: &str, title: &str, company_id: &str) -> Hunt {
        Hunt {
            id: id.to_string(),
            job_title: title.to_string(),
            company_id: company_id.to_string(),
            ..Hunt::default()
        }
    }

    fn company(id: &str, name: &str) -> Company {
        Company {
            id: id.to_string(),
            name: name.to_string(),
            is_mnc: "No".to_string(),
            ..Company::default()
        }
    }

    fn display_row(hunt: &Hunt) -> Vec<String> {
        vec![
            "No".to_string(),
            String::new(),
            hunt.id.clone(),
            hunt.job_title.clone(),
            hunt.job_description.clone(),
            hunt.job_source.clone(),
            hunt.salary_base_min.clone(),
            hunt.salary_base_max.clone(),
            hunt.salary_industry_avg.clone(),
            hunt.salary_expecting.clone(),
            hunt.currency.clone(),
            hunt.ot_rate_ratio.clone(),
            hunt.work_arrangement.clone(),
            hunt.has_health_insurance.clone(),
            hunt.company_id.clone(),
            String::new(),
            "No".to_string(),
            "No".to_string(),
        ]
    }

    #[test]
    fn test_reconcile_hunts_updates_editable_columns_only() {
        let current = vec![hunt("h1", "Engineer", "c1")];

        let mut edited = display_row(&current[0]);
        edited[3] = "Senior Engineer".to_string();
        edited[13] = "Yes".to_string();
        edited[14] = "c9".to_string(); // computed column, must not stick

        let out = reconcile_hunts(&[edited], &current);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].job_title, "Senior Engineer");
        assert_eq!(out[0].has_health_insurance, "Yes");
        assert_eq!(out[0].company_id, "c1");
    }

    #[test]
    fn test_reconcile_hunts_deletes_missing_and_ignores_unknown_ids() {
        let current = vec![hunt("h1", "Engineer", ""), hunt("h2", "Analyst", "")];

        let mut unknown = display_row(&current[0]);
        unknown[2] = "h9".to_string();
        let mut blank = display_row(&current[0]);
        blank[2] = String::new();

        let edited = vec![display_row(&current[1]), unknown, blank];
        let out = reconcile_hunts(&edited, &current);

        // h1 deleted, h9 and the blank row never invented, edited order kept
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "h2");
    }

    #[test]
    fn test_reconcile_hunts_health_insurance_lenient_decode_strict_encode() {
        let current = vec![hunt("h1", "Engineer", "")];

        let mut edited = display_row(&current[0]);
        edited[13] = "sure, why not".to_string();
        let out = reconcile_hunts(&[edited], &current);
        assert_eq!(out[0].has_health_insurance, "No");

        let mut edited = display_row(&current[0]);
        edited[13] = "Yes".to_string();
        let out = reconcile_hunts(&[edited], &current);
        assert_eq!(out[0].has_health_insurance, "Yes");
    }

    #[test]
    fn test_reconcile_hunts_normalizes_short_rows() {
        let current = vec![hunt("h1", "Engineer", "c1")];
        let edited = vec![vec!["No".to_string(), String::new(), "h1".to_string()]];

        let out = reconcile_hunts(&edited, &current);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].job_title, "");
        assert_eq!(out[0].company_id, "c1");
    }

    #[test]
    fn test_reconcile_companies_referenced_delete_is_restored() {
        let hunts = vec![hunt("h1", "Engineer", "c1")];
        let current = vec![company("c1", "Acme"), company("c2", "Globex")];

        // User deleted both rows; only the unreferenced one may go.
        let (out, rejected) = reconcile_companies(&[], &current, &hunts);
        assert_eq!(rejected, vec!["Acme".to_string()]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "c1");
    }

    #[test]
    fn test_reconcile_companies_rejected_delete_leaves_collection_unchanged() {
        let hunts = vec![hunt("h1", "Engineer", "c2")];
        let current = vec![
            company("c1", "Acme"),
            company("c2", "Globex"),
            company("c3", "Initech"),
        ];

        // Only the referenced row was deleted from the edited set.
        let edited: Vec<Vec<String>> = [&current[0], &current[2]]
            .iter()
            .map(|c| c.to_row())
            .collect();

        let (out, rejected) = reconcile_companies(&edited, &current, &hunts);
        assert_eq!(rejected, vec!["Globex".to_string()]);
        assert_eq!(out, current);
    }

    #[test]
    fn test_reconcile_companies_edits_fields_and_normalizes_is_mnc() {
        let current = vec![company("c1", "Acme")];
        let mut edited = current[0].to_row();
        edited[1] = "Acme Corp".to_string();
        edited[4] = "definitely".to_string();

        let (out, rejected) = reconcile_companies(&[edited], &current, &[]);
        assert!(rejected.is_empty());
        assert_eq!(out[0].name, "Acme Corp");
        assert_eq!(out[0].is_mnc, "No");
    }

    #[test]
    fn test_reconcile_reminders_scoped_preserves_other_hunts() {
        let reminder = |id: &str, hunt_id: &str, status: &str| Reminder {
            id: id.to_string(),
            hunt_id: hunt_id.to_string(),
            date_time: "2025-06-01 09:00:00".to_string(),
            status: status.to_string(),
            description: String::new(),
        };
        let current = vec![
            reminder("r1", "h1", "Pending"),
            reminder("r2", "h2", "Pending"),
            reminder("r3", "h1", "Pending"),
        ];

        // Scoped to h1: r1 marked Done, r3 deleted. h2's r2 untouched.
        let edited = vec![vec![
            "r1".to_string(),
            "Engineer @ Acme".to_string(),
            "2025-06-01 09:00:00".to_string(),
            "Done".to_string(),
            "called them".to_string(),
        ]];

        let out = reconcile_reminders(&edited, &current, Some("h1"));
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(out[0].status, "Done");
        assert_eq!(out[0].description, "called them");
        assert_eq!(out[0].hunt_id, "h1"); // label never written back
        assert_eq!(out[1].status, "Pending");
    }

    #[test]
    fn test_create_hunt_new_company_mints_and_binds() {
        let mut session = empty_session();

        let input = NewHuntInput {
            job_title: "Engineer".to_string(),
            company_name: "Acme".to_string(),
            ..NewHuntInput::default()
        };
        let hunt_id =
            create_hunt(&mut session, &input, CompanyMode::New, &CompanyFields::default())
                .unwrap();

        assert_eq!(session.hunts.len(), 1);
        assert_eq!(session.companies.len(), 1);
        let hunt = session.hunt_by_id(&hunt_id).unwrap();
        assert!(!hunt.company_id.is_empty());
        assert_eq!(hunt.company_id, session.companies[0].id);
        assert_eq!(session.companies[0].name, "Acme");
    }

    #[test]
    fn test_create_hunt_new_mode_reuses_existing_name() {
        let mut session = session_with(vec![], vec![company("c1", "Acme")]);

        let input = NewHuntInput {
            job_title: "Engineer".to_string(),
            company_name: "Acme".to_string(),
            ..NewHuntInput::default()
        };
        let fields = CompanyFields {
            industry: "IT".to_string(),
            ..CompanyFields::default()
        };
        let hunt_id = create_hunt(&mut session, &input, CompanyMode::New, &fields).unwrap();

        assert_eq!(session.companies.len(), 1);
        assert_eq!(session.companies[0].id, "c1");
        assert_eq!(session.companies[0].industry, "IT");
        assert_eq!(session.hunt_by_id(&hunt_id).unwrap().company_id, "c1");
    }

    #[test]
    fn test_create_hunt_existing_mode_requires_known_name() {
        let mut session = session_with(vec![], vec![company("c1", "Acme")]);

        let input = NewHuntInput {
            job_title: "Engineer".to_string(),
            company_name: "Acmee".to_string(),
            ..NewHuntInput::default()
        };
        let err = create_hunt(
            &mut session,
            &input,
            CompanyMode::Existing,
            &CompanyFields::default(),
        )
        .unwrap_err()
        .to_string();

        assert!(err.contains("Did you mean 'Acme'"), "{err}");
        assert!(session.hunts.is_empty());
        assert_eq!(session.companies.len(), 1);
    }

    #[test]
    fn test_create_hunt_new_mode_empty_name_leaves_unassigned() {
        let mut session = empty_session();
        let input = NewHuntInput {
            job_title: "Engineer".to_string(),
            ..NewHuntInput::default()
        };
        let hunt_id =
            create_hunt(&mut session, &input, CompanyMode::New, &CompanyFields::default())
                .unwrap();

        assert_eq!(session.hunt_by_id(&hunt_id).unwrap().company_id, "");
        assert!(session.companies.is_empty());
    }

    #[test]
    fn test_switch_company_only_rewrites_company_id() {
        let mut session = session_with(
            vec![hunt("h1", "Engineer", "c1")],
            vec![company("c1", "Acme"), company("c2", "Globex")],
        );

        switch_company(&mut session, "h1", "Globex").unwrap();
        assert_eq!(session.hunts[0].company_id, "c2");
        assert_eq!(session.companies.len(), 2);

        assert!(switch_company(&mut session, "h1", "").is_err());
        assert!(switch_company(&mut session, "h1", "Nowhere Inc").is_err());
        assert_eq!(session.hunts[0].company_id, "c2");
    }

    #[test]
    fn test_edit_company_for_hunt_mints_when_unbound() {
        let mut session = session_with(vec![hunt("h1", "Engineer", "")], vec![]);

        let fields = CompanyFields {
            industry: "Logistics".to_string(),
            is_mnc: "Yes".to_string(),
            ..CompanyFields::default()
        };
        edit_company_for_hunt(&mut session, "h1", "Acme", &fields).unwrap();

        let bound = session.hunts[0].company_id.clone();
        assert!(!bound.is_empty());
        let created = session.company_by_id(&bound).unwrap();
        assert_eq!(created.name, "Acme");
        assert_eq!(created.is_mnc, "Yes");

        // Second edit updates the same row in place.
        edit_company_for_hunt(&mut session, "h1", "Acme Corp", &fields).unwrap();
        assert_eq!(session.companies.len(), 1);
        assert_eq!(session.companies[0].name, "Acme Corp");
    }

    #[test]
    fn test_delete_company_guard() {
        let mut session = session_with(
            vec![hunt("h1", "Engineer", "c1")],
            vec![company("c1", "Acme"), company("c2", "Globex")],
        );

        let err = delete_company(&mut session, "c1").unwrap_err().to_string();
        assert!(err.contains("still linked"), "{err}");
        assert_eq!(session.companies.len(), 2);

        delete_company(&mut session, "c2").unwrap();
        assert_eq!(session.companies.len(), 1);
        assert!(delete_company(&mut session, "c9").is_err());
    }

    #[test]
    fn test_reminder_lifecycle_flips_projection_flag() {
        let mut session = session_with(vec![hunt("h1", "Engineer", "")], vec![]);
        let now = parse_date_time("2025-06-15 12:00:00").unwrap();

        let reminder_id =
            add_reminder(&mut session, "h1", "2025-06-01 09:00:00", "follow up").unwrap();
        assert_eq!(session.reminders[0].status, "Pending");

        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(dir.path());
        let rows = project_hunt_table(&session, &artifacts, now);
        assert!(rows[0].reminder_due);

        // Mark Done through the editor surface and reconcile.
        let mut edited = reminder_table(&session, Some("h1"));
        edited[0][3] = "Done".to_string();
        session.reminders = reconcile_reminders(&edited, &session.reminders, Some("h1"));

        assert_eq!(session.reminders[0].id, reminder_id);
        let rows = project_hunt_table(&session, &artifacts, now);
        assert!(!rows[0].reminder_due);
    }

    #[test]
    fn test_add_reminder_and_progress_require_known_hunt() {
        let mut session = empty_session();
        assert!(add_reminder(&mut session, "h1", "2025-06-01 09:00:00", "x").is_err());
        assert!(add_progress(&mut session, "h1", "2025-06-01 09:00:00", "Applied", "x").is_err());
    }
}

use chrono::NaiveDateTime;

use crate::artifacts::Artifacts;
use crate::models::{is_yes, yes_no};
use crate::session::Session;

// This module and the reconciler are the only two places allowed to cross
// between normalized records and the denormalized display shape. Everything
// else works on exactly one of the two.

/// Column order of the hunt-table projection. Everything outside
/// Job Title..Has Health Insurance is computed or resolved and never
/// written back by the reconciler.
pub const HUNT_TABLE_HEADERS: [&str; 18] = [
    "Reminder",
    "Progress",
    "id",
    "Job Title",
    "Job Description",
    "Job Source",
    "Salary Base Min",
    "Salary Base Max",
    "Salary Industry Avg",
    "Salary Expecting",
    "Currency",
    "OT Rate Ratio",
    "Work Arrangement",
    "Has Health Insurance",
    "companyId",
    "Company Name",
    "Resume",
    "Email",
];

pub const HUNT_TABLE_WIDTH: usize = HUNT_TABLE_HEADERS.len();
/// Index of the id cell in a hunt display row.
pub const HUNT_TABLE_ID_COL: usize = 2;

pub const REMINDER_TABLE_HEADERS: [&str; 5] = ["id", "Hunt", "Date Time", "Status", "Description"];
pub const PROGRESS_TABLE_HEADERS: [&str; 5] = ["id", "Hunt", "Date Time", "Status", "Description"];
pub const COMPANY_TABLE_HEADERS: [&str; 10] = [
    "id",
    "Name",
    "Industry",
    "Description",
    "Is MNC",
    "Address",
    "Website",
    "Reputation",
    "Phone",
    "Email",
];

/// One denormalized hunt-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct HuntTableRow {
    pub reminder_due: bool,
    pub progress_status: String,
    pub id: String,
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
    pub company_id: String,
    pub company_name: String,
    pub has_resume: bool,
    pub has_email: bool,
}

impl HuntTableRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            yes_no(self.reminder_due).to_string(),
            self.progress_status.clone(),
            self.id.clone(),
            self.job_title.clone(),
            self.job_description.clone(),
            self.job_source.clone(),
            self.salary_base_min.clone(),
            self.salary_base_max.clone(),
            self.salary_industry_avg.clone(),
            self.salary_expecting.clone(),
            self.currency.clone(),
            self.ot_rate_ratio.clone(),
            self.work_arrangement.clone(),
            self.has_health_insurance.clone(),
            self.company_id.clone(),
            self.company_name.clone(),
            yes_no(self.has_resume).to_string(),
            yes_no(self.has_email).to_string(),
        ]
    }
}

/// Timestamps are stored as "2025-01-31 09:00:00"; a bare-minutes form is
/// accepted on input.
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M"))
        .ok()
}

pub fn format_date_time(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A hunt's reminder flag: any Pending reminder whose dateTime is due or
/// past. An unparseable dateTime never rings.
pub fn hunt_has_due_reminder(session: &Session, hunt_id: &str, now: NaiveDateTime) -> bool {
    session.reminders_for_hunt(hunt_id).iter().any(|r| {
        r.status == "Pending" && parse_date_time(&r.date_time).is_some_and(|dt| dt <= now)
    })
}

/// Status of the hunt's most recent progress entry: latest parseable
/// dateTime wins; when none parse, the last stored row wins.
pub fn latest_progress_status(session: &Session, hunt_id: &str) -> String {
    let entries = session.progress_for_hunt(hunt_id);

    let latest_dated = entries
        .iter()
        .filter_map(|p| parse_date_time(&p.date_time).map(|dt| (dt, *p)))
        .max_by_key(|(dt, _)| *dt);

    match latest_dated {
        Some((_, entry)) => entry.status.clone(),
        None => entries.last().map(|p| p.status.clone()).unwrap_or_default(),
    }
}

/// The main hunt-table projection, one display row per hunt in stored
/// order. `now` drives the reminder flag; artifact flags come from the
/// injected filesystem probes.
pub fn project_hunt_table(
    session: &Session,
    artifacts: &Artifacts,
    now: NaiveDateTime,
) -> Vec<HuntTableRow> {
    session
        .hunts
        .iter()
        .map(|hunt| HuntTableRow {
            reminder_due: hunt_has_due_reminder(session, &hunt.id, now),
            progress_status: latest_progress_status(session, &hunt.id),
            id: hunt.id.clone(),
            job_title: hunt.job_title.clone(),
            job_description: hunt.job_description.clone(),
            job_source: hunt.job_source.clone(),
            salary_base_min: hunt.salary_base_min.clone(),
            salary_base_max: hunt.salary_base_max.clone(),
            salary_industry_avg: hunt.salary_industry_avg.clone(),
            salary_expecting: hunt.salary_expecting.clone(),
            currency: hunt.currency.clone(),
            ot_rate_ratio: hunt.ot_rate_ratio.clone(),
            work_arrangement: hunt.work_arrangement.clone(),
            has_health_insurance: yes_no(is_yes(&hunt.has_health_insurance)).to_string(),
            company_id: hunt.company_id.clone(),
            company_name: session
                .company_by_id(&hunt.company_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            has_resume: artifacts.has_resume(&hunt.id),
            has_email: artifacts.has_email_draft(&hunt.id),
        })
        .collect()
}

/// Reminder editor rows: [id, hunt label, dateTime, status, description],
/// optionally scoped to one hunt. Stored order, orphans excluded from
/// hunt-scoped views only.
pub fn reminder_table(session: &Session, scope: Option<&str>) -> Vec<Vec<String>> {
    session
        .reminders
        .iter()
        .filter(|r| scope.is_none_or(|hunt_id| r.hunt_id == hunt_id))
        .map(|r| {
            vec![
                r.id.clone(),
                session.hunt_label(&r.hunt_id),
                r.date_time.clone(),
                r.status.clone(),
                r.description.clone(),
            ]
        })
        .collect()
}

pub fn progress_table(session: &Session, scope: Option<&str>) -> Vec<Vec<String>> {
    session
        .progress
        .iter()
        .filter(|p| scope.is_none_or(|hunt_id| p.hunt_id == hunt_id))
        .map(|p| {
            vec![
                p.id.clone(),
                session.hunt_label(&p.hunt_id),
                p.date_time.clone(),
                p.status.clone(),
                p.description.clone(),
            ]
        })
        .collect()
}

/// Company editor rows: the raw schema columns, isMnc normalized to the
/// Yes/No pair for display.
pub fn company_table(session: &Session) -> Vec<Vec<String>> {
    session
        .companies
        .iter()
        .map(|c| {
            let mut row = c.to_row();
            row[4] = yes_no(is_yes(&c.is_mnc)).to_string();
            row
        })
        .collect()
}

use serde::{Deserialize, Serialize};

// Column order of the four CSV files. The files carry no header row, so
// these widths are the only schema there is.
pub const HUNT_WIDTH: usize = 13;
pub const COMPANY_WIDTH: usize = 10;
pub const REMINDER_WIDTH: usize = 5;
pub const PROGRESS_WIDTH: usize = 5;

/// One tracked job application. All fields are strings at rest; salary and
/// ratio fields are parsed by whoever needs numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hunt {
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
}

impl Hunt {
    pub fn from_row(row: &[String]) -> Self {
        Self {
            id: cell(row, 0),
            job_title: cell(row, 1),
            job_description: cell(row, 2),
            job_source: cell(row, 3),
            salary_base_min: cell(row, 4),
            salary_base_max: cell(row, 5),
            salary_industry_avg: cell(row, 6),
            salary_expecting: cell(row, 7),
            currency: cell(row, 8),
            ot_rate_ratio: cell(row, 9),
            work_arrangement: cell(row, 10),
            has_health_insurance: cell(row, 11),
            company_id: cell(row, 12),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
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
        ]
    }
}

/// A company referenced by zero or more hunts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub description: String,
    pub is_mnc: String,
    pub address: String,
    pub website: String,
    pub reputation: String,
    pub phone: String,
    pub email: String,
}

impl Company {
    pub fn from_row(row: &[String]) -> Self {
        Self {
            id: cell(row, 0),
            name: cell(row, 1),
            industry: cell(row, 2),
            description: cell(row, 3),
            is_mnc: cell(row, 4),
            address: cell(row, 5),
            website: cell(row, 6),
            reputation: cell(row, 7),
            phone: cell(row, 8),
            email: cell(row, 9),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.industry.clone(),
            self.description.clone(),
            self.is_mnc.clone(),
            self.address.clone(),
            self.website.clone(),
            self.reputation.clone(),
            self.phone.clone(),
            self.email.clone(),
        ]
    }
}

/// A dated follow-up attached to a hunt. New reminders always start out
/// with status "Pending"; anything else is free text, "Done" by convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub hunt_id: String,
    pub date_time: String,
    pub status: String,
    pub description: String,
}

impl Reminder {
    pub fn from_row(row: &[String]) -> Self {
        Self {
            id: cell(row, 0),
            hunt_id: cell(row, 1),
            date_time: cell(row, 2),
            status: cell(row, 3),
            description: cell(row, 4),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.hunt_id.clone(),
            self.date_time.clone(),
            self.status.clone(),
            self.description.clone(),
        ]
    }
}

/// One entry in a hunt's application history (applied, interview, offer...).
/// Same shape as Reminder but a separate collection with separate meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub id: String,
    pub hunt_id: String,
    pub date_time: String,
    pub status: String,
    pub description: String,
}

impl Progress {
    pub fn from_row(row: &[String]) -> Self {
        Self {
            id: cell(row, 0),
            hunt_id: cell(row, 1),
            date_time: cell(row, 2),
            status: cell(row, 3),
            description: cell(row, 4),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.hunt_id.clone(),
            self.date_time.clone(),
            self.status.clone(),
            self.description.clone(),
        ]
    }
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

// --- Yes/No fields ---
//
// hasHealthInsurance and isMnc are stored as the literals "Yes" / "No".
// Decode is lenient (anything else counts as "No"), encode is strict.

pub fn is_yes(value: &str) -> bool {
    value == "Yes"
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

// --- Personal details ---

/// The singleton personal-details document, read and written wholesale as
/// JSON. Unknown keys are dropped, missing ones filled from the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalDetails {
    pub name: String,
    pub email: String,
    pub linkedin_id: String,
    pub github_acc: String,
    pub phone: String,
    pub address: String,
    pub about: String,
    pub education: Vec<EducationEntry>,
    pub work: Vec<WorkEntry>,
    pub skills: Vec<SkillEntry>,
}

impl Default for PersonalDetails {
    fn default() -> Self {
        // The default document carries one blank entry per list so an
        // editor surface always has a row to start from.
        Self {
            name: String::new(),
            email: String::new(),
            linkedin_id: String::new(),
            github_acc: String::new(),
            phone: String::new(),
            address: String::new(),
            about: String::new(),
            education: vec![EducationEntry::default()],
            work: vec![WorkEntry::default()],
            skills: vec![SkillEntry::default()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub education: String,
    pub almamater: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkEntry {
    pub position: String,
    pub company: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillEntry {
    pub skill: String,
    pub description: String,
}

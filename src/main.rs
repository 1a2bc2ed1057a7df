mod ai;
mod artifacts;
mod edit;
mod ids;
mod mail;
mod models;
mod project;
mod reconcile;
mod resume;
mod session;
mod store;
mod tui;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ai::{GenContext, Preferences, create_provider, generate_application_email,
         generate_resume_structure, parse_job_ad, resolve_model};
use artifacts::Artifacts;
use mail::{GmailSender, OutgoingEmail, open_in_composer};
use models::Reminder;
use project::{
    COMPANY_TABLE_HEADERS, HUNT_TABLE_HEADERS, PROGRESS_TABLE_HEADERS, REMINDER_TABLE_HEADERS,
    company_table, format_date_time, parse_date_time, progress_table, project_hunt_table,
    reminder_table,
};
use reconcile::{
    CompanyFields, CompanyMode, NewHuntInput, add_progress, add_reminder, create_hunt,
    delete_company, edit_company_for_hunt, mark_reminder_done, reconcile_companies,
    reconcile_hunts, reconcile_progress, reconcile_reminders, switch_company,
};
use session::Session;
use store::Store;

#[derive(Parser)]
#[command(name = "jobhound")]
#[command(about = "Job application tracking - hunts, companies, reminders, progress")]
struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the hunt table
    List,

    /// Browse hunts in a terminal UI
    Browse,

    /// Create a new hunt
    New(NewArgs),

    /// Edit a table in $EDITOR and reconcile the result back
    Edit {
        #[command(subcommand)]
        target: EditTarget,
    },

    /// Manage companies
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Manage reminders
    Reminder {
        #[command(subcommand)]
        command: ReminderCommands,
    },

    /// Manage progress entries
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },

    /// Show or edit personal details
    Personal {
        #[command(subcommand)]
        command: PersonalCommands,
    },

    /// Parse a job ad with AI and create a hunt from it
    Parse {
        /// File with the ad text; reads stdin when omitted
        file: Option<PathBuf>,

        /// Model to use
        #[arg(short, long, default_value = "claude-sonnet")]
        model: String,

        /// Show the parsed fields without creating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate, compose, or send an application email for a hunt
    Email(EmailArgs),

    /// Generate a tailored resume for a hunt
    Resume(ResumeArgs),
}

#[derive(Subcommand)]
enum EditTarget {
    /// Hunt table (id and computed columns are ignored on save)
    Hunts,

    /// Company table (referenced companies cannot be deleted)
    Companies,

    /// Reminders, optionally scoped to one hunt
    Reminders {
        /// Hunt id, id prefix, or label
        #[arg(long)]
        hunt: Option<String>,
    },

    /// Progress entries, optionally scoped to one hunt
    Progress {
        /// Hunt id, id prefix, or label
        #[arg(long)]
        hunt: Option<String>,
    },
}

#[derive(Args)]
struct NewArgs {
    /// Job title
    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Where the ad was found (LinkedIn, MauKerja, Indeed, ...)
    #[arg(long, default_value = "")]
    source: String,

    #[arg(long, default_value = "")]
    salary_min: String,

    #[arg(long, default_value = "")]
    salary_max: String,

    #[arg(long, default_value = "")]
    salary_avg: String,

    #[arg(long, default_value = "")]
    salary_expecting: String,

    #[arg(long, default_value = "MYR")]
    currency: String,

    #[arg(long, default_value = "")]
    ot_rate: String,

    /// WFH, Hybrid, Onsite, ...
    #[arg(long, default_value = "")]
    arrangement: String,

    /// Yes or No
    #[arg(long, default_value = "No")]
    health_insurance: String,

    /// Company name; empty leaves the hunt unassigned
    #[arg(long, default_value = "")]
    company: String,

    /// Bind to an existing company by name instead of creating one
    #[arg(long)]
    existing_company: bool,

    #[arg(long, default_value = "")]
    industry: String,

    #[arg(long, default_value = "")]
    company_description: String,

    /// Yes or No
    #[arg(long, default_value = "No")]
    mnc: String,

    #[arg(long, default_value = "")]
    address: String,

    #[arg(long, default_value = "")]
    website: String,

    /// 1-5
    #[arg(long, default_value = "3")]
    reputation: String,

    #[arg(long, default_value = "")]
    company_phone: String,

    #[arg(long, default_value = "")]
    company_email: String,
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// List all companies
    List,

    /// Delete a company (blocked while any hunt references it)
    Delete {
        /// Company id or exact name
        company: String,
    },

    /// Switch a hunt to another existing company
    Switch {
        /// Hunt id, id prefix, or label
        hunt: String,

        /// Existing company name
        name: String,
    },

    /// Edit (or create) the company bound to a hunt
    Edit {
        /// Hunt id, id prefix, or label
        hunt: String,

        /// Company name (defaults to the current one)
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        industry: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Yes or No
        #[arg(long)]
        mnc: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        website: Option<String>,

        /// 1-5
        #[arg(long)]
        reputation: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReminderCommands {
    /// List reminders
    List {
        /// Hunt id, id prefix, or label
        #[arg(long)]
        hunt: Option<String>,
    },

    /// Add a reminder (status starts as Pending)
    Add {
        /// Hunt id, id prefix, or label
        hunt: String,

        /// "YYYY-MM-DD HH:MM[:SS]"
        #[arg(long)]
        at: String,

        #[arg(long, default_value = "")]
        desc: String,
    },

    /// Mark a reminder as Done
    Done {
        /// Reminder id or id prefix
        id: String,
    },
}

#[derive(Subcommand)]
enum ProgressCommands {
    /// List progress entries
    List {
        /// Hunt id, id prefix, or label
        #[arg(long)]
        hunt: Option<String>,
    },

    /// Add a progress entry
    Add {
        /// Hunt id, id prefix, or label
        hunt: String,

        /// Applied, Interview, Offer, Rejected, On Hold, ...
        #[arg(long, default_value = "Applied")]
        status: String,

        #[arg(long, default_value = "")]
        desc: String,

        /// "YYYY-MM-DD HH:MM[:SS]"; defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
enum PersonalCommands {
    /// Show the personal details document
    Show,

    /// Edit the personal details JSON in $EDITOR
    Edit,
}

#[derive(Args)]
struct EmailArgs {
    /// Hunt id, id prefix, or label
    hunt: String,

    /// Model to use for generation
    #[arg(short, long, default_value = "claude-sonnet")]
    model: String,

    /// Reuse the saved draft instead of generating a new one
    #[arg(long)]
    use_draft: bool,

    /// Tone preference (e.g. concise, formal)
    #[arg(long, default_value = "")]
    tone: String,

    /// Skills to emphasise (comma-separated)
    #[arg(long, default_value = "")]
    skills: String,

    /// Extra notes for the generator
    #[arg(long, default_value = "")]
    notes: String,

    /// Recipient; defaults to the company email, then the personal email
    #[arg(long)]
    to: Option<String>,

    /// Open the default mail composer with the draft
    #[arg(long)]
    compose: bool,

    /// Send directly via the Gmail API
    #[arg(long)]
    send: bool,

    /// OAuth access token file for --send
    #[arg(long, default_value = "~/.jobhound.gmail_token")]
    token_file: String,

    /// Files to attach when sending directly
    #[arg(long)]
    attach: Vec<PathBuf>,
}

#[derive(Args)]
struct ResumeArgs {
    /// Hunt id, id prefix, or label
    hunt: String,

    /// Model to use for generation
    #[arg(short, long, default_value = "claude-sonnet")]
    model: String,

    /// Tone preference
    #[arg(long, default_value = "")]
    tone: String,

    /// Skills to emphasise (comma-separated)
    #[arg(long, default_value = "")]
    skills: String,

    /// Extra notes for the generator
    #[arg(long, default_value = "")]
    notes: String,

    /// Output path (defaults to the hunt's artifact path)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match &cli.data_dir {
        Some(dir) => Store::at(dir.clone()),
        None => Store::open()?,
    };
    let artifacts = Artifacts::new(store.data_dir());
    let mut session = Session::load(store)?;

    match cli.command {
        Commands::List => cmd_list(&session, &artifacts),

        Commands::Browse => tui::run_browse(&session, &artifacts)?,

        Commands::New(args) => cmd_new(&mut session, args)?,

        Commands::Edit { target } => cmd_edit(&mut session, target)?,

        Commands::Company { command } => cmd_company(&mut session, command)?,

        Commands::Reminder { command } => cmd_reminder(&mut session, command)?,

        Commands::Progress { command } => cmd_progress(&mut session, command)?,

        Commands::Personal { command } => cmd_personal(&mut session, command)?,

        Commands::Parse {
            file,
            model,
            dry_run,
        } => cmd_parse(&mut session, file, &model, dry_run)?,

        Commands::Email(args) => cmd_email(&session, &artifacts, args)?,

        Commands::Resume(args) => cmd_resume(&session, &artifacts, args)?,
    }

    Ok(())
}

// --- Command handlers ---

fn cmd_list(session: &Session, artifacts: &Artifacts) {
    let rows = project_hunt_table(session, artifacts, Local::now().naive_local());
    if rows.is_empty() {
        println!("No hunts found.");
        return;
    }

    println!(
        "{:<4} {:<10} {:<28} {:<20} {:<12} {:<4} {:<4}",
        "DUE", "ID", "TITLE", "COMPANY", "PROGRESS", "RES", "EML"
    );
    println!("{}", "-".repeat(88));
    for row in rows {
        println!(
            "{:<4} {:<10} {:<28} {:<20} {:<12} {:<4} {:<4}",
            if row.reminder_due { "!" } else { "" },
            short_id(&row.id),
            truncate(&row.job_title, 26),
            truncate(&row.company_name, 18),
            truncate(&row.progress_status, 10),
            if row.has_resume { "yes" } else { "-" },
            if row.has_email { "yes" } else { "-" },
        );
    }
}

fn cmd_new(session: &mut Session, args: NewArgs) -> Result<()> {
    let input = NewHuntInput {
        job_title: args.title,
        job_description: args.description,
        job_source: args.source,
        salary_base_min: args.salary_min,
        salary_base_max: args.salary_max,
        salary_industry_avg: args.salary_avg,
        salary_expecting: args.salary_expecting,
        currency: args.currency,
        ot_rate_ratio: args.ot_rate,
        work_arrangement: args.arrangement,
        has_health_insurance: args.health_insurance,
        company_name: args.company,
    };
    let fields = CompanyFields {
        industry: args.industry,
        description: args.company_description,
        is_mnc: args.mnc,
        address: args.address,
        website: args.website,
        reputation: args.reputation,
        phone: args.company_phone,
        email: args.company_email,
    };
    let mode = if args.existing_company {
        CompanyMode::Existing
    } else {
        CompanyMode::New
    };

    let hunt_id = create_hunt(session, &input, mode, &fields)?;
    session.save_all()?;

    println!("Created hunt {} ({})", short_id(&hunt_id), session.hunt_label(&hunt_id));
    Ok(())
}

fn cmd_edit(session: &mut Session, target: EditTarget) -> Result<()> {
    match target {
        EditTarget::Hunts => {
            let artifacts = Artifacts::new(session.store().data_dir());
            let cells: Vec<Vec<String>> =
                project_hunt_table(session, &artifacts, Local::now().naive_local())
                    .iter()
                    .map(|row| row.cells())
                    .collect();

            let edited = edit::edit_rows(&HUNT_TABLE_HEADERS, &cells)?;
            let before = session.hunts.len();
            session.hunts = reconcile_hunts(&edited, &session.hunts);
            session.save_hunts()?;
            report_counts("hunt", before, session.hunts.len());
        }

        EditTarget::Companies => {
            let edited = edit::edit_rows(&COMPANY_TABLE_HEADERS, &company_table(session))?;
            let before = session.companies.len();
            let (companies, rejected) =
                reconcile_companies(&edited, &session.companies, &session.hunts);
            session.companies = companies;
            session.save_companies()?;

            for name in &rejected {
                eprintln!(
                    "WARNING: '{}' was not deleted - it is still linked to at least one hunt. \
                     Reassign or delete those hunts first.",
                    name
                );
            }
            report_counts("company", before, session.companies.len());
        }

        EditTarget::Reminders { hunt } => {
            let scope = resolve_scope(session, hunt.as_deref())?;
            let edited =
                edit::edit_rows(&REMINDER_TABLE_HEADERS, &reminder_table(session, scope.as_deref()))?;
            let before = session.reminders.len();
            session.reminders = reconcile_reminders(&edited, &session.reminders, scope.as_deref());
            session.save_reminders()?;
            report_counts("reminder", before, session.reminders.len());
        }

        EditTarget::Progress { hunt } => {
            let scope = resolve_scope(session, hunt.as_deref())?;
            let edited =
                edit::edit_rows(&PROGRESS_TABLE_HEADERS, &progress_table(session, scope.as_deref()))?;
            let before = session.progress.len();
            session.progress = reconcile_progress(&edited, &session.progress, scope.as_deref());
            session.save_progress()?;
            report_counts("progress", before, session.progress.len());
        }
    }
    Ok(())
}

fn cmd_company(session: &mut Session, command: CompanyCommands) -> Result<()> {
    match command {
        CompanyCommands::List => {
            if session.companies.is_empty() {
                println!("No companies found.");
                return Ok(());
            }
            println!(
                "{:<10} {:<24} {:<16} {:<4} {:<4} {:<24}",
                "ID", "NAME", "INDUSTRY", "MNC", "REP", "EMAIL"
            );
            println!("{}", "-".repeat(88));
            for company in &session.companies {
                println!(
                    "{:<10} {:<24} {:<16} {:<4} {:<4} {:<24}",
                    short_id(&company.id),
                    truncate(&company.name, 22),
                    truncate(&company.industry, 14),
                    company.is_mnc,
                    company.reputation,
                    truncate(&company.email, 22),
                );
            }
        }

        CompanyCommands::Delete { company } => {
            let company_id = match session.companies.iter().find(|c| c.id == company) {
                Some(c) => c.id.clone(),
                None => session
                    .find_company_by_name(&company)
                    .map(|c| c.id.clone())
                    .ok_or_else(|| anyhow!("No company matches '{}'", company))?,
            };
            let name = session
                .company_by_id(&company_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();

            delete_company(session, &company_id)?;
            session.save_companies()?;
            println!("Deleted company '{}'.", name);
        }

        CompanyCommands::Switch { hunt, name } => {
            let hunt_id = session.resolve_hunt(&hunt)?.id.clone();
            switch_company(session, &hunt_id, &name)?;
            session.save_hunts()?;
            println!("Hunt is now '{}'.", session.hunt_label(&hunt_id));
        }

        CompanyCommands::Edit {
            hunt,
            name,
            industry,
            description,
            mnc,
            address,
            website,
            reputation,
            phone,
            email,
        } => {
            let hunt_id = session.resolve_hunt(&hunt)?.id.clone();

            // Prefill from the currently bound company; flags override.
            let current = session
                .hunt_by_id(&hunt_id)
                .and_then(|h| session.company_by_id(&h.company_id))
                .cloned()
                .unwrap_or_default();

            let company_name = name.unwrap_or(current.name);
            let fields = CompanyFields {
                industry: industry.unwrap_or(current.industry),
                description: description.unwrap_or(current.description),
                is_mnc: mnc.unwrap_or(current.is_mnc),
                address: address.unwrap_or(current.address),
                website: website.unwrap_or(current.website),
                reputation: reputation.unwrap_or(current.reputation),
                phone: phone.unwrap_or(current.phone),
                email: email.unwrap_or(current.email),
            };

            edit_company_for_hunt(session, &hunt_id, &company_name, &fields)?;
            session.save_hunts()?;
            session.save_companies()?;
            println!("Saved company '{}'.", company_name.trim());
        }
    }
    Ok(())
}

fn cmd_reminder(session: &mut Session, command: ReminderCommands) -> Result<()> {
    match command {
        ReminderCommands::List { hunt } => {
            let scope = resolve_scope(session, hunt.as_deref())?;
            let rows = reminder_table(session, scope.as_deref());
            if rows.is_empty() {
                println!("No reminders found.");
                return Ok(());
            }
            println!(
                "{:<10} {:<28} {:<20} {:<8} {:<24}",
                "ID", "HUNT", "WHEN", "STATUS", "DESCRIPTION"
            );
            println!("{}", "-".repeat(94));
            for row in rows {
                println!(
                    "{:<10} {:<28} {:<20} {:<8} {:<24}",
                    short_id(&row[0]),
                    truncate(&row[1], 26),
                    row[2],
                    row[3],
                    truncate(&row[4], 22),
                );
            }
        }

        ReminderCommands::Add { hunt, at, desc } => {
            let hunt_id = session.resolve_hunt(&hunt)?.id.clone();
            let when = parse_date_time(&at)
                .ok_or_else(|| anyhow!("Invalid date/time '{}' (want YYYY-MM-DD HH:MM)", at))?;

            let id = add_reminder(session, &hunt_id, &format_date_time(when), &desc)?;
            session.save_reminders()?;
            println!(
                "Added reminder {} for '{}'.",
                short_id(&id),
                session.hunt_label(&hunt_id)
            );
        }

        ReminderCommands::Done { id } => {
            let reminder_id = resolve_reminder_id(session, &id)?;
            mark_reminder_done(session, &reminder_id)?;
            session.save_reminders()?;
            println!("Marked reminder {} as Done.", short_id(&reminder_id));
        }
    }
    Ok(())
}

fn cmd_progress(session: &mut Session, command: ProgressCommands) -> Result<()> {
    match command {
        ProgressCommands::List { hunt } => {
            let scope = resolve_scope(session, hunt.as_deref())?;
            let rows = progress_table(session, scope.as_deref());
            if rows.is_empty() {
                println!("No progress entries found.");
                return Ok(());
            }
            println!(
                "{:<10} {:<28} {:<20} {:<12} {:<24}",
                "ID", "HUNT", "WHEN", "STATUS", "DESCRIPTION"
            );
            println!("{}", "-".repeat(98));
            for row in rows {
                println!(
                    "{:<10} {:<28} {:<20} {:<12} {:<24}",
                    short_id(&row[0]),
                    truncate(&row[1], 26),
                    row[2],
                    truncate(&row[3], 10),
                    truncate(&row[4], 22),
                );
            }
        }

        ProgressCommands::Add {
            hunt,
            status,
            desc,
            at,
        } => {
            let hunt_id = session.resolve_hunt(&hunt)?.id.clone();
            let when = match at {
                Some(text) => parse_date_time(&text)
                    .ok_or_else(|| anyhow!("Invalid date/time '{}' (want YYYY-MM-DD HH:MM)", text))?,
                None => Local::now().naive_local(),
            };

            add_progress(session, &hunt_id, &format_date_time(when), &status, &desc)?;
            session.save_progress()?;
            println!(
                "Recorded '{}' for '{}'.",
                status,
                session.hunt_label(&hunt_id)
            );
        }
    }
    Ok(())
}

fn cmd_personal(session: &mut Session, command: PersonalCommands) -> Result<()> {
    match command {
        PersonalCommands::Show => {
            let p = &session.personal;
            println!("Name:     {}", p.name);
            println!("Email:    {}", p.email);
            println!("Phone:    {}", p.phone);
            println!("LinkedIn: {}", p.linkedin_id);
            println!("GitHub:   {}", p.github_acc);
            println!("Address:  {}", p.address);
            println!("About:    {}", p.about);
            println!("\nEducation:");
            for entry in &p.education {
                println!("  - {} ({}) {}", entry.education, entry.almamater, entry.description);
            }
            println!("Work:");
            for entry in &p.work {
                println!("  - {} at {} {}", entry.position, entry.company, entry.description);
            }
            println!("Skills:");
            for entry in &p.skills {
                println!("  - {} {}", entry.skill, entry.description);
            }
        }

        PersonalCommands::Edit => {
            let json = serde_json::to_string_pretty(&session.personal)?;
            let edited = edit::edit_text_in_editor(&json, ".json")?;
            session.personal = serde_json::from_str(&edited)
                .context("Edited personal details are not valid JSON; nothing saved")?;
            session.save_personal()?;
            println!("Personal details saved.");
        }
    }
    Ok(())
}

fn cmd_parse(
    session: &mut Session,
    file: Option<PathBuf>,
    model: &str,
    dry_run: bool,
) -> Result<()> {
    let ad_text = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut text)
                .context("Failed to read the ad from stdin")?;
            text
        }
    };
    if ad_text.trim().is_empty() {
        bail!("The job ad text is empty");
    }

    let spec = resolve_model(model)?;
    let provider = create_provider(&spec)?;
    println!("Parsing job ad with {}...", spec.short_name);
    let parsed = parse_job_ad(provider.as_ref(), &ad_text)?;

    println!("\nHunt:");
    println!("  Title:       {}", parsed.hunt.job_title);
    println!("  Source:      {}", parsed.hunt.job_source);
    println!(
        "  Salary:      {} - {} {}",
        parsed.hunt.salary_base_min, parsed.hunt.salary_base_max, parsed.hunt.currency
    );
    println!("  Arrangement: {}", parsed.hunt.work_arrangement);
    println!("  Insurance:   {}", parsed.hunt.has_health_insurance);
    println!("Company:");
    println!("  Name:        {}", parsed.hunt.company_name);
    println!("  Industry:    {}", parsed.company.industry);
    println!("  Address:     {}", parsed.company.address);
    println!("  Website:     {}", parsed.company.website);

    if dry_run {
        println!("\n(Dry run - nothing was created)");
        return Ok(());
    }

    let hunt_id = create_hunt(session, &parsed.hunt, CompanyMode::New, &parsed.company)?;
    session.save_all()?;
    println!(
        "\nCreated hunt {} ({})",
        short_id(&hunt_id),
        session.hunt_label(&hunt_id)
    );
    Ok(())
}

fn cmd_email(session: &Session, artifacts: &Artifacts, args: EmailArgs) -> Result<()> {
    let hunt = session.resolve_hunt(&args.hunt)?.clone();
    let company = session.company_by_id(&hunt.company_id);

    let draft = if args.use_draft {
        artifacts
            .load_email_draft(&hunt.id)?
            .ok_or_else(|| anyhow!("No saved draft for this hunt; drop --use-draft"))?
    } else {
        let spec = resolve_model(&args.model)?;
        let provider = create_provider(&spec)?;
        let prefs = Preferences {
            tone: args.tone.clone(),
            skills_to_emphasise: args.skills.clone(),
            notes: args.notes.clone(),
        };
        let ctx = GenContext {
            personal: &session.personal,
            hunt: &hunt,
            company,
            prefs: &prefs,
        };

        println!("Generating email with {}...", spec.short_name);
        let draft = generate_application_email(provider.as_ref(), &ctx)?;
        let path = artifacts.save_email_draft(&hunt.id, &draft)?;
        println!("Draft saved to {}", path.display());
        draft
    };

    // Best effort recipient: explicit flag, then company, then self.
    let to = args
        .to
        .clone()
        .or_else(|| company.map(|c| c.email.clone()).filter(|e| !e.is_empty()))
        .or_else(|| {
            let email = session.personal.email.clone();
            (!email.is_empty()).then_some(email)
        })
        .unwrap_or_default();

    if args.compose {
        let email = OutgoingEmail {
            to: to.clone(),
            subject: draft.subject.clone(),
            body: draft.body.clone(),
            attachments: vec![],
        };
        open_in_composer(&email)?;
        println!("Opened mail composer for {}.", email.to);
    }

    if args.send {
        if to.trim().is_empty() {
            bail!("No recipient: pass --to, or set a company/personal email");
        }
        let sender = GmailSender::from_token_file(&expand_tilde(&args.token_file))?;
        let email = OutgoingEmail {
            to: to.clone(),
            subject: draft.subject.clone(),
            body: draft.body.clone(),
            attachments: args.attach.clone(),
        };
        let message_id = sender.send(&email)?;
        println!("Sent via Gmail. Message ID: {}", message_id);
    }

    if !args.compose && !args.send {
        println!("\nTo:      {}", to);
        println!("Subject: {}", draft.subject);
        println!("\n{}", draft.body);
    }
    Ok(())
}

fn cmd_resume(session: &Session, artifacts: &Artifacts, args: ResumeArgs) -> Result<()> {
    let hunt = session.resolve_hunt(&args.hunt)?.clone();
    let company = session.company_by_id(&hunt.company_id);

    let spec = resolve_model(&args.model)?;
    let provider = create_provider(&spec)?;
    let prefs = Preferences {
        tone: args.tone,
        skills_to_emphasise: args.skills,
        notes: args.notes,
    };
    let ctx = GenContext {
        personal: &session.personal,
        hunt: &hunt,
        company,
        prefs: &prefs,
    };

    println!("Generating resume with {}...", spec.short_name);
    let doc = generate_resume_structure(provider.as_ref(), &ctx)?;

    let out_path = args.output.unwrap_or_else(|| artifacts.resume_path(&hunt.id));
    resume::write_markdown(&doc, &out_path)?;
    println!("Resume written to {}", out_path.display());
    Ok(())
}

// --- Helpers ---

fn resolve_scope(session: &Session, hunt: Option<&str>) -> Result<Option<String>> {
    match hunt {
        Some(reference) => Ok(Some(session.resolve_hunt(reference)?.id.clone())),
        None => Ok(None),
    }
}

fn resolve_reminder_id(session: &Session, reference: &str) -> Result<String> {
    let matches: Vec<&Reminder> = session
        .reminders
        .iter()
        .filter(|r| r.id.starts_with(reference))
        .collect();
    match matches.len() {
        1 => Ok(matches[0].id.clone()),
        0 => Err(anyhow!("No reminder matches '{}'", reference)),
        _ => Err(anyhow!("Reminder id '{}' is ambiguous", reference)),
    }
}

fn report_counts(kind: &str, before: usize, after: usize) {
    if after < before {
        println!("Saved {} {} row(s) ({} deleted).", after, kind, before - after);
    } else {
        println!("Saved {} {} row(s).", after, kind);
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

fn short_id(id: &str) -> &str {
    if id.len() > 8 { &id[..8] } else { id }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("abcdef1234567890"), "abcdef12");
        assert_eq!(short_id("ab"), "ab");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long title", 10), "a rathe...");
    }

    #[test]
    fn test_expand_tilde() {
        unsafe {
            std::env::set_var("HOME", "/home/jane");
        }
        assert_eq!(
            expand_tilde("~/.jobhound.gmail_token"),
            PathBuf::from("/home/jane/.jobhound.gmail_token")
        );
        assert_eq!(expand_tilde("/tmp/token"), PathBuf::from("/tmp/token"));
    }
}

use anyhow::Result;
use chrono::Local;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::artifacts::Artifacts;
use crate::project::{HuntTableRow, project_hunt_table};
use crate::session::Session;

// Read-only browse view over the projected hunt table. Editing still goes
// through the edit cycle; this is for scanning the pipeline.

struct AppState {
    rows: Vec<HuntTableRow>,
    selected: usize,
    scroll_offset: u16,
}

impl AppState {
    fn new(rows: Vec<HuntTableRow>) -> Self {
        Self {
            rows,
            selected: 0,
            scroll_offset: 0,
        }
    }

    fn current(&self) -> Option<&HuntTableRow> {
        self.rows.get(self.selected)
    }

    fn next(&mut self) {
        if !self.rows.is_empty() && self.selected < self.rows.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

pub fn run_browse(session: &Session, artifacts: &Artifacts) -> Result<()> {
    let rows = project_hunt_table(session, artifacts, Local::now().naive_local());
    if rows.is_empty() {
        println!("No hunts found.");
        return Ok(());
    }

    let mut state = AppState::new(rows);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, session);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    session: &Session,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, session, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, session: &Session, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(frame.area());

    // Left panel: hunts, flagged when a reminder is due
    let items: Vec<ListItem> = state
        .rows
        .iter()
        .map(|row| {
            let flag = if row.reminder_due { "!" } else { " " };
            let title = if row.job_title.len() > 30 {
                format!("{}...", &row.job_title[..27])
            } else {
                row.job_title.clone()
            };
            let company = if row.company_name.is_empty() {
                "?"
            } else {
                row.company_name.as_str()
            };
            ListItem::new(format!("{} {} | {}", flag, title, company))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Hunts ({}) ", state.rows.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: hunt detail
    let detail = build_detail(state, session);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer help
    let help_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let help = Paragraph::new(" j/k:navigate  J/K:scroll  q:quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area[1]);
}

fn build_detail<'a>(state: &'a AppState, session: &'a Session) -> Text<'a> {
    let Some(row) = state.current() else {
        return Text::raw("No hunt selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        &row.job_title,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if !row.company_name.is_empty() {
        lines.push(Line::from(format!("at {}", row.company_name)));
    }
    if !row.progress_status.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Progress: {}", row.progress_status),
            Style::default().fg(Color::Cyan),
        )));
    }
    if row.reminder_due {
        lines.push(Line::from(Span::styled(
            "Reminder due",
            Style::default().fg(Color::Yellow),
        )));
    }

    lines.push(Line::from(""));
    if !row.job_source.is_empty() {
        lines.push(Line::from(format!("Source: {}", row.job_source)));
    }
    if !row.work_arrangement.is_empty() {
        lines.push(Line::from(format!("Arrangement: {}", row.work_arrangement)));
    }
    lines.push(Line::from(format!(
        "Health insurance: {}",
        row.has_health_insurance
    )));
    if !row.salary_base_min.is_empty() || !row.salary_base_max.is_empty() {
        lines.push(Line::from(format!(
            "Salary: {} - {} {}",
            row.salary_base_min, row.salary_base_max, row.currency
        )));
    }
    if !row.salary_expecting.is_empty() {
        lines.push(Line::from(format!(
            "Expecting: {} {}",
            row.salary_expecting, row.currency
        )));
    }
    lines.push(Line::from(format!(
        "Artifacts: resume {} | email {}",
        if row.has_resume { "yes" } else { "no" },
        if row.has_email { "yes" } else { "no" },
    )));

    if let Some(company) = session.company_by_id(&row.company_id) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "COMPANY",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {} ({})", company.name, company.industry)));
        if !company.address.is_empty() {
            lines.push(Line::from(format!("  {}", company.address)));
        }
        if !company.website.is_empty() {
            lines.push(Line::from(format!("  {}", company.website)));
        }
    }

    let reminders = session.reminders_for_hunt(&row.id);
    if !reminders.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "REMINDERS",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for reminder in reminders {
            let style = if reminder.status == "Pending" {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "  [{}] {} {}",
                    reminder.status, reminder.date_time, reminder.description
                ),
                style,
            )));
        }
    }

    let progress = session.progress_for_hunt(&row.id);
    if !progress.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "PROGRESS",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for entry in progress {
            lines.push(Line::from(format!(
                "  {} {} - {}",
                entry.date_time, entry.status, entry.description
            )));
        }
    }

    if !row.job_description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "DESCRIPTION",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(&row.job_description, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}

//! Main TUI application.

use crate::components::{
    Footer, Header, JobDetail, JobTable, MsgViewer, MsgViewerState, TableView,
};
use crate::ui::Theme;
use aview_core::{find_latest_message_file, is_message_file, same_path};
use aview_grid::{
    CellFormatter, DateComparatorFn, DateFilter, GridFunctions, CLEAN_DATE_COLUMN,
    DATE_COMPARATOR,
};
use aview_highlight::Language;
use aview_parsers::parse_sacct_timestamp;
use aview_slurm::{load_job_table, Column, SacctJob, SlurmJobState};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::cmp::Reverse;
use std::time::{Duration, Instant};

/// Lines moved by a page scroll in the message panel.
const PAGE: usize = 10;

/// Sort mode for the job table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Table order: newest job id first
    #[default]
    JobId,
    /// Most recent start first
    Start,
    /// Most recent end first
    End,
    /// Active jobs first, then failures
    State,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            Self::JobId => Self::Start,
            Self::Start => Self::End,
            Self::End => Self::State,
            Self::State => Self::JobId,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::JobId => "JobID",
            Self::Start => "Start",
            Self::End => "End",
            Self::State => "State",
        }
    }
}

/// Active panel for keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePanel {
    #[default]
    Jobs,
    Messages,
}

/// Main application state.
pub struct App {
    pub jobs: Vec<SacctJob>,
    pub should_quit: bool,
    pub selected_index: usize,
    pub sort_mode: SortMode,
    pub date_filter: Option<DateFilter>,
    /// Column the date filter applies to
    pub date_column: Column,
    pub active_panel: ActivePanel,
    pub show_help: bool,
    /// Job detail panel beside the messages
    pub show_details: bool,
    pub messages: MsgViewerState,
    pub theme: Theme,
    jobs_path: Option<Utf8PathBuf>,
    message_path: Option<Utf8PathBuf>, // Fixed message file, ignores the selection
    language: Language,
    functions: GridFunctions,
    visible: Vec<usize>,                       // Indexes into `jobs`, filtered and sorted
    status_message: Option<(String, Instant)>, // Temporary status message with timestamp
}

impl App {
    pub fn new(jobs: Vec<SacctJob>, language: Language) -> Self {
        let mut app = Self {
            jobs,
            should_quit: false,
            selected_index: 0,
            sort_mode: SortMode::default(),
            date_filter: None,
            date_column: Column::Start,
            active_panel: ActivePanel::default(),
            show_help: false,
            show_details: true,
            messages: MsgViewerState::default(),
            theme: Theme::default(),
            jobs_path: None,
            message_path: None,
            language,
            functions: GridFunctions::with_builtin(),
            visible: Vec::new(),
            status_message: None,
        };
        app.update_job_list();
        app.open_messages();
        app
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// File the job table was loaded from, reread by `r`.
    pub fn with_jobs_path(mut self, path: Utf8PathBuf) -> Self {
        self.jobs_path = Some(path);
        self
    }

    /// Show this message file whatever job is selected.
    pub fn with_message_file(mut self, path: Utf8PathBuf) -> Self {
        self.message_path = Some(path);
        self.open_messages();
        self
    }

    pub fn with_date_filter(mut self, filter: Option<DateFilter>, column: Column) -> Self {
        self.date_filter = filter;
        self.date_column = column;
        self.update_job_list();
        self.open_messages();
        self
    }

    /// Replace the table's grid functions.
    pub fn with_functions(mut self, functions: GridFunctions) -> Self {
        self.functions = functions;
        self.update_job_list();
        self
    }

    pub fn jobs_path(&self) -> Option<&Utf8Path> {
        self.jobs_path.as_deref()
    }

    /// Message file currently shown.
    pub fn message_file(&self) -> Option<&Utf8Path> {
        self.messages.path.as_deref()
    }

    /// Directory the message panel follows: the fixed file's directory, or
    /// the selected job's working directory whether or not it holds a
    /// message file yet.
    pub fn message_dir(&self) -> Option<&Utf8Path> {
        match &self.message_path {
            Some(path) => path.parent(),
            None => self.selected_job().and_then(|job| job.work_dir.as_deref()),
        }
    }

    /// React to a file created or modified on disk.
    ///
    /// A new or newer message file in the followed directory replaces the
    /// one shown. Returns whether the panel was reloaded.
    pub fn file_changed(&mut self, path: &Utf8Path) -> bool {
        if let Some(fixed) = &self.message_path {
            if !same_path(fixed, path) {
                return false;
            }
            self.refresh_messages();
            return true;
        }

        if !is_message_file(path) {
            return false;
        }
        let Some(dir) = self.message_dir().map(Utf8Path::to_owned) else {
            return false;
        };
        if !path.parent().is_some_and(|parent| same_path(parent, &dir)) {
            return false;
        }

        let latest = find_latest_message_file(&dir);
        if latest.is_some() && latest.as_deref() == self.message_file() {
            self.messages.reload(&self.language);
        } else {
            self.open_messages();
            if let Some(path) = self.message_file() {
                tracing::debug!("Following new message file {}", path);
            }
        }
        true
    }

    /// Date cell formatter, looked up by name.
    fn date_formatter(&self) -> CellFormatter {
        self.functions
            .formatter(CLEAN_DATE_COLUMN)
            .unwrap_or(raw_cell)
    }

    /// Date filter comparator, looked up by name.
    fn date_comparator(&self) -> Option<DateComparatorFn> {
        let comparator = self.functions.comparator(DATE_COMPARATOR);
        if comparator.is_none() {
            tracing::warn!("No {} registered, date filter ignored", DATE_COMPARATOR);
        }
        comparator
    }

    /// Update cached row order based on filter and sort.
    pub fn update_job_list(&mut self) {
        let selected_id = self.selected_job().map(|job| job.job_id.clone());

        let mut visible: Vec<usize> = match (&self.date_filter, self.date_comparator()) {
            (Some(filter), Some(comparator)) => (0..self.jobs.len())
                .filter(|&i| {
                    let cell = self.jobs[i].cell(self.date_column);
                    filter.matches_with(&Local, comparator, cell.as_deref())
                })
                .collect(),
            _ => (0..self.jobs.len()).collect(),
        };

        match self.sort_mode {
            SortMode::JobId => {}
            SortMode::Start => {
                visible.sort_by_key(|&i| Reverse(parse_sacct_timestamp(&self.jobs[i].start)))
            }
            SortMode::End => {
                visible.sort_by_key(|&i| Reverse(parse_sacct_timestamp(&self.jobs[i].end)))
            }
            SortMode::State => visible.sort_by_key(|&i| state_rank(&self.jobs[i].state)),
        }

        self.visible = visible;

        // Keep the same job selected when it is still shown
        let position = selected_id
            .and_then(|id| self.visible.iter().position(|&i| self.jobs[i].job_id == id));
        self.selected_index = match position {
            Some(position) => position,
            None => self.selected_index.min(self.visible.len().saturating_sub(1)),
        };
    }

    /// Indexes into `jobs` of the shown rows, in display order.
    pub fn visible_jobs(&self) -> &[usize] {
        &self.visible
    }

    pub fn selected_job(&self) -> Option<&SacctJob> {
        self.visible
            .get(self.selected_index)
            .and_then(|&i| self.jobs.get(i))
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn select_next(&mut self) {
        let len = self.visible.len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
            self.selection_changed();
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.visible.len();
        if len > 0 {
            self.selected_index = self.selected_index.checked_sub(1).unwrap_or(len - 1);
            self.selection_changed();
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
        self.selection_changed();
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.visible.len().saturating_sub(1);
        self.selection_changed();
    }

    pub fn cycle_sort(&mut self) {
        self.sort_mode = self.sort_mode.next();
        self.update_job_list();
    }

    pub fn clear_date_filter(&mut self) {
        if self.date_filter.take().is_some() {
            self.update_job_list();
            self.open_messages();
            self.set_status("Date filter cleared");
        } else {
            self.set_status("No date filter");
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_details(&mut self) {
        self.show_details = !self.show_details;
    }

    fn selection_changed(&mut self) {
        if self.message_path.is_none() {
            self.open_messages();
        }
    }

    /// Load the messages of the selected job (or the fixed message file).
    fn open_messages(&mut self) {
        let mut state = if let Some(ref path) = self.message_path {
            MsgViewerState::load(path, &self.language)
        } else {
            match self.selected_job() {
                Some(SacctJob {
                    work_dir: Some(dir),
                    ..
                }) => MsgViewerState::load(dir, &self.language),
                Some(job) => MsgViewerState::unavailable(format!(
                    "Job {} has no working directory",
                    job.job_id
                )),
                None => MsgViewerState::unavailable("No job selected"),
            }
        };
        state.toggle_follow();
        self.messages = state;
    }

    /// Reread the message file after it changed.
    pub fn refresh_messages(&mut self) {
        if self.messages.path.is_some() {
            self.messages.reload(&self.language);
        } else {
            self.open_messages();
        }
    }

    /// Replace the job table (e.g. after the file changed).
    pub fn update_jobs(&mut self, jobs: Vec<SacctJob>) {
        let previous = self.selected_job().map(|job| job.job_id.clone());
        self.jobs = jobs;
        self.update_job_list();

        let current = self.selected_job().map(|job| job.job_id.clone());
        if current != previous {
            self.selection_changed();
        }
    }

    /// Reload the job table file and the message file.
    pub fn reload(&mut self) {
        if let Some(path) = self.jobs_path.clone() {
            match load_job_table(&path) {
                Ok(jobs) => {
                    let count = jobs.len();
                    self.update_jobs(jobs);
                    self.set_status(format!("Reloaded {} jobs", count));
                }
                Err(e) => {
                    tracing::warn!("Failed to reload {}: {}", path, e);
                    self.set_status(format!("Failed to reload {}: {}", path, e));
                }
            }
        }
        self.refresh_messages();
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Text `y` copies: the submit line, or the current message line.
    fn copy_text(&self) -> Result<String, &'static str> {
        match self.active_panel {
            ActivePanel::Jobs => {
                let job = self.selected_job().ok_or("No job selected")?;
                job.submit_line
                    .clone()
                    .filter(|line| !line.trim().is_empty())
                    .ok_or("No submit line to copy")
            }
            ActivePanel::Messages => self
                .messages
                .line_text(self.messages.scroll_offset)
                .filter(|line| !line.trim().is_empty())
                .map(String::from)
                .ok_or("No message line to copy"),
        }
    }

    fn copy_to_clipboard(&mut self) {
        let text = match self.copy_text() {
            Ok(text) => text,
            Err(reason) => {
                self.set_status(reason);
                return;
            }
        };

        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(text) {
                Ok(()) => self.set_status("Copied to clipboard"),
                Err(_) => self.set_status("Failed to copy to clipboard"),
            },
            Err(_) => self.set_status("Clipboard not available"),
        }
    }

    fn switch_panel(&mut self) {
        self.active_panel = match self.active_panel {
            ActivePanel::Jobs => ActivePanel::Messages,
            ActivePanel::Messages => ActivePanel::Jobs,
        };
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            KeyCode::Char('j') | KeyCode::Down => match self.active_panel {
                ActivePanel::Jobs => self.select_next(),
                ActivePanel::Messages => self.messages.scroll_down(),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.active_panel {
                ActivePanel::Jobs => self.select_previous(),
                ActivePanel::Messages => self.messages.scroll_up(),
            },
            KeyCode::Char('g') | KeyCode::Home => match self.active_panel {
                ActivePanel::Jobs => self.select_first(),
                ActivePanel::Messages => self.messages.scroll_to_top(),
            },
            KeyCode::Char('G') | KeyCode::End => match self.active_panel {
                ActivePanel::Jobs => self.select_last(),
                ActivePanel::Messages => self.messages.scroll_to_bottom(),
            },
            KeyCode::PageUp => self.messages.page_up(PAGE),
            KeyCode::PageDown => self.messages.page_down(PAGE),
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('f') => self.clear_date_filter(),
            KeyCode::Char('F') | KeyCode::Char('t') => self.messages.toggle_follow(),
            KeyCode::Char('y') => self.copy_to_clipboard(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('d') => self.toggle_details(),
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Tab => self.switch_panel(),
            _ => {}
        }
    }

    /// Poll for events and handle them.
    pub fn poll_events(&mut self, timeout: Duration) -> std::io::Result<bool> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Render the UI.
    pub fn render(&self, frame: &mut Frame) {
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.background)),
            frame.area(),
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),      // Header
                Constraint::Percentage(45), // Job table
                Constraint::Min(6),         // Message panel
                Constraint::Length(1),      // Footer
            ])
            .split(frame.area());

        let source = self
            .jobs_path
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let summary = self.messages.error.is_none().then_some(&self.messages.summary);
        Header::render(frame, chunks[0], &source, &self.jobs, summary, &self.theme);

        let filter = self
            .date_filter
            .as_ref()
            .map(|f| format!("{} {}", self.date_column.header(), f));
        JobTable::render(
            frame,
            chunks[1],
            &self.jobs,
            &self.visible,
            (!self.visible.is_empty()).then_some(self.selected_index),
            self.date_formatter(),
            TableView {
                total: self.jobs.len(),
                sort: self.sort_mode.label(),
                filter,
            },
            &self.theme,
            self.active_panel == ActivePanel::Jobs,
        );

        let message_area = if self.show_details {
            let panels = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Min(20)])
                .split(chunks[2]);
            JobDetail::render(
                frame,
                panels[0],
                self.selected_job(),
                self.date_formatter(),
                summary,
                &self.theme,
            );
            panels[1]
        } else {
            chunks[2]
        };

        MsgViewer::render_panel(
            frame,
            message_area,
            &self.messages,
            &self.theme,
            self.active_panel == ActivePanel::Messages,
        );

        // Status messages show for 3 seconds
        let status_msg = self.status_message.as_ref().and_then(|(msg, timestamp)| {
            (timestamp.elapsed() < Duration::from_secs(3)).then_some(msg.as_str())
        });
        Footer::render(frame, chunks[3], status_msg, &self.theme);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = centered_rect(60, 60, frame.area());

        let help_text = r#"
  Keyboard Shortcuts
  ──────────────────

  Jobs Panel (when active)
  j/k / ↑↓   Select job
  g / G      Go to first/last job
  y          Copy submit line

  Messages Panel (when active)
  j/k / ↑↓   Scroll line by line
  PgUp/PgDn  Page up/down
  g / G      Go to top/bottom
  y          Copy current line

  Global
  Tab        Switch active panel
  s          Cycle sort
  f          Clear date filter
  d          Toggle job details
  F / t      Toggle follow mode
  r          Reload
  ?          This help
  q / Ctrl+C Quit

  Press any key to close
"#;

        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .style(Style::default().bg(self.theme.muted)),
            )
            .style(
                Style::default()
                    .fg(self.theme.foreground)
                    .bg(self.theme.muted),
            );

        frame.render_widget(paragraph, area);
    }
}

/// Fallback when no date formatter is registered.
fn raw_cell(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

fn state_rank(state: &SlurmJobState) -> u8 {
    match state {
        SlurmJobState::Running => 0,
        SlurmJobState::Pending => 1,
        SlurmJobState::Failed | SlurmJobState::OutOfMemory | SlurmJobState::NodeFail => 2,
        SlurmJobState::Timeout => 3,
        SlurmJobState::Cancelled { .. } => 4,
        SlurmJobState::Completed => 5,
        SlurmJobState::Unknown(_) => 6,
    }
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use aview_grid::{DateFilterKind, GridFunction};
    use aview_highlight::LanguageRegistry;
    use aview_slurm::parse_job_table;
    use chrono::NaiveDate;
    use std::fs;
    use std::time::SystemTime;

    const TABLE: &str = "\
JobID,JobName,Start,End,Elapsed,State,Timelimit,NNodes,NCPUS,SubmitLine,WorkDir
101,car.slurm,2024-05-01T08:00:00,2024-05-01T09:30:00,01:30:00,COMPLETED,02:00:00,1,4,sbatch car.slurm,/nonexistent/car
103,bump.slurm,2024-05-03T10:00:00,Unknown,Unknown,RUNNING,1-00:00:00,1,8,sbatch bump.slurm,/nonexistent/bump
102,wheel.slurm,Unknown,Unknown,00:00:00,PENDING,UNLIMITED,1,2,,
104,tire.slurm,2024-05-02T11:00:00,2024-05-02T11:05:00,00:05:00,FAILED,01:00:00,1,2,sbatch tire.slurm,/nonexistent/tire
";

    fn language() -> Language {
        LanguageRegistry::with_builtin()
            .unwrap()
            .require("adams_msg")
            .unwrap()
            .clone()
    }

    fn app() -> App {
        App::new(parse_job_table(TABLE).unwrap(), language())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn visible_ids(app: &App) -> Vec<&str> {
        app.visible_jobs()
            .iter()
            .map(|&i| app.jobs[i].job_id.as_str())
            .collect()
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        assert_eq!(app.selected_job().unwrap().job_id, "104");

        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selected_job().unwrap().job_id, "101");
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_index, 0);

        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.selected_index, 3);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_sort_modes() {
        let mut app = app();
        assert_eq!(visible_ids(&app), vec!["104", "103", "102", "101"]);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.sort_mode, SortMode::Start);
        // Missing start times sort last
        assert_eq!(visible_ids(&app), vec!["103", "104", "101", "102"]);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(visible_ids(&app), vec!["104", "101", "103", "102"]);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.sort_mode, SortMode::State);
        assert_eq!(visible_ids(&app), vec!["103", "102", "104", "101"]);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.sort_mode, SortMode::JobId);
    }

    #[test]
    fn test_sort_keeps_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_job().unwrap().job_id, "103");
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.selected_job().unwrap().job_id, "103");
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_date_filter_and_clear() {
        let filter = DateFilter::new(
            DateFilterKind::GreaterThan,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        let mut app = app().with_date_filter(Some(filter), Column::Start);
        // Same-day starts compare equal; blank starts are excluded
        assert_eq!(visible_ids(&app), vec!["104", "103"]);

        press(&mut app, KeyCode::Char('f'));
        assert!(app.date_filter.is_none());
        assert_eq!(app.visible_jobs().len(), 4);
    }

    #[test]
    fn test_date_filter_on_end_column() {
        let filter = DateFilter::new(
            DateFilterKind::Equals,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
        .include_blanks(true);
        let app = app().with_date_filter(Some(filter), Column::End);
        assert_eq!(visible_ids(&app), vec!["103", "102", "101"]);
    }

    #[test]
    fn test_missing_comparator_disables_filter() {
        let filter = DateFilter::new(
            DateFilterKind::Equals,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        let mut functions = GridFunctions::new();
        functions.register(CLEAN_DATE_COLUMN, GridFunction::Formatter(raw_cell));
        let app = app()
            .with_date_filter(Some(filter), Column::Start)
            .with_functions(functions);
        assert_eq!(app.visible_jobs().len(), 4);
        assert_eq!(app.date_formatter()(Some("2024-05-01T08:00:00")), "2024-05-01T08:00:00");
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = self::app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_panels_route_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_panel, ActivePanel::Messages);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_index, 0);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_panel, ActivePanel::Jobs);
    }

    #[test]
    fn test_messages_follow_selection() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(work_dir.join("run.msg"), "Solution failed to converge\n").unwrap();

        let table = format!(
            "JobID,State,WorkDir\n2,RUNNING,{}\n1,COMPLETED,/nonexistent\n",
            work_dir
        );
        let mut app = App::new(parse_job_table(&table).unwrap(), language());
        assert_eq!(app.message_file(), Some(work_dir.join("run.msg").as_path()));
        assert_eq!(app.messages.summary.failed_to_converge, 1);
        assert!(app.messages.follow_mode);

        press(&mut app, KeyCode::Char('j'));
        assert!(app.messages.error.is_some());
        assert_eq!(app.message_file(), None);
    }

    #[test]
    fn test_new_message_file_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = Utf8Path::from_path(dir.path()).unwrap();
        let table = format!("JobID,State,WorkDir\n7,PENDING,{}\n", work_dir);
        let mut app = App::new(parse_job_table(&table).unwrap(), language());
        assert_eq!(app.message_dir(), Some(work_dir));
        assert_eq!(app.message_file(), None);
        assert!(app.messages.error.is_some());

        let first = work_dir.join("run.msg");
        fs::write(&first, " command: sim/static\n").unwrap();
        fs::write(work_dir.join("notes.txt"), "x").unwrap();
        assert!(!app.file_changed(&work_dir.join("notes.txt")));
        assert!(!app.file_changed(Utf8Path::new("/nonexistent/other.msg")));

        assert!(app.file_changed(&first));
        assert_eq!(app.message_file(), Some(first.as_path()));
        assert!(app.messages.error.is_none());

        // Appended output reloads the same file
        fs::write(&first, " command: sim/static\nsolution converged\n").unwrap();
        assert!(app.file_changed(&first));
        assert_eq!(app.messages.summary.converged, 1);

        // A newer run in the same directory takes over
        let second = work_dir.join("run2.msg");
        fs::write(&second, "solution failed to converge\n").unwrap();
        fs::File::options()
            .write(true)
            .open(&second)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();
        assert!(app.file_changed(&second));
        assert_eq!(app.message_file(), Some(second.as_path()));
        assert_eq!(app.messages.summary.failed_to_converge, 1);
    }

    #[test]
    fn test_fixed_message_file_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = Utf8Path::from_path(dir.path()).unwrap();
        let msg = work_dir.join("car.msg");
        fs::write(&msg, "solution converged\n").unwrap();

        let mut app = app().with_message_file(msg.clone());
        assert_eq!(app.message_dir(), Some(work_dir));

        fs::write(work_dir.join("bump.msg"), "solution failed to converge\n").unwrap();
        assert!(!app.file_changed(&work_dir.join("bump.msg")));
        assert_eq!(app.message_file(), Some(msg.as_path()));

        fs::write(&msg, "solution converged\nsolution converged\n").unwrap();
        assert!(app.file_changed(&msg));
        assert_eq!(app.messages.summary.converged, 2);
    }

    #[test]
    fn test_fixed_message_file() {
        let dir = tempfile::tempdir().unwrap();
        let msg = Utf8Path::from_path(dir.path()).unwrap().join("car.msg");
        fs::write(&msg, "Solution converged\n").unwrap();

        let mut app = app().with_message_file(msg.clone());
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.message_file(), Some(msg.as_path()));

        fs::write(&msg, "Solution converged\nSolution converged\n").unwrap();
        app.refresh_messages();
        assert_eq!(app.messages.summary.converged, 2);
    }

    #[test]
    fn test_reload_jobs_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("jobs.csv");
        fs::write(&path, "JobID,State\n1,RUNNING\n").unwrap();

        let jobs = load_job_table(&path).unwrap();
        let mut app = App::new(jobs, language()).with_jobs_path(path.clone());
        assert_eq!(app.jobs.len(), 1);

        fs::write(&path, "JobID,State\n1,COMPLETED\n2,PENDING\n").unwrap();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.jobs.len(), 2);
        // Selection follows the job, not the row
        assert_eq!(app.selected_job().unwrap().job_id, "1");
        assert_eq!(app.selected_index, 1);

        fs::remove_file(&path).unwrap();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.jobs.len(), 2);
    }

    #[test]
    fn test_toggle_details() {
        let mut app = app();
        assert!(app.show_details);
        press(&mut app, KeyCode::Char('d'));
        assert!(!app.show_details);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.show_details);
    }

    #[test]
    fn test_copy_text() {
        let mut app = app();
        assert_eq!(app.copy_text(), Ok("sbatch tire.slurm".to_string()));

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_job().unwrap().job_id, "102");
        assert_eq!(app.copy_text(), Err("No submit line to copy"));

        app.active_panel = ActivePanel::Messages;
        assert_eq!(app.copy_text(), Err("No message line to copy"));
    }
}

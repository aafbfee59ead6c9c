//! Header component with job counts and message status.

use crate::ui::Theme;
use aview_core::{MessageStatus, MessageSummary};
use aview_slurm::{SacctJob, SlurmJobState};
use chrono::Local;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct Header;

impl Header {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        source: &str,
        jobs: &[SacctJob],
        messages: Option<&MessageSummary>,
        theme: &Theme,
    ) {
        let count = |f: fn(&SlurmJobState) -> bool| jobs.iter().filter(|j| f(&j.state)).count();
        let running = count(|s| matches!(s, SlurmJobState::Running));
        let pending = count(|s| matches!(s, SlurmJobState::Pending));
        let completed = count(|s| matches!(s, SlurmJobState::Completed));
        let other = jobs.len() - running - pending - completed;

        // Truncate the source path, keeping its last components
        let max_len = (area.width as usize).saturating_sub(50);
        let source = if source.chars().count() > max_len && max_len > 3 {
            let skip = source.chars().count() - max_len + 1;
            format!("…{}", source.chars().skip(skip).collect::<String>())
        } else {
            source.to_string()
        };

        let sep = Span::styled(" │ ", Style::default().fg(theme.muted));
        let title = Line::from(vec![
            Span::styled("aview", Style::default().add_modifier(Modifier::BOLD)),
            sep.clone(),
            Span::styled(source, Style::default().fg(theme.highlight)),
        ]);

        let datetime = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let datetime_line = Line::from(Span::styled(datetime, Style::default().fg(theme.warning)))
            .alignment(Alignment::Right);

        let mut body = vec![
            Span::styled(format!("{} running ", running), Style::default().fg(theme.running)),
            Span::styled(format!("{} pending ", pending), Style::default().fg(theme.pending)),
            Span::styled(
                format!("{} completed ", completed),
                Style::default().fg(theme.completed),
            ),
            Span::styled(format!("{} other", other), Style::default().fg(theme.failed)),
        ];

        if let Some(summary) = messages {
            let color = match summary.status() {
                MessageStatus::Converged => theme.success,
                MessageStatus::Failed | MessageStatus::Errors => theme.error,
                MessageStatus::Unknown => theme.muted,
            };
            body.push(sep);
            body.push(Span::styled(
                format!("messages: {}", summary.status().label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
            if summary.error_blocks > 0 {
                body.push(Span::styled(
                    format!(" ({} error blocks)", summary.error_blocks),
                    Style::default().fg(theme.error),
                ));
            }
        }

        let paragraph = Paragraph::new(Line::from(body)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_top(datetime_line),
        );

        frame.render_widget(paragraph, area);
    }
}

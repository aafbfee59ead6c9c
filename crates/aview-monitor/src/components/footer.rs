//! Footer component with keyboard shortcuts and status messages.

use crate::ui::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Footer;

impl Footer {
    pub fn render(frame: &mut Frame, area: Rect, status_message: Option<&str>, theme: &Theme) {
        let help =
            "j/k:nav  Tab:panel  s:sort  f:clear filter  d:details  F:follow  y:copy  r:reload  ?:help  q:quit";
        let version = format!("v{}", VERSION);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(version.len() as u16 + 1),
            ])
            .split(area);

        let left_content = if let Some(msg) = status_message {
            Line::from(Span::styled(
                msg.to_string(),
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(help, Style::default().fg(theme.muted)))
        };

        frame.render_widget(Paragraph::new(left_content), chunks[0]);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                version,
                Style::default().fg(theme.muted),
            ))),
            chunks[1],
        );
    }
}

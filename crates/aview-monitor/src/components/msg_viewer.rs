//! Message viewer panel for solver `.msg` files.

use crate::ui::Theme;
use aview_core::{load_message_file, MessageSummary};
use aview_highlight::{highlight, segments, split_lines, Language, Segment};
use camino::{Utf8Path, Utf8PathBuf};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// State for the message viewer.
#[derive(Debug, Clone, Default)]
pub struct MsgViewerState {
    /// Message file being viewed
    pub path: Option<Utf8PathBuf>,
    /// File content
    pub text: String,
    /// Highlighted segments per line
    pub lines: Vec<Vec<Segment>>,
    pub summary: MessageSummary,
    /// First visible line
    pub scroll_offset: usize,
    /// Follow mode - keep the last line in view
    pub follow_mode: bool,
    /// Why nothing could be loaded
    pub error: Option<String>,
}

impl MsgViewerState {
    /// Load and highlight a message file (or the newest one in a directory).
    pub fn load(path: &Utf8Path, language: &Language) -> Self {
        match load_message_file(path) {
            Ok((path, text)) => {
                let mut state = Self::from_text(text, language);
                state.path = Some(path);
                state
            }
            Err(e) => {
                tracing::debug!("No messages for {}: {}", path, e);
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Highlight in-memory text.
    pub fn from_text(text: String, language: &Language) -> Self {
        let spans = highlight(language, &text);
        let lines = split_lines(&text, &segments(&text, &spans));
        let summary = MessageSummary::from_spans(&text, &spans);
        Self {
            path: None,
            text,
            lines,
            summary,
            scroll_offset: 0,
            follow_mode: false,
            error: None,
        }
    }

    /// Empty state explaining why there is nothing to show.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Text of line `index`.
    pub fn line_text(&self, index: usize) -> Option<&str> {
        let line = self.lines.get(index)?;
        match (line.first(), line.last()) {
            (Some(first), Some(last)) => Some(&self.text[first.start..last.end]),
            _ => Some(""),
        }
    }

    fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = (self.scroll_offset + 1).min(self.last_line());
        self.follow_mode = false;
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        self.follow_mode = false;
    }

    pub fn page_down(&mut self, page: usize) {
        self.scroll_offset = (self.scroll_offset + page).min(self.last_line());
        self.follow_mode = false;
    }

    pub fn page_up(&mut self, page: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(page);
        self.follow_mode = false;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.follow_mode = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.last_line();
        self.follow_mode = false;
    }

    pub fn toggle_follow(&mut self) {
        self.follow_mode = !self.follow_mode;
        if self.follow_mode {
            self.scroll_offset = self.last_line();
        }
    }

    /// Replace the content, keeping the scroll position and follow mode.
    pub fn reload(&mut self, language: &Language) {
        let Some(path) = self.path.clone() else {
            return;
        };
        let follow = self.follow_mode;
        let offset = self.scroll_offset;

        *self = Self::load(&path, language);
        self.follow_mode = follow;
        self.scroll_offset = if follow {
            self.last_line()
        } else {
            offset.min(self.last_line())
        };
    }

    /// First line to draw for a viewport of `height` lines.
    fn first_visible(&self, height: usize) -> usize {
        if self.follow_mode {
            self.lines.len().saturating_sub(height)
        } else {
            self.scroll_offset
        }
    }

    pub fn scroll_info(&self) -> String {
        if self.lines.is_empty() {
            return "0/0".to_string();
        }
        format!("{}/{}", self.scroll_offset + 1, self.lines.len())
    }
}

/// Message viewer component.
pub struct MsgViewer;

impl MsgViewer {
    /// Render the viewer as the bottom panel.
    pub fn render_panel(
        frame: &mut Frame,
        area: Rect,
        state: &MsgViewerState,
        theme: &Theme,
        is_active: bool,
    ) {
        let content_height = area.height.saturating_sub(2) as usize;

        let follow_indicator = if state.follow_mode { " [follow]" } else { "" };
        let name = state
            .path
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let title = format!(" Messages: {}{} ", name, follow_indicator);

        let content: Vec<Line> = if let Some(ref error) = state.error {
            vec![Line::from(Span::styled(
                error.clone(),
                Style::default().fg(theme.muted),
            ))]
        } else if state.lines.is_empty() {
            vec![Line::from(Span::styled(
                "(no messages yet...)",
                Style::default().fg(theme.muted),
            ))]
        } else {
            let start = state.first_visible(content_height);
            state
                .lines
                .iter()
                .skip(start)
                .take(content_height)
                .map(|line| {
                    Line::from(
                        line.iter()
                            .map(|seg| {
                                Span::styled(seg.text(&state.text), theme.class_style(seg.class))
                            })
                            .collect::<Vec<_>>(),
                    )
                })
                .collect()
        };

        let border_style = if is_active {
            Style::default().fg(theme.highlight)
        } else {
            Style::default().fg(theme.muted)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
            .title_style(Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD))
            .title_bottom(format!(" {} ", state.scroll_info()));

        frame.render_widget(Paragraph::new(content).block(block), area);

        if state.lines.len() > content_height {
            let mut scrollbar_state = ScrollbarState::new(state.lines.len())
                .position(state.first_visible(content_height));

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aview_highlight::{DisplayClass, LanguageRegistry};
    use std::fs;

    fn language() -> Language {
        LanguageRegistry::with_builtin()
            .unwrap()
            .require("adams_msg")
            .unwrap()
            .clone()
    }

    #[test]
    fn test_from_text_highlights_lines() {
        let state = MsgViewerState::from_text(
            " command: sim/dyn\nSolution converged\n".to_string(),
            &language(),
        );
        assert_eq!(state.lines.len(), 2);
        assert_eq!(state.line_text(1), Some("Solution converged"));
        assert_eq!(state.lines[1][0].class, Some(DisplayClass::Addition));
        assert_eq!(state.summary.converged, 1);
    }

    #[test]
    fn test_scrolling_and_follow() {
        let text = (0..20).map(|i| format!("line {i}\n")).collect::<String>();
        let mut state = MsgViewerState::from_text(text, &language());

        state.scroll_up();
        assert_eq!(state.scroll_offset, 0);
        state.page_down(10);
        assert_eq!(state.scroll_offset, 10);
        state.page_down(100);
        assert_eq!(state.scroll_offset, 19);

        state.toggle_follow();
        assert!(state.follow_mode);
        assert_eq!(state.first_visible(5), 15);
        state.scroll_up();
        assert!(!state.follow_mode);
        assert_eq!(state.scroll_offset, 18);
    }

    #[test]
    fn test_load_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = Utf8Path::from_path(dir.path()).unwrap();
        let lang = language();

        let missing = MsgViewerState::load(work_dir, &lang);
        assert!(missing.error.is_some());
        assert!(missing.lines.is_empty());

        let msg = work_dir.join("run.msg");
        fs::write(&msg, "one\n").unwrap();
        let mut state = MsgViewerState::load(work_dir, &lang);
        assert_eq!(state.path.as_deref(), Some(msg.as_path()));
        state.toggle_follow();

        fs::write(&msg, "one\ntwo\nsolution failed to converge\n").unwrap();
        state.reload(&lang);
        assert!(state.follow_mode);
        assert_eq!(state.scroll_offset, 2);
        assert_eq!(state.summary.failed_to_converge, 1);
    }
}

//! Color themes.

use aview_highlight::DisplayClass;
use aview_slurm::SlurmJobState;
use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown theme {0:?} (expected dark or light)")]
pub struct ThemeError(String);

const ORANGE: Color = Color::Rgb(255, 165, 0);
const DARK_ORANGE: Color = Color::Rgb(205, 102, 0);
const DARK_GOLDENROD: Color = Color::Rgb(184, 134, 11);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub foreground: Color,
    pub highlight: Color,
    pub muted: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub running: Color,
    pub pending: Color,
    pub completed: Color,
    pub timeout: Color,
    pub cancelled: Color,
    pub failed: Color,
    pub number: Color,
    pub code: Color,
    pub comment: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Color::Black,
            foreground: Color::White,
            highlight: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            running: Color::LightGreen,
            pending: Color::LightYellow,
            completed: Color::LightBlue,
            timeout: Color::LightRed,
            cancelled: Color::Gray,
            failed: ORANGE,
            number: Color::LightCyan,
            code: Color::Yellow,
            comment: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Color::White,
            foreground: Color::Black,
            highlight: Color::Blue,
            muted: Color::Gray,
            success: Color::Green,
            error: Color::Red,
            warning: DARK_GOLDENROD,
            running: Color::Green,
            pending: DARK_GOLDENROD,
            completed: Color::Blue,
            timeout: Color::Red,
            cancelled: Color::DarkGray,
            failed: DARK_ORANGE,
            number: Color::Blue,
            code: Color::Magenta,
            comment: Color::Gray,
        }
    }

    /// Row color for a job state.
    pub fn state_color(&self, state: &SlurmJobState) -> Color {
        match state {
            SlurmJobState::Running => self.running,
            SlurmJobState::Pending => self.pending,
            SlurmJobState::Completed => self.completed,
            SlurmJobState::Timeout => self.timeout,
            SlurmJobState::Cancelled { .. } => self.cancelled,
            SlurmJobState::Failed | SlurmJobState::OutOfMemory | SlurmJobState::NodeFail => {
                self.failed
            }
            SlurmJobState::Unknown(_) => self.foreground,
        }
    }

    /// Style for highlighted message text; `None` is plain text.
    pub fn class_style(&self, class: Option<DisplayClass>) -> Style {
        let plain = Style::default().fg(self.foreground);
        match class {
            None | Some(DisplayClass::Messages) | Some(DisplayClass::Commands) => plain,
            Some(DisplayClass::Numerics) => plain.fg(self.number),
            Some(DisplayClass::Strong) => plain.add_modifier(Modifier::BOLD),
            Some(DisplayClass::Comment) => plain.fg(self.comment).add_modifier(Modifier::ITALIC),
            Some(DisplayClass::Code) => plain.fg(self.code),
            Some(DisplayClass::Addition) => plain.fg(self.success),
            Some(DisplayClass::Deletion) => plain.fg(self.error),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::dark()),
            "light" => Ok(Self::light()),
            _ => Err(ThemeError(s.to_string())),
        }
    }
}

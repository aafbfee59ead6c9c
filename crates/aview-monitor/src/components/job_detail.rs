//! Job detail panel: every field of the selected job as name/value pairs.

use crate::ui::Theme;
use aview_core::{MessageStatus, MessageSummary};
use aview_grid::CellFormatter;
use aview_slurm::{Column, SacctJob};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Width of the name column, `SubmitLine` plus a space.
const NAME_WIDTH: usize = 11;

pub struct JobDetail;

impl JobDetail {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        job: Option<&SacctJob>,
        format_date: CellFormatter,
        messages: Option<&MessageSummary>,
        theme: &Theme,
    ) {
        let content = match job {
            Some(job) => build_detail_lines(job, format_date, messages, theme),
            None => vec![Line::from(Span::styled(
                "No job selected",
                Style::default().fg(theme.muted),
            ))],
        };

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.muted))
                    .title(" Job Details "),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, area);
    }
}

/// Value shown for `column`, dates passed through `format_date`.
pub fn detail_value(job: &SacctJob, column: Column, format_date: CellFormatter) -> String {
    let raw = job.cell(column);
    if column.is_date() {
        format_date(raw.as_deref()).to_string()
    } else {
        raw.unwrap_or_default()
    }
}

fn build_detail_lines(
    job: &SacctJob,
    format_date: CellFormatter,
    messages: Option<&MessageSummary>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let label = Style::default().fg(theme.muted);
    let value = Style::default().fg(theme.foreground);

    let mut lines: Vec<Line<'static>> = Column::ALL
        .iter()
        .map(|&column| {
            let style = if column == Column::State {
                Style::default()
                    .fg(theme.state_color(&job.state))
                    .add_modifier(Modifier::BOLD)
            } else {
                value
            };
            Line::from(vec![
                Span::styled(format!("{:<NAME_WIDTH$}", column.header()), label),
                Span::styled(detail_value(job, column, format_date), style),
            ])
        })
        .collect();

    let Some(summary) = messages else {
        return lines;
    };

    lines.push(Line::from(""));
    let status = summary.status();
    let color = match status {
        MessageStatus::Converged => theme.success,
        MessageStatus::Failed | MessageStatus::Errors => theme.error,
        MessageStatus::Unknown => theme.muted,
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{:<NAME_WIDTH$}", "Messages"), label),
        Span::styled(status.label(), Style::default().fg(color)),
    ]));

    // First line of each error block
    for error in &summary.errors {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<NAME_WIDTH$}", ""), label),
            Span::styled(format!("✗ {}", error), Style::default().fg(theme.error)),
        ]));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use aview_grid::{GridFunctions, CLEAN_DATE_COLUMN};
    use aview_slurm::parse_job_table;

    fn job() -> SacctJob {
        parse_job_table(
            "JobID,JobName,Start,End,State,Timelimit,NNodes,SubmitLine\n\
             101,car.slurm,2024-05-01T08:00:00,Unknown,RUNNING,02:00:00,2,sbatch car.slurm\n",
        )
        .unwrap()
        .remove(0)
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn formatter() -> CellFormatter {
        GridFunctions::with_builtin()
            .formatter(CLEAN_DATE_COLUMN)
            .unwrap()
    }

    #[test]
    fn test_detail_dates_are_normalized() {
        let job = job();
        assert_eq!(detail_value(&job, Column::Start, formatter()), "2024-05-01");
        assert_eq!(detail_value(&job, Column::End, formatter()), "");
        assert_eq!(detail_value(&job, Column::NNodes, formatter()), "2");
        assert_eq!(detail_value(&job, Column::TimeLimit, formatter()), "02:00:00");
    }

    #[test]
    fn test_detail_lines_list_every_column() {
        let lines = build_detail_lines(&job(), formatter(), None, &Theme::dark());
        assert_eq!(lines.len(), Column::ALL.len());
        assert_eq!(text(&lines[0]), "JobID      101");
        assert_eq!(text(&lines[2]), "Start      2024-05-01");
        assert!(text(&lines[9]).ends_with("sbatch car.slurm"));
    }

    #[test]
    fn test_detail_lines_show_message_errors() {
        let summary = MessageSummary {
            error_blocks: 1,
            errors: vec!["Part 12 has no mass.".to_string()],
            ..MessageSummary::default()
        };
        let lines = build_detail_lines(&job(), formatter(), Some(&summary), &Theme::dark());
        let tail: Vec<String> = lines[Column::ALL.len()..].iter().map(text).collect();
        assert_eq!(
            tail,
            vec![
                String::new(),
                "Messages   errors".to_string(),
                "           ✗ Part 12 has no mass.".to_string(),
            ]
        );
    }
}

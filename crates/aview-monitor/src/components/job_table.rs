//! Job table component.

use crate::ui::Theme;
use aview_grid::CellFormatter;
use aview_slurm::{Column, SacctJob};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

/// Columns shown in the table, in order.
pub const TABLE_COLUMNS: [Column; 8] = [
    Column::JobId,
    Column::JobName,
    Column::State,
    Column::Start,
    Column::End,
    Column::Elapsed,
    Column::NCpus,
    Column::WorkDir,
];

/// What the table title reports about the current view.
pub struct TableView<'a> {
    pub total: usize,
    pub sort: &'a str,
    pub filter: Option<String>,
}

pub struct JobTable;

impl JobTable {
    /// Render the rows at `visible` (indexes into `jobs`).
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        jobs: &[SacctJob],
        visible: &[usize],
        selected: Option<usize>,
        format_date: CellFormatter,
        view: TableView<'_>,
        theme: &Theme,
        is_active: bool,
    ) {
        let header = Row::new(TABLE_COLUMNS.iter().map(|c| Cell::from(c.header())))
            .style(Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = visible
            .iter()
            .filter_map(|&i| jobs.get(i))
            .map(|job| {
                let color = theme.state_color(&job.state);
                let cells = TABLE_COLUMNS.iter().map(|&column| {
                    let raw = job.cell(column);
                    let text = if column.is_date() {
                        format_date(raw.as_deref()).to_string()
                    } else if column == Column::State {
                        format!("{} {}", job.state.symbol(), job.state.label())
                    } else {
                        raw.unwrap_or_default()
                    };
                    Cell::from(text)
                });
                Row::new(cells).style(Style::default().fg(color))
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Min(12),
        ];

        let mut title = vec![
            Span::raw(format!(" Jobs ({}/{}) ", visible.len(), view.total)),
            Span::styled(
                format!("sort:{} ", view.sort),
                Style::default().fg(theme.muted),
            ),
        ];
        if let Some(filter) = view.filter {
            title.push(Span::styled(
                format!("filter:{} ", filter),
                Style::default().fg(theme.warning),
            ));
        }

        let border_style = if is_active {
            Style::default().fg(theme.highlight)
        } else {
            Style::default().fg(theme.muted)
        };

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(Line::from(title)),
            )
            .row_highlight_style(
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
            );

        let mut table_state = TableState::default();
        table_state.select(selected);

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

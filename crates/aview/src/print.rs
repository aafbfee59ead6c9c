//! Non-interactive output for the `highlight` and `jobs` subcommands.

use aview_cli::{DateFilterArgs, OutputFormat};
use aview_grid::{DateFilter, GridFunctions, CLEAN_DATE_COLUMN, DATE_COMPARATOR};
use aview_highlight::{
    highlight, segments, split_lines, to_html, DisplayClass, Language, LanguageRegistry,
};
use aview_monitor::components::TABLE_COLUMNS;
use aview_slurm::{load_job_table, Column, SacctJob};
use camino::Utf8Path;
use chrono::Local;
use crossterm::style::{ContentStyle, Stylize};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fmt::Write as _;
use std::fs;

/// `aview highlight FILE`
pub fn highlight_file(path: &Utf8Path, language: &str, format: OutputFormat) -> Result<()> {
    let registry = LanguageRegistry::with_builtin().into_diagnostic()?;
    let language = registry.require(language).into_diagnostic()?;
    let text = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path))?;

    tracing::debug!("Highlighting {} as {}", path, language.name);
    print!("{}", render_highlight(&text, language, format)?);
    Ok(())
}

/// `aview jobs FILE`
pub fn job_table(path: &Utf8Path, filter: &DateFilterArgs) -> Result<()> {
    let jobs = load_job_table(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to load {}", path))?;

    let functions = GridFunctions::with_builtin();
    print!(
        "{}",
        render_jobs(
            &jobs,
            filter.filter().as_ref(),
            filter.date_column.column(),
            &functions
        )
    );
    Ok(())
}

pub fn render_highlight(text: &str, language: &Language, format: OutputFormat) -> Result<String> {
    let spans = highlight(language, text);
    match format {
        OutputFormat::Html => Ok(to_html(text, &spans)),
        OutputFormat::Json => serde_json::to_string_pretty(&spans)
            .map(|json| json + "\n")
            .into_diagnostic(),
        OutputFormat::Ansi => {
            let mut out = String::with_capacity(text.len());
            for line in split_lines(text, &segments(text, &spans)) {
                for seg in line {
                    let piece = seg.text(text);
                    let written = match seg.class {
                        Some(class) => write!(out, "{}", ansi_style(class).apply(piece)),
                        None => write!(out, "{}", piece),
                    };
                    written.into_diagnostic()?;
                }
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn ansi_style(class: DisplayClass) -> ContentStyle {
    let style = ContentStyle::new();
    match class {
        DisplayClass::Messages | DisplayClass::Commands => style,
        DisplayClass::Numerics => style.cyan(),
        DisplayClass::Strong => style.bold(),
        DisplayClass::Comment => style.dark_grey().italic(),
        DisplayClass::Code => style.yellow(),
        DisplayClass::Addition => style.green(),
        DisplayClass::Deletion => style.red(),
    }
}

/// Plain-text table of the jobs passing `filter`, dates shown normalized.
pub fn render_jobs(
    jobs: &[SacctJob],
    filter: Option<&DateFilter>,
    date_column: Column,
    functions: &GridFunctions,
) -> String {
    let comparator = functions.comparator(DATE_COMPARATOR);
    if filter.is_some() && comparator.is_none() {
        tracing::warn!("No {} registered, date filter ignored", DATE_COMPARATOR);
    }
    let format_date = functions.formatter(CLEAN_DATE_COLUMN);

    let rows: Vec<Vec<String>> = jobs
        .iter()
        .filter(|job| match (filter, comparator) {
            (Some(filter), Some(comparator)) => {
                filter.matches_with(&Local, comparator, job.cell(date_column).as_deref())
            }
            _ => true,
        })
        .map(|job| {
            TABLE_COLUMNS
                .iter()
                .map(|&column| {
                    let cell = job.cell(column);
                    match format_date {
                        Some(format) if column.is_date() => format(cell.as_deref()).to_string(),
                        _ => cell.unwrap_or_default(),
                    }
                })
                .collect()
        })
        .collect();

    let headers: Vec<&str> = TABLE_COLUMNS.iter().map(|c| c.header()).collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain([header.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let mut push_row = |cells: &[&str]| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_row(&headers);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&cells);
    }
    out
}

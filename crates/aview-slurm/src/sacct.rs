//! Read job tables saved from sacct.
//!
//! The expected export is
//! `sacct -X -P --delimiter=, -o jobid,jobname%-40,start,end,...` with its
//! header line. Plain `--parsable2` output (`|` delimited) is accepted too.

use crate::types::{Column, SacctJob, SlurmJobState};
use aview_grid::NOT_A_TIME;
use aview_parsers::{column_key, non_empty_string, parse_duration, split_delimited};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;
use thiserror::Error;

/// sacct `-o` fields of the job table.
pub const JOB_TABLE_COLUMNS: &[&str] = &[
    "jobid",
    "jobname%-40",
    "start",
    "end",
    "Elapsed",
    "state",
    "timelimit",
    "nnodes",
    "ncpus",
    "submitline%-70",
    "workdir%-70",
];

/// The `sacct` invocation that writes a complete job table.
pub fn sacct_command() -> String {
    format!("sacct -X -P --delimiter=, -o {}", JOB_TABLE_COLUMNS.join(","))
}

#[derive(Error, Debug)]
pub enum JobTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Job table has no header line")]
    Empty,
    #[error(
        "Job table is missing the {0} column (export it with `{cmd}`)",
        cmd = sacct_command()
    )]
    MissingColumn(&'static str),
}

/// Load and parse a job table file.
pub fn load_job_table(path: &Utf8Path) -> Result<Vec<SacctJob>, JobTableError> {
    let content = fs::read_to_string(path)?;
    parse_job_table(&content)
}

/// Parse a job table export, newest job first.
///
/// Rows with too few fields are skipped with a warning.
pub fn parse_job_table(content: &str) -> Result<Vec<SacctJob>, JobTableError> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or(JobTableError::Empty)?;
    let delimiter = if header.contains(',') { ',' } else { '|' };

    let mut index: HashMap<Column, usize> = HashMap::new();
    let header_fields: Vec<&str> = header.split(delimiter).collect();
    for (i, name) in header_fields.iter().enumerate() {
        if let Some(column) = Column::from_key(&column_key(name)) {
            index.entry(column).or_insert(i);
        }
    }
    for required in [Column::JobId, Column::State] {
        if !index.contains_key(&required) {
            return Err(JobTableError::MissingColumn(required.header()));
        }
    }

    let mut jobs = Vec::new();
    for line in lines {
        match split_row(line, delimiter, header_fields.len(), &index) {
            Ok(fields) => jobs.push(parse_row(&fields, &index)),
            Err(e) => tracing::warn!("Skipping job table row: {}", e),
        }
    }

    jobs.sort_by(|a, b| {
        job_id_key(&b.job_id)
            .cmp(&job_id_key(&a.job_id))
            .then_with(|| b.job_id.cmp(&a.job_id))
    });
    Ok(jobs)
}

/// Split a row, folding surplus fields back into the submit line.
///
/// Submit lines often contain the delimiter themselves.
fn split_row(
    line: &str,
    delimiter: char,
    width: usize,
    index: &HashMap<Column, usize>,
) -> Result<Vec<String>, String> {
    let fields = split_delimited(line, delimiter, width)?;
    let surplus = fields.len() - width;
    if surplus == 0 {
        return Ok(fields.into_iter().map(String::from).collect());
    }

    let Some(&submit) = index.get(&Column::SubmitLine) else {
        return Err(format!(
            "Expected {} fields, got {}: {}",
            width,
            fields.len(),
            line
        ));
    };

    let mut merged: Vec<String> = fields[..submit].iter().map(|f| f.to_string()).collect();
    merged.push(fields[submit..=submit + surplus].join(&delimiter.to_string()));
    merged.extend(fields[submit + surplus + 1..].iter().map(|f| f.to_string()));
    Ok(merged)
}

fn parse_row(fields: &[String], index: &HashMap<Column, usize>) -> SacctJob {
    let field = |column: Column| {
        index
            .get(&column)
            .and_then(|&i| fields.get(i))
            .map(|f| f.trim())
            .unwrap_or("")
    };

    let elapsed = match field(Column::Elapsed) {
        "Unknown" => "00:00:00",
        other => other,
    };

    SacctJob {
        job_id: field(Column::JobId).to_string(),
        name: field(Column::JobName).replace(".slurm", ""),
        start: date_cell(field(Column::Start)),
        end: date_cell(field(Column::End)),
        elapsed: parse_duration(elapsed),
        state: SlurmJobState::parse(field(Column::State)),
        time_limit: parse_duration(field(Column::TimeLimit)),
        nodes: field(Column::NNodes).parse().ok(),
        cpus: field(Column::NCpus).parse().ok(),
        submit_line: non_empty_string(field(Column::SubmitLine)),
        work_dir: non_empty_string(field(Column::WorkDir)).map(Utf8PathBuf::from),
    }
}

/// Map sacct's placeholders for a missing time onto the not-a-time marker.
fn date_cell(raw: &str) -> String {
    match raw {
        "" | "Unknown" | "None" | "N/A" => NOT_A_TIME.to_string(),
        other => other.to_string(),
    }
}

/// Numeric sort key for job ids: `123_4` sorts as (123, 4).
fn job_id_key(job_id: &str) -> (u64, u64) {
    let (base, task) = job_id.split_once('_').unwrap_or((job_id, "0"));
    let leading = |s: &str| -> u64 {
        s.chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0)
    };
    (leading(base), leading(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const TABLE: &str = "\
JobID,JobName,Start,End,Elapsed,State,Timelimit,NNodes,NCPUS,SubmitLine,WorkDir
101,car_ride.slurm,2024-05-01T08:00:00,2024-05-01T09:30:00,01:30:00,COMPLETED,02:00:00,1,4,sbatch car_ride.slurm,/scratch/u/car
103,bump.slurm,2024-05-02T10:00:00,Unknown,Unknown,RUNNING,1-00:00:00,1,8,sbatch bump.slurm,/scratch/u/bump
102,wheel.slurm,Unknown,Unknown,00:00:00,PENDING,UNLIMITED,1,2,,
";

    #[test]
    fn test_parse_job_table() {
        let jobs = parse_job_table(TABLE).unwrap();
        assert_eq!(jobs.len(), 3);

        // Newest first
        let ids: Vec<&str> = jobs.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["103", "102", "101"]);

        let car = &jobs[2];
        assert_eq!(car.name, "car_ride");
        assert_eq!(car.start, "2024-05-01T08:00:00");
        assert_eq!(car.elapsed, Some(Duration::from_secs(5400)));
        assert_eq!(car.state, SlurmJobState::Completed);
        assert_eq!(car.cpus, Some(4));
        assert_eq!(car.work_dir.as_deref(), Some(Utf8Path::new("/scratch/u/car")));
    }

    #[test]
    fn test_placeholder_cleanups() {
        let jobs = parse_job_table(TABLE).unwrap();
        let bump = &jobs[0];
        assert_eq!(bump.end, NOT_A_TIME);
        assert_eq!(bump.elapsed, Some(Duration::ZERO));
        assert_eq!(bump.time_limit, Some(Duration::from_secs(86400)));

        let wheel = &jobs[1];
        assert_eq!(wheel.start, NOT_A_TIME);
        assert_eq!(wheel.time_limit, None);
        assert_eq!(wheel.submit_line, None);
        assert_eq!(wheel.work_dir, None);
    }

    #[test]
    fn test_submit_line_with_delimiter() {
        let table = "jobid,jobname%-40,state,submitline%-70,workdir%-70\n\
                     7,a.slurm,FAILED,sbatch --export=A=1,B=2 a.slurm,/w\n";
        let jobs = parse_job_table(table).unwrap();
        assert_eq!(
            jobs[0].submit_line.as_deref(),
            Some("sbatch --export=A=1,B=2 a.slurm")
        );
        assert_eq!(jobs[0].work_dir.as_deref(), Some(Utf8Path::new("/w")));
        assert_eq!(jobs[0].start, NOT_A_TIME);
    }

    #[test]
    fn test_pipe_delimited_and_short_rows() {
        let table = "JobID|State|Start\n5|RUNNING|2024-05-01T00:00:00\n6|PENDING\n";
        let jobs = parse_job_table(table).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, "5");
    }

    #[test]
    fn test_missing_columns() {
        assert!(matches!(parse_job_table(""), Err(JobTableError::Empty)));
        assert!(matches!(
            parse_job_table("JobName,Start\n"),
            Err(JobTableError::MissingColumn("JobID"))
        ));
    }

    #[test]
    fn test_array_job_ids_sort_numerically() {
        assert!(job_id_key("99") < job_id_key("100"));
        assert!(job_id_key("100_2") < job_id_key("100_10"));
        assert_eq!(job_id_key("abc"), (0, 0));
    }

    #[test]
    fn test_load_job_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();
        let path = Utf8Path::from_path(file.path()).unwrap();
        assert_eq!(load_job_table(path).unwrap().len(), 3);
        assert!(matches!(
            load_job_table(Utf8Path::new("/nonexistent/jobs.csv")),
            Err(JobTableError::Io(_))
        ));
    }

    #[test]
    fn test_missing_column_names_export_command() {
        let err = parse_job_table("JobName,State\ncar,RUNNING\n").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Job table is missing the JobID column"));
        assert!(message.contains("-o jobid,jobname%-40,start,end,Elapsed,state"));
    }

    #[test]
    fn test_job_table_columns_are_known() {
        for name in JOB_TABLE_COLUMNS {
            assert!(Column::from_key(&column_key(name)).is_some(), "{name}");
        }
    }
}

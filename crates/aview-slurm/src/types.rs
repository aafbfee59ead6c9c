//! SLURM job types.

use aview_parsers::format_duration;
use camino::Utf8PathBuf;
use std::time::Duration;

/// SLURM job state from sacct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlurmJobState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled { by: Option<String> },
    Timeout,
    OutOfMemory,
    NodeFail,
    Unknown(String),
}

impl SlurmJobState {
    /// Parse a sacct state string (e.g. "CANCELLED by 12345").
    pub fn parse(state: &str) -> Self {
        let mut words = state.split_whitespace();
        let base = words.next().unwrap_or("");

        match base.to_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELLED" => {
                let by = match (words.next(), words.next()) {
                    (Some("by"), Some(who)) => Some(who.to_string()),
                    _ => None,
                };
                Self::Cancelled { by }
            }
            "TIMEOUT" => Self::Timeout,
            "OUT_OF_MEMORY" => Self::OutOfMemory,
            "NODE_FAIL" => Self::NodeFail,
            _ => Self::Unknown(state.trim().to_string()),
        }
    }

    /// State as sacct prints it.
    pub fn label(&self) -> String {
        match self {
            Self::Pending => "PENDING".to_string(),
            Self::Running => "RUNNING".to_string(),
            Self::Completed => "COMPLETED".to_string(),
            Self::Failed => "FAILED".to_string(),
            Self::Cancelled { by: Some(who) } => format!("CANCELLED by {}", who),
            Self::Cancelled { by: None } => "CANCELLED".to_string(),
            Self::Timeout => "TIMEOUT".to_string(),
            Self::OutOfMemory => "OUT_OF_MEMORY".to_string(),
            Self::NodeFail => "NODE_FAIL".to_string(),
            Self::Unknown(state) => state.clone(),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Pending => "○",
            Self::Running => "●",
            Self::Completed => "✓",
            Self::Failed | Self::OutOfMemory | Self::NodeFail => "✗",
            Self::Timeout => "⧗",
            Self::Cancelled { .. } => "⊘",
            Self::Unknown(_) => "?",
        }
    }
}

/// Columns of the job table export, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    JobId,
    JobName,
    Start,
    End,
    Elapsed,
    State,
    TimeLimit,
    NNodes,
    NCpus,
    SubmitLine,
    WorkDir,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::JobId,
        Column::JobName,
        Column::Start,
        Column::End,
        Column::Elapsed,
        Column::State,
        Column::TimeLimit,
        Column::NNodes,
        Column::NCpus,
        Column::SubmitLine,
        Column::WorkDir,
    ];

    /// Lowercase sacct field name.
    pub fn key(&self) -> &'static str {
        match self {
            Self::JobId => "jobid",
            Self::JobName => "jobname",
            Self::Start => "start",
            Self::End => "end",
            Self::Elapsed => "elapsed",
            Self::State => "state",
            Self::TimeLimit => "timelimit",
            Self::NNodes => "nnodes",
            Self::NCpus => "ncpus",
            Self::SubmitLine => "submitline",
            Self::WorkDir => "workdir",
        }
    }

    /// Header as sacct prints it.
    pub fn header(&self) -> &'static str {
        match self {
            Self::JobId => "JobID",
            Self::JobName => "JobName",
            Self::Start => "Start",
            Self::End => "End",
            Self::Elapsed => "Elapsed",
            Self::State => "State",
            Self::TimeLimit => "Timelimit",
            Self::NNodes => "NNodes",
            Self::NCpus => "NCPUS",
            Self::SubmitLine => "SubmitLine",
            Self::WorkDir => "WorkDir",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Columns holding timestamps, shown and filtered as dates.
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }
}

/// One row of the job table.
#[derive(Debug, Clone, PartialEq)]
pub struct SacctJob {
    /// SLURM job ID (array jobs look like `123_4`)
    pub job_id: String,

    /// Job name without the `.slurm` script suffix
    pub name: String,

    /// Raw start cell (`NaT` when unknown)
    pub start: String,

    /// Raw end cell (`NaT` when unknown)
    pub end: String,

    pub elapsed: Option<Duration>,

    pub state: SlurmJobState,

    pub time_limit: Option<Duration>,

    pub nodes: Option<u32>,

    pub cpus: Option<u32>,

    /// Command line used to submit the job
    pub submit_line: Option<String>,

    /// Working directory, where the solver writes its message file
    pub work_dir: Option<Utf8PathBuf>,
}

impl SacctJob {
    /// Raw cell text for `column`.
    pub fn cell(&self, column: Column) -> Option<String> {
        match column {
            Column::JobId => Some(self.job_id.clone()),
            Column::JobName => Some(self.name.clone()),
            Column::Start => Some(self.start.clone()),
            Column::End => Some(self.end.clone()),
            Column::Elapsed => self.elapsed.map(format_duration),
            Column::State => Some(self.state.label()),
            Column::TimeLimit => self.time_limit.map(format_duration),
            Column::NNodes => self.nodes.map(|n| n.to_string()),
            Column::NCpus => self.cpus.map(|n| n.to_string()),
            Column::SubmitLine => self.submit_line.clone(),
            Column::WorkDir => self.work_dir.as_ref().map(|p| p.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert_eq!(SlurmJobState::parse("RUNNING"), SlurmJobState::Running);
        assert_eq!(SlurmJobState::parse("completed"), SlurmJobState::Completed);
        assert_eq!(
            SlurmJobState::parse("CANCELLED by 12345"),
            SlurmJobState::Cancelled {
                by: Some("12345".to_string())
            }
        );
        assert_eq!(
            SlurmJobState::parse("CANCELLED"),
            SlurmJobState::Cancelled { by: None }
        );
        assert_eq!(SlurmJobState::parse("NODE_FAIL"), SlurmJobState::NodeFail);
        assert_eq!(
            SlurmJobState::parse("REQUEUED"),
            SlurmJobState::Unknown("REQUEUED".to_string())
        );
    }

    #[test]
    fn test_state_label_round_trips_cancelled_by() {
        let state = SlurmJobState::parse("CANCELLED by 12345");
        assert_eq!(state.label(), "CANCELLED by 12345");
    }

    #[test]
    fn test_column_keys() {
        for column in Column::ALL {
            assert_eq!(Column::from_key(column.key()), Some(column));
        }
        assert!(Column::Start.is_date());
        assert!(!Column::Elapsed.is_date());
        assert_eq!(Column::from_key("partition"), None);
    }
}

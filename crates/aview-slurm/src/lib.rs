//! SLURM job tables for aview.
//!
//! Read jobs from a saved `sacct` export.

pub mod sacct;
pub mod types;

pub use sacct::{
    load_job_table, parse_job_table, sacct_command, JobTableError, JOB_TABLE_COLUMNS,
};
pub use types::{Column, SacctJob, SlurmJobState};

//! Solver message files for aview.
//!
//! This crate finds the `.msg` file a job writes in its working directory
//! and summarizes what the solver reported.

pub mod messages;

pub use messages::{
    find_latest_message_file, is_message_file, load_message_file, same_path, MessageError,
    MessageStatus, MessageSummary, MESSAGE_EXTENSION,
};

//! TUI components.

pub mod footer;
pub mod header;
pub mod job_detail;
pub mod job_table;
pub mod msg_viewer;

pub use footer::Footer;
pub use header::Header;
pub use job_detail::JobDetail;
pub use job_table::{JobTable, TableView, TABLE_COLUMNS};
pub use msg_viewer::{MsgViewer, MsgViewerState};

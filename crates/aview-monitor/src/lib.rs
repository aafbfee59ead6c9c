//! Terminal UI for browsing sacct job tables and solver messages.

pub mod app;
pub mod components;
pub mod ui;

pub use app::{ActivePanel, App, SortMode};
pub use ui::{Theme, ThemeError};

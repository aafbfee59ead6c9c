//! Syntax highlighting for solver message logs.
//!
//! Languages are declared as rule tables by provider functions and
//! registered once into a [`LanguageRegistry`]. The [`highlight`] engine
//! turns a document into classified spans that renderers consume.

pub mod capabilities;
pub mod error;
pub mod grammar;
pub mod highlighter;
pub mod languages;
pub mod registry;
pub mod render;

pub use capabilities::Capabilities;
pub use error::HighlightError;
pub use grammar::{DisplayClass, Language, Pattern, PatternMatch, Rule, BODY_GROUP};
pub use highlighter::{highlight, segments, split_lines, HighlightSpan, Segment};
pub use registry::{LanguageProvider, LanguageRegistry};
pub use render::to_html;

//! Built-in languages.

pub mod adams_msg;

use crate::registry::LanguageProvider;

/// Languages registered by
/// [`LanguageRegistry::with_builtin`](crate::LanguageRegistry::with_builtin).
pub const BUILTIN: &[(&str, LanguageProvider)] = &[(adams_msg::ID, adams_msg::adams_msg)];

//! Language registry populated once at startup.

use crate::capabilities::Capabilities;
use crate::error::HighlightError;
use crate::grammar::Language;
use crate::languages;
use std::collections::HashMap;

/// A language provider builds its rule table from the engine's capabilities.
pub type LanguageProvider = fn(&Capabilities) -> Result<Language, HighlightError>;

/// Registered languages, looked up by id or alias (case-insensitive).
///
/// Populate it with [`LanguageRegistry::register`] during startup, then share
/// it by reference; lookups never mutate it.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    capabilities: Capabilities,
    languages: Vec<(String, Language)>,
    index: HashMap<String, usize>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in language.
    pub fn with_builtin() -> Result<Self, HighlightError> {
        let mut registry = Self::new();
        for (id, provider) in languages::BUILTIN {
            registry.register(id, *provider)?;
        }
        Ok(registry)
    }

    /// Build a language with `provider` and register it under `id` and its aliases.
    pub fn register(&mut self, id: &str, provider: LanguageProvider) -> Result<(), HighlightError> {
        let language = provider(&self.capabilities)?;

        let mut names: Vec<String> = std::iter::once(id)
            .chain(language.aliases.iter().map(String::as_str))
            .map(str::to_lowercase)
            .collect();
        names.sort();
        names.dedup();

        if let Some(taken) = names.iter().find(|name| self.index.contains_key(*name)) {
            return Err(HighlightError::DuplicateName(taken.clone()));
        }

        let slot = self.languages.len();
        for name in names {
            self.index.insert(name, slot);
        }
        tracing::debug!(
            "Registered language {} ({} aliases, {} rules)",
            id,
            language.aliases.len(),
            language.rules.len()
        );
        self.languages.push((id.to_string(), language));
        Ok(())
    }

    /// Look up a language by id or alias.
    pub fn get(&self, name: &str) -> Option<&Language> {
        self.index
            .get(&name.to_lowercase())
            .map(|&slot| &self.languages[slot].1)
    }

    /// Like [`get`](Self::get), but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<&Language, HighlightError> {
        self.get(name)
            .ok_or_else(|| HighlightError::UnknownLanguage {
                name: name.to_string(),
                known: self.ids().collect::<Vec<_>>().join(", "),
            })
    }

    /// Primary ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{DisplayClass, Rule};

    fn plain(caps: &Capabilities) -> Result<Language, HighlightError> {
        Ok(Language::new("Plain")
            .aliases(["txt"])
            .rule(Rule::new(DisplayClass::Numerics).begin(caps.pattern(r"\d+")?)))
    }

    fn broken(caps: &Capabilities) -> Result<Language, HighlightError> {
        Ok(Language::new("Broken").rule(Rule::new(DisplayClass::Code).begin(caps.pattern("[")?)))
    }

    #[test]
    fn test_builtin_aliases() {
        let registry = LanguageRegistry::with_builtin().unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["adams_msg"]);
        assert_eq!(registry.get("adams_msg").unwrap().name, "Adams msg");
        assert_eq!(registry.get("msg").unwrap().name, "Adams msg");
        assert_eq!(registry.get("MSG").unwrap().name, "Adams msg");
        assert!(registry.get("python").is_none());
    }

    #[test]
    fn test_require_unknown() {
        let registry = LanguageRegistry::new();
        assert!(matches!(
            registry.require("msg"),
            Err(HighlightError::UnknownLanguage { name, .. }) if name == "msg"
        ));

        let registry = LanguageRegistry::with_builtin().unwrap();
        let err = registry.require("python").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown language: python (known: adams_msg)"
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = LanguageRegistry::with_builtin().unwrap();
        registry.register("plain", plain).unwrap();
        assert!(registry.get("txt").is_some());

        let err = registry.register("msg", plain).unwrap_err();
        assert!(matches!(err, HighlightError::DuplicateName(name) if name == "msg"));
        assert_eq!(registry.ids().count(), 2);
    }

    #[test]
    fn test_provider_error_propagates() {
        let mut registry = LanguageRegistry::new();
        assert!(matches!(
            registry.register("broken", broken),
            Err(HighlightError::InvalidPattern { .. })
        ));
        assert!(registry.get("broken").is_none());
    }
}

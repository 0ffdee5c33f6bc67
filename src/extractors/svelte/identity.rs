// Story identity resolution
//
// Names must be unique per document. Ids are either explicit (used verbatim)
// or derived from the name; a derived id that collides with an earlier
// generated id gets a hash suffix and a warning.

use std::collections::HashSet;
use tracing::warn;

use crate::error::{ExtractError, Result};
use crate::extractors::base::{ExtractionWarning, IdHash};
use crate::utils::derive_id;
use crate::utils::naming::id_suffix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: String,
    pub warning: Option<ExtractionWarning>,
}

/// Per-traversal identity sets
#[derive(Debug)]
pub struct IdentityRegistry {
    filename: String,
    names: HashSet<String>,
    export_names: HashSet<String>,
    generated_ids: HashSet<String>,
    explicit_ids: HashSet<String>,
    id_hash: IdHash,
    unify_id_sets: bool,
}

impl IdentityRegistry {
    pub fn new(filename: impl Into<String>, id_hash: IdHash, unify_id_sets: bool) -> Self {
        Self {
            filename: filename.into(),
            names: HashSet::new(),
            export_names: HashSet::new(),
            generated_ids: HashSet::new(),
            explicit_ids: HashSet::new(),
            id_hash,
            unify_id_sets,
        }
    }

    /// Reserve a story name; a second story with the same name is fatal
    pub fn claim_name(&mut self, name: &str) -> Result<()> {
        if !self.names.insert(name.to_string()) {
            return Err(ExtractError::DuplicateStoryName {
                filename: self.filename.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn claim_export_name(&mut self, export_name: &str) -> Result<()> {
        if !self.export_names.insert(export_name.to_string()) {
            return Err(ExtractError::DuplicateExportName {
                filename: self.filename.clone(),
                export_name: export_name.to_string(),
            });
        }
        Ok(())
    }

    pub fn resolve_id(&mut self, name: &str, explicit: Option<&str>) -> ResolvedId {
        if let Some(id) = explicit {
            self.explicit_ids.insert(id.to_string());
            return ResolvedId {
                id: id.to_string(),
                warning: None,
            };
        }

        let derived = derive_id(name);
        let collides = self.generated_ids.contains(&derived)
            || (self.unify_id_sets && self.explicit_ids.contains(&derived));
        if !collides {
            self.generated_ids.insert(derived.clone());
            return ResolvedId {
                id: derived,
                warning: None,
            };
        }

        let assigned = format!("{}{}", derived, id_suffix(name, self.id_hash));
        warn!(
            "Story name conflict with exports in '{}': '{}' derives id '{}', using '{}'",
            self.filename, name, derived, assigned
        );
        self.generated_ids.insert(assigned.clone());
        ResolvedId {
            warning: Some(ExtractionWarning::IdCollision {
                filename: self.filename.clone(),
                name: name.to_string(),
                derived_id: derived,
                assigned_id: assigned.clone(),
            }),
            id: assigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_is_fatal() {
        let mut registry = IdentityRegistry::new("a.svelte", IdHash::Fold, false);
        registry.claim_name("Default").unwrap();
        registry.claim_name("default").unwrap();
        assert_eq!(
            registry.claim_name("Default").unwrap_err(),
            ExtractError::DuplicateStoryName {
                filename: "a.svelte".to_string(),
                name: "Default".to_string(),
            }
        );
    }

    #[test]
    fn test_colliding_generated_id_gets_suffix() {
        let mut registry = IdentityRegistry::new("a.svelte", IdHash::Fold, false);
        let first = registry.resolve_id("Primary CTA!!", None);
        let second = registry.resolve_id("Primary CTA??", None);

        assert_eq!(first.id, "PrimaryCTA");
        assert!(first.warning.is_none());
        assert_eq!(second.id, "PrimaryCTA496765ee");
        assert_eq!(
            second.warning,
            Some(ExtractionWarning::IdCollision {
                filename: "a.svelte".to_string(),
                name: "Primary CTA??".to_string(),
                derived_id: "PrimaryCTA".to_string(),
                assigned_id: "PrimaryCTA496765ee".to_string(),
            })
        );
    }

    #[test]
    fn test_explicit_ids_are_never_suffixed_or_checked() {
        let mut registry = IdentityRegistry::new("a.svelte", IdHash::Fold, false);
        assert_eq!(registry.resolve_id("One", Some("same")).id, "same");
        assert_eq!(registry.resolve_id("Two", Some("same")).id, "same");
        // Derived id equal to an explicit one passes unchecked by default
        let derived = registry.resolve_id("same", None);
        assert_eq!(derived.id, "same");
        assert!(derived.warning.is_none());
    }

    #[test]
    fn test_unified_sets_check_explicit_ids() {
        let mut registry = IdentityRegistry::new("a.svelte", IdHash::Fold, true);
        registry.resolve_id("One", Some("Default"));
        let derived = registry.resolve_id("Default", None);
        assert_eq!(derived.id, "Default40b391df");
        assert!(derived.warning.is_some());
    }

    #[test]
    fn test_duplicate_export_name_is_fatal() {
        let mut registry = IdentityRegistry::new("a.svelte", IdHash::Fold, false);
        registry.claim_export_name("primary").unwrap();
        assert!(matches!(
            registry.claim_export_name("primary"),
            Err(ExtractError::DuplicateExportName { .. })
        ));
    }
}

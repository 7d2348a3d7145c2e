//! Shared shape of the two catalogue records (departments and job roles).

use serde::{Deserialize, Serialize};

use dreamteam_core::{DomainError, DomainResult, Entity};

/// Maximum length of a catalogue name.
pub const MAX_NAME_LEN: usize = 60;

/// Maximum length of a catalogue description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Name + description as submitted by an admin, before it gets an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Trim surrounding whitespace and check the field rules.
    pub fn normalized(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        let description = self.description.trim().to_string();

        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::validation(format!(
                "description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }

        Ok(Self { name, description })
    }
}

/// A record built from a [`CatalogEntry`] (departments, job roles).
///
/// Lets storage backends share one code path for both tables.
pub trait Catalogued: Entity + Clone + Send + Sync + 'static {
    fn build(id: Self::Id, entry: CatalogEntry) -> Self;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn replace(&mut self, entry: CatalogEntry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_fields() {
        let entry = CatalogEntry::new("  IT ", " The IT Department ").normalized().unwrap();
        assert_eq!(entry.name, "IT");
        assert_eq!(entry.description, "The IT Department");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = CatalogEntry::new("   ", "anything").normalized().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_description_is_allowed() {
        assert!(CatalogEntry::new("CEO", "").normalized().is_ok());
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(CatalogEntry::new(name, "").normalized().is_err());
    }
}

//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync + 'static;

    /// Kind tag used for counting and logging.
    const KIND: EntityKind;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// The record kinds held by the entity store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Employee,
    Department,
    Role,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::Department => "department",
            EntityKind::Role => "role",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

use serde::{Deserialize, Serialize};

use dreamteam_core::{Entity, EntityKind, RoleId};

use crate::catalog::{CatalogEntry, Catalogued};

/// A job role (e.g. "CEO").
///
/// Unrelated to the authorization level of an employee, which is the
/// `is_admin` flag surfaced as `dreamteam_auth::AccessLevel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
}

impl Entity for Role {
    type Id = RoleId;
    const KIND: EntityKind = EntityKind::Role;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Catalogued for Role {
    fn build(id: RoleId, entry: CatalogEntry) -> Self {
        Self {
            id,
            name: entry.name,
            description: entry.description,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn replace(&mut self, entry: CatalogEntry) {
        self.name = entry.name;
        self.description = entry.description;
    }
}

use serde::{Deserialize, Serialize};

use dreamteam_core::{DepartmentId, Entity, EntityKind};

use crate::catalog::{CatalogEntry, Catalogued};

/// A department employees can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub description: String,
}

impl Entity for Department {
    type Id = DepartmentId;
    const KIND: EntityKind = EntityKind::Department;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Catalogued for Department {
    fn build(id: DepartmentId, entry: CatalogEntry) -> Self {
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

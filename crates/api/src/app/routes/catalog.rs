//! Department and job role pages.
//!
//! Both catalogues share one set of generic handlers; [`CatalogResource`]
//! binds a record type to its store calls and labels.

use axum::{
    Form,
    extract::{Extension, Path},
    response::{Html, IntoResponse, Response},
};

use dreamteam_core::{DepartmentId, RoleId};
use dreamteam_directory::{CatalogEntry, Catalogued, Department, Employee, Role};
use dreamteam_infra::{EntityStore, StoreResult};

use crate::app::{
    dto,
    endpoints::Endpoint,
    errors::PageError,
    pages::{self, CatalogLabels, CatalogRow},
    routes::form_rejection,
};
use crate::authz::found;
use crate::context::{AppContext, Identity};

#[axum::async_trait]
pub trait CatalogResource: Catalogued {
    const LABELS: CatalogLabels;

    fn parse_id(raw: &str) -> Option<Self::Id>;

    fn id_string(&self) -> String;

    /// Employees currently placed in this record.
    fn holders(&self, employees: &[Employee]) -> usize;

    async fn list(store: &dyn EntityStore) -> StoreResult<Vec<Self>>;

    async fn create(store: &dyn EntityStore, entry: CatalogEntry) -> StoreResult<Self>;

    async fn get(store: &dyn EntityStore, id: Self::Id) -> StoreResult<Self>;

    async fn update(store: &dyn EntityStore, id: Self::Id, entry: CatalogEntry) -> StoreResult<Self>;

    async fn delete(store: &dyn EntityStore, id: Self::Id) -> StoreResult<()>;
}

#[axum::async_trait]
impl CatalogResource for Department {
    const LABELS: CatalogLabels = CatalogLabels {
        singular: "Department",
        plural: "Departments",
        list: Endpoint::ListDepartments,
        add: Endpoint::AddDepartment,
        edit: Endpoint::EditDepartment,
        delete: Endpoint::DeleteDepartment,
    };

    fn parse_id(raw: &str) -> Option<DepartmentId> {
        raw.parse().ok()
    }

    fn id_string(&self) -> String {
        self.id.to_string()
    }

    fn holders(&self, employees: &[Employee]) -> usize {
        employees.iter().filter(|e| e.department_id == Some(self.id)).count()
    }

    async fn list(store: &dyn EntityStore) -> StoreResult<Vec<Self>> {
        store.list_departments().await
    }

    async fn create(store: &dyn EntityStore, entry: CatalogEntry) -> StoreResult<Self> {
        store.create_department(entry).await
    }

    async fn get(store: &dyn EntityStore, id: DepartmentId) -> StoreResult<Self> {
        store.get_department(id).await
    }

    async fn update(store: &dyn EntityStore, id: DepartmentId, entry: CatalogEntry) -> StoreResult<Self> {
        store.update_department(id, entry).await
    }

    async fn delete(store: &dyn EntityStore, id: DepartmentId) -> StoreResult<()> {
        store.delete_department(id).await
    }
}

#[axum::async_trait]
impl CatalogResource for Role {
    const LABELS: CatalogLabels = CatalogLabels {
        singular: "Role",
        plural: "Roles",
        list: Endpoint::ListRoles,
        add: Endpoint::AddRole,
        edit: Endpoint::EditRole,
        delete: Endpoint::DeleteRole,
    };

    fn parse_id(raw: &str) -> Option<RoleId> {
        raw.parse().ok()
    }

    fn id_string(&self) -> String {
        self.id.to_string()
    }

    fn holders(&self, employees: &[Employee]) -> usize {
        employees.iter().filter(|e| e.role_id == Some(self.id)).count()
    }

    async fn list(store: &dyn EntityStore) -> StoreResult<Vec<Self>> {
        store.list_roles().await
    }

    async fn create(store: &dyn EntityStore, entry: CatalogEntry) -> StoreResult<Self> {
        store.create_role(entry).await
    }

    async fn get(store: &dyn EntityStore, id: RoleId) -> StoreResult<Self> {
        store.get_role(id).await
    }

    async fn update(store: &dyn EntityStore, id: RoleId, entry: CatalogEntry) -> StoreResult<Self> {
        store.update_role(id, entry).await
    }

    async fn delete(store: &dyn EntityStore, id: RoleId) -> StoreResult<()> {
        store.delete_role(id).await
    }
}

/// Unparseable ids cannot name a record.
fn record_id<R: CatalogResource>(raw: &str) -> Result<R::Id, PageError> {
    R::parse_id(raw).ok_or(PageError::NotFound)
}

pub async fn list<R: CatalogResource>(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
) -> Result<Html<String>, PageError> {
    let records = R::list(ctx.store.as_ref()).await?;
    let employees = ctx.store.list_employees().await?;
    let rows: Vec<CatalogRow<'_>> = records
        .iter()
        .map(|record| CatalogRow {
            id: record.id_string(),
            name: record.name(),
            description: record.description(),
            holders: record.holders(&employees),
        })
        .collect();
    Ok(Html(pages::catalog_list(&identity, &R::LABELS, &rows)))
}

pub async fn add_form<R: CatalogResource>(identity: Identity) -> Html<String> {
    let labels = R::LABELS;
    Html(pages::catalog_form(&identity, &labels, labels.add.path(), "", "", None))
}

pub async fn add<R: CatalogResource>(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
    Form(form): Form<dto::CatalogForm>,
) -> Result<Response, PageError> {
    let labels = R::LABELS;
    let entry = CatalogEntry::new(form.name.as_str(), form.description.as_str());
    match R::create(ctx.store.as_ref(), entry).await {
        Ok(record) => {
            tracing::info!(kind = %R::KIND, name = %record.name(), "catalogue record added");
            Ok(found(labels.list.path()))
        }
        Err(err) => {
            let (status, message) = form_rejection(err)?;
            let html = pages::catalog_form(
                &identity,
                &labels,
                labels.add.path(),
                &form.name,
                &form.description,
                Some(&message),
            );
            Ok((status, Html(html)).into_response())
        }
    }
}

pub async fn edit_form<R: CatalogResource>(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let labels = R::LABELS;
    let record = R::get(ctx.store.as_ref(), record_id::<R>(&raw_id)?).await?;
    Ok(Html(pages::catalog_form(
        &identity,
        &labels,
        &labels.edit.with_id(&raw_id),
        record.name(),
        record.description(),
        None,
    )))
}

pub async fn edit<R: CatalogResource>(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
    Path(raw_id): Path<String>,
    Form(form): Form<dto::CatalogForm>,
) -> Result<Response, PageError> {
    let labels = R::LABELS;
    let id = record_id::<R>(&raw_id)?;
    let entry = CatalogEntry::new(form.name.as_str(), form.description.as_str());
    match R::update(ctx.store.as_ref(), id, entry).await {
        Ok(record) => {
            tracing::info!(kind = %R::KIND, name = %record.name(), "catalogue record edited");
            Ok(found(labels.list.path()))
        }
        Err(err) => {
            let (status, message) = form_rejection(err)?;
            let html = pages::catalog_form(
                &identity,
                &labels,
                &labels.edit.with_id(&raw_id),
                &form.name,
                &form.description,
                Some(&message),
            );
            Ok((status, Html(html)).into_response())
        }
    }
}

pub async fn delete<R: CatalogResource>(
    Extension(ctx): Extension<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Response, PageError> {
    let id = record_id::<R>(&raw_id)?;
    R::delete(ctx.store.as_ref(), id).await?;
    tracing::info!(kind = %R::KIND, id = %raw_id, "catalogue record deleted");
    Ok(found(R::LABELS.list.path()))
}

#[cfg(test)]
mod tests {
    use dreamteam_core::EntityKind;
    use dreamteam_infra::InMemoryEntityStore;

    use super::*;

    #[test]
    fn bad_ids_are_not_found() {
        assert_eq!(record_id::<Department>("42").unwrap_err(), PageError::NotFound);
        let id = DepartmentId::new();
        assert_eq!(record_id::<Department>(&id.to_string()).unwrap(), id);
    }

    #[tokio::test]
    async fn resources_route_to_their_own_tables() {
        let store = InMemoryEntityStore::new();
        Department::create(&store, CatalogEntry::new("IT", "")).await.unwrap();
        Role::create(&store, CatalogEntry::new("CEO", "")).await.unwrap();
        Role::create(&store, CatalogEntry::new("CTO", "")).await.unwrap();

        assert_eq!(store.count(EntityKind::Department).await.unwrap(), 1);
        assert_eq!(store.count(EntityKind::Role).await.unwrap(), 2);
        assert_eq!(Role::list(&store).await.unwrap().len(), 2);
    }
}

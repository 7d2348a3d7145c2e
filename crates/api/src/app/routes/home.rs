use axum::{extract::Extension, response::Html};

use dreamteam_core::EntityKind;
use dreamteam_infra::{EntityStore, StoreError};

use crate::app::{errors::PageError, pages};
use crate::context::{AppContext, Identity, SignedIn};

pub async fn homepage(identity: Identity) -> Html<String> {
    Html(pages::homepage(&identity))
}

pub async fn dashboard(
    Extension(ctx): Extension<AppContext>,
    signed_in: SignedIn,
) -> Result<Html<String>, PageError> {
    let employee = &signed_in.employee;

    let department = match employee.department_id {
        Some(id) => optional(ctx.store.get_department(id).await)?.map(|d| d.name),
        None => None,
    };
    let role = match employee.role_id {
        Some(id) => optional(ctx.store.get_role(id).await)?.map(|r| r.name),
        None => None,
    };

    let identity = Identity::Employee(signed_in.clone());
    Ok(Html(pages::dashboard(
        &identity,
        employee,
        department.as_deref(),
        role.as_deref(),
    )))
}

pub async fn admin_dashboard(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
) -> Result<Html<String>, PageError> {
    let employees = ctx.store.count(EntityKind::Employee).await?;
    let departments = ctx.store.count(EntityKind::Department).await?;
    let roles = ctx.store.count(EntityKind::Role).await?;
    Ok(Html(pages::admin_dashboard(&identity, employees, departments, roles)))
}

/// A reference deleted between reads shows as unassigned.
fn optional<T>(result: Result<T, StoreError>) -> Result<Option<T>, PageError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

use axum::{
    Form,
    extract::{Extension, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use dreamteam_core::{DepartmentId, EmployeeId, EntityKind, RoleId};
use dreamteam_directory::{Assignment, Employee};
use dreamteam_infra::{EntityStore, SessionStore, StoreError};

use crate::app::{dto, endpoints::Endpoint, errors::PageError, pages, routes::form_rejection};
use crate::authz::found;
use crate::context::{AppContext, Identity};

pub async fn list(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
) -> Result<Html<String>, PageError> {
    let employees = ctx.store.list_employees().await?;
    let departments = ctx.store.list_departments().await?;
    let roles = ctx.store.list_roles().await?;
    Ok(Html(pages::employees_list(&identity, &employees, &departments, &roles)))
}

/// The target of an assignment or removal. Admins are neither placed in
/// departments nor deleted from this page.
async fn regular_employee(ctx: &AppContext, raw_id: &str) -> Result<Employee, PageError> {
    let id: EmployeeId = raw_id.parse().map_err(|_| PageError::NotFound)?;
    let employee = ctx.store.get_employee(id).await?;
    if employee.is_admin {
        tracing::warn!(employee_id = %employee.id, "refusing to modify an admin");
        return Err(PageError::Forbidden);
    }
    Ok(employee)
}

pub async fn assign_form(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let employee = regular_employee(&ctx, &raw_id).await?;
    let departments = ctx.store.list_departments().await?;
    let roles = ctx.store.list_roles().await?;
    Ok(Html(pages::assign_form(&identity, &employee, &departments, &roles, None)))
}

pub async fn assign(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
    Path(raw_id): Path<String>,
    Form(form): Form<dto::AssignForm>,
) -> Result<Response, PageError> {
    let employee = regular_employee(&ctx, &raw_id).await?;

    let (status, message) = match parse_assignment(&form) {
        Ok(assignment) => match ctx.store.assign_employee(employee.id, assignment).await {
            Ok(updated) => {
                tracing::info!(
                    employee_id = %updated.id,
                    department_id = ?updated.department_id,
                    role_id = ?updated.role_id,
                    "employee assigned"
                );
                return Ok(found(Endpoint::ListEmployees.path()));
            }
            Err(StoreError::NotFound(kind @ (EntityKind::Department | EntityKind::Role))) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("The selected {kind} no longer exists."),
            ),
            Err(err) => form_rejection(err)?,
        },
        Err(message) => (StatusCode::UNPROCESSABLE_ENTITY, message.to_string()),
    };

    let departments = ctx.store.list_departments().await?;
    let roles = ctx.store.list_roles().await?;
    let html = pages::assign_form(&identity, &employee, &departments, &roles, Some(&message));
    Ok((status, Html(html)).into_response())
}

/// Remove a regular employee and end every session they hold.
pub async fn delete(
    Extension(ctx): Extension<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Response, PageError> {
    let employee = regular_employee(&ctx, &raw_id).await?;
    ctx.store.delete_employee(employee.id).await?;
    let sessions = ctx.sessions.remove_for_employee(employee.id);
    tracing::info!(employee_id = %employee.id, sessions, "employee deleted");
    Ok(found(Endpoint::ListEmployees.path()))
}

fn parse_assignment(form: &dto::AssignForm) -> Result<Assignment, &'static str> {
    fn optional<T: core::str::FromStr>(raw: &str) -> Result<Option<T>, ()> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(|_| ())
    }

    Ok(Assignment {
        department_id: optional::<DepartmentId>(&form.department_id).map_err(|_| "Unknown department.")?,
        role_id: optional::<RoleId>(&form.role_id).map_err(|_| "Unknown role.")?,
    })
}

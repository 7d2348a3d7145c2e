use axum::{
    Router,
    http::StatusCode,
    routing::{MethodRouter, get, post},
};

use dreamteam_auth::RouteAccess;
use dreamteam_directory::{Department, Role};
use dreamteam_infra::StoreError;

use crate::app::{endpoints::Endpoint, errors::PageError};
use crate::authz;

pub mod auth;
pub mod catalog;
pub mod employees;
pub mod home;
pub mod system;

/// Handler for every [`Endpoint`].
pub fn route_table() -> Vec<(Endpoint, MethodRouter)> {
    vec![
        (Endpoint::Homepage, get(home::homepage)),
        (Endpoint::Login, get(auth::login_form).post(auth::login)),
        (Endpoint::Register, get(auth::register_form).post(auth::register)),
        (Endpoint::Logout, get(auth::logout)),
        (Endpoint::Dashboard, get(home::dashboard)),
        (Endpoint::AdminDashboard, get(home::admin_dashboard)),
        (Endpoint::ListDepartments, get(catalog::list::<Department>)),
        (
            Endpoint::AddDepartment,
            get(catalog::add_form::<Department>).post(catalog::add::<Department>),
        ),
        (
            Endpoint::EditDepartment,
            get(catalog::edit_form::<Department>).post(catalog::edit::<Department>),
        ),
        (Endpoint::DeleteDepartment, post(catalog::delete::<Department>)),
        (Endpoint::ListRoles, get(catalog::list::<Role>)),
        (Endpoint::AddRole, get(catalog::add_form::<Role>).post(catalog::add::<Role>)),
        (Endpoint::EditRole, get(catalog::edit_form::<Role>).post(catalog::edit::<Role>)),
        (Endpoint::DeleteRole, post(catalog::delete::<Role>)),
        (Endpoint::ListEmployees, get(employees::list)),
        (
            Endpoint::AssignEmployee,
            get(employees::assign_form).post(employees::assign),
        ),
        (Endpoint::DeleteEmployee, post(employees::delete)),
        (Endpoint::Health, get(system::health)),
        (Endpoint::WhoAmI, get(system::whoami)),
    ]
}

/// Router for all pages, each guarded by its endpoint's access class.
pub fn router() -> Router {
    route_table()
        .into_iter()
        .fold(Router::new(), |router, (endpoint, handler)| {
            let handler = match endpoint.access() {
                RouteAccess::Public => handler,
                access => handler.route_layer(axum::middleware::from_fn_with_state(access, authz::gate)),
            };
            router.route(endpoint.path(), handler)
        })
}

/// Status and message for a store rejection shown on the submitting form.
///
/// Anything that is not the caller's mistake becomes a fault page.
pub(crate) fn form_rejection(err: StoreError) -> Result<(StatusCode, String), PageError> {
    match err {
        StoreError::Validation(msg) => Ok((StatusCode::UNPROCESSABLE_ENTITY, sentence(&msg))),
        StoreError::Conflict(msg) => Ok((StatusCode::CONFLICT, sentence(&msg))),
        other => Err(other.into()),
    }
}

fn sentence(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
        None => String::new(),
    }
}

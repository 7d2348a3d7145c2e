use axum::{Json, http::StatusCode};

use dreamteam_auth::AccessLevel;

use crate::app::dto::WhoAmIResponse;
use crate::context::SignedIn;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(signed_in: SignedIn) -> Json<WhoAmIResponse> {
    let employee = signed_in.employee;
    let access_level = match employee.access_level() {
        AccessLevel::Admin => "admin",
        AccessLevel::Regular => "regular",
        AccessLevel::Anonymous => "anonymous",
    };
    Json(WhoAmIResponse {
        employee_id: employee.id.to_string(),
        username: employee.username,
        is_admin: employee.is_admin,
        access_level,
    })
}

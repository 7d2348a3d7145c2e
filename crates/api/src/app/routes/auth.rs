use axum::{
    Form,
    extract::{Extension, Query},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;

use dreamteam_auth::{Session, safe_next};
use dreamteam_directory::{Employee, NewEmployee};
use dreamteam_infra::{EntityStore, SessionStore, StoreError};

use crate::app::{dto, endpoints::Endpoint, errors::PageError, pages, routes::form_rejection};
use crate::authz::{found, login_url};
use crate::context::{AppContext, Identity};
use crate::middleware::{cleared_session_cookie, session_cookie};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Form action that keeps the `next` target across the POST.
fn login_action(next: Option<&str>) -> String {
    match next {
        Some(_) => login_url(next),
        None => Endpoint::Login.path().to_string(),
    }
}

pub async fn login_form(identity: Identity, Query(query): Query<dto::NextQuery>) -> Html<String> {
    let action = login_action(query.next.as_deref());
    Html(pages::login(&identity, &action, "", None))
}

pub async fn login(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
    Query(query): Query<dto::NextQuery>,
    Form(form): Form<dto::LoginForm>,
) -> Result<Response, PageError> {
    let Some(employee) = check_credentials(&ctx, &form).await? else {
        tracing::warn!(username = %form.username, "failed login");
        let action = login_action(query.next.as_deref());
        return Ok(Html(pages::login(&identity, &action, &form.username, Some(INVALID_CREDENTIALS))).into_response());
    };

    if let Identity::Employee(previous) = &identity {
        ctx.sessions.remove(&previous.token);
    }
    let session = Session::issue(employee.id, Utc::now(), ctx.session_ttl);
    let cookie = session_cookie(&session.token, ctx.session_ttl);
    ctx.sessions.insert(session).map_err(|_| PageError::Internal)?;
    tracing::info!(employee_id = %employee.id, admin = employee.is_admin, "login");

    let destination = safe_next(query.next.as_deref(), &[Endpoint::Logout.path()])
        .map(str::to_string)
        .unwrap_or_else(|| {
            let home = if employee.is_admin { Endpoint::AdminDashboard } else { Endpoint::Dashboard };
            home.path().to_string()
        });

    let mut res = found(&destination);
    res.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(res)
}

/// The employee whose password matches, if any.
async fn check_credentials(ctx: &AppContext, form: &dto::LoginForm) -> Result<Option<Employee>, PageError> {
    let employee = match ctx.store.find_by_username(&form.username).await {
        Ok(employee) => employee,
        Err(StoreError::NotFound(_)) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let password = form.password.clone();
    tokio::task::spawn_blocking(move || employee.verify_password(&password).then_some(employee))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "password verification task failed");
            PageError::Internal
        })
}

pub async fn register_form(identity: Identity) -> Html<String> {
    Html(pages::register(&identity, &pages::RegisterValues::default(), None))
}

pub async fn register(
    Extension(ctx): Extension<AppContext>,
    identity: Identity,
    Form(form): Form<dto::RegisterForm>,
) -> Result<Response, PageError> {
    let rejected = |status: StatusCode, message: &str| {
        let values = pages::RegisterValues {
            email: &form.email,
            username: &form.username,
            first_name: &form.first_name,
            last_name: &form.last_name,
        };
        (status, Html(pages::register(&identity, &values, Some(message)))).into_response()
    };

    if form.password != form.confirm_password {
        return Ok(rejected(StatusCode::UNPROCESSABLE_ENTITY, "Passwords must match."));
    }

    let hasher = ctx.hasher.clone();
    let (username, password) = (form.username.clone(), form.password.clone());
    let new = tokio::task::spawn_blocking(move || NewEmployee::new(username, &password, &hasher))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "password hashing task failed");
            PageError::Internal
        })?
        .and_then(|new| new.email(form.email.as_str()))
        .and_then(|new| new.names(form.first_name.as_str(), form.last_name.as_str()));

    let created = match new {
        Ok(new) => ctx.store.create_employee(new).await,
        Err(err) => Err(StoreError::from(err)),
    };

    match created {
        Ok(employee) => {
            tracing::info!(employee_id = %employee.id, username = %employee.username, "employee registered");
            Ok(found(Endpoint::Login.path()))
        }
        Err(err) => {
            let (status, message) = form_rejection(err)?;
            Ok(rejected(status, &message))
        }
    }
}

/// End the session (if any) and send the browser back to login.
///
/// The redirect always carries `next=/logout`; the login handler refuses to
/// follow it.
pub async fn logout(Extension(ctx): Extension<AppContext>, identity: Identity) -> Response {
    if let Identity::Employee(signed_in) = &identity {
        ctx.sessions.remove(&signed_in.token);
        tracing::info!(employee_id = %signed_in.employee.id, "logout");
    }

    let mut res = found(&login_url(Some(Endpoint::Logout.path())));
    res.headers_mut().append(header::SET_COOKIE, cleared_session_cookie());
    res.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    res
}

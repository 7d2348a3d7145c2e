//! Server-rendered HTML.
//!
//! Plain string templates; every interpolated value goes through [`escape`].

use std::fmt::Write as _;

use dreamteam_core::{DepartmentId, RoleId};
use dreamteam_directory::{Department, Employee, Role};

use crate::app::endpoints::Endpoint;
use crate::app::errors::PageError;
use crate::context::Identity;

/// HTML-escape text for element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn nav(identity: &Identity) -> String {
    let link = |endpoint: Endpoint, label: &str| format!(r#"<li><a href="{}">{label}</a></li>"#, endpoint.path());
    let items = match identity.employee() {
        None => [
            link(Endpoint::Homepage, "Home"),
            link(Endpoint::Register, "Register"),
            link(Endpoint::Login, "Login"),
        ]
        .concat(),
        Some(employee) if employee.is_admin => [
            link(Endpoint::AdminDashboard, "Dashboard"),
            link(Endpoint::ListDepartments, "Departments"),
            link(Endpoint::ListRoles, "Roles"),
            link(Endpoint::ListEmployees, "Employees"),
            link(Endpoint::Logout, "Logout"),
            format!("<li>Hi, {}!</li>", escape(&employee.username)),
        ]
        .concat(),
        Some(employee) => [
            link(Endpoint::Dashboard, "Dashboard"),
            link(Endpoint::Logout, "Logout"),
            format!("<li>Hi, {}!</li>", escape(&employee.username)),
        ]
        .concat(),
    };
    format!("<nav><ul>{items}</ul></nav>")
}

fn layout(title: &str, identity: &Identity, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} | Project Dream Team</title></head>\n\
         <body>\n{nav}\n<main>\n{body}\n</main>\n<footer>Project Dream Team</footer>\n</body>\n</html>\n",
        title = escape(title),
        nav = nav(identity),
    )
}

fn notice(message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<p class="notice">{}</p>"#, escape(m)))
        .unwrap_or_default()
}

fn text_input(name: &str, label: &str, kind: &str, value: &str) -> String {
    format!(
        r#"<label for="{name}">{label}</label><input id="{name}" name="{name}" type="{kind}" value="{}">"#,
        escape(value)
    )
}

pub fn fault_page(page: PageError) -> String {
    let code = page.status().as_u16();
    layout(
        &format!("{code} Error"),
        &Identity::Anonymous,
        &format!(
            r#"<h1>{code} Error</h1><p>{}</p><p><a href="{}">Home</a></p>"#,
            page.message(),
            Endpoint::Homepage.path()
        ),
    )
}

pub fn homepage(identity: &Identity) -> String {
    layout(
        "Home",
        identity,
        "<h1>Project Dream Team</h1><p>The best company in the world!</p>",
    )
}

pub fn login(identity: &Identity, action: &str, username: &str, message: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Login to your account</h1>{notice}<form method="post" action="{action}">{user}{pass}<button type="submit">Login</button></form>"#,
        notice = notice(message),
        action = escape(action),
        user = text_input("username", "Username", "text", username),
        pass = text_input("password", "Password", "password", ""),
    );
    layout("Login", identity, &body)
}

/// Values echoed back into the registration form.
#[derive(Debug, Default)]
pub struct RegisterValues<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

pub fn register(identity: &Identity, values: &RegisterValues<'_>, message: Option<&str>) -> String {
    let fields = [
        text_input("email", "Email", "email", values.email),
        text_input("username", "Username", "text", values.username),
        text_input("first_name", "First Name", "text", values.first_name),
        text_input("last_name", "Last Name", "text", values.last_name),
        text_input("password", "Password", "password", ""),
        text_input("confirm_password", "Confirm Password", "password", ""),
    ]
    .concat();
    let body = format!(
        r#"<h1>Register for an account</h1>{notice}<form method="post" action="{action}">{fields}<button type="submit">Register</button></form>"#,
        notice = notice(message),
        action = Endpoint::Register.path(),
    );
    layout("Register", identity, &body)
}

pub fn dashboard(identity: &Identity, employee: &Employee, department: Option<&str>, role: Option<&str>) -> String {
    let body = format!(
        "<h1>The Dashboard</h1><p>Welcome, {}.</p><dl><dt>Department</dt><dd>{}</dd><dt>Role</dt><dd>{}</dd></dl>",
        escape(&employee.display_name()),
        escape(department.unwrap_or("-")),
        escape(role.unwrap_or("-")),
    );
    layout("Dashboard", identity, &body)
}

pub fn admin_dashboard(identity: &Identity, employees: u64, departments: u64, roles: u64) -> String {
    let body = format!(
        "<h1>Admin Dashboard</h1><p>For administrators only!</p>\
         <ul><li>{employees} employees</li><li>{departments} departments</li><li>{roles} roles</li></ul>"
    );
    layout("Admin Dashboard", identity, &body)
}

/// Wording and URLs of one catalogue (departments or roles).
#[derive(Debug, Clone, Copy)]
pub struct CatalogLabels {
    pub singular: &'static str,
    pub plural: &'static str,
    pub list: Endpoint,
    pub add: Endpoint,
    pub edit: Endpoint,
    pub delete: Endpoint,
}

/// One listing row: id, name, description and number of employees holding it.
pub struct CatalogRow<'a> {
    pub id: String,
    pub name: &'a str,
    pub description: &'a str,
    pub holders: usize,
}

pub fn catalog_list(identity: &Identity, labels: &CatalogLabels, rows: &[CatalogRow<'_>]) -> String {
    let mut body = format!("<h1>{}</h1>", labels.plural);
    if rows.is_empty() {
        let _ = write!(body, "<p>No {} have been added.</p>", labels.plural.to_lowercase());
    } else {
        body.push_str("<table><tr><th>Name</th><th>Description</th><th>Employee Count</th><th></th><th></th></tr>");
        for row in rows {
            let _ = write!(
                body,
                r#"<tr><td>{name}</td><td>{description}</td><td>{holders}</td><td><a href="{edit}">Edit</a></td><td><form method="post" action="{delete}"><button type="submit">Delete</button></form></td></tr>"#,
                name = escape(row.name),
                description = escape(row.description),
                holders = row.holders,
                edit = labels.edit.with_id(&row.id),
                delete = labels.delete.with_id(&row.id),
            );
        }
        body.push_str("</table>");
    }
    let _ = write!(
        body,
        r#"<p><a href="{}">Add {}</a></p>"#,
        labels.add.path(),
        labels.singular
    );
    layout(labels.plural, identity, &body)
}

pub fn catalog_form(
    identity: &Identity,
    labels: &CatalogLabels,
    action: &str,
    name: &str,
    description: &str,
    message: Option<&str>,
) -> String {
    let verb = if action == labels.add.path() { "Add" } else { "Edit" };
    let title = format!("{verb} {}", labels.singular);
    let body = format!(
        r#"<h1>{title}</h1>{notice}<form method="post" action="{action}">{name}{description}<button type="submit">Submit</button></form>"#,
        notice = notice(message),
        action = escape(action),
        name = text_input("name", "Name", "text", name),
        description = text_input("description", "Description", "text", description),
    );
    layout(&title, identity, &body)
}

fn name_of<'a, I: PartialEq>(items: &'a [(I, &'a str)], id: Option<I>) -> &'a str {
    id.and_then(|id| items.iter().find(|(candidate, _)| *candidate == id))
        .map(|(_, name)| *name)
        .unwrap_or("-")
}

pub fn employees_list(identity: &Identity, employees: &[Employee], departments: &[Department], roles: &[Role]) -> String {
    let departments: Vec<(DepartmentId, &str)> = departments.iter().map(|d| (d.id, d.name.as_str())).collect();
    let roles: Vec<(RoleId, &str)> = roles.iter().map(|r| (r.id, r.name.as_str())).collect();

    let mut body = String::from("<h1>Employees</h1>");
    body.push_str("<table><tr><th>Name</th><th>Department</th><th>Role</th><th></th></tr>");
    for employee in employees {
        let (department, role, action) = if employee.is_admin {
            ("N/A", "N/A", "Admin".to_string())
        } else {
            (
                name_of(&departments, employee.department_id),
                name_of(&roles, employee.role_id),
                format!(
                    r#"<a href="{}">Assign</a> <form method="post" action="{}"><button type="submit">Delete</button></form>"#,
                    Endpoint::AssignEmployee.with_id(employee.id),
                    Endpoint::DeleteEmployee.with_id(employee.id),
                ),
            )
        };
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{action}</td></tr>",
            escape(&employee.display_name()),
            escape(department),
            escape(role),
        );
    }
    body.push_str("</table>");
    layout("Employees", identity, &body)
}

fn select<I: PartialEq + core::fmt::Display>(name: &str, label: &str, options: &[(I, &str)], current: Option<I>) -> String {
    let mut out = format!(r#"<label for="{name}">{label}</label><select id="{name}" name="{name}"><option value="">-</option>"#);
    for (id, text) in options {
        let selected = if current.as_ref() == Some(id) { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{id}"{selected}>{}</option>"#, escape(text));
    }
    out.push_str("</select>");
    out
}

pub fn assign_form(
    identity: &Identity,
    employee: &Employee,
    departments: &[Department],
    roles: &[Role],
    message: Option<&str>,
) -> String {
    let departments: Vec<(DepartmentId, &str)> = departments.iter().map(|d| (d.id, d.name.as_str())).collect();
    let roles: Vec<(RoleId, &str)> = roles.iter().map(|r| (r.id, r.name.as_str())).collect();
    let body = format!(
        r#"<h1>Assign Department and Role</h1><p>Select a department and role to assign to {who}.</p>{notice}<form method="post" action="{action}">{department}{role}<button type="submit">Submit</button></form>"#,
        who = escape(&employee.display_name()),
        notice = notice(message),
        action = Endpoint::AssignEmployee.with_id(employee.id),
        department = select("department_id", "Department", &departments, employee.department_id),
        role = select("role_id", "Role", &roles, employee.role_id),
    );
    layout("Assign Employee", identity, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn fault_pages_name_their_status() {
        assert!(fault_page(PageError::Forbidden).contains("403 Error"));
        assert!(fault_page(PageError::NotFound).contains("404 Error"));
        assert!(fault_page(PageError::Internal).contains("500 Error"));
    }

    #[test]
    fn anonymous_nav_offers_login() {
        let html = homepage(&Identity::Anonymous);
        assert!(html.contains(r#"href="/login""#));
        assert!(!html.contains(r#"href="/logout""#));
    }

    #[test]
    fn login_form_escapes_echoed_username() {
        let html = login(&Identity::Anonymous, "/login", "<script>", Some("Invalid username or password."));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Invalid username or password."));
    }

    #[test]
    fn only_regular_employees_get_row_actions() {
        let hasher = dreamteam_auth::CredentialHasher::low_cost();
        let staff = |username: &str, is_admin: bool| {
            dreamteam_directory::NewEmployee::new(username, "secret", &hasher)
                .unwrap()
                .admin(is_admin)
                .into_employee(dreamteam_core::EmployeeId::new())
        };
        let admin = staff("boss", true);
        let regular = staff("clerk", false);

        let html = employees_list(&Identity::Anonymous, &[admin.clone(), regular.clone()], &[], &[]);
        assert!(html.contains(&Endpoint::DeleteEmployee.with_id(regular.id)));
        assert!(html.contains(&Endpoint::AssignEmployee.with_id(regular.id)));
        assert!(!html.contains(&Endpoint::DeleteEmployee.with_id(admin.id)));
    }
}

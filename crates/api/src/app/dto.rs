use serde::Deserialize;

// -------------------------
// Form bodies
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Blank selections mean "none".
#[derive(Debug, Default, Deserialize)]
pub struct AssignForm {
    #[serde(default)]
    pub department_id: String,
    #[serde(default)]
    pub role_id: String,
}

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// -------------------------
// JSON responses
// -------------------------

#[derive(Debug, serde::Serialize)]
pub struct WhoAmIResponse {
    pub employee_id: String,
    pub username: String,
    pub is_admin: bool,
    pub access_level: &'static str,
}

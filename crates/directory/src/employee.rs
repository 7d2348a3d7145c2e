//! Employee records.
//!
//! An employee is both a directory entry (names, department, job role) and a
//! login identity (username + password hash + admin flag).

use serde::{Deserialize, Serialize};

use dreamteam_auth::{AccessLevel, CredentialHasher, PasswordError, PasswordHash};
use dreamteam_core::{DepartmentId, DomainError, DomainResult, EmployeeId, Entity, EntityKind, RoleId};

/// Maximum length of usernames, emails and personal names.
pub const MAX_FIELD_LEN: usize = 60;

/// A persisted employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: PasswordHash,
    pub is_admin: bool,
    pub department_id: Option<DepartmentId>,
    pub role_id: Option<RoleId>,
}

impl Employee {
    /// Check a login attempt against the stored hash.
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password_hash.verify(candidate)
    }

    pub fn access_level(&self) -> AccessLevel {
        AccessLevel::from_admin_flag(self.is_admin)
    }

    /// "First Last" when names are known, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl Entity for Employee {
    type Id = EmployeeId;
    const KIND: EntityKind = EntityKind::Employee;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// An employee about to be created (registration or seeding).
///
/// The plaintext password never lives in this struct: it is hashed when the
/// value is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: PasswordHash,
    pub is_admin: bool,
}

impl NewEmployee {
    /// Validate the username and hash the password.
    pub fn new(
        username: impl Into<String>,
        password: &str,
        hasher: &CredentialHasher,
    ) -> DomainResult<Self> {
        let username = normalize_username(username.into())?;
        let password_hash = hasher.hash(password).map_err(password_error)?;

        Ok(Self {
            username,
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            is_admin: false,
        })
    }

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    /// Attach an email address. Blank input clears it.
    pub fn email(mut self, email: impl Into<String>) -> DomainResult<Self> {
        self.email = normalize_email(email.into())?;
        Ok(self)
    }

    pub fn names(mut self, first: impl Into<String>, last: impl Into<String>) -> DomainResult<Self> {
        self.first_name = bounded("first name", first.into())?;
        self.last_name = bounded("last name", last.into())?;
        Ok(self)
    }

    /// Re-check field rules. Storage backends call this before inserting.
    pub fn validate(&self) -> DomainResult<()> {
        normalize_username(self.username.clone())?;
        if let Some(email) = &self.email {
            normalize_email(email.clone())?;
        }
        bounded("first name", self.first_name.clone())?;
        bounded("last name", self.last_name.clone())?;
        Ok(())
    }

    pub fn into_employee(self, id: EmployeeId) -> Employee {
        Employee {
            id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: self.password_hash,
            is_admin: self.is_admin,
            department_id: None,
            role_id: None,
        }
    }
}

/// Department + job role placement of an employee, set by an admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub department_id: Option<DepartmentId>,
    pub role_id: Option<RoleId>,
}

fn normalize_username(raw: String) -> DomainResult<String> {
    let username = raw.trim().to_string();
    if username.is_empty() {
        return Err(DomainError::validation("username must not be empty"));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("username must not contain whitespace"));
    }
    if username.chars().count() > MAX_FIELD_LEN {
        return Err(DomainError::validation(format!(
            "username must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(username)
}

fn normalize_email(raw: String) -> DomainResult<Option<String>> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Ok(None);
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(DomainError::validation("email address is malformed"));
    }
    Ok(Some(bounded("email", email)?))
}

fn bounded(field: &str, raw: String) -> DomainResult<String> {
    let value = raw.trim().to_string();
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(DomainError::validation(format!(
            "{field} must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(value)
}

fn password_error(err: PasswordError) -> DomainError {
    match err {
        PasswordError::Empty => DomainError::validation("password must not be empty"),
        other => DomainError::validation(other.to_string()),
    }
}

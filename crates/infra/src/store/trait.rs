use async_trait::async_trait;
use thiserror::Error;

use dreamteam_core::{DepartmentId, DomainError, EmployeeId, EntityKind, RoleId};
use dreamteam_directory::{Assignment, CatalogEntry, Department, Employee, NewEmployee, Role};

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity store operation error.
///
/// `Validation`, `Conflict` and `NotFound` are caller mistakes and carry a
/// message fit for a form; `Backend` is an infrastructure fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// `"<field> is already taken"`, the message shared by all backends.
    pub fn taken(field: &str) -> Self {
        Self::Conflict(format!("{field} is already taken"))
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => StoreError::Validation(msg),
        }
    }
}

/// Repository over employees, departments and job roles.
///
/// ## Semantics
///
/// - Every successful write is visible to subsequent reads through the same store.
/// - `count` is exact: it reflects precisely the committed rows of that kind.
/// - Usernames, employee emails, department names and role names are unique;
///   a duplicate is reported as [`StoreError::Conflict`].
/// - Deleting a department or role clears it from every employee that held it.
/// - Listings are ordered by username / name.
///
/// ## Schema scope
///
/// `create_all` prepares storage and is idempotent. `drop_all` removes every
/// record; the store stays usable afterwards.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn create_all(&self) -> StoreResult<()>;

    async fn drop_all(&self) -> StoreResult<()>;

    async fn count(&self, kind: EntityKind) -> StoreResult<u64>;

    // ── employees ───────────────────────────────────────────────────────────

    async fn create_employee(&self, new: NewEmployee) -> StoreResult<Employee>;

    async fn get_employee(&self, id: EmployeeId) -> StoreResult<Employee>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Employee>;

    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;

    /// Place an employee in a department and job role. Referenced records must exist.
    async fn assign_employee(&self, id: EmployeeId, assignment: Assignment) -> StoreResult<Employee>;

    async fn delete_employee(&self, id: EmployeeId) -> StoreResult<()>;

    // ── departments ─────────────────────────────────────────────────────────

    async fn create_department(&self, entry: CatalogEntry) -> StoreResult<Department>;

    async fn get_department(&self, id: DepartmentId) -> StoreResult<Department>;

    async fn list_departments(&self) -> StoreResult<Vec<Department>>;

    async fn update_department(&self, id: DepartmentId, entry: CatalogEntry) -> StoreResult<Department>;

    async fn delete_department(&self, id: DepartmentId) -> StoreResult<()>;

    // ── job roles ───────────────────────────────────────────────────────────

    async fn create_role(&self, entry: CatalogEntry) -> StoreResult<Role>;

    async fn get_role(&self, id: RoleId) -> StoreResult<Role>;

    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    async fn update_role(&self, id: RoleId, entry: CatalogEntry) -> StoreResult<Role>;

    async fn delete_role(&self, id: RoleId) -> StoreResult<()>;
}

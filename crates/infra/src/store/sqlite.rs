//! SQLite-backed entity store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | EntityStore error | Scenario |
//! |------------|-------------------|----------|
//! | Database (unique violation) | `Conflict` | duplicate username / email / name |
//! | RowNotFound | `NotFound` | lookup of an unknown id |
//! | anything else | `Backend` | IO, pool closed, malformed rows |
//!
//! Identifiers are stored as hyphenated UUID text.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::instrument;

use dreamteam_auth::PasswordHash;
use dreamteam_core::{DepartmentId, EmployeeId, Entity, EntityKind, RoleId};
use dreamteam_directory::{Assignment, CatalogEntry, Catalogued, Department, Employee, NewEmployee, Role};

use super::r#trait::{EntityStore, StoreError, StoreResult};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS departments (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        email TEXT UNIQUE,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL,
        is_admin INTEGER NOT NULL DEFAULT 0,
        department_id TEXT REFERENCES departments(id),
        role_id TEXT REFERENCES roles(id)
    )
    "#,
];

const EMPLOYEE_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, is_admin, department_id, role_id";

/// Entity store over a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteEntityStore {
    pool: SqlitePool,
}

impl SqliteEntityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `url` (e.g. `sqlite://dreamteam.db?mode=rwc`).
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(format!("connect: {e}")))?;
        Ok(Self::new(pool))
    }

    /// A private in-memory database.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Backend(format!("connect: {e}")))?;
        Ok(Self::new(pool))
    }

    async fn get_catalogued<T: Catalogued>(&self, table: &str, id: String) -> StoreResult<T>
    where
        T::Id: FromStr,
    {
        let row = sqlx::query(&format!("SELECT id, name, description FROM {table} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", T::KIND, e))?
            .ok_or(StoreError::NotFound(T::KIND))?;
        catalogued_from_row(&row)
    }

    async fn list_catalogued<T: Catalogued>(&self, table: &str) -> StoreResult<Vec<T>>
    where
        T::Id: FromStr,
    {
        let rows = sqlx::query(&format!("SELECT id, name, description FROM {table} ORDER BY name ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", T::KIND, e))?;
        rows.iter().map(catalogued_from_row).collect()
    }

    async fn insert_catalogued<T: Catalogued>(&self, table: &str, id: T::Id, entry: CatalogEntry) -> StoreResult<T>
    where
        T::Id: std::fmt::Display,
    {
        let entry = entry.normalized()?;
        sqlx::query(&format!("INSERT INTO {table} (id, name, description) VALUES (?, ?, ?)"))
            .bind(id.to_string())
            .bind(&entry.name)
            .bind(&entry.description)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", T::KIND, e))?;
        Ok(T::build(id, entry))
    }

    async fn update_catalogued<T: Catalogued>(&self, table: &str, id: T::Id, entry: CatalogEntry) -> StoreResult<T>
    where
        T::Id: std::fmt::Display,
    {
        let entry = entry.normalized()?;
        let result = sqlx::query(&format!("UPDATE {table} SET name = ?, description = ? WHERE id = ?"))
            .bind(&entry.name)
            .bind(&entry.description)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", T::KIND, e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(T::KIND));
        }
        Ok(T::build(id, entry))
    }

    /// Delete a catalogue row and detach it from employees in one transaction.
    async fn delete_catalogued(&self, table: &str, column: &str, kind: EntityKind, id: String) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", kind, e))?;

        sqlx::query(&format!("UPDATE employees SET {column} = NULL WHERE {column} = ?"))
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("detach", kind, e))?;

        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete", kind, e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(kind));
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", kind, e))?;
        Ok(())
    }

    async fn exists(&self, table: &str, kind: EntityKind, id: String) -> StoreResult<bool> {
        let row = sqlx::query(&format!("SELECT 1 FROM {table} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists", kind, e))?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    #[instrument(skip(self), err)]
    async fn create_all(&self) -> StoreResult<()> {
        for statement in SCHEMA.iter().copied() {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(format!("create schema: {e}")))?;
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn drop_all(&self) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(format!("begin: {e}")))?;
        // Employees first: they reference the catalogue tables.
        for table in ["employees", "departments", "roles"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Backend(format!("clear {table}: {e}")))?;
        }
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(format!("commit: {e}")))?;
        Ok(())
    }

    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        let table = table_for(kind);
        let n = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", kind, e))?;
        Ok(n.max(0) as u64)
    }

    #[instrument(skip(self, new), fields(username = %new.username), err)]
    async fn create_employee(&self, new: NewEmployee) -> StoreResult<Employee> {
        new.validate()?;
        let employee = new.into_employee(EmployeeId::new());

        sqlx::query(
            r#"
            INSERT INTO employees (id, username, email, first_name, last_name, password_hash, is_admin)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee.id.to_string())
        .bind(&employee.username)
        .bind(&employee.email)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.password_hash.as_str())
        .bind(employee.is_admin)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", EntityKind::Employee, e))?;

        Ok(employee)
    }

    async fn get_employee(&self, id: EmployeeId) -> StoreResult<Employee> {
        let row = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", EntityKind::Employee, e))?
            .ok_or(StoreError::NotFound(EntityKind::Employee))?;
        employee_from_row(&row)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Employee> {
        let row = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE username = ?"))
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_username", EntityKind::Employee, e))?
            .ok_or(StoreError::NotFound(EntityKind::Employee))?;
        employee_from_row(&row)
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let rows = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY username ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", EntityKind::Employee, e))?;
        rows.iter().map(employee_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn assign_employee(&self, id: EmployeeId, assignment: Assignment) -> StoreResult<Employee> {
        if let Some(department_id) = assignment.department_id {
            if !self.exists("departments", EntityKind::Department, department_id.to_string()).await? {
                return Err(StoreError::NotFound(EntityKind::Department));
            }
        }
        if let Some(role_id) = assignment.role_id {
            if !self.exists("roles", EntityKind::Role, role_id.to_string()).await? {
                return Err(StoreError::NotFound(EntityKind::Role));
            }
        }

        let result = sqlx::query("UPDATE employees SET department_id = ?, role_id = ? WHERE id = ?")
            .bind(assignment.department_id.map(|d| d.to_string()))
            .bind(assignment.role_id.map(|r| r.to_string()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("assign", EntityKind::Employee, e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(EntityKind::Employee));
        }

        self.get_employee(id).await
    }

    async fn delete_employee(&self, id: EmployeeId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", EntityKind::Employee, e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(EntityKind::Employee));
        }
        Ok(())
    }

    async fn create_department(&self, entry: CatalogEntry) -> StoreResult<Department> {
        self.insert_catalogued("departments", DepartmentId::new(), entry).await
    }

    async fn get_department(&self, id: DepartmentId) -> StoreResult<Department> {
        self.get_catalogued("departments", id.to_string()).await
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        self.list_catalogued("departments").await
    }

    async fn update_department(&self, id: DepartmentId, entry: CatalogEntry) -> StoreResult<Department> {
        self.update_catalogued("departments", id, entry).await
    }

    async fn delete_department(&self, id: DepartmentId) -> StoreResult<()> {
        self.delete_catalogued("departments", "department_id", Department::KIND, id.to_string())
            .await
    }

    async fn create_role(&self, entry: CatalogEntry) -> StoreResult<Role> {
        self.insert_catalogued("roles", RoleId::new(), entry).await
    }

    async fn get_role(&self, id: RoleId) -> StoreResult<Role> {
        self.get_catalogued("roles", id.to_string()).await
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.list_catalogued("roles").await
    }

    async fn update_role(&self, id: RoleId, entry: CatalogEntry) -> StoreResult<Role> {
        self.update_catalogued("roles", id, entry).await
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<()> {
        self.delete_catalogued("roles", "role_id", Role::KIND, id.to_string())
            .await
    }
}

fn table_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Employee => "employees",
        EntityKind::Department => "departments",
        EntityKind::Role => "roles",
    }
}

fn map_sqlx_error(operation: &str, kind: EntityKind, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            // SQLite reports "UNIQUE constraint failed: <table>.<column>".
            let field = db
                .message()
                .rsplit('.')
                .next()
                .filter(|col| !col.contains(' '))
                .unwrap_or("value")
                .to_string();
            StoreError::taken(&field)
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(kind),
        _ => {
            tracing::error!(operation, %kind, error = %err, "sqlite entity store failure");
            StoreError::Backend(format!("{operation} {kind}: {err}"))
        }
    }
}

fn column<T>(row: &SqliteRow, name: &str) -> StoreResult<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Backend(format!("failed to read column {name}: {e}")))
}

fn parse_id<T: FromStr>(raw: &str, kind: EntityKind) -> StoreResult<T> {
    raw.parse()
        .map_err(|_| StoreError::Backend(format!("malformed {kind} id in storage: {raw}")))
}

fn employee_from_row(row: &SqliteRow) -> StoreResult<Employee> {
    let id: String = column(row, "id")?;
    let password_hash: String = column(row, "password_hash")?;
    let department_id: Option<String> = column(row, "department_id")?;
    let role_id: Option<String> = column(row, "role_id")?;

    Ok(Employee {
        id: parse_id(&id, EntityKind::Employee)?,
        username: column(row, "username")?,
        email: column(row, "email")?,
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        password_hash: PasswordHash::from_phc(password_hash)
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        is_admin: column(row, "is_admin")?,
        department_id: department_id
            .map(|raw| parse_id::<DepartmentId>(&raw, EntityKind::Department))
            .transpose()?,
        role_id: role_id
            .map(|raw| parse_id::<RoleId>(&raw, EntityKind::Role))
            .transpose()?,
    })
}

fn catalogued_from_row<T: Catalogued>(row: &SqliteRow) -> StoreResult<T>
where
    T::Id: FromStr,
{
    let id: String = column(row, "id")?;
    let entry = CatalogEntry::new(
        column::<String>(row, "name")?,
        column::<String>(row, "description")?,
    );
    Ok(T::build(parse_id(&id, T::KIND)?, entry))
}

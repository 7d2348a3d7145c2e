use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use dreamteam_core::{DepartmentId, EmployeeId, Entity, EntityKind, RoleId};
use dreamteam_directory::{Assignment, CatalogEntry, Catalogued, Department, Employee, NewEmployee, Role};

use super::r#trait::{EntityStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    employees: HashMap<EmployeeId, Employee>,
    departments: HashMap<DepartmentId, Department>,
    roles: HashMap<RoleId, Role>,
}

/// In-memory entity store.
///
/// Intended for tests/dev. One lock guards all three tables so multi-table
/// writes (deletes that detach employees) are atomic.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    tables: RwLock<Tables>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("entity store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("entity store lock poisoned".to_string()))
    }
}

fn insert_catalogued<T>(table: &mut HashMap<T::Id, T>, id: T::Id, entry: CatalogEntry) -> StoreResult<T>
where
    T: Catalogued,
{
    let entry = entry.normalized()?;
    if table.values().any(|existing| existing.name() == entry.name) {
        return Err(StoreError::taken("name"));
    }
    let record = T::build(id.clone(), entry);
    table.insert(id, record.clone());
    Ok(record)
}

fn update_catalogued<T>(table: &mut HashMap<T::Id, T>, id: &T::Id, entry: CatalogEntry) -> StoreResult<T>
where
    T: Catalogued,
{
    let entry = entry.normalized()?;
    if table
        .iter()
        .any(|(other_id, existing)| other_id != id && existing.name() == entry.name)
    {
        return Err(StoreError::taken("name"));
    }
    let record = table.get_mut(id).ok_or(StoreError::NotFound(T::KIND))?;
    record.replace(entry);
    Ok(record.clone())
}

fn sorted_by_name<T: Catalogued>(table: &HashMap<T::Id, T>) -> Vec<T> {
    let mut records: Vec<T> = table.values().cloned().collect();
    records.sort_by(|a, b| a.name().cmp(b.name()));
    records
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn create_all(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn drop_all(&self) -> StoreResult<()> {
        *self.write()? = Tables::default();
        Ok(())
    }

    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        let tables = self.read()?;
        let n = match kind {
            EntityKind::Employee => tables.employees.len(),
            EntityKind::Department => tables.departments.len(),
            EntityKind::Role => tables.roles.len(),
        };
        Ok(n as u64)
    }

    async fn create_employee(&self, new: NewEmployee) -> StoreResult<Employee> {
        new.validate()?;
        let mut tables = self.write()?;

        if tables.employees.values().any(|e| e.username == new.username) {
            return Err(StoreError::taken("username"));
        }
        if let Some(email) = &new.email {
            if tables.employees.values().any(|e| e.email.as_ref() == Some(email)) {
                return Err(StoreError::taken("email"));
            }
        }

        let employee = new.into_employee(EmployeeId::new());
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn get_employee(&self, id: EmployeeId) -> StoreResult<Employee> {
        self.read()?
            .employees
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(EntityKind::Employee))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Employee> {
        let username = username.trim();
        self.read()?
            .employees
            .values()
            .find(|e| e.username == username)
            .cloned()
            .ok_or(StoreError::NotFound(EntityKind::Employee))
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self.read()?.employees.values().cloned().collect();
        employees.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(employees)
    }

    async fn assign_employee(&self, id: EmployeeId, assignment: Assignment) -> StoreResult<Employee> {
        let mut tables = self.write()?;

        if let Some(department_id) = assignment.department_id {
            if !tables.departments.contains_key(&department_id) {
                return Err(StoreError::NotFound(EntityKind::Department));
            }
        }
        if let Some(role_id) = assignment.role_id {
            if !tables.roles.contains_key(&role_id) {
                return Err(StoreError::NotFound(EntityKind::Role));
            }
        }

        let employee = tables
            .employees
            .get_mut(&id)
            .ok_or(StoreError::NotFound(EntityKind::Employee))?;
        employee.department_id = assignment.department_id;
        employee.role_id = assignment.role_id;
        Ok(employee.clone())
    }

    async fn delete_employee(&self, id: EmployeeId) -> StoreResult<()> {
        self.write()?
            .employees
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(EntityKind::Employee))
    }

    async fn create_department(&self, entry: CatalogEntry) -> StoreResult<Department> {
        insert_catalogued(&mut self.write()?.departments, DepartmentId::new(), entry)
    }

    async fn get_department(&self, id: DepartmentId) -> StoreResult<Department> {
        self.read()?
            .departments
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(Department::KIND))
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        Ok(sorted_by_name(&self.read()?.departments))
    }

    async fn update_department(&self, id: DepartmentId, entry: CatalogEntry) -> StoreResult<Department> {
        update_catalogued(&mut self.write()?.departments, &id, entry)
    }

    async fn delete_department(&self, id: DepartmentId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.departments.remove(&id).is_none() {
            return Err(StoreError::NotFound(Department::KIND));
        }
        for employee in tables.employees.values_mut() {
            if employee.department_id == Some(id) {
                employee.department_id = None;
            }
        }
        Ok(())
    }

    async fn create_role(&self, entry: CatalogEntry) -> StoreResult<Role> {
        insert_catalogued(&mut self.write()?.roles, RoleId::new(), entry)
    }

    async fn get_role(&self, id: RoleId) -> StoreResult<Role> {
        self.read()?
            .roles
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(Role::KIND))
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(sorted_by_name(&self.read()?.roles))
    }

    async fn update_role(&self, id: RoleId, entry: CatalogEntry) -> StoreResult<Role> {
        update_catalogued(&mut self.write()?.roles, &id, entry)
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.roles.remove(&id).is_none() {
            return Err(StoreError::NotFound(Role::KIND));
        }
        for employee in tables.employees.values_mut() {
            if employee.role_id == Some(id) {
                employee.role_id = None;
            }
        }
        Ok(())
    }
}

//! Behaviour every `EntityStore` backend must share.
//!
//! Each scenario runs once per backend; a fresh store is created per test.

use dreamteam_auth::CredentialHasher;
use dreamteam_core::{DepartmentId, EmployeeId, EntityKind};
use dreamteam_directory::{Assignment, CatalogEntry, NewEmployee};

use super::{EntityStore, InMemoryEntityStore, SqliteEntityStore, StoreError};

fn employee(username: &str, password: &str) -> NewEmployee {
    NewEmployee::new(username, password, &CredentialHasher::low_cost()).unwrap()
}

/// The two accounts every web test starts from.
async fn seed(store: &dyn EntityStore) {
    store.create_all().await.unwrap();
    store
        .create_employee(employee("showe", "admininplaintext").admin(true))
        .await
        .unwrap();
    store
        .create_employee(employee("showe2", "testinplaintext"))
        .await
        .unwrap();
}

async fn seeded_count_is_exact_and_teardown_empties(store: &dyn EntityStore) {
    seed(store).await;
    assert_eq!(store.count(EntityKind::Employee).await.unwrap(), 2);

    store.drop_all().await.unwrap();
    assert_eq!(store.count(EntityKind::Employee).await.unwrap(), 0);
}

async fn creating_department_and_role_counts_one_each(store: &dyn EntityStore) {
    seed(store).await;

    store
        .create_department(CatalogEntry::new("IT", "The IT Department"))
        .await
        .unwrap();
    assert_eq!(store.count(EntityKind::Department).await.unwrap(), 1);

    store
        .create_role(CatalogEntry::new("CEO", "Run the whole company"))
        .await
        .unwrap();
    assert_eq!(store.count(EntityKind::Role).await.unwrap(), 1);
}

async fn find_by_username_returns_hashed_account(store: &dyn EntityStore) {
    seed(store).await;

    let admin = store.find_by_username("showe").await.unwrap();
    assert!(admin.is_admin);
    assert!(admin.verify_password("admininplaintext"));
    assert_ne!(admin.password_hash.as_str(), "admininplaintext");

    let regular = store.find_by_username("showe2").await.unwrap();
    assert!(!regular.is_admin);

    assert_eq!(
        store.find_by_username("nobody").await.unwrap_err(),
        StoreError::NotFound(EntityKind::Employee)
    );
}

async fn duplicate_keys_conflict(store: &dyn EntityStore) {
    seed(store).await;

    let err = store
        .create_employee(employee("showe", "other"))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Conflict("username is already taken".to_string()));

    store
        .create_employee(employee("jdoe", "pw").email("jdoe@example.com").unwrap())
        .await
        .unwrap();
    let err = store
        .create_employee(employee("jdoe2", "pw").email("JDoe@example.com").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Conflict("email is already taken".to_string()));

    store.create_department(CatalogEntry::new("IT", "")).await.unwrap();
    let err = store
        .create_department(CatalogEntry::new(" IT ", "again"))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Conflict("name is already taken".to_string()));
    assert_eq!(store.count(EntityKind::Department).await.unwrap(), 1);
    assert_eq!(store.count(EntityKind::Employee).await.unwrap(), 3);
}

async fn blank_catalogue_name_is_validation_error(store: &dyn EntityStore) {
    store.create_all().await.unwrap();
    let err = store.create_role(CatalogEntry::new("  ", "x")).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.count(EntityKind::Role).await.unwrap(), 0);
}

async fn assignment_and_detach_on_delete(store: &dyn EntityStore) {
    seed(store).await;
    let regular = store.find_by_username("showe2").await.unwrap();
    let it = store.create_department(CatalogEntry::new("IT", "")).await.unwrap();
    let ceo = store.create_role(CatalogEntry::new("CEO", "")).await.unwrap();

    let assigned = store
        .assign_employee(
            regular.id,
            Assignment {
                department_id: Some(it.id),
                role_id: Some(ceo.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(assigned.department_id, Some(it.id));
    assert_eq!(assigned.role_id, Some(ceo.id));

    store.delete_department(it.id).await.unwrap();
    let after = store.get_employee(regular.id).await.unwrap();
    assert_eq!(after.department_id, None);
    assert_eq!(after.role_id, Some(ceo.id));

    store.delete_role(ceo.id).await.unwrap();
    assert_eq!(store.get_employee(regular.id).await.unwrap().role_id, None);
    assert_eq!(store.count(EntityKind::Role).await.unwrap(), 0);
}

async fn assignment_to_unknown_records_is_not_found(store: &dyn EntityStore) {
    seed(store).await;
    let regular = store.find_by_username("showe2").await.unwrap();

    let err = store
        .assign_employee(
            regular.id,
            Assignment {
                department_id: Some(DepartmentId::new()),
                role_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound(EntityKind::Department));

    let err = store
        .assign_employee(EmployeeId::new(), Assignment::default())
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound(EntityKind::Employee));
}

async fn update_renames_and_guards_uniqueness(store: &dyn EntityStore) {
    store.create_all().await.unwrap();
    let it = store.create_department(CatalogEntry::new("IT", "")).await.unwrap();
    store.create_department(CatalogEntry::new("HR", "")).await.unwrap();

    let renamed = store
        .update_department(it.id, CatalogEntry::new("Engineering", "Builds things"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Engineering");
    assert_eq!(store.get_department(it.id).await.unwrap().description, "Builds things");

    // Keeping its own name is not a conflict.
    store
        .update_department(it.id, CatalogEntry::new("Engineering", ""))
        .await
        .unwrap();

    let err = store
        .update_department(it.id, CatalogEntry::new("HR", ""))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Conflict("name is already taken".to_string()));

    let names: Vec<String> = store
        .list_departments()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Engineering", "HR"]);
}

async fn delete_employee_removes_row(store: &dyn EntityStore) {
    seed(store).await;
    let regular = store.find_by_username("showe2").await.unwrap();

    store.delete_employee(regular.id).await.unwrap();
    assert_eq!(store.count(EntityKind::Employee).await.unwrap(), 1);
    assert_eq!(
        store.delete_employee(regular.id).await.unwrap_err(),
        StoreError::NotFound(EntityKind::Employee)
    );

    let usernames: Vec<String> = store
        .list_employees()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.username)
        .collect();
    assert_eq!(usernames, vec!["showe"]);
}

macro_rules! contract_tests {
    ($backend:ident, $make:expr) => {
        mod $backend {
            use super::*;

            #[tokio::test]
            async fn seeded_count_is_exact_and_teardown_empties() {
                super::seeded_count_is_exact_and_teardown_empties(&$make).await;
            }

            #[tokio::test]
            async fn creating_department_and_role_counts_one_each() {
                super::creating_department_and_role_counts_one_each(&$make).await;
            }

            #[tokio::test]
            async fn find_by_username_returns_hashed_account() {
                super::find_by_username_returns_hashed_account(&$make).await;
            }

            #[tokio::test]
            async fn duplicate_keys_conflict() {
                super::duplicate_keys_conflict(&$make).await;
            }

            #[tokio::test]
            async fn blank_catalogue_name_is_validation_error() {
                super::blank_catalogue_name_is_validation_error(&$make).await;
            }

            #[tokio::test]
            async fn assignment_and_detach_on_delete() {
                super::assignment_and_detach_on_delete(&$make).await;
            }

            #[tokio::test]
            async fn assignment_to_unknown_records_is_not_found() {
                super::assignment_to_unknown_records_is_not_found(&$make).await;
            }

            #[tokio::test]
            async fn update_renames_and_guards_uniqueness() {
                super::update_renames_and_guards_uniqueness(&$make).await;
            }

            #[tokio::test]
            async fn delete_employee_removes_row() {
                super::delete_employee_removes_row(&$make).await;
            }
        }
    };
}

contract_tests!(in_memory, InMemoryEntityStore::new());
contract_tests!(sqlite, SqliteEntityStore::in_memory().await.unwrap());

//! `dreamteam-directory`: the staff directory domain: employees, departments
//! and job roles.
//!
//! Plain data structs plus their validation rules. Persistence lives in
//! `dreamteam-infra`.

pub mod catalog;
pub mod department;
pub mod employee;
pub mod role;

pub use catalog::{CatalogEntry, Catalogued};
pub use department::Department;
pub use employee::{Assignment, Employee, NewEmployee};
pub use role::Role;

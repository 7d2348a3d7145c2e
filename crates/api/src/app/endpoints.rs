//! Named endpoints: path pattern and access class of every page.

use dreamteam_auth::RouteAccess;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Homepage,
    Login,
    Register,
    Logout,
    Dashboard,
    AdminDashboard,
    ListDepartments,
    AddDepartment,
    EditDepartment,
    DeleteDepartment,
    ListRoles,
    AddRole,
    EditRole,
    DeleteRole,
    ListEmployees,
    AssignEmployee,
    DeleteEmployee,
    Health,
    WhoAmI,
}

impl Endpoint {
    pub const ALL: [Endpoint; 19] = [
        Endpoint::Homepage,
        Endpoint::Login,
        Endpoint::Register,
        Endpoint::Logout,
        Endpoint::Dashboard,
        Endpoint::AdminDashboard,
        Endpoint::ListDepartments,
        Endpoint::AddDepartment,
        Endpoint::EditDepartment,
        Endpoint::DeleteDepartment,
        Endpoint::ListRoles,
        Endpoint::AddRole,
        Endpoint::EditRole,
        Endpoint::DeleteRole,
        Endpoint::ListEmployees,
        Endpoint::AssignEmployee,
        Endpoint::DeleteEmployee,
        Endpoint::Health,
        Endpoint::WhoAmI,
    ];

    /// Dotted `area.view` name.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Homepage => "home.homepage",
            Endpoint::Login => "auth.login",
            Endpoint::Register => "auth.register",
            Endpoint::Logout => "auth.logout",
            Endpoint::Dashboard => "home.dashboard",
            Endpoint::AdminDashboard => "home.admin_dashboard",
            Endpoint::ListDepartments => "home.list_departments",
            Endpoint::AddDepartment => "admin.add_department",
            Endpoint::EditDepartment => "admin.edit_department",
            Endpoint::DeleteDepartment => "admin.delete_department",
            Endpoint::ListRoles => "home.list_roles",
            Endpoint::AddRole => "admin.add_role",
            Endpoint::EditRole => "admin.edit_role",
            Endpoint::DeleteRole => "admin.delete_role",
            Endpoint::ListEmployees => "home.list_employees",
            Endpoint::AssignEmployee => "admin.assign_employee",
            Endpoint::DeleteEmployee => "admin.delete_employee",
            Endpoint::Health => "system.health",
            Endpoint::WhoAmI => "system.whoami",
        }
    }

    /// Router path pattern (`:id` marks the record segment).
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Homepage => "/",
            Endpoint::Login => "/login",
            Endpoint::Register => "/register",
            Endpoint::Logout => "/logout",
            Endpoint::Dashboard => "/dashboard",
            Endpoint::AdminDashboard => "/admin/dashboard",
            Endpoint::ListDepartments => "/admin/departments",
            Endpoint::AddDepartment => "/admin/departments/add",
            Endpoint::EditDepartment => "/admin/departments/edit/:id",
            Endpoint::DeleteDepartment => "/admin/departments/delete/:id",
            Endpoint::ListRoles => "/admin/roles",
            Endpoint::AddRole => "/admin/roles/add",
            Endpoint::EditRole => "/admin/roles/edit/:id",
            Endpoint::DeleteRole => "/admin/roles/delete/:id",
            Endpoint::ListEmployees => "/admin/employees",
            Endpoint::AssignEmployee => "/admin/employees/assign/:id",
            Endpoint::DeleteEmployee => "/admin/employees/delete/:id",
            Endpoint::Health => "/health",
            Endpoint::WhoAmI => "/whoami",
        }
    }

    pub fn access(self) -> RouteAccess {
        match self {
            Endpoint::Homepage | Endpoint::Login | Endpoint::Register | Endpoint::Health => RouteAccess::Public,
            Endpoint::Logout | Endpoint::Dashboard | Endpoint::WhoAmI => RouteAccess::LoginRequired,
            Endpoint::AdminDashboard
            | Endpoint::ListDepartments
            | Endpoint::AddDepartment
            | Endpoint::EditDepartment
            | Endpoint::DeleteDepartment
            | Endpoint::ListRoles
            | Endpoint::AddRole
            | Endpoint::EditRole
            | Endpoint::DeleteRole
            | Endpoint::ListEmployees
            | Endpoint::AssignEmployee
            | Endpoint::DeleteEmployee => RouteAccess::AdminOnly,
        }
    }

    /// Concrete URL of a record-scoped endpoint.
    pub fn with_id(self, id: impl core::fmt::Display) -> String {
        self.path().replace(":id", &id.to_string())
    }
}

//! Accounts, roles and staff records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ActivityLogId, CrudAction, CustomerId, Email, EmployeeId, EmployeeStatus, PermissionId, Price,
    RoleId, RoleName, UserId,
};

/// A login account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub full_name: String,
    pub mobile: String,
    pub role: UserRole,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// A role and the permissions it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub id: RoleId,
    pub name: RoleName,
    pub display_name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl UserRole {
    /// Whether any permission entry for `module` grants `action`.
    #[must_use]
    pub fn allows(&self, module: &str, action: CrudAction) -> bool {
        self.name == RoleName::Admin
            || self
                .permissions
                .iter()
                .any(|p| p.module == module && p.allows(action))
    }
}

/// Module-level CRUD flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Permission {
    pub id: PermissionId,
    pub module: String,
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view: bool,
}

impl Permission {
    /// Whether this entry grants `action`.
    #[must_use]
    pub const fn allows(&self, action: CrudAction) -> bool {
        match action {
            CrudAction::Add => self.can_add,
            CrudAction::Edit => self.can_edit,
            CrudAction::Delete => self.can_delete,
            CrudAction::View => self.can_view,
        }
    }
}

/// A staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub user_id: UserId,
    pub full_name: String,
    pub email: Email,
    pub phone: String,
    pub role_id: RoleId,
    pub status: EmployeeStatus,
}

/// A shopper profile with lifetime totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    pub full_name: String,
    pub mobile: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub total_orders: u32,
    pub total_spent: Price,
}

/// An audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub user_id: UserId,
    pub user: User,
    pub action: String,
    pub module: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn permission(module: &str, view: bool, edit: bool) -> Permission {
        Permission {
            id: PermissionId::new(1),
            module: module.to_string(),
            can_add: false,
            can_edit: edit,
            can_delete: false,
            can_view: view,
        }
    }

    #[test]
    fn test_employee_role_checks_module_permissions() {
        let role = UserRole {
            id: RoleId::new(2),
            name: RoleName::Employee,
            display_name: "Packer".to_string(),
            permissions: vec![permission("orders", true, false)],
        };

        assert!(role.allows("orders", CrudAction::View));
        assert!(!role.allows("orders", CrudAction::Edit));
        assert!(!role.allows("products", CrudAction::View));
    }

    #[test]
    fn test_admin_role_allows_everything() {
        let role = UserRole {
            id: RoleId::new(1),
            name: RoleName::Admin,
            display_name: "Administrator".to_string(),
            permissions: Vec::new(),
        };
        assert!(role.allows("products", CrudAction::Delete));
    }

    #[test]
    fn test_user_deserializes_camel_case() {
        let json = r#"{
            "id": 3,
            "username": "meera",
            "email": "meera@example.in",
            "fullName": "Meera Iyer",
            "mobile": "9876543210",
            "role": {"id": 3, "name": "customer", "displayName": "Customer"},
            "isActive": true,
            "dateJoined": "2025-11-02T09:30:00Z"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.full_name, "Meera Iyer");
        assert_eq!(user.role.name, RoleName::Customer);
        assert!(user.role.permissions.is_empty());
    }
}

//! Status enums for various entities.
//!
//! Wire values are the lowercase snake-case strings the backend emits.

use serde::{Deserialize, Serialize};

/// Role a user account is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    /// Full access to the back office.
    Admin,
    /// Staff member with module-level permissions.
    Employee,
    /// Shopper account.
    Customer,
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Employee => write!(f, "employee"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            "customer" => Ok(Self::Customer),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Employment status of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Cash on delivery.
    #[default]
    Cod,
    Online,
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order can no longer change state.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// Category of a site-wide system notification.
///
/// Types the client does not know about deserialize to [`Self::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Promotion,
    NewArrival,
    Announcement,
    Alert,
    #[default]
    #[serde(other)]
    Other,
}

/// Operation a permission entry can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudAction {
    Add,
    Edit,
    Delete,
    View,
}

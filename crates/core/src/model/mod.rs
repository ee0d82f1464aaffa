//! Entity records returned by the storefront backend.
//!
//! These are passive shapes: relationships such as order → customer are
//! carried as IDs (and sometimes an embedded copy) and resolved server-side.

pub mod catalog;
pub mod dashboard;
pub mod order;
pub mod user;

pub use catalog::{Category, Product};
pub use dashboard::DashboardStats;
pub use order::{CartItem, Order, OrderItem, ShippingAddress};
pub use user::{ActivityLog, Customer, Employee, Permission, User, UserRole};

//! Cart and order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Customer, Product};
use crate::types::{
    CartItemId, CustomerId, OrderId, OrderItemId, OrderStatus, PaymentMode, PaymentStatus, Price,
    ProductId,
};

/// A line in the shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(i64::from(self.quantity))
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub customer: Customer,
    pub total_amount: Price,
    pub payment_mode: PaymentMode,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A line of a placed order, priced at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product: Product,
    pub quantity: u32,
    pub price: Price,
}

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
}

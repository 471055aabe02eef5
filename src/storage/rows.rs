use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::order::{Order, OrderError, OrderItem};

// ============================================================================
// Relational Projection Rows
// ============================================================================
//
// Row structs mirror the two tables:
//
//   orders(id, customer_id, total_cents, created_at, updated_at)
//   order_items(id, order_id, product_id, name, unit_price_cents,
//               quantity, position)
//
// `position` persists the aggregate's item ordering; a relational store
// returns rows in unspecified order without it. Both storage backends go
// through this codec so they encode and decode identically.
//
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub position: i32,
}

impl OrderItemRow {
    /// Encode one item for persistence. The stored price is the UNIT
    /// price; the line total is never written per item.
    pub fn from_domain(order_id: Uuid, position: i32, item: &OrderItem) -> Self {
        Self {
            id: item.id(),
            order_id,
            product_id: item.product_id(),
            name: item.name().to_string(),
            unit_price_cents: item.unit_price_cents(),
            quantity: item.quantity(),
            position,
        }
    }

    /// Decode back into the domain, re-running item validation.
    pub fn into_domain(self) -> Result<OrderItem, OrderError> {
        OrderItem::new(
            self.id,
            self.name,
            self.unit_price_cents,
            self.product_id,
            self.quantity,
        )
    }
}

/// Reconstruct the aggregate from its stored projection. Item rows must
/// already be sorted by `position`.
pub fn assemble_order(order: OrderRow, items: Vec<OrderItemRow>) -> Result<Order, OrderError> {
    let items = items
        .into_iter()
        .map(OrderItemRow::into_domain)
        .collect::<Result<Vec<_>, _>>()?;

    Order::new(order.id, order.customer_id, items)
}

// ============================================================================
// Unit Tests
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::Order;

use super::repository::{OrderRepository, StorageError};
use super::rows::{assemble_order, OrderItemRow, OrderRow};

// ============================================================================
// In-Memory Order Repository
// ============================================================================
//
// Stores the SAME row structs the Postgres backend writes, so the contract
// tests below exercise the shared encode/decode path rather than a
// shortcut through the domain objects. Also serves as the demo backend
// when no DATABASE_URL is configured.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    // Vec keeps creation order, mirroring ORDER BY created_at.
    orders: Vec<OrderRow>,
    items_by_order: HashMap<Uuid, Vec<OrderItemRow>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn encode_items(order: &Order) -> Vec<OrderItemRow> {
    order
        .items()
        .iter()
        .enumerate()
        .map(|(position, item)| OrderItemRow::from_domain(order.id(), position as i32, item))
        .collect()
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), StorageError> {
        let mut state = self.state.write().await;

        let now = Utc::now();
        state.orders.push(OrderRow {
            id: order.id(),
            customer_id: order.customer_id(),
            total_cents: order.total_cents(),
            created_at: now,
            updated_at: now,
        });
        state.items_by_order.insert(order.id(), encode_items(order));

        tracing::info!(
            order_id = %order.id(),
            item_count = order.items().len(),
            total_cents = order.total_cents(),
            "✅ Order created (in-memory)"
        );

        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), StorageError> {
        let mut state = self.state.write().await;

        let Some(row) = state.orders.iter_mut().find(|row| row.id == order.id()) else {
            // Matches an UPDATE that touches zero rows.
            return Ok(());
        };
        row.total_cents = order.total_cents();
        row.updated_at = Utc::now();

        let incoming = encode_items(order);
        let kept_ids: Vec<Uuid> = incoming.iter().map(|row| row.id).collect();

        let stored = state.items_by_order.entry(order.id()).or_default();
        // Upsert keyed by item id, then drop rows absent from the new set.
        for row in incoming {
            match stored.iter_mut().find(|existing| existing.id == row.id) {
                Some(existing) => *existing = row,
                None => stored.push(row),
            }
        }
        stored.retain(|row| kept_ids.contains(&row.id));
        stored.sort_by_key(|row| row.position);

        tracing::info!(
            order_id = %order.id(),
            item_count = order.items().len(),
            total_cents = order.total_cents(),
            "✅ Order updated (in-memory)"
        );

        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, StorageError> {
        let state = self.state.read().await;

        let Some(order_row) = state.orders.iter().find(|row| row.id == id).cloned() else {
            return Ok(None);
        };
        let items = state.items_by_order.get(&id).cloned().unwrap_or_default();

        Ok(Some(assemble_order(order_row, items)?))
    }

    async fn find_all(&self) -> Result<Vec<Order>, StorageError> {
        let state = self.state.read().await;

        state
            .orders
            .iter()
            .map(|order_row| {
                let items = state
                    .items_by_order
                    .get(&order_row.id)
                    .cloned()
                    .unwrap_or_default();
                assemble_order(order_row.clone(), items).map_err(StorageError::from)
            })
            .collect()
    }
}

// ============================================================================
// Repository Contract Tests
// ============================================================================

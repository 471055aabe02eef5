use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::order::Order;

use super::repository::{OrderRepository, StorageError};
use super::rows::{assemble_order, OrderItemRow, OrderRow};

// ============================================================================
// PostgreSQL Order Repository
// ============================================================================
//
// Every multi-step mutation runs inside a single transaction: a failure
// before commit rolls back all of it. In `update`, each item upsert is
// awaited before the stale-row delete executes, so the delete can never
// observe a half-written item set.
//
// ============================================================================

const CREATE_ORDERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        customer_id UUID NOT NULL,
        total_cents BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )";

const CREATE_ORDER_ITEMS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS order_items (
        id UUID PRIMARY KEY,
        order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id UUID NOT NULL,
        name TEXT NOT NULL,
        unit_price_cents BIGINT NOT NULL,
        quantity INT NOT NULL,
        position INT NOT NULL
    )";

const CREATE_ORDER_ITEMS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS order_items_order_id_idx ON order_items (order_id)";

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bootstrap both tables. Safe to call on every startup.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_ORDER_ITEMS_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_ORDER_ITEMS_INDEX)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Schema bootstrap complete");
        Ok(())
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<OrderItemRow>, sqlx::Error> {
        sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, name, unit_price_cents, quantity, position
             FROM order_items
             WHERE order_id = $1
             ORDER BY position",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, customer_id, total_cents)
             VALUES ($1, $2, $3)",
        )
        .bind(order.id())
        .bind(order.customer_id())
        .bind(order.total_cents())
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items().iter().enumerate() {
            let row = OrderItemRow::from_domain(order.id(), position as i32, item);

            sqlx::query(
                "INSERT INTO order_items
                     (id, order_id, product_id, name, unit_price_cents, quantity, position)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(row.id)
            .bind(row.order_id)
            .bind(row.product_id)
            .bind(row.name)
            .bind(row.unit_price_cents)
            .bind(row.quantity)
            .bind(row.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id(),
            customer_id = %order.customer_id(),
            item_count = order.items().len(),
            total_cents = order.total_cents(),
            "✅ Order created"
        );

        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE orders
             SET total_cents = $2, updated_at = now()
             WHERE id = $1",
        )
        .bind(order.id())
        .bind(order.total_cents())
        .execute(&mut *tx)
        .await?;

        // Each upsert completes before the stale-row delete below runs.
        let mut kept_ids: Vec<Uuid> = Vec::with_capacity(order.items().len());
        for (position, item) in order.items().iter().enumerate() {
            let row = OrderItemRow::from_domain(order.id(), position as i32, item);
            kept_ids.push(row.id);

            sqlx::query(
                "INSERT INTO order_items
                     (id, order_id, product_id, name, unit_price_cents, quantity, position)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (id) DO UPDATE SET
                     product_id = EXCLUDED.product_id,
                     name = EXCLUDED.name,
                     unit_price_cents = EXCLUDED.unit_price_cents,
                     quantity = EXCLUDED.quantity,
                     position = EXCLUDED.position",
            )
            .bind(row.id)
            .bind(row.order_id)
            .bind(row.product_id)
            .bind(row.name)
            .bind(row.unit_price_cents)
            .bind(row.quantity)
            .bind(row.position)
            .execute(&mut *tx)
            .await?;
        }

        let deleted = sqlx::query(
            "DELETE FROM order_items
             WHERE order_id = $1 AND id <> ALL($2)",
        )
        .bind(order.id())
        .bind(&kept_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id(),
            item_count = order.items().len(),
            stale_items_deleted = deleted,
            total_cents = order.total_cents(),
            "✅ Order updated"
        );

        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, StorageError> {
        let Some(order_row) = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_id, total_cents, created_at, updated_at
             FROM orders
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        tracing::debug!(
            order_id = %order_row.id,
            created_at = %order_row.created_at,
            updated_at = %order_row.updated_at,
            "Loaded order row"
        );

        let items = self.load_items(id).await?;
        let order = assemble_order(order_row, items)?;

        Ok(Some(order))
    }

    async fn find_all(&self) -> Result<Vec<Order>, StorageError> {
        let order_rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_id, total_cents, created_at, updated_at
             FROM orders
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        // One pass over all item rows, grouped per order.
        let mut items_by_order: HashMap<Uuid, Vec<OrderItemRow>> = HashMap::new();
        let mut stream = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, name, unit_price_cents, quantity, position
             FROM order_items
             ORDER BY order_id, position",
        )
        .fetch(&self.pool);

        while let Some(row) = stream.try_next().await? {
            items_by_order.entry(row.order_id).or_default().push(row);
        }

        let mut orders = Vec::with_capacity(order_rows.len());
        for order_row in order_rows {
            let items = items_by_order.remove(&order_row.id).unwrap_or_default();
            orders.push(assemble_order(order_row, items)?);
        }

        tracing::debug!(order_count = orders.len(), "Loaded all orders");

        Ok(orders)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Schema statements are exercised for real against Postgres; here we
    // pin the table shape they declare.
    #[test]
    fn test_schema_declares_both_tables() {
        assert!(CREATE_ORDERS_TABLE.contains("orders"));
        assert!(CREATE_ORDERS_TABLE.contains("total_cents"));
        assert!(CREATE_ORDER_ITEMS_TABLE.contains("order_items"));
        assert!(CREATE_ORDER_ITEMS_TABLE.contains("unit_price_cents"));
        assert!(CREATE_ORDER_ITEMS_TABLE.contains("position"));
    }

    #[test]
    fn test_item_rows_cascade_with_their_order() {
        // Items have no lifecycle outside their order.
        assert!(CREATE_ORDER_ITEMS_TABLE.contains("ON DELETE CASCADE"));
    }
}

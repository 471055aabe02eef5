use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::OrderItem;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// The Order exclusively owns its items; an OrderItem has no lifecycle
// outside its order. The collection is ordered and never empty. The total
// is derived at read time by summing line totals, never cached on the
// aggregate itself.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    customer_id: Uuid,
    items: Vec<OrderItem>,
}

impl Order {
    /// Build an order from an already-validated item list. Fails on an
    /// empty list.
    pub fn new(id: Uuid, customer_id: Uuid, items: Vec<OrderItem>) -> Result<Self, OrderError> {
        Self::validate_items(&items)?;

        Ok(Self {
            id,
            customer_id,
            items,
        })
    }

    fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Sum of line totals across all items, in cents.
    pub fn total_cents(&self) -> i64 {
        self.items.iter().map(OrderItem::line_total_cents).sum()
    }

    /// Replace the whole item collection. There is no incremental
    /// add/remove; callers hand over the complete new set.
    pub fn update_items(&mut self, items: Vec<OrderItem>) -> Result<(), OrderError> {
        Self::validate_items(&items)?;
        self.items = items;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_item(unit_price_cents: i64, quantity: i32) -> OrderItem {
        OrderItem::new(
            Uuid::new_v4(),
            "Mechanical keyboard",
            unit_price_cents,
            Uuid::new_v4(),
            quantity,
        )
        .unwrap()
    }

    fn create_test_order(items: Vec<OrderItem>) -> Order {
        Order::new(Uuid::new_v4(), Uuid::new_v4(), items).unwrap()
    }

    #[test]
    fn test_order_creation() {
        let id = Uuid::new_v4();
        let customer_id = Uuid::new_v4();
        let items = vec![create_test_item(4_500, 2)];

        let order = Order::new(id, customer_id, items.clone()).unwrap();

        assert_eq!(order.id(), id);
        assert_eq!(order.customer_id(), customer_id);
        assert_eq!(order.items(), items.as_slice());
    }

    #[test]
    fn test_empty_items_rejected() {
        let result = Order::new(Uuid::new_v4(), Uuid::new_v4(), vec![]);
        assert!(matches!(result, Err(OrderError::EmptyItems)));
    }

    #[test]
    fn test_total_sums_line_totals() {
        let order = create_test_order(vec![
            create_test_item(4_500, 2), // 9_000
            create_test_item(1_250, 4), // 5_000
            create_test_item(30_000, 1),
        ]);

        assert_eq!(order.total_cents(), 44_000);
    }

    #[test]
    fn test_total_is_stable_across_reads() {
        let order = create_test_order(vec![create_test_item(4_500, 3)]);

        // Re-summing at read time must not compound quantities.
        assert_eq!(order.total_cents(), 13_500);
        assert_eq!(order.total_cents(), 13_500);
    }

    #[test]
    fn test_update_items_replaces_collection() {
        let mut order = create_test_order(vec![
            create_test_item(4_500, 2),
            create_test_item(1_250, 4),
        ]);

        let replacement = vec![create_test_item(999, 5)];
        order.update_items(replacement.clone()).unwrap();

        assert_eq!(order.items(), replacement.as_slice());
        assert_eq!(order.total_cents(), 4_995);
    }

    #[test]
    fn test_update_items_rejects_empty_set() {
        let original = vec![create_test_item(4_500, 2)];
        let mut order = create_test_order(original.clone());

        let result = order.update_items(vec![]);

        assert!(matches!(result, Err(OrderError::EmptyItems)));
        // Failed replacement leaves the previous items in place.
        assert_eq!(order.items(), original.as_slice());
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let first = create_test_item(100, 1);
        let second = create_test_item(200, 1);
        let third = create_test_item(300, 1);

        let order = create_test_order(vec![first.clone(), second.clone(), third.clone()]);

        assert_eq!(order.items()[0], first);
        assert_eq!(order.items()[1], second);
        assert_eq!(order.items()[2], third);
    }
}

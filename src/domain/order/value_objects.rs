use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================
//
// OrderItem is immutable after construction. Monetary values are fixed
// integer cents. Unit price and line total are two distinct quantities:
// `unit_price_cents()` is the price of ONE unit, `line_total_cents()` is
// unit price multiplied by quantity. Persistence always stores the unit
// price; line totals are computed, never stored per item.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderItem {
    id: Uuid,
    product_id: Uuid,
    name: String,
    unit_price_cents: i64,
    quantity: i32,
}

impl OrderItem {
    /// Build a validated order line. Quantity must be at least 1 and the
    /// unit price must not be negative.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        unit_price_cents: i64,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Self, OrderError> {
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        if unit_price_cents < 0 {
            return Err(OrderError::NegativeUnitPrice(unit_price_cents));
        }

        Ok(Self {
            id,
            product_id,
            name: name.into(),
            unit_price_cents,
            quantity,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of one unit, in cents.
    pub fn unit_price_cents(&self) -> i64 {
        self.unit_price_cents
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// Unit price multiplied by quantity, in cents.
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
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
            "Keyboard",
            unit_price_cents,
            Uuid::new_v4(),
            quantity,
        )
        .unwrap()
    }

    #[test]
    fn test_order_item_creation() {
        let id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let item = OrderItem::new(id, "Keyboard", 4_500, product_id, 2).unwrap();

        assert_eq!(item.id(), id);
        assert_eq!(item.product_id(), product_id);
        assert_eq!(item.name(), "Keyboard");
        assert_eq!(item.unit_price_cents(), 4_500);
        assert_eq!(item.quantity(), 2);
    }

    #[test]
    fn test_line_total_is_unit_price_times_quantity() {
        let item = create_test_item(4_500, 3);

        assert_eq!(item.line_total_cents(), 13_500);
        // The unit price is unchanged by quantity.
        assert_eq!(item.unit_price_cents(), 4_500);
    }

    #[test]
    fn test_single_unit_line_total_equals_unit_price() {
        let item = create_test_item(999, 1);
        assert_eq!(item.line_total_cents(), item.unit_price_cents());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = OrderItem::new(Uuid::new_v4(), "Keyboard", 4_500, Uuid::new_v4(), 0);
        assert!(matches!(result, Err(OrderError::InvalidQuantity(0))));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let result = OrderItem::new(Uuid::new_v4(), "Keyboard", 4_500, Uuid::new_v4(), -2);
        assert!(matches!(result, Err(OrderError::InvalidQuantity(-2))));
    }

    #[test]
    fn test_negative_unit_price_rejected() {
        let result = OrderItem::new(Uuid::new_v4(), "Keyboard", -1, Uuid::new_v4(), 1);
        assert!(matches!(result, Err(OrderError::NegativeUnitPrice(-1))));
    }

    #[test]
    fn test_free_item_allowed() {
        let item = create_test_item(0, 4);
        assert_eq!(item.line_total_cents(), 0);
    }

    #[test]
    fn test_order_item_serialization() {
        let item = create_test_item(2_099, 3);

        let json = serde_json::to_string(&item).unwrap();
        let deserialized: OrderItem = serde_json::from_str(&json).unwrap();

        assert_eq!(item, deserialized);
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, OrderError};

// ============================================================================
// Order Repository - Persistence Contract
// ============================================================================
//
// The repository treats the relational rows as a non-authoritative
// projection of the aggregate. Stored item prices are always UNIT prices;
// the order row's total is the only denormalized derived value.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failure raised by the underlying store, carried untranslated.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Stored rows that no longer reconstruct a valid aggregate,
    /// e.g. an order row with zero item rows.
    #[error("Stored order is invalid: {0}")]
    Corrupted(#[from] OrderError),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order row and all of its item rows atomically.
    async fn create(&self, order: &Order) -> Result<(), StorageError>;

    /// Persist the current state of an existing order in one transaction:
    /// update the stored total, upsert every current item, then delete
    /// stored item rows that are no longer part of the set. Every per-item
    /// step completes before the delete runs.
    async fn update(&self, order: &Order) -> Result<(), StorageError>;

    /// Load one order with its items. Absence is `Ok(None)`, not an error.
    async fn find(&self, id: Uuid) -> Result<Option<Order>, StorageError>;

    /// Load every stored order with its items.
    async fn find_all(&self) -> Result<Vec<Order>, StorageError>;
}

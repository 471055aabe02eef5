// ============================================================================
// Storage Layer - Order Persistence
// ============================================================================
//
// The repository contract plus its two backends. Rows are a derived,
// non-authoritative projection of the domain aggregates; both backends
// share one codec (rows.rs) between domain objects and rows.
//
// ============================================================================

pub mod memory;
pub mod postgres;
pub mod repository;
pub mod rows;

pub use memory::InMemoryOrderRepository;
pub use postgres::PgOrderRepository;
pub use repository::{OrderRepository, StorageError};

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod config;
mod domain;
mod storage;

use config::AppConfig;
use domain::order::{Order, OrderItem};
use storage::{InMemoryOrderRepository, OrderRepository, PgOrderRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_store=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order store demo");

    let config = AppConfig::from_env()?;

    // === 1. Pick a storage backend ===
    let repository: Arc<dyn OrderRepository> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await?;

            let repository = PgOrderRepository::new(pool);
            repository.ensure_schema().await?;
            Arc::new(repository)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using the in-memory backend");
            Arc::new(InMemoryOrderRepository::new())
        }
    };

    // === 2. Create an order ===
    tracing::info!("📝 Demonstrating the order lifecycle");

    let customer_id = Uuid::new_v4();
    let keyboard = OrderItem::new(
        Uuid::new_v4(),
        "Mechanical keyboard",
        4_500,
        Uuid::new_v4(),
        2,
    )?;
    let monitor = OrderItem::new(Uuid::new_v4(), "27\" monitor", 25_000, Uuid::new_v4(), 1)?;

    let order = Order::new(Uuid::new_v4(), customer_id, vec![keyboard, monitor.clone()])?;
    repository.create(&order).await?;

    // === 3. Load it back ===
    let mut loaded = repository
        .find(order.id())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Order not found after create: {}", order.id()))?;
    tracing::info!(
        order_id = %loaded.id(),
        total_cents = loaded.total_cents(),
        "Loaded order back"
    );

    // === 4. Replace the item set ===
    let cable = OrderItem::new(Uuid::new_v4(), "HDMI cable", 1_200, Uuid::new_v4(), 3)?;
    loaded.update_items(vec![monitor, cable])?;
    repository.update(&loaded).await?;

    // === 5. Round-trip cycles: stored prices stay put ===
    for cycle in 1..=3 {
        let current = repository
            .find(loaded.id())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Order disappeared: {}", loaded.id()))?;
        repository.update(&current).await?;
        tracing::info!(
            cycle,
            total_cents = current.total_cents(),
            "Round-trip cycle complete"
        );
    }

    // === 6. List everything ===
    let all = repository.find_all().await?;
    tracing::info!(order_count = all.len(), "📦 Orders in store");

    tracing::info!("✨ Demo complete");
    Ok(())
}

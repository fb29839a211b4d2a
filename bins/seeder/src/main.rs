//! Database seeder for Stockbook development and testing.
//!
//! Seeds one demo organization per valuation method, each with a couple of
//! SKUs, two locations, and opening stock applied through the real
//! transaction path so cost layers and ledger history look like production
//! data.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use stockbook_core::stock::StockAction;
use stockbook_db::entities::{organizations, sea_orm_active_enums::ValuationMethod};
use stockbook_db::repositories::{
    CreateOrganizationInput, OrganizationRepository, StockMovementInput, StockRepository,
};
use stockbook_shared::Metadata;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    tracing::info!("connecting to database");
    let db = stockbook_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    for (slug, name, method) in [
        ("demo-fifo", "Demo FIFO Org", ValuationMethod::Fifo),
        ("demo-lifo", "Demo LIFO Org", ValuationMethod::Lifo),
        ("demo-wac", "Demo WAC Org", ValuationMethod::Wac),
    ] {
        seed_demo_org(&db, slug, name, method).await?;
    }

    tracing::info!("seeding complete");
    Ok(())
}

/// Seeds one demo organization with opening stock, skipping it if present.
async fn seed_demo_org(
    db: &DatabaseConnection,
    slug: &str,
    name: &str,
    method: ValuationMethod,
) -> anyhow::Result<()> {
    let existing = organizations::Entity::find()
        .filter(organizations::Column::Slug.eq(slug))
        .one(db)
        .await?;

    if existing.is_some() {
        tracing::info!(slug, "organization already exists, skipping");
        return Ok(());
    }

    let org = OrganizationRepository::new(db.clone())
        .create(CreateOrganizationInput {
            name: name.to_string(),
            slug: slug.to_string(),
            valuation_method: method,
            currency: "USD".to_string(),
        })
        .await
        .context("failed to create demo organization")?;

    let repo = StockRepository::new(db.clone());

    let receipts = [
        ("WIDGET-A", "Alloy Widget", "Main Warehouse", 100, dec!(4.25)),
        ("WIDGET-A", "Alloy Widget", "Main Warehouse", 50, dec!(4.80)),
        ("WIDGET-B", "Brass Widget", "Main Warehouse", 40, dec!(12.00)),
        ("WIDGET-B", "Brass Widget", "Storefront", 10, dec!(12.50)),
    ];

    for (code, sku_name, location, quantity, unit_cost) in receipts {
        repo.apply_transaction(StockMovementInput {
            organization_id: org.id,
            action: StockAction::Receive,
            sku_code: code.to_string(),
            sku_name: Some(sku_name.to_string()),
            location: location.to_string(),
            quantity,
            unit_cost: Some(unit_cost),
            ship_from: None,
            reason: None,
            metadata: opening_metadata(),
            actor: "seeder".to_string(),
        })
        .await
        .with_context(|| format!("failed to seed opening stock for {code} at {location}"))?;
    }

    tracing::info!(slug, org_id = %org.id, "created demo organization");
    Ok(())
}

fn opening_metadata() -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("source", "seeder");
    meta.insert("batch", Uuid::new_v4().to_string());
    meta
}

//! Initial database migration.
//!
//! Creates the enums, tables, constraints, and indexes for the inventory
//! ledger: organizations, SKUs, locations, stock transactions, stock states,
//! and cost layers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY & CATALOG
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(SKUS_SQL).await?;
        db.execute_unprepared(LOCATIONS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER & STATE
        // ============================================================
        db.execute_unprepared(STOCK_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(STOCK_STATES_SQL).await?;
        db.execute_unprepared(COST_LAYERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Valuation method for cost layer consumption
CREATE TYPE valuation_method AS ENUM (
    'fifo',
    'lifo',
    'wac'
);

-- Stock movement action
CREATE TYPE stock_action AS ENUM (
    'receive',
    'ship',
    'adjust',
    'reserve',
    'unreserve',
    'transfer_out',
    'transfer_in'
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(255) NOT NULL UNIQUE,
    valuation_method valuation_method NOT NULL DEFAULT 'fifo',
    currency VARCHAR(3) NOT NULL DEFAULT 'USD',
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const SKUS_SQL: &str = r"
CREATE TABLE skus (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    code VARCHAR(100) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_skus_org_code UNIQUE (organization_id, code)
);

CREATE INDEX idx_skus_org ON skus(organization_id);
";

const LOCATIONS_SQL: &str = r"
CREATE TABLE locations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_locations_org_name UNIQUE (organization_id, name)
);

CREATE INDEX idx_locations_org ON locations(organization_id);
";

const STOCK_TRANSACTIONS_SQL: &str = r"
CREATE TABLE stock_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    sku_id UUID NOT NULL REFERENCES skus(id),
    location_id UUID NOT NULL REFERENCES locations(id),
    action stock_action NOT NULL,
    quantity BIGINT NOT NULL,
    qty_before BIGINT NOT NULL,
    total_cost_minor BIGINT,
    metadata JSONB NOT NULL DEFAULT '{}',
    actor VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_stock_transactions_org_sku ON stock_transactions(organization_id, sku_id);
CREATE INDEX idx_stock_transactions_org_created ON stock_transactions(organization_id, created_at);
";

const STOCK_STATES_SQL: &str = r"
CREATE TABLE stock_states (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    sku_id UUID NOT NULL REFERENCES skus(id),
    location_id UUID NOT NULL REFERENCES locations(id),
    on_hand BIGINT NOT NULL DEFAULT 0,
    reserved BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_stock_states_key UNIQUE (organization_id, sku_id, location_id),
    CONSTRAINT ck_stock_states_on_hand CHECK (on_hand >= 0),
    CONSTRAINT ck_stock_states_reserved CHECK (reserved >= 0 AND reserved <= on_hand)
);
";

const COST_LAYERS_SQL: &str = r"
CREATE TABLE cost_layers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    sku_id UUID NOT NULL REFERENCES skus(id),
    location_id UUID NOT NULL REFERENCES locations(id),
    transaction_id UUID NOT NULL REFERENCES stock_transactions(id),
    qty_in BIGINT NOT NULL,
    qty_remaining BIGINT NOT NULL,
    unit_cost_minor BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT ck_cost_layers_qty_in CHECK (qty_in > 0),
    CONSTRAINT ck_cost_layers_remaining CHECK (qty_remaining >= 0 AND qty_remaining <= qty_in),
    CONSTRAINT ck_cost_layers_unit_cost CHECK (unit_cost_minor >= 0)
);

CREATE INDEX idx_cost_layers_key ON cost_layers(organization_id, sku_id, location_id)
    WHERE qty_remaining > 0;
CREATE INDEX idx_cost_layers_created ON cost_layers(organization_id, sku_id, location_id, created_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS cost_layers;
DROP TABLE IF EXISTS stock_states;
DROP TABLE IF EXISTS stock_transactions;
DROP TABLE IF EXISTS locations;
DROP TABLE IF EXISTS skus;
DROP TABLE IF EXISTS organizations;
DROP TYPE IF EXISTS stock_action;
DROP TYPE IF EXISTS valuation_method;
";

use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS agents (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    working_area TEXT,
    commission NUMERIC NOT NULL DEFAULT 0,
    phone TEXT,
    country TEXT
);

CREATE TABLE IF NOT EXISTS customers (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL CHECK (name <> ''),
    city TEXT,
    country TEXT,
    grade TEXT,
    phone TEXT,
    working_area TEXT,
    opening_amount NUMERIC NOT NULL DEFAULT 0,
    outstanding_amount NUMERIC NOT NULL DEFAULT 0,
    payment_amount NUMERIC NOT NULL DEFAULT 0,
    receive_amount NUMERIC NOT NULL DEFAULT 0,
    agent_id BIGINT NOT NULL REFERENCES agents (id)
);

CREATE INDEX IF NOT EXISTS idx_customers_agent ON customers (agent_id);

CREATE TABLE IF NOT EXISTS payments (
    id BIGSERIAL PRIMARY KEY,
    payment_type TEXT NOT NULL,
    amount NUMERIC NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS orders (
    id BIGSERIAL PRIMARY KEY,
    amount NUMERIC NOT NULL DEFAULT 0,
    advance_amount NUMERIC NOT NULL DEFAULT 0,
    description TEXT,
    customer_id BIGINT NOT NULL REFERENCES customers (id)
);

CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders (customer_id);

CREATE TABLE IF NOT EXISTS order_payments (
    order_id BIGINT NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
    payment_id BIGINT NOT NULL REFERENCES payments (id),
    position INT NOT NULL,
    PRIMARY KEY (order_id, position)
);

-- Databases bootstrapped with fixed-scale amount columns.
ALTER TABLE agents ALTER COLUMN commission TYPE NUMERIC;
ALTER TABLE customers
    ALTER COLUMN opening_amount TYPE NUMERIC,
    ALTER COLUMN outstanding_amount TYPE NUMERIC,
    ALTER COLUMN payment_amount TYPE NUMERIC,
    ALTER COLUMN receive_amount TYPE NUMERIC;
ALTER TABLE payments ALTER COLUMN amount TYPE NUMERIC;
ALTER TABLE orders
    ALTER COLUMN amount TYPE NUMERIC,
    ALTER COLUMN advance_amount TYPE NUMERIC;
"#;

pub async fn connect_database(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    info!(max_connections, "connected to postgres");
    Ok(pool)
}

/// Creates the four record tables and the order/payment link table.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .context("failed to initialize orderdesk schema")?;

    debug!("orderdesk schema ready");
    Ok(())
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use orderdesk_core::{
    Agent, Customer, DeskError, EntityKind, Order, Payment, RecordId, RecordStore, RecordTx,
};
use rust_decimal::Decimal;
use sqlx::{Connection, PgPool, Postgres, Row, Transaction, postgres::PgRow};

const ORDER_SELECT: &str = r#"
    SELECT
        o.id,
        o.amount,
        o.advance_amount,
        o.description,
        o.customer_id,
        COALESCE(
            array_agg(op.payment_id ORDER BY op.position) FILTER (WHERE op.payment_id IS NOT NULL),
            '{}'
        ) AS payment_ids
    FROM orders o
    LEFT JOIN order_payments op ON op.order_id = o.id
"#;

const CUSTOMER_SELECT: &str = r#"
    SELECT
        id, name, city, country, grade, phone, working_area,
        opening_amount, outstanding_amount, payment_amount, receive_amount, agent_id
    FROM customers
"#;

/// Postgres-backed gateway; each desk transaction is one database transaction.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn begin(&self) -> Result<Box<dyn RecordTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .context("failed to open transaction")?;
        Ok(Box::new(PgRecordTx { tx }))
    }
}

struct PgRecordTx {
    tx: Transaction<'static, Postgres>,
}

fn db_id(id: RecordId) -> Result<i64> {
    i64::try_from(id).with_context(|| format!("id {id} exceeds the database key range"))
}

/// `0` asks the table sequence for a fresh key.
fn requested_id(id: RecordId) -> Result<Option<i64>> {
    if id == 0 { Ok(None) } else { db_id(id).map(Some) }
}

fn record_id(raw: i64) -> Result<RecordId> {
    RecordId::try_from(raw).with_context(|| format!("negative key {raw} in database"))
}

fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

fn agent_from_row(row: &PgRow) -> Result<Agent> {
    Ok(Agent {
        id: record_id(row.try_get("id")?)?,
        name: row.try_get("name")?,
        working_area: row.try_get("working_area")?,
        commission: row.try_get("commission")?,
        phone: row.try_get("phone")?,
        country: row.try_get("country")?,
    })
}

fn customer_from_row(row: &PgRow) -> Result<Customer> {
    Ok(Customer {
        id: record_id(row.try_get("id")?)?,
        name: row.try_get("name")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        grade: row.try_get("grade")?,
        phone: row.try_get("phone")?,
        working_area: row.try_get("working_area")?,
        opening_amount: row.try_get("opening_amount")?,
        outstanding_amount: row.try_get("outstanding_amount")?,
        payment_amount: row.try_get("payment_amount")?,
        receive_amount: row.try_get("receive_amount")?,
        agent_id: record_id(row.try_get("agent_id")?)?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order> {
    let payment_ids: Vec<i64> = row.try_get("payment_ids")?;
    Ok(Order {
        id: record_id(row.try_get("id")?)?,
        amount: row.try_get("amount")?,
        advance_amount: row.try_get("advance_amount")?,
        description: row.try_get("description")?,
        customer_id: record_id(row.try_get("customer_id")?)?,
        payment_ids: payment_ids
            .into_iter()
            .map(record_id)
            .collect::<Result<_>>()?,
    })
}

fn payment_from_row(row: &PgRow) -> Result<Payment> {
    Ok(Payment {
        id: record_id(row.try_get("id")?)?,
        payment_type: row.try_get("payment_type")?,
        amount: row.try_get("amount")?,
    })
}

#[async_trait]
impl RecordTx for PgRecordTx {
    async fn agent(&mut self, id: RecordId) -> Result<Option<Agent>> {
        let row = sqlx::query(
            "SELECT id, name, working_area, commission, phone, country FROM agents WHERE id = $1",
        )
        .bind(db_id(id)?)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(agent_from_row).transpose()
    }

    async fn save_agent(&mut self, agent: Agent) -> Result<Agent> {
        let row = sqlx::query(
            r#"
            INSERT INTO agents (id, name, working_area, commission, phone, country)
            VALUES (COALESCE($1, nextval(pg_get_serial_sequence('agents', 'id'))), $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                working_area = EXCLUDED.working_area,
                commission = EXCLUDED.commission,
                phone = EXCLUDED.phone,
                country = EXCLUDED.country
            RETURNING id, name, working_area, commission, phone, country
            "#,
        )
        .bind(requested_id(agent.id)?)
        .bind(&agent.name)
        .bind(&agent.working_area)
        .bind(agent.commission)
        .bind(&agent.phone)
        .bind(&agent.country)
        .fetch_one(&mut *self.tx)
        .await
        .context("failed to save agent")?;

        agent_from_row(&row)
    }

    /// A customer committed after the caller's reference check trips the
    /// foreign key; that surfaces as `AlreadyReferenced`, not a storage fault.
    async fn delete_agent(&mut self, id: RecordId) -> Result<bool> {
        let key = db_id(id)?;
        let mut savepoint = Connection::begin(&mut *self.tx).await?;
        let outcome = sqlx::query("DELETE FROM agents WHERE id = $1")
            .bind(key)
            .execute(&mut *savepoint)
            .await;

        match outcome {
            Ok(result) => {
                savepoint.commit().await?;
                Ok(result.rows_affected() > 0)
            }
            Err(err) if is_foreign_key_violation(&err) => {
                savepoint.rollback().await?;
                match self.first_customer_for_agent(id).await? {
                    Some(customer) => Err(DeskError::AlreadyReferenced {
                        kind: EntityKind::Agent,
                        id,
                        referrer: EntityKind::Customer,
                        referrer_id: customer.id,
                    }
                    .into()),
                    None => Err(anyhow::Error::new(err).context("failed to delete agent")),
                }
            }
            Err(err) => Err(anyhow::Error::new(err).context("failed to delete agent")),
        }
    }

    async fn customer(&mut self, id: RecordId) -> Result<Option<Customer>> {
        let sql = format!("{CUSTOMER_SELECT} WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(db_id(id)?)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(customer_from_row).transpose()
    }

    async fn customers(&mut self) -> Result<Vec<Customer>> {
        let sql = format!("{CUSTOMER_SELECT} ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&mut *self.tx).await?;

        rows.iter().map(customer_from_row).collect()
    }

    async fn customers_named_like(&mut self, fragment: &str) -> Result<Vec<Customer>> {
        let sql = format!("{CUSTOMER_SELECT} WHERE name ILIKE $1 ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(like_pattern(fragment))
            .fetch_all(&mut *self.tx)
            .await?;

        rows.iter().map(customer_from_row).collect()
    }

    async fn first_customer_for_agent(&mut self, agent_id: RecordId) -> Result<Option<Customer>> {
        let sql = format!("{CUSTOMER_SELECT} WHERE agent_id = $1 ORDER BY id LIMIT 1");
        let row = sqlx::query(&sql)
            .bind(db_id(agent_id)?)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(customer_from_row).transpose()
    }

    async fn save_customer(&mut self, customer: Customer) -> Result<Customer> {
        let row = sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, city, country, grade, phone, working_area,
                opening_amount, outstanding_amount, payment_amount, receive_amount, agent_id
            )
            VALUES (
                COALESCE($1, nextval(pg_get_serial_sequence('customers', 'id'))),
                $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
            )
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                city = EXCLUDED.city,
                country = EXCLUDED.country,
                grade = EXCLUDED.grade,
                phone = EXCLUDED.phone,
                working_area = EXCLUDED.working_area,
                opening_amount = EXCLUDED.opening_amount,
                outstanding_amount = EXCLUDED.outstanding_amount,
                payment_amount = EXCLUDED.payment_amount,
                receive_amount = EXCLUDED.receive_amount,
                agent_id = EXCLUDED.agent_id
            RETURNING
                id, name, city, country, grade, phone, working_area,
                opening_amount, outstanding_amount, payment_amount, receive_amount, agent_id
            "#,
        )
        .bind(requested_id(customer.id)?)
        .bind(&customer.name)
        .bind(&customer.city)
        .bind(&customer.country)
        .bind(&customer.grade)
        .bind(&customer.phone)
        .bind(&customer.working_area)
        .bind(customer.opening_amount)
        .bind(customer.outstanding_amount)
        .bind(customer.payment_amount)
        .bind(customer.receive_amount)
        .bind(db_id(customer.agent_id)?)
        .fetch_one(&mut *self.tx)
        .await
        .context("failed to save customer")?;

        customer_from_row(&row)
    }

    async fn delete_customer(&mut self, id: RecordId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(db_id(id)?)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn order(&mut self, id: RecordId) -> Result<Option<Order>> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1 GROUP BY o.id");
        let row = sqlx::query(&sql)
            .bind(db_id(id)?)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn orders_for_customer(&mut self, customer_id: RecordId) -> Result<Vec<Order>> {
        let sql = format!("{ORDER_SELECT} WHERE o.customer_id = $1 GROUP BY o.id ORDER BY o.id");
        let rows = sqlx::query(&sql)
            .bind(db_id(customer_id)?)
            .fetch_all(&mut *self.tx)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn orders_with_advance_above(&mut self, threshold: Decimal) -> Result<Vec<Order>> {
        let sql = format!("{ORDER_SELECT} WHERE o.advance_amount > $1 GROUP BY o.id ORDER BY o.id");
        let rows = sqlx::query(&sql)
            .bind(threshold)
            .fetch_all(&mut *self.tx)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn save_order(&mut self, order: Order) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (id, amount, advance_amount, description, customer_id)
            VALUES (COALESCE($1, nextval(pg_get_serial_sequence('orders', 'id'))), $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                amount = EXCLUDED.amount,
                advance_amount = EXCLUDED.advance_amount,
                description = EXCLUDED.description,
                customer_id = EXCLUDED.customer_id
            RETURNING id, amount, advance_amount, description, customer_id
            "#,
        )
        .bind(requested_id(order.id)?)
        .bind(order.amount)
        .bind(order.advance_amount)
        .bind(&order.description)
        .bind(db_id(order.customer_id)?)
        .fetch_one(&mut *self.tx)
        .await
        .context("failed to save order")?;
        let order_id: i64 = row.try_get("id")?;

        sqlx::query("DELETE FROM order_payments WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *self.tx)
            .await?;

        for (position, payment_id) in order.payment_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_payments (order_id, payment_id, position) VALUES ($1, $2, $3)",
            )
            .bind(order_id)
            .bind(db_id(*payment_id)?)
            .bind(i32::try_from(position).context("too many payments on one order")?)
            .execute(&mut *self.tx)
            .await
            .context("failed to link payment to order")?;
        }

        Ok(Order {
            id: record_id(order_id)?,
            amount: row.try_get("amount")?,
            advance_amount: row.try_get("advance_amount")?,
            description: row.try_get("description")?,
            customer_id: record_id(row.try_get("customer_id")?)?,
            payment_ids: order.payment_ids,
        })
    }

    async fn delete_order(&mut self, id: RecordId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(db_id(id)?)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn payment(&mut self, id: RecordId) -> Result<Option<Payment>> {
        let row = sqlx::query("SELECT id, payment_type, amount FROM payments WHERE id = $1")
            .bind(db_id(id)?)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(payment_from_row).transpose()
    }

    async fn save_payment(&mut self, payment: Payment) -> Result<Payment> {
        let row = sqlx::query(
            r#"
            INSERT INTO payments (id, payment_type, amount)
            VALUES (COALESCE($1, nextval(pg_get_serial_sequence('payments', 'id'))), $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                payment_type = EXCLUDED.payment_type,
                amount = EXCLUDED.amount
            RETURNING id, payment_type, amount
            "#,
        )
        .bind(requested_id(payment.id)?)
        .bind(&payment.payment_type)
        .bind(payment.amount)
        .fetch_one(&mut *self.tx)
        .await
        .context("failed to save payment")?;

        payment_from_row(&row)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PgRecordTx { tx } = *self;
        tx.commit().await.context("failed to commit transaction")?;
        Ok(())
    }
}

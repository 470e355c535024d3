use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{Agent, Customer, Order, Payment, RecordId};

/// Entry point to a persistence gateway. Every desk operation runs inside a
/// single transaction obtained here.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn begin(&self) -> anyhow::Result<Box<dyn RecordTx>>;
}

/// One unit of work over the agent, customer, order and payment tables.
///
/// Saving a record whose id is `0` assigns a fresh id; any other id is an
/// insert-or-replace keyed by that id. Dropping the transaction without
/// calling [`RecordTx::commit`] discards every write made through it.
#[async_trait]
pub trait RecordTx: Send {
    async fn agent(&mut self, id: RecordId) -> anyhow::Result<Option<Agent>>;
    async fn save_agent(&mut self, agent: Agent) -> anyhow::Result<Agent>;
    async fn delete_agent(&mut self, id: RecordId) -> anyhow::Result<bool>;

    async fn customer(&mut self, id: RecordId) -> anyhow::Result<Option<Customer>>;
    async fn customers(&mut self) -> anyhow::Result<Vec<Customer>>;
    /// Case-insensitive substring match on the customer name.
    async fn customers_named_like(&mut self, fragment: &str) -> anyhow::Result<Vec<Customer>>;
    async fn first_customer_for_agent(
        &mut self,
        agent_id: RecordId,
    ) -> anyhow::Result<Option<Customer>>;
    async fn save_customer(&mut self, customer: Customer) -> anyhow::Result<Customer>;
    async fn delete_customer(&mut self, id: RecordId) -> anyhow::Result<bool>;

    async fn order(&mut self, id: RecordId) -> anyhow::Result<Option<Order>>;
    async fn orders_for_customer(&mut self, customer_id: RecordId) -> anyhow::Result<Vec<Order>>;
    /// Orders whose advance amount is strictly greater than `threshold`.
    async fn orders_with_advance_above(
        &mut self,
        threshold: Decimal,
    ) -> anyhow::Result<Vec<Order>>;
    async fn save_order(&mut self, order: Order) -> anyhow::Result<Order>;
    async fn delete_order(&mut self, id: RecordId) -> anyhow::Result<bool>;

    async fn payment(&mut self, id: RecordId) -> anyhow::Result<Option<Payment>>;
    async fn save_payment(&mut self, payment: Payment) -> anyhow::Result<Payment>;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}

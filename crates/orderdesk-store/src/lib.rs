use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use orderdesk_core::{Agent, Customer, Order, Payment, RecordId, RecordStore, RecordTx};
use rust_decimal::Decimal;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

#[derive(Debug, Clone, Default)]
struct Tables {
    agents: BTreeMap<RecordId, Agent>,
    customers: BTreeMap<RecordId, Customer>,
    orders: BTreeMap<RecordId, Order>,
    payments: BTreeMap<RecordId, Payment>,
    // One sequence across all tables, so an id is never reused anywhere.
    last_id: RecordId,
}

impl Tables {
    fn assign_id(&mut self, requested: RecordId) -> RecordId {
        if requested == 0 {
            self.last_id += 1;
            self.last_id
        } else {
            self.last_id = self.last_id.max(requested);
            requested
        }
    }
}

/// Process-local gateway. Transactions are serialized: each holds the write
/// lock and mutates a private copy that replaces the tables on commit.
///
/// Read-only transactions take the same lock and copy, so lookups queue behind
/// writers and every `begin` costs time proportional to the stored rows. Fine
/// for development and tests; use the Postgres gateway for real load.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn begin(&self) -> anyhow::Result<Box<dyn RecordTx>> {
        let guard = Arc::clone(&self.tables).write_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTx { guard, working }))
    }
}

struct InMemoryTx {
    guard: OwnedRwLockWriteGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl RecordTx for InMemoryTx {
    async fn agent(&mut self, id: RecordId) -> anyhow::Result<Option<Agent>> {
        Ok(self.working.agents.get(&id).cloned())
    }

    async fn save_agent(&mut self, mut agent: Agent) -> anyhow::Result<Agent> {
        agent.id = self.working.assign_id(agent.id);
        self.working.agents.insert(agent.id, agent.clone());
        Ok(agent)
    }

    async fn delete_agent(&mut self, id: RecordId) -> anyhow::Result<bool> {
        Ok(self.working.agents.remove(&id).is_some())
    }

    async fn customer(&mut self, id: RecordId) -> anyhow::Result<Option<Customer>> {
        Ok(self.working.customers.get(&id).cloned())
    }

    async fn customers(&mut self) -> anyhow::Result<Vec<Customer>> {
        Ok(self.working.customers.values().cloned().collect())
    }

    async fn customers_named_like(&mut self, fragment: &str) -> anyhow::Result<Vec<Customer>> {
        let needle = fragment.to_lowercase();
        Ok(self
            .working
            .customers
            .values()
            .filter(|customer| customer.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn first_customer_for_agent(
        &mut self,
        agent_id: RecordId,
    ) -> anyhow::Result<Option<Customer>> {
        Ok(self
            .working
            .customers
            .values()
            .find(|customer| customer.agent_id == agent_id)
            .cloned())
    }

    async fn save_customer(&mut self, mut customer: Customer) -> anyhow::Result<Customer> {
        customer.id = self.working.assign_id(customer.id);
        self.working.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn delete_customer(&mut self, id: RecordId) -> anyhow::Result<bool> {
        Ok(self.working.customers.remove(&id).is_some())
    }

    async fn order(&mut self, id: RecordId) -> anyhow::Result<Option<Order>> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn orders_for_customer(&mut self, customer_id: RecordId) -> anyhow::Result<Vec<Order>> {
        Ok(self
            .working
            .orders
            .values()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn orders_with_advance_above(
        &mut self,
        threshold: Decimal,
    ) -> anyhow::Result<Vec<Order>> {
        Ok(self
            .working
            .orders
            .values()
            .filter(|order| order.advance_amount > threshold)
            .cloned()
            .collect())
    }

    async fn save_order(&mut self, mut order: Order) -> anyhow::Result<Order> {
        order.id = self.working.assign_id(order.id);
        self.working.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete_order(&mut self, id: RecordId) -> anyhow::Result<bool> {
        Ok(self.working.orders.remove(&id).is_some())
    }

    async fn payment(&mut self, id: RecordId) -> anyhow::Result<Option<Payment>> {
        Ok(self.working.payments.get(&id).cloned())
    }

    async fn save_payment(&mut self, mut payment: Payment) -> anyhow::Result<Payment> {
        payment.id = self.working.assign_id(payment.id);
        self.working.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let InMemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

use std::collections::HashSet;

use orderdesk_core::{CustomerInput, CustomerView, DeskError, DeskResult, EntityKind, RecordId};
use tracing::info;

use crate::{
    OrderDesk,
    merge::{merge_customer, order_from_line, replacement_customer},
    resolve::{customer_view, require_agent, require_customer, resolve_payments},
};

impl OrderDesk {
    /// Inserts a customer when `input.id` is zero, otherwise replaces the
    /// stored one wholesale, including its order collection.
    pub async fn create_or_replace_customer(
        &self,
        input: CustomerInput,
    ) -> DeskResult<CustomerView> {
        let agent_ref = input
            .agent
            .ok_or_else(|| DeskError::validation("customer agent is required"))?;
        let record = replacement_customer(&input, agent_ref.id)?;

        let mut tx = self.store.begin().await?;
        require_agent(tx.as_mut(), agent_ref.id).await?;

        let existing_orders = if input.id == 0 {
            Vec::new()
        } else {
            require_customer(tx.as_mut(), input.id).await?;
            tx.orders_for_customer(input.id).await?
        };

        let customer = tx.save_customer(record).await?;

        let mut kept = HashSet::new();
        for line in &input.orders {
            if line.id != 0 && !existing_orders.iter().any(|order| order.id == line.id) {
                return Err(DeskError::not_found(EntityKind::Order, line.id));
            }
            let payment_ids = resolve_payments(tx.as_mut(), &line.payments).await?;
            let saved = tx
                .save_order(order_from_line(line.id, line, customer.id, payment_ids))
                .await?;
            kept.insert(saved.id);
        }

        let mut orphans_removed = 0;
        for orphan in existing_orders
            .iter()
            .filter(|order| !kept.contains(&order.id))
        {
            tx.delete_order(orphan.id).await?;
            orphans_removed += 1;
        }

        let view = customer_view(tx.as_mut(), customer).await?;
        tx.commit().await?;

        info!(
            customer_id = view.id,
            agent_id = view.agent.id,
            orders = view.orders.len(),
            orphans_removed,
            replaced = input.id != 0,
            "customer saved"
        );
        Ok(view)
    }

    /// Merges the supplied fields into the stored customer. Order lines are
    /// appended as new orders; existing orders are left alone.
    pub async fn update_customer(
        &self,
        id: RecordId,
        patch: CustomerInput,
    ) -> DeskResult<CustomerView> {
        let mut tx = self.store.begin().await?;
        let mut customer = require_customer(tx.as_mut(), id).await?;

        merge_customer(&mut customer, &patch)?;
        if let Some(agent_ref) = patch.agent {
            customer.agent_id = require_agent(tx.as_mut(), agent_ref.id).await?.id;
        }
        let customer = tx.save_customer(customer).await?;

        for line in &patch.orders {
            let payment_ids = resolve_payments(tx.as_mut(), &line.payments).await?;
            tx.save_order(order_from_line(0, line, customer.id, payment_ids))
                .await?;
        }

        let view = customer_view(tx.as_mut(), customer).await?;
        tx.commit().await?;

        info!(
            customer_id = id,
            orders_appended = patch.orders.len(),
            "customer updated"
        );
        Ok(view)
    }

    /// Deletes the customer's orders, then the customer. Payments stay.
    pub async fn delete_customer(&self, id: RecordId) -> DeskResult<()> {
        let mut tx = self.store.begin().await?;
        require_customer(tx.as_mut(), id).await?;

        let orders = tx.orders_for_customer(id).await?;
        for order in &orders {
            tx.delete_order(order.id).await?;
        }
        tx.delete_customer(id).await?;
        tx.commit().await?;

        info!(
            customer_id = id,
            orders_removed = orders.len(),
            "customer deleted"
        );
        Ok(())
    }

    pub async fn get_customer(&self, id: RecordId) -> DeskResult<CustomerView> {
        let mut tx = self.store.begin().await?;
        let customer = require_customer(tx.as_mut(), id).await?;
        customer_view(tx.as_mut(), customer).await
    }

    pub async fn list_customers(&self) -> DeskResult<Vec<CustomerView>> {
        let mut tx = self.store.begin().await?;
        let mut views = Vec::new();
        for customer in tx.customers().await? {
            views.push(customer_view(tx.as_mut(), customer).await?);
        }
        Ok(views)
    }

    pub async fn find_customers_named_like(
        &self,
        fragment: &str,
    ) -> DeskResult<Vec<CustomerView>> {
        let mut tx = self.store.begin().await?;
        let mut views = Vec::new();
        for customer in tx.customers_named_like(fragment).await? {
            views.push(customer_view(tx.as_mut(), customer).await?);
        }
        Ok(views)
    }
}

use orderdesk_core::{
    CustomerRef, DeskError, DeskResult, EntityKind, Order, OrderInput, OrderView, RecordId,
};
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    OrderDesk,
    resolve::{order_view, require_customer, require_order, resolve_payments, standalone_order_view},
};

impl OrderDesk {
    /// Builds a fresh order from `input`. A non-zero id must name an existing
    /// order, which is overwritten; otherwise a new id is assigned.
    pub async fn create_or_replace_order(&self, input: OrderInput) -> DeskResult<OrderView> {
        let customer_ref = input
            .customer
            .ok_or_else(|| DeskError::validation("order customer is required"))?;

        let mut tx = self.store.begin().await?;
        let customer = require_customer(tx.as_mut(), customer_ref.id).await?;
        let payment_ids = resolve_payments(tx.as_mut(), &input.payments).await?;
        if input.id != 0 {
            require_order(tx.as_mut(), input.id).await?;
        }

        let order = tx
            .save_order(Order {
                id: input.id,
                amount: input.amount,
                advance_amount: input.advance_amount,
                description: input.description,
                customer_id: customer.id,
                payment_ids,
            })
            .await?;

        let view = order_view(tx.as_mut(), order, CustomerRef::from(&customer)).await?;
        tx.commit().await?;

        info!(
            order_id = view.id,
            customer_id = customer.id,
            payments = view.payments.len(),
            replaced = input.id != 0,
            "order saved"
        );
        Ok(view)
    }

    /// Removes the order row only; its payments stay.
    pub async fn delete_order(&self, id: RecordId) -> DeskResult<()> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_order(id).await? {
            return Err(DeskError::not_found(EntityKind::Order, id));
        }
        tx.commit().await?;

        info!(order_id = id, "order deleted");
        Ok(())
    }

    pub async fn get_order(&self, id: RecordId) -> DeskResult<OrderView> {
        let mut tx = self.store.begin().await?;
        let order = require_order(tx.as_mut(), id).await?;
        standalone_order_view(tx.as_mut(), order).await
    }

    /// Orders with an advance amount greater than zero.
    pub async fn orders_with_advance(&self) -> DeskResult<Vec<OrderView>> {
        let mut tx = self.store.begin().await?;
        let mut views = Vec::new();
        for order in tx.orders_with_advance_above(Decimal::ZERO).await? {
            views.push(standalone_order_view(tx.as_mut(), order).await?);
        }
        Ok(views)
    }
}

use orderdesk_core::{
    Agent, Customer, CustomerRef, CustomerView, DeskError, DeskResult, EntityKind, Order,
    OrderView, Payment, RecordId, RecordRef, RecordTx,
};

pub(crate) async fn require_agent(tx: &mut dyn RecordTx, id: RecordId) -> DeskResult<Agent> {
    tx.agent(id)
        .await?
        .ok_or_else(|| DeskError::not_found(EntityKind::Agent, id))
}

pub(crate) async fn require_customer(
    tx: &mut dyn RecordTx,
    id: RecordId,
) -> DeskResult<Customer> {
    tx.customer(id)
        .await?
        .ok_or_else(|| DeskError::not_found(EntityKind::Customer, id))
}

pub(crate) async fn require_order(tx: &mut dyn RecordTx, id: RecordId) -> DeskResult<Order> {
    tx.order(id)
        .await?
        .ok_or_else(|| DeskError::not_found(EntityKind::Order, id))
}

pub(crate) async fn require_payment(tx: &mut dyn RecordTx, id: RecordId) -> DeskResult<Payment> {
    tx.payment(id)
        .await?
        .ok_or_else(|| DeskError::not_found(EntityKind::Payment, id))
}

/// Payments must already exist; an order never creates one.
pub(crate) async fn resolve_payments(
    tx: &mut dyn RecordTx,
    refs: &[RecordRef],
) -> DeskResult<Vec<RecordId>> {
    let mut ids = Vec::with_capacity(refs.len());
    for payment in refs {
        ids.push(require_payment(tx, payment.id).await?.id);
    }
    Ok(ids)
}

pub(crate) async fn order_view(
    tx: &mut dyn RecordTx,
    order: Order,
    customer: CustomerRef,
) -> DeskResult<OrderView> {
    let mut payments = Vec::with_capacity(order.payment_ids.len());
    for payment_id in &order.payment_ids {
        payments.push(require_payment(tx, *payment_id).await?);
    }

    Ok(OrderView {
        id: order.id,
        amount: order.amount,
        advance_amount: order.advance_amount,
        description: order.description,
        customer,
        payments,
    })
}

pub(crate) async fn standalone_order_view(
    tx: &mut dyn RecordTx,
    order: Order,
) -> DeskResult<OrderView> {
    let customer = require_customer(tx, order.customer_id).await?;
    order_view(tx, order, CustomerRef::from(&customer)).await
}

/// Rebuilds the customer's order collection from the order table.
pub(crate) async fn customer_view(
    tx: &mut dyn RecordTx,
    customer: Customer,
) -> DeskResult<CustomerView> {
    let agent = require_agent(tx, customer.agent_id).await?;
    let reference = CustomerRef::from(&customer);

    let mut orders = Vec::new();
    for order in tx.orders_for_customer(customer.id).await? {
        orders.push(order_view(tx, order, reference.clone()).await?);
    }

    Ok(CustomerView::assemble(customer, agent, orders))
}

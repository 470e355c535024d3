#![allow(dead_code)]

use std::sync::Arc;

use orderdesk_core::{
    Agent, AgentInput, CustomerInput, CustomerView, OrderLineInput, Payment, PaymentInput,
    RecordRef,
};
use orderdesk_service::OrderDesk;
use orderdesk_store::InMemoryStore;
use rust_decimal::Decimal;

pub fn desk() -> OrderDesk {
    OrderDesk::new(Arc::new(InMemoryStore::new()))
}

pub fn amount(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

pub async fn agent(desk: &OrderDesk, name: &str) -> Agent {
    desk.create_agent(AgentInput {
        name: name.to_string(),
        working_area: Some("London".to_string()),
        commission: Decimal::new(13, 2),
        phone: Some("077-12346674".to_string()),
        country: None,
    })
    .await
    .expect("agent created")
}

pub async fn payment(desk: &OrderDesk, payment_type: &str) -> Payment {
    desk.create_payment(PaymentInput {
        payment_type: payment_type.to_string(),
        amount: amount(0),
    })
    .await
    .expect("payment created")
}

pub fn order_line(amount_value: i64, advance: i64, payments: &[&Payment]) -> OrderLineInput {
    OrderLineInput {
        id: 0,
        amount: amount(amount_value),
        advance_amount: amount(advance),
        description: Some("SOD".to_string()),
        payments: payments.iter().map(|p| RecordRef::new(p.id)).collect(),
    }
}

pub fn customer_input(name: &str, agent: &Agent) -> CustomerInput {
    CustomerInput {
        name: Some(name.to_string()),
        city: Some("New York".to_string()),
        country: Some("USA".to_string()),
        grade: Some("2".to_string()),
        phone: Some("CCCCCCC".to_string()),
        working_area: Some("New York".to_string()),
        opening_amount: Some(amount(3000)),
        outstanding_amount: Some(amount(6000)),
        payment_amount: Some(amount(5000)),
        receive_amount: Some(amount(2000)),
        agent: Some(RecordRef::new(agent.id)),
        ..CustomerInput::default()
    }
}

pub async fn customer(desk: &OrderDesk, name: &str, agent: &Agent) -> CustomerView {
    desk.create_or_replace_customer(customer_input(name, agent))
        .await
        .expect("customer created")
}

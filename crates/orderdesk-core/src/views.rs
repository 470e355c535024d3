use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Agent, Customer, Payment, RecordId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerRef {
    pub id: RecordId,
    pub name: String,
}

impl From<&Customer> for CustomerRef {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderView {
    pub id: RecordId,
    pub amount: Decimal,
    pub advance_amount: Decimal,
    pub description: Option<String>,
    pub customer: CustomerRef,
    pub payments: Vec<Payment>,
}

/// A customer with its agent resolved and its orders gathered by lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerView {
    pub id: RecordId,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub grade: Option<String>,
    pub phone: Option<String>,
    pub working_area: Option<String>,
    pub opening_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub payment_amount: Decimal,
    pub receive_amount: Decimal,
    pub agent: Agent,
    pub orders: Vec<OrderView>,
}

impl CustomerView {
    pub fn assemble(customer: Customer, agent: Agent, orders: Vec<OrderView>) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            city: customer.city,
            country: customer.country,
            grade: customer.grade,
            phone: customer.phone,
            working_area: customer.working_area,
            opening_amount: customer.opening_amount,
            outstanding_amount: customer.outstanding_amount,
            payment_amount: customer.payment_amount,
            receive_amount: customer.receive_amount,
            agent,
            orders,
        }
    }
}

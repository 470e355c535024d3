//! Request payloads accepted by the desk.
//!
//! Every optional field is an explicit `Option` so that a caller who sends
//! `0` is distinguishable from one who sends nothing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::RecordId;

/// A reference to an existing row, as in `{"id": 7}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordRef {
    pub id: RecordId,
}

impl RecordRef {
    pub fn new(id: RecordId) -> Self {
        Self { id }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub id: RecordId,
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub grade: Option<String>,
    pub phone: Option<String>,
    pub working_area: Option<String>,
    pub opening_amount: Option<Decimal>,
    pub outstanding_amount: Option<Decimal>,
    pub payment_amount: Option<Decimal>,
    pub receive_amount: Option<Decimal>,
    pub agent: Option<RecordRef>,
    #[serde(default)]
    pub orders: Vec<OrderLineInput>,
}

/// An order nested inside a customer payload; the customer is implied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderLineInput {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub advance_amount: Decimal,
    pub description: Option<String>,
    #[serde(default)]
    pub payments: Vec<RecordRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderInput {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub advance_amount: Decimal,
    pub description: Option<String>,
    pub customer: Option<RecordRef>,
    #[serde(default)]
    pub payments: Vec<RecordRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentInput {
    #[serde(default)]
    pub name: String,
    pub working_area: Option<String>,
    #[serde(default)]
    pub commission: Decimal,
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentInput {
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub amount: Decimal,
}

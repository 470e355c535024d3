use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Primary key shared by every table. `0` means "not yet assigned".
pub type RecordId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
    pub id: RecordId,
    pub name: String,
    pub working_area: Option<String>,
    pub commission: Decimal,
    pub phone: Option<String>,
    pub country: Option<String>,
}

/// Stored customer row. Orders are not embedded; they point back through
/// `Order::customer_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
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
    pub agent_id: RecordId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: RecordId,
    pub amount: Decimal,
    pub advance_amount: Decimal,
    pub description: Option<String>,
    pub customer_id: RecordId,
    /// Shared references, in the order they were attached.
    pub payment_ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payment {
    pub id: RecordId,
    pub payment_type: String,
    pub amount: Decimal,
}
